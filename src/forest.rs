//! Forest reconstruction from flat component lists
//!
//! Surface updates arrive as unordered flat records linked only by id
//! references. This module rebuilds the rooted forest: last record wins for
//! a duplicated id, dangling references and cycles are suppressed, and a
//! child referenced by more than one parent is owned by exactly one of them
//! (the first parent reached in depth-first order, roots in declared
//! order). The build is pure and total; bad input shrinks the forest, it
//! never aborts it.

use crate::binding::{normalize_source, normalize_text, Display};
use crate::schema::{Component, ComponentDefinition};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A materialized node: bindings resolved, children attached in declared
/// order. Rebuilt from scratch on every surface replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub id: String,
    pub kind: NodeKind,
    pub children: Vec<ResolvedNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Column {
        gap: GapSize,
        alignment: Alignment,
    },
    Row {
        gap: GapSize,
        alignment: Alignment,
        distribution: Distribution,
    },
    /// At most one child; the renderer shows an empty-state marker when
    /// `children` is empty.
    Card,
    Divider,
    Text {
        text: Display,
        hint: UsageHint,
    },
    Icon {
        name: Option<Display>,
        source: Option<Display>,
    },
    Image {
        source: Display,
        alt: Option<Display>,
        hint: ImageHint,
    },
}

/// Spacing between siblings. Terminal cells are coarse, so xsmall and
/// small collapse to one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapSize {
    #[default]
    None,
    XSmall,
    Small,
    Medium,
    Large,
}

impl GapSize {
    /// Unknown keywords fall back to the default rather than failing the
    /// record.
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("xsmall") => GapSize::XSmall,
            Some("small") => GapSize::Small,
            Some("medium") => GapSize::Medium,
            Some("large") => GapSize::Large,
            _ => GapSize::None,
        }
    }

    pub fn cells(self) -> u16 {
        match self {
            GapSize::None => 0,
            GapSize::XSmall | GapSize::Small => 1,
            GapSize::Medium => 2,
            GapSize::Large => 3,
        }
    }
}

/// Cross-axis placement of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl Alignment {
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("center") => Alignment::Center,
            Some("end") => Alignment::End,
            Some("stretch") => Alignment::Stretch,
            _ => Alignment::Start,
        }
    }
}

/// Main-axis distribution for Row children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl Distribution {
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("center") => Distribution::Center,
            Some("end") => Distribution::End,
            Some("spaceBetween") => Distribution::SpaceBetween,
            Some("spaceAround") => Distribution::SpaceAround,
            Some("spaceEvenly") => Distribution::SpaceEvenly,
            _ => Distribution::Start,
        }
    }
}

/// Presentation hint for Text; picks style only, never structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageHint {
    H1,
    H2,
    H3,
    #[default]
    Body,
    Caption,
    Label,
    Monospace,
}

impl UsageHint {
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("h1") => UsageHint::H1,
            Some("h2") => UsageHint::H2,
            Some("h3") => UsageHint::H3,
            Some("caption") => UsageHint::Caption,
            Some("label") => UsageHint::Label,
            Some("monospace") => UsageHint::Monospace,
            _ => UsageHint::Body,
        }
    }
}

/// Size class for Image placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageHint {
    Icon,
    Avatar,
    SmallFeature,
    #[default]
    MediumFeature,
    LargeFeature,
    Header,
}

impl ImageHint {
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("icon") => ImageHint::Icon,
            Some("avatar") => ImageHint::Avatar,
            Some("smallFeature") => ImageHint::SmallFeature,
            Some("largeFeature") => ImageHint::LargeFeature,
            Some("header") => ImageHint::Header,
            _ => ImageHint::MediumFeature,
        }
    }

    /// Placeholder height in rows, borders included.
    pub fn rows(self) -> u16 {
        match self {
            ImageHint::Icon => 3,
            ImageHint::Avatar | ImageHint::SmallFeature => 4,
            ImageHint::MediumFeature => 6,
            ImageHint::Header => 7,
            ImageHint::LargeFeature => 9,
        }
    }
}

/// Build the rooted forest for one surface.
///
/// Roots are exactly the ids never referenced as a child, in their original
/// relative order. Children materialize in declared order.
pub fn build(components: &[Component], data: &Value) -> Vec<ResolvedNode> {
    // Last record with a given id wins; the id keeps its first occurrence's
    // position for ordering.
    let mut order: Vec<&str> = Vec::new();
    let mut definitions: HashMap<&str, &ComponentDefinition> = HashMap::new();
    for record in components {
        if !definitions.contains_key(record.id.as_str()) {
            order.push(&record.id);
        }
        definitions.insert(&record.id, &record.component);
    }

    // Referenced ids, scanned from the winning definitions only.
    let mut referenced: HashSet<&str> = HashSet::new();
    for definition in definitions.values() {
        for child in child_ids(definition) {
            referenced.insert(child);
        }
    }

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut ancestors: Vec<&str> = Vec::new();
    let mut roots = Vec::new();
    for id in order {
        if referenced.contains(id) {
            continue;
        }
        if let Some(node) = materialize(id, &definitions, data, &mut claimed, &mut ancestors) {
            roots.push(node);
        }
    }
    roots
}

fn child_ids<'a>(definition: &'a ComponentDefinition) -> Vec<&'a str> {
    match definition {
        ComponentDefinition::Column(props) => props
            .children
            .iter()
            .flat_map(|c| c.explicit_list.iter().map(String::as_str))
            .collect(),
        ComponentDefinition::Row(props) => props
            .children
            .iter()
            .flat_map(|c| c.explicit_list.iter().map(String::as_str))
            .collect(),
        ComponentDefinition::Card(props) => props.child.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

fn materialize<'a>(
    id: &'a str,
    definitions: &HashMap<&'a str, &'a ComponentDefinition>,
    data: &Value,
    claimed: &mut HashSet<&'a str>,
    ancestors: &mut Vec<&'a str>,
) -> Option<ResolvedNode> {
    if ancestors.contains(&id) {
        debug!("Suppressing cycle at component {}", id);
        return None;
    }
    if claimed.contains(id) {
        debug!("Component {} already owned by an earlier parent", id);
        return None;
    }
    let Some(definition) = definitions.get(id) else {
        debug!("Dangling reference to unknown component {}", id);
        return None;
    };

    let kind = match definition {
        ComponentDefinition::Column(props) => NodeKind::Column {
            gap: GapSize::from_keyword(props.gap.as_deref()),
            alignment: Alignment::from_keyword(props.alignment.as_deref()),
        },
        ComponentDefinition::Row(props) => NodeKind::Row {
            gap: GapSize::from_keyword(props.gap.as_deref()),
            alignment: Alignment::from_keyword(props.alignment.as_deref()),
            distribution: Distribution::from_keyword(props.distribution.as_deref()),
        },
        ComponentDefinition::Card(_) => NodeKind::Card,
        ComponentDefinition::Divider(_) => NodeKind::Divider,
        ComponentDefinition::Text(props) => NodeKind::Text {
            text: normalize_text(&props.text, data),
            hint: UsageHint::from_keyword(props.usage_hint.as_deref()),
        },
        ComponentDefinition::Icon(props) => NodeKind::Icon {
            name: props.name.as_ref().map(|n| normalize_text(n, data)),
            source: props.source.as_ref().map(|s| normalize_source(s, data)),
        },
        ComponentDefinition::Image(props) => {
            let Some(source) = props.source.as_ref().or(props.url.as_ref()) else {
                debug!("Image {} has neither source nor url, skipping", id);
                return None;
            };
            NodeKind::Image {
                source: normalize_source(source, data),
                alt: props.alt_text.as_ref().map(|a| normalize_text(a, data)),
                hint: ImageHint::from_keyword(props.usage_hint.as_deref()),
            }
        }
    };

    claimed.insert(id);
    ancestors.push(id);
    let mut children = Vec::new();
    for child_id in child_ids(definition) {
        if let Some(child) = materialize(child_id, definitions, data, claimed, ancestors) {
            children.push(child);
        }
    }
    ancestors.pop();

    Some(ResolvedNode {
        id: id.to_string(),
        kind,
        children,
    })
}
