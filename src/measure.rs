//! Off-screen measurement
//!
//! Sizing is a separate phase from drawing so that the packer (and tests)
//! can work from deterministic numbers without a real terminal. Sizes are
//! in terminal cells, computed from unicode display widths. Text wraps at
//! the given width, but an unbreakable token reports its full width and a
//! Row sums its children, so a measurement can exceed the constraint;
//! that is what lets the packer rule a surface out as oversized.

use crate::forest::{NodeKind, ResolvedNode};
use unicode_width::UnicodeWidthStr;

pub const ICON_GLYPH: &str = "\u{25c6}"; // ◆

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Measure a whole surface: roots stack vertically, no gap between them.
pub fn measure_forest(forest: &[ResolvedNode], wrap_width: u16) -> Size {
    let mut size = Size::default();
    for node in forest {
        let node_size = measure_node(node, wrap_width);
        size.width = size.width.max(node_size.width);
        size.height = size.height.saturating_add(node_size.height);
    }
    size
}

/// Measure one node and its subtree.
pub fn measure_node(node: &ResolvedNode, wrap_width: u16) -> Size {
    match &node.kind {
        NodeKind::Column { gap, .. } => {
            let mut size = Size::default();
            for (index, child) in node.children.iter().enumerate() {
                let child_size = measure_node(child, wrap_width);
                size.width = size.width.max(child_size.width);
                size.height = size.height.saturating_add(child_size.height);
                if index + 1 < node.children.len() {
                    size.height = size.height.saturating_add(gap.cells());
                }
            }
            size
        }
        NodeKind::Row { gap, .. } => {
            let mut size = Size::default();
            for (index, child) in node.children.iter().enumerate() {
                let child_size = measure_node(child, wrap_width);
                size.width = size.width.saturating_add(child_size.width);
                size.height = size.height.max(child_size.height);
                if index + 1 < node.children.len() {
                    size.width = size.width.saturating_add(gap.cells());
                }
            }
            size
        }
        NodeKind::Card => {
            // Border adds one cell on every side.
            let inner_width = wrap_width.saturating_sub(2);
            let inner = match node.children.first() {
                Some(child) => measure_node(child, inner_width),
                None => Size::new(cell_width(crate::render::EMPTY_CARD_MARKER), 1),
            };
            Size::new(
                inner.width.saturating_add(2),
                inner.height.saturating_add(2),
            )
        }
        NodeKind::Divider => Size::new(wrap_width, 1),
        NodeKind::Text { text, .. } => {
            let content = text.resolved().unwrap_or("");
            let lines = wrap_lines(content, wrap_width);
            let width = lines.iter().map(|l| cell_width(l)).max().unwrap_or(0);
            Size::new(width, lines.len() as u16)
        }
        NodeKind::Icon { name, .. } => {
            let label_width = name
                .as_ref()
                .and_then(|n| n.resolved())
                .map(|n| cell_width(n) + 1)
                .unwrap_or(0);
            Size::new(cell_width(ICON_GLYPH) + label_width, 1)
        }
        NodeKind::Image { hint, .. } => Size::new(wrap_width, hint.rows()),
    }
}

/// Greedy word wrap. A token wider than the limit stays whole on its own
/// line, so the reported width can exceed `width`. Empty text still
/// occupies one line.
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let limit = width.max(1) as usize;
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0usize;
        for word in raw_line.split_whitespace() {
            let word_width = word.width();
            let needed = if current.is_empty() { word_width } else { word_width + 1 };
            if current_width + needed > limit && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn cell_width(text: &str) -> u16 {
    text.width() as u16
}
