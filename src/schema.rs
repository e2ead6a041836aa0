//! Wire schema for GenUI v1.0 messages
//!
//! The generation backend streams three message kinds: surface updates (a
//! full replacement of one surface's flat component list), data model
//! updates (a full replacement of the shared JSON data document), and
//! advisory begin-rendering signals. Parsing is tolerant per component
//! record: a malformed record is dropped with a debug log and the rest of
//! the update survives.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const SCHEMA_VERSION: &str = "genui-1.0";

/// A single message from the generation backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "surfaceUpdate")]
    SurfaceUpdate {
        #[serde(rename = "schemaVersion", default)]
        schema_version: String,
        surface: String,
        /// Kept as raw values so one bad record can't sink the whole update.
        #[serde(default)]
        components: Vec<Value>,
    },
    #[serde(rename = "dataModelUpdate")]
    DataModelUpdate {
        #[serde(rename = "schemaVersion", default)]
        schema_version: String,
        data: Value,
    },
    #[serde(rename = "beginRendering")]
    BeginRendering {
        #[serde(rename = "schemaVersion", default)]
        schema_version: String,
        surface: String,
    },
}

impl Message {
    /// Parse one message from JSON text.
    ///
    /// The backend is not consistent about the casing of the `type` tag, so
    /// it is normalized to the canonical camelCase form before dispatch.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(text)?;
        normalize_type_tag(&mut value);
        let message: Message = serde_json::from_value(value)?;
        if let Some(version) = message.schema_version() {
            if !version.is_empty() && version != SCHEMA_VERSION {
                warn!("Unexpected schema version: {}", version);
            }
        }
        Ok(message)
    }

    fn schema_version(&self) -> Option<&str> {
        match self {
            Message::SurfaceUpdate { schema_version, .. }
            | Message::DataModelUpdate { schema_version, .. }
            | Message::BeginRendering { schema_version, .. } => Some(schema_version),
        }
    }
}

fn normalize_type_tag(value: &mut Value) {
    if let Some(tag) = value.get("type").and_then(Value::as_str) {
        let canonical = match tag.to_ascii_lowercase().as_str() {
            "surfaceupdate" => "surfaceUpdate",
            "datamodelupdate" => "dataModelUpdate",
            "beginrendering" => "beginRendering",
            _ => return,
        };
        value["type"] = Value::String(canonical.to_string());
    }
}

/// Entry in the flat component list.
#[derive(Debug, Clone, Deserialize)]
pub struct Component {
    pub id: String,
    pub component: ComponentDefinition,
}

/// Tagged union over the seven component kinds.
#[derive(Debug, Clone, Deserialize)]
pub enum ComponentDefinition {
    Column(ColumnProps),
    Row(RowProps),
    Card(CardProps),
    Divider(DividerProps),
    Text(TextProps),
    Icon(IconProps),
    Image(ImageProps),
}

/// Child id list wrapper (`{"explicitList": [...]}` on the wire).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Children {
    #[serde(rename = "explicitList", default)]
    pub explicit_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnProps {
    pub children: Option<Children>,
    /// "none" | "xsmall" | "small" | "medium" | "large"
    pub gap: Option<String>,
    /// "start" | "center" | "end" | "stretch"
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowProps {
    pub children: Option<Children>,
    pub gap: Option<String>,
    pub alignment: Option<String>,
    /// "start" | "center" | "end" | "spaceBetween" | "spaceAround" | "spaceEvenly"
    pub distribution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardProps {
    pub child: Option<String>,
}

/// Dividers carry no data; the wire form is an empty object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DividerProps {}

#[derive(Debug, Clone, Deserialize)]
pub struct TextProps {
    pub text: TextValue,
    /// "h1" | "h2" | "h3" | "body" | "caption" | "label" | "monospace"
    #[serde(rename = "usageHint")]
    pub usage_hint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconProps {
    pub source: Option<SourceValue>,
    pub name: Option<TextValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageProps {
    pub source: Option<SourceValue>,
    /// Legacy alias for `source`; at least one of the two must be present.
    pub url: Option<SourceValue>,
    #[serde(rename = "altText")]
    pub alt_text: Option<TextValue>,
    /// "icon" | "avatar" | "smallFeature" | "mediumFeature" | "largeFeature" | "header"
    #[serde(rename = "usageHint")]
    pub usage_hint: Option<String>,
}

/// Text binding: literal, legacy literal, data-bound pointer, or a bare
/// primitive. Variant order matters: when both `literal` and `path` appear
/// on the same object the literal wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Literal {
        literal: String,
    },
    LegacyLiteral {
        #[serde(rename = "literalString")]
        literal_string: String,
    },
    Path {
        path: String,
    },
    Bare(Value),
}

/// Source binding for Icon/Image: literal URL, pointer, or bare string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    Url { url: String },
    Path { path: String },
    Bare(Value),
}

/// Parse raw component records, dropping the ones that don't conform.
pub fn parse_components(raw: &[Value]) -> Vec<Component> {
    let mut components = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<Component>(value.clone()) {
            Ok(component) => components.push(component),
            Err(e) => {
                debug!("Dropping malformed component record: {}", e);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_surface_update() {
        let text = r#"{
            "type": "surfaceUpdate",
            "schemaVersion": "genui-1.0",
            "surface": "main",
            "components": [
                {"id": "root", "component": {"Column": {"children": {"explicitList": ["t1"]}, "gap": "small"}}},
                {"id": "t1", "component": {"Text": {"text": {"literal": "hello"}, "usageHint": "h1"}}}
            ]
        }"#;
        let message = Message::parse(text).unwrap();
        match message {
            Message::SurfaceUpdate { surface, components, .. } => {
                assert_eq!(surface, "main");
                let parsed = parse_components(&components);
                assert_eq!(parsed.len(), 2);
                assert_eq!(parsed[0].id, "root");
            }
            other => panic!("wrong message kind: {:?}", other),
        }
    }

    #[test]
    fn test_type_tag_case_insensitive() {
        let text = r#"{"type": "DataModelUpdate", "data": {"a": 1}}"#;
        let message = Message::parse(text).unwrap();
        assert!(matches!(message, Message::DataModelUpdate { .. }));

        let text = r#"{"type": "BEGINRENDERING", "surface": "main"}"#;
        let message = Message::parse(text).unwrap();
        assert!(matches!(message, Message::BeginRendering { .. }));
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        assert!(Message::parse(r#"{"type": "noSuchThing"}"#).is_err());
    }

    #[test]
    fn test_malformed_record_dropped_rest_survives() {
        let raw = vec![
            json!({"id": "a", "component": {"Divider": {}}}),
            json!({"component": {"Divider": {}}}),            // no id
            json!({"id": "b", "component": {"Widget": {}}}),  // unknown tag
            json!({"id": "c", "component": {"Text": {"text": "plain"}}}),
        ];
        let parsed = parse_components(&raw);
        let ids: Vec<&str> = parsed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_text_value_forms() {
        let literal: TextValue = serde_json::from_value(json!({"literal": "x"})).unwrap();
        assert_eq!(literal, TextValue::Literal { literal: "x".into() });

        let legacy: TextValue = serde_json::from_value(json!({"literalString": "y"})).unwrap();
        assert_eq!(legacy, TextValue::LegacyLiteral { literal_string: "y".into() });

        let path: TextValue = serde_json::from_value(json!({"path": "/a/b"})).unwrap();
        assert_eq!(path, TextValue::Path { path: "/a/b".into() });

        let bare: TextValue = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(bare, TextValue::Bare(json!(42)));

        // Both fields present: the literal variant matches first.
        let both: TextValue = serde_json::from_value(json!({"literal": "hi", "path": "/x"})).unwrap();
        assert_eq!(both, TextValue::Literal { literal: "hi".into() });
    }

    #[test]
    fn test_source_value_forms() {
        let url: SourceValue = serde_json::from_value(json!({"url": "https://e.x/a.png"})).unwrap();
        assert_eq!(url, SourceValue::Url { url: "https://e.x/a.png".into() });

        let bare: SourceValue = serde_json::from_value(json!("https://e.x/b.png")).unwrap();
        assert_eq!(bare, SourceValue::Bare(json!("https://e.x/b.png")));
    }
}
