//! Data binding resolution
//!
//! JSON-pointer lookup against the shared data document, plus the
//! normalization of text/source bindings into display values. Both are
//! total: a miss never raises, it falls back to the original unresolved
//! binding so the renderer can show an empty placeholder instead of an
//! error.

use crate::schema::{SourceValue, TextValue};
use serde_json::Value;

/// Resolve a JSON pointer against a data document.
///
/// `""` and `"/"` address the whole document. Each `/`-separated segment is
/// an object key (exact, case-sensitive) or, against an array, a base-10
/// non-negative integer index. `~1` unescapes to `/` and `~0` to `~`.
/// Any out-of-range, missing, or non-container traversal yields `None`.
pub fn resolve<'a>(data: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() || pointer == "/" {
        return Some(data);
    }
    let rest = pointer.strip_prefix('/')?;

    let mut current = data;
    for raw in rest.split('/') {
        let segment = unescape(raw);
        current = match current {
            Value::Object(map) => map.get(segment.as_ref())?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

fn unescape(segment: &str) -> std::borrow::Cow<'_, str> {
    if segment.contains('~') {
        std::borrow::Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        std::borrow::Cow::Borrowed(segment)
    }
}

/// Outcome of normalizing a binding.
///
/// `Unresolved` keeps the original binding text (the pointer, or the raw
/// value's JSON form) so logging can say what missed; the renderer shows it
/// as an empty/fallback marker, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Resolved(String),
    Unresolved(String),
}

impl Display {
    pub fn resolved(&self) -> Option<&str> {
        match self {
            Display::Resolved(s) => Some(s),
            Display::Unresolved(_) => None,
        }
    }
}

/// Normalize a text binding against the current data snapshot.
pub fn normalize_text(value: &TextValue, data: &Value) -> Display {
    match value {
        TextValue::Literal { literal } => Display::Resolved(literal.clone()),
        TextValue::LegacyLiteral { literal_string } => Display::Resolved(literal_string.clone()),
        TextValue::Path { path } => match resolve(data, path) {
            Some(found) => Display::Resolved(display_string(found)),
            None => {
                tracing::debug!("Text binding miss: {}", path);
                Display::Unresolved(path.clone())
            }
        },
        TextValue::Bare(raw) => bare_display(raw),
    }
}

/// Normalize a source binding (Icon/Image) against the data snapshot.
///
/// A resolved pointer value is a literal URL from here on; it is never
/// re-interpreted as another pointer.
pub fn normalize_source(value: &SourceValue, data: &Value) -> Display {
    match value {
        SourceValue::Url { url } => Display::Resolved(url.clone()),
        SourceValue::Path { path } => match resolve(data, path) {
            Some(found) => Display::Resolved(display_string(found)),
            None => {
                tracing::debug!("Source binding miss: {}", path);
                Display::Unresolved(path.clone())
            }
        },
        SourceValue::Bare(raw) => bare_display(raw),
    }
}

fn bare_display(raw: &Value) -> Display {
    match raw {
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            Display::Resolved(display_string(raw))
        }
        // A bare object/array is not a usable literal.
        other => Display::Unresolved(compact(other)),
    }
}

/// String form of a resolved value: identity for strings, canonical text
/// for numbers and booleans, empty for null, compact JSON for containers.
fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => compact(other),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SourceValue, TextValue};
    use serde_json::json;

    #[test]
    fn test_resolve_nested_path() {
        let data = json!({"a": {"b": [{"c": 1}]}});
        assert_eq!(resolve(&data, "/a/b/0"), Some(&json!({"c": 1})));
        assert_eq!(resolve(&data, "/a/b/0/c"), Some(&json!(1)));
        assert_eq!(resolve(&data, "/a/x"), None);
    }

    #[test]
    fn test_resolve_whole_document() {
        let data = json!({"a": 1});
        assert_eq!(resolve(&data, "/"), Some(&data));
        assert_eq!(resolve(&data, ""), Some(&data));
    }

    #[test]
    fn test_resolve_fails_closed() {
        let data = json!({"a": [1, 2], "s": "str"});
        assert_eq!(resolve(&data, "/a/2"), None);      // out of range
        assert_eq!(resolve(&data, "/a/-1"), None);     // not a non-negative index
        assert_eq!(resolve(&data, "/a/one"), None);    // not an index at all
        assert_eq!(resolve(&data, "/s/0"), None);      // traversal into a scalar
        assert_eq!(resolve(&data, "a"), None);         // missing leading slash
        assert_eq!(resolve(&data, "/A"), None);        // case-sensitive
    }

    #[test]
    fn test_resolve_escapes() {
        let data = json!({"a/b": 1, "m~n": 2});
        assert_eq!(resolve(&data, "/a~1b"), Some(&json!(1)));
        assert_eq!(resolve(&data, "/m~0n"), Some(&json!(2)));
    }

    #[test]
    fn test_literal_wins_over_path() {
        let data = json!({"x": "from data"});
        let both: TextValue = serde_json::from_value(json!({"literal": "hi", "path": "/x"})).unwrap();
        assert_eq!(normalize_text(&both, &data), Display::Resolved("hi".into()));
        // And regardless of whether the path exists.
        assert_eq!(normalize_text(&both, &json!({})), Display::Resolved("hi".into()));
    }

    #[test]
    fn test_path_miss_keeps_original_binding() {
        let value = TextValue::Path { path: "/missing".into() };
        assert_eq!(
            normalize_text(&value, &json!({})),
            Display::Unresolved("/missing".into())
        );
    }

    #[test]
    fn test_string_round_trip_and_coercion() {
        let data = json!({"s": "exact value", "n": 42, "b": true, "nothing": null});
        let s = TextValue::Path { path: "/s".into() };
        assert_eq!(normalize_text(&s, &data), Display::Resolved("exact value".into()));
        let n = TextValue::Path { path: "/n".into() };
        assert_eq!(normalize_text(&n, &data), Display::Resolved("42".into()));
        let b = TextValue::Path { path: "/b".into() };
        assert_eq!(normalize_text(&b, &data), Display::Resolved("true".into()));
        let nothing = TextValue::Path { path: "/nothing".into() };
        assert_eq!(normalize_text(&nothing, &data), Display::Resolved(String::new()));
    }

    #[test]
    fn test_bare_primitives() {
        let data = json!({});
        assert_eq!(
            normalize_text(&TextValue::Bare(json!("plain")), &data),
            Display::Resolved("plain".into())
        );
        assert_eq!(
            normalize_text(&TextValue::Bare(json!(7)), &data),
            Display::Resolved("7".into())
        );
        assert!(matches!(
            normalize_text(&TextValue::Bare(json!({"not": "a literal"})), &data),
            Display::Unresolved(_)
        ));
    }

    #[test]
    fn test_source_pointer_not_reinterpreted() {
        // The resolved value looks like a pointer but must be taken as a
        // literal URL, not chased a second time.
        let data = json!({"img": "/another/pointer", "another": {"pointer": "real.png"}});
        let value = SourceValue::Path { path: "/img".into() };
        assert_eq!(
            normalize_source(&value, &data),
            Display::Resolved("/another/pointer".into())
        );
    }
}
