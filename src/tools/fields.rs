//! Lenient field readers for loosely typed upstream payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads strings and numbers as text; blanks and anything else read as absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`text`], with absent values read as an empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(deserializer)?.unwrap_or_default())
}

/// Reads a non-negative integer given as a number or a numeric string.
pub fn number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Reads a nested object; null, non-objects and objects that do not fit read
/// as the default.
pub fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// Reads a single string or a list of strings.
pub fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Inner {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "text")]
        one: Option<String>,
        #[serde(default, deserialize_with = "text_list")]
        many: Vec<String>,
        #[serde(default, deserialize_with = "string")]
        label: String,
        #[serde(default, deserialize_with = "number")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "object")]
        inner: Inner,
    }

    fn sample(value: Value) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_test() {
        assert_eq!(sample(json!({ "one": " abc " })).one.as_deref(), Some("abc"));
        assert_eq!(sample(json!({ "one": 376 })).one.as_deref(), Some("376"));
        assert_eq!(sample(json!({ "one": "" })).one, None);
        assert_eq!(sample(json!({ "one": null })).one, None);
        assert_eq!(sample(json!({ "one": { "nested": 1 } })).one, None);
        assert_eq!(sample(json!({})).one, None);
    }

    #[test]
    fn text_list_test() {
        assert_eq!(sample(json!({ "many": "ns1" })).many, vec!["ns1"]);
        assert_eq!(
            sample(json!({ "many": ["ns1", "", 3, "ns2"] })).many,
            vec!["ns1", "ns2"]
        );
        assert!(sample(json!({ "many": null })).many.is_empty());
        assert!(sample(json!({})).many.is_empty());
    }

    #[test]
    fn string_test() {
        assert_eq!(sample(json!({ "label": "ns1.example.com" })).label, "ns1.example.com");
        assert_eq!(sample(json!({ "label": null })).label, "");
        assert_eq!(sample(json!({ "label": 7 })).label, "7");
        assert_eq!(sample(json!({})).label, "");
    }

    #[test]
    fn number_test() {
        assert_eq!(sample(json!({ "count": 300 })).count, Some(300));
        assert_eq!(sample(json!({ "count": " 3600 " })).count, Some(3600));
        assert_eq!(sample(json!({ "count": "soon" })).count, None);
        assert_eq!(sample(json!({ "count": -1 })).count, None);
        assert_eq!(sample(json!({ "count": null })).count, None);
    }

    #[test]
    fn object_test() {
        assert_eq!(
            sample(json!({ "inner": { "name": "a" } })).inner,
            Inner { name: "a".to_string() }
        );
        assert_eq!(sample(json!({ "inner": null })).inner, Inner::default());
        assert_eq!(sample(json!({ "inner": "text" })).inner, Inner::default());
        assert_eq!(sample(json!({ "inner": { "name": 5 } })).inner, Inner::default());
    }
}
