//! Submitted and default form values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

static NULL: Cstruct = Cstruct::Null;

/// A form value structure: nested mappings and sequences of strings.
///
/// Each render step hands a child the slice of the structure stored under
/// the child's name. Missing keys read as [`Cstruct::Null`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cstruct {
    /// No value.
    #[default]
    Null,
    /// A scalar value.
    Str(String),
    /// A sequence of values.
    Seq(Vec<Cstruct>),
    /// A mapping of child name to value.
    Map(BTreeMap<String, Cstruct>),
}

impl Cstruct {
    /// Builds a mapping from `(name, value)` pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Cstruct>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the value stored under `name`, or null.
    pub fn get(&self, name: &str) -> &Cstruct {
        match self {
            Self::Map(entries) => entries.get(name).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Returns the scalar value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns whether this is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns whether this is null or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.is_empty(),
            Self::Seq(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
        }
    }

    /// Converts arbitrary JSON into a cstruct. Scalars become strings.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Str(b.to_string()),
            Value::Number(n) => Self::Str(n.to_string()),
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::Seq(items.into_iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts the cstruct into JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Str(s) => Value::String(s.clone()),
            Self::Seq(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Returns the value at a dotted path, or null.
    pub fn get_path(&self, path: &str) -> &Cstruct {
        path.split('.').fold(self, |value, name| value.get(name))
    }

    /// Stores `value` at a dotted path, creating mappings on the way.
    pub fn set_path(&mut self, path: &str, value: Cstruct) {
        if !matches!(self, Self::Map(_)) {
            *self = Self::Map(BTreeMap::new());
        }
        if let Self::Map(entries) = self {
            match path.split_once('.') {
                Some((head, rest)) => entries
                    .entry(head.to_string())
                    .or_default()
                    .set_path(rest, value),
                None => {
                    entries.insert(path.to_string(), value);
                }
            }
        }
    }

    /// Removes and returns the value stored under `name`.
    pub fn take(&mut self, name: &str) -> Cstruct {
        match self {
            Self::Map(entries) => entries.remove(name).unwrap_or_default(),
            _ => Self::Null,
        }
    }

    /// Fills null entries from `defaults`, recursing into mappings.
    #[must_use]
    pub fn with_defaults(self, defaults: &Cstruct) -> Cstruct {
        match (self, defaults) {
            (Self::Null, d) => d.clone(),
            (Self::Map(mut entries), Self::Map(defs)) => {
                for (name, default) in defs {
                    let value = entries.remove(name).unwrap_or_default();
                    entries.insert(name.clone(), value.with_defaults(default));
                }
                Self::Map(entries)
            }
            (value, _) => value,
        }
    }

    /// Builds a mapping from flat request parameters.
    ///
    /// Dotted names (`address.city`) create nested mappings and repeated
    /// names collect into a sequence.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = BTreeMap::new();
        for (name, value) in params {
            insert_path(&mut root, name.as_ref(), value.into());
        }
        Self::Map(root)
    }
}

fn insert_path(map: &mut BTreeMap<String, Cstruct>, path: &str, value: String) {
    if let Some((head, rest)) = path.split_once('.') {
        let entry = map
            .entry(head.to_string())
            .or_insert_with(|| Cstruct::Map(BTreeMap::new()));
        if !matches!(entry, Cstruct::Map(_)) {
            *entry = Cstruct::Map(BTreeMap::new());
        }
        if let Cstruct::Map(inner) = entry {
            insert_path(inner, rest, value);
        }
        return;
    }

    match map.get_mut(path) {
        Some(Cstruct::Seq(items)) => items.push(Cstruct::Str(value)),
        Some(existing) if matches!(existing, Cstruct::Str(_)) => {
            let first = std::mem::take(existing);
            *existing = Cstruct::Seq(vec![first, Cstruct::Str(value)]);
        }
        _ => {
            map.insert(path.to_string(), Cstruct::Str(value));
        }
    }
}

impl From<&str> for Cstruct {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Cstruct {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Cstruct>> From<Option<T>> for Cstruct {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Cstruct>> for Cstruct {
    fn from(value: Vec<Cstruct>) -> Self {
        Self::Seq(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        let mut values = Cstruct::from_params([("logo.small", "s")]);
        assert_eq!(values.get_path("logo.small").as_str(), Some("s"));
        assert!(values.get_path("logo.large.x").is_null());

        values.set_path("images.images", Cstruct::Seq(vec![]));
        values.set_path("logo.small", "t".into());
        assert_eq!(values.get_path("logo.small").as_str(), Some("t"));
        assert_eq!(values.get_path("images.images"), &Cstruct::Seq(vec![]));

        assert_eq!(values.take("logo").get("small").as_str(), Some("t"));
        assert!(values.get("logo").is_null());
    }

    #[test]
    fn test_missing_key_is_null() {
        let values = Cstruct::map([("name", "Ada")]);
        assert_eq!(values.get("name").as_str(), Some("Ada"));
        assert!(values.get("email").is_null());
        assert!(Cstruct::Null.get("anything").is_null());
    }

    #[test]
    fn test_from_params_nests_dotted_names() {
        let values = Cstruct::from_params([
            ("name", "Ada"),
            ("address.city", "London"),
            ("address.zip", "N1"),
            ("tags", "a"),
            ("tags", "b"),
        ]);

        assert_eq!(values.get("address").get("city").as_str(), Some("London"));
        assert_eq!(values.get("address").get("zip").as_str(), Some("N1"));
        assert_eq!(
            values.get("tags"),
            &Cstruct::Seq(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_from_json_stringifies_scalars() {
        let values = Cstruct::from_json(json!({"age": 42, "active": true, "nick": null}));
        assert_eq!(values.get("age").as_str(), Some("42"));
        assert_eq!(values.get("active").as_str(), Some("true"));
        assert!(values.get("nick").is_null());
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Cstruct = serde_json::from_value(json!({"a": ["x", null]})).unwrap();
        assert_eq!(
            values.get("a"),
            &Cstruct::Seq(vec!["x".into(), Cstruct::Null])
        );
    }

    #[test]
    fn test_with_defaults_fills_nulls_only() {
        let defaults = Cstruct::from_json(json!({"_csrf": "tok", "name": "anon", "address": {"city": "Paris"}}));
        let values = Cstruct::from_json(json!({"name": "Ada", "address": {"zip": "N1"}}))
            .with_defaults(&defaults);

        assert_eq!(values.get("_csrf").as_str(), Some("tok"));
        assert_eq!(values.get("name").as_str(), Some("Ada"));
        assert_eq!(values.get("address").get("city").as_str(), Some("Paris"));
        assert_eq!(values.get("address").get("zip").as_str(), Some("N1"));
        assert_eq!(Cstruct::Null.with_defaults(&defaults), defaults);
    }

    #[test]
    fn test_is_empty() {
        assert!(Cstruct::Null.is_empty());
        assert!(Cstruct::from("").is_empty());
        assert!(!Cstruct::from("x").is_empty());
    }
}
