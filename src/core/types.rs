use std::fmt;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use super::Value;

/// A tuple key: either string-typed (as raw rows usually come from storage)
/// or symbol-typed (as mapped tuples expose them).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Sym(String),
}

impl Key {
    pub fn str(name: impl Into<String>) -> Self {
        Self::Str(name.into())
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Self::Sym(name.into())
    }

    /// `":name"` reads as a symbol key, anything else as a string key.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(':') {
            Some(name) if !name.is_empty() => Self::sym(name),
            _ => Self::str(raw),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Str(name) | Self::Sym(name) => name,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Sym(_))
    }

    pub fn to_symbol(&self) -> Self {
        Self::Sym(self.name().to_string())
    }

    pub fn to_str_key(&self) -> Self {
        Self::Str(self.name().to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(name) => write!(f, "{:?}", name),
            Self::Sym(name) => write!(f, ":{}", name),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Str(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Str(name)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

/// An insertion-ordered mapping from keys to values: one row of a relation,
/// or the structure a mapper produces from it.
#[derive(Debug, Clone, Default)]
pub struct Tuple {
    entries: Vec<(Key, Value)>,
}

impl Tuple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<Key>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tuple = Self::new();
        for (key, value) in pairs {
            tuple.insert(key, value);
        }
        tuple
    }

    /// Chainable insert, handy for building tuples inline.
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Exact lookup: key type and name must both match.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Permissive lookup by name, preferring a string key over a symbol key.
    pub fn fetch(&self, name: &str) -> Option<&Value> {
        self.get(&Key::str(name))
            .or_else(|| self.get(&Key::sym(name)))
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `other` into `self`, overwriting values of shared keys.
    pub fn merge(&mut self, other: Tuple) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// True when every entry of `filter` is present here with an equal value.
    pub fn matches(&self, filter: &Tuple) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.fetch(key.name()) == Some(value))
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            map.insert(key.name().to_string(), value.to_json());
        }
        JsonValue::Object(map)
    }

    /// Build from a JSON object. JSON has no symbols, so every key is a string key.
    pub fn from_json_object(map: &JsonMap<String, JsonValue>) -> Self {
        let mut tuple = Self::with_capacity(map.len());
        for (key, value) in map {
            tuple.insert(Key::str(key.as_str()), Value::from(value));
        }
        tuple
    }
}

/// Equality ignores entry order, like comparing two hashes.
impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| match key {
                Key::Sym(name) => format!("{}: {}", name, value),
                Key::Str(name) => format!("{:?} => {}", name, value),
            })
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl Serialize for Tuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}

impl IntoIterator for Tuple {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Tuple {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut tuple = Tuple::new().with("a", 1).with("b", 2);
        assert_eq!(tuple.insert("a", 3), Some(Value::Integer(1)));
        let keys: Vec<&str> = tuple.keys().map(Key::name).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(tuple.fetch("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left = Tuple::new().with("a", 1).with("b", 2);
        let right = Tuple::new().with("b", 2).with("a", 1);
        assert_eq!(left, right);
        assert_ne!(left, Tuple::new().with("a", 1));
    }

    #[test]
    fn test_string_and_symbol_keys_differ() {
        let tuple = Tuple::new().with(Key::sym("id"), 1);
        assert!(tuple.get(&Key::str("id")).is_none());
        assert_eq!(tuple.fetch("id"), Some(&Value::Integer(1)));
        assert_ne!(tuple, Tuple::new().with("id", 1));
    }

    #[test]
    fn test_fetch_prefers_string_key() {
        let tuple = Tuple::new().with(Key::sym("id"), 1).with("id", 2);
        assert_eq!(tuple.fetch("id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse(":id"), Key::sym("id"));
        assert_eq!(Key::parse("id"), Key::str("id"));
        assert_eq!(Key::parse(":"), Key::str(":"));
    }

    #[test]
    fn test_display() {
        let tuple = Tuple::new()
            .with(Key::sym("id"), 1)
            .with("name", "Jane");
        assert_eq!(tuple.to_string(), r#"{id: 1, "name" => "Jane"}"#);
    }

    #[test]
    fn test_serialize_keeps_declaration_order() {
        let tuple = Tuple::new().with(Key::sym("z"), 1).with(Key::sym("a"), 2);
        let json = serde_json::to_string(&tuple).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }
}
