//! Declarative header specification.
//!
//! This is the format mapper definitions are expressed in, whether they come
//! from the closure DSL or from a JSON document:
//!
//! ```json
//! {
//!   "symbolize_keys": true,
//!   "prefix": "user",
//!   "attributes": [
//!     { "kind": "attribute", "name": "id" },
//!     { "kind": "wrap", "name": "details", "prefix": "first",
//!       "attributes": [{ "kind": "attribute", "name": "name" }] },
//!     { "kind": "wrap", "name": "contact", "prefix": false,
//!       "attributes": [{ "kind": "attribute", "name": "email" }] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use crate::core::{Key, Result, RomError};

/// Prefix setting of a header block or attribute.
///
/// An absent prefix means "use what the surrounding block resolves to";
/// `Disabled` (written as `false`) turns prefixing off for the whole subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrefixRepr", into = "PrefixRepr")]
pub enum Prefix {
    Disabled,
    Name(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PrefixRepr {
    Flag(bool),
    Name(String),
}

impl TryFrom<PrefixRepr> for Prefix {
    type Error = String;

    fn try_from(repr: PrefixRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PrefixRepr::Flag(false) => Ok(Self::Disabled),
            PrefixRepr::Flag(true) => Err("prefix must be a string or false".to_string()),
            PrefixRepr::Name(name) => Ok(Self::Name(name)),
        }
    }
}

impl From<Prefix> for PrefixRepr {
    fn from(prefix: Prefix) -> Self {
        match prefix {
            Prefix::Disabled => Self::Flag(false),
            Prefix::Name(name) => Self::Name(name),
        }
    }
}

/// Options of a header block: the mapper definition itself or a wrap/unwrap group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolize_keys: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Prefix>,
}

impl HeaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbolize_keys(mut self, symbolize: bool) -> Self {
        self.symbolize_keys = Some(symbolize);
        self
    }

    pub fn inherit_header(mut self, inherit: bool) -> Self {
        self.inherit_header = Some(inherit);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(Prefix::Name(prefix.into()));
        self
    }

    pub fn no_prefix(mut self) -> Self {
        self.prefix = Some(Prefix::Disabled);
        self
    }

    /// Fill every option unset here from `fallback`.
    pub fn or(self, fallback: &HeaderOptions) -> Self {
        Self {
            symbolize_keys: self.symbolize_keys.or(fallback.symbolize_keys),
            inherit_header: self.inherit_header.or(fallback.inherit_header),
            prefix: self.prefix.or_else(|| fallback.prefix.clone()),
        }
    }
}

/// Options of a single scalar attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOptions {
    /// Explicit source key; wins over prefix composition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Prefix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolize_keys: Option<bool>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.from = Some(source.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(Prefix::Name(prefix.into()));
        self
    }

    pub fn no_prefix(mut self) -> Self {
        self.prefix = Some(Prefix::Disabled);
        self
    }

    pub fn symbolize_keys(mut self, symbolize: bool) -> Self {
        self.symbolize_keys = Some(symbolize);
        self
    }
}

/// One line of a header declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeDirective {
    Attribute {
        #[serde(with = "key_name")]
        name: Key,
        #[serde(flatten)]
        options: AttributeOptions,
    },
    Wrap {
        #[serde(with = "key_name")]
        name: Key,
        #[serde(flatten)]
        options: HeaderOptions,
        #[serde(default)]
        attributes: Vec<AttributeDirective>,
    },
    Unwrap {
        #[serde(with = "key_name")]
        name: Key,
        #[serde(flatten)]
        options: HeaderOptions,
        #[serde(default)]
        attributes: Vec<AttributeDirective>,
    },
    Exclude {
        #[serde(with = "key_name")]
        name: Key,
    },
}

impl AttributeDirective {
    pub fn name(&self) -> &Key {
        match self {
            Self::Attribute { name, .. }
            | Self::Wrap { name, .. }
            | Self::Unwrap { name, .. }
            | Self::Exclude { name } => name,
        }
    }

    pub fn is_exclude(&self) -> bool {
        matches!(self, Self::Exclude { .. })
    }
}

/// A complete, not yet resolved header declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderSpec {
    #[serde(flatten)]
    pub options: HeaderOptions,
    #[serde(default)]
    pub attributes: Vec<AttributeDirective>,
}

impl HeaderSpec {
    pub fn new(options: HeaderOptions, attributes: Vec<AttributeDirective>) -> Self {
        Self {
            options,
            attributes,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RomError::InvalidHeader(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Keys travel as plain strings; a leading `:` marks a symbol key.
mod key_name {
    use serde::{Deserialize, Deserializer, Serializer};
    use crate::core::Key;

    pub fn serialize<S: Serializer>(key: &Key, serializer: S) -> Result<S::Ok, S::Error> {
        match key {
            Key::Sym(name) => serializer.serialize_str(&format!(":{}", name)),
            Key::Str(name) => serializer.serialize_str(name),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Key, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Key::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_spec() {
        let spec = HeaderSpec::from_json(
            r#"{
                "symbolize_keys": true,
                "prefix": "user",
                "attributes": [
                    {"kind": "attribute", "name": "id"},
                    {"kind": "wrap", "name": "contact", "prefix": false,
                     "attributes": [{"kind": "attribute", "name": "email", "from": "mail"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.options.symbolize_keys, Some(true));
        assert_eq!(spec.options.prefix, Some(Prefix::Name("user".into())));
        assert_eq!(spec.attributes.len(), 2);

        let AttributeDirective::Wrap { options, attributes, .. } = &spec.attributes[1] else {
            panic!("expected a wrap directive");
        };
        assert_eq!(options.prefix, Some(Prefix::Disabled));
        assert_eq!(
            attributes[0],
            AttributeDirective::Attribute {
                name: Key::str("email"),
                options: AttributeOptions::new().source("mail"),
            }
        );
    }

    #[test]
    fn test_prefix_true_is_rejected() {
        let err = HeaderSpec::from_json(r#"{"prefix": true, "attributes": []}"#).unwrap_err();
        assert!(matches!(err, RomError::InvalidHeader(_)));
    }

    #[test]
    fn test_symbol_names_survive_json() {
        let spec = HeaderSpec::new(
            HeaderOptions::new().no_prefix(),
            vec![AttributeDirective::Exclude { name: Key::sym("id") }],
        );
        let json = spec.to_json().unwrap();
        assert!(json.contains("\":id\""));
        assert_eq!(HeaderSpec::from_json(&json).unwrap(), spec);
    }

    #[test]
    fn test_options_fallback() {
        let top = HeaderOptions::new().symbolize_keys(true).prefix("user");
        let merged = HeaderOptions::new().no_prefix().or(&top);
        assert_eq!(merged.symbolize_keys, Some(true));
        assert_eq!(merged.prefix, Some(Prefix::Disabled));
    }
}
