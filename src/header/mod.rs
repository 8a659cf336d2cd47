//! Attribute headers: the resolved, immutable description of how a raw
//! tuple's keys map onto a mapped tuple.

mod builder;
pub mod dsl;
pub mod spec;

pub use dsl::HeaderDsl;
pub use spec::{AttributeDirective, AttributeOptions, HeaderOptions, HeaderSpec, Prefix};

use std::fmt;
use tracing::{Level, event};
use crate::core::{Key, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Copies one source key to one target key.
    Scalar,
    /// Builds a nested tuple from the parent's flat namespace.
    Wrap,
    /// Lifts the keys of a nested tuple into the parent.
    Unwrap,
}

/// Header-level options after inheritance has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub symbolize_keys: bool,
    pub inherit_header: bool,
    pub prefix: Option<String>,
}

impl ResolvedOptions {
    /// Options of a top-level header: declared options over defaults.
    pub fn root(options: &HeaderOptions) -> Self {
        Self::default().nested(options)
    }

    /// Options of a wrap/unwrap block declared inside a header with `self` options.
    ///
    /// `symbolize_keys` and `inherit_header` are inherited unless overridden.
    /// The prefix is taken from the block; without one, the parent prefix is
    /// kept only when the block inherits the header.
    pub fn nested(&self, options: &HeaderOptions) -> Self {
        let symbolize_keys = options.symbolize_keys.unwrap_or(self.symbolize_keys);
        let inherit_header = options.inherit_header.unwrap_or(self.inherit_header);
        let prefix = match &options.prefix {
            Some(Prefix::Disabled) => None,
            Some(Prefix::Name(name)) => Some(name.clone()),
            None if inherit_header => self.prefix.clone(),
            None => None,
        };
        Self {
            symbolize_keys,
            inherit_header,
            prefix,
        }
    }
}

/// One resolved attribute of a header.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    name: Key,
    source_key: String,
    target_key: Key,
    kind: AttributeKind,
    header: Option<AttributeHeader>,
}

impl AttributeSpec {
    pub(crate) fn scalar(name: Key, source_key: String, target_key: Key) -> Self {
        Self {
            name,
            source_key,
            target_key,
            kind: AttributeKind::Scalar,
            header: None,
        }
    }

    pub(crate) fn group(
        kind: AttributeKind,
        name: Key,
        target_key: Key,
        header: AttributeHeader,
    ) -> Self {
        Self {
            source_key: name.name().to_string(),
            name,
            target_key,
            kind,
            header: Some(header),
        }
    }

    /// The name the attribute was declared with.
    pub fn name(&self) -> &Key {
        &self.name
    }

    /// Key read from the raw tuple. Wraps read from the parent namespace
    /// instead; for them this is the declared name.
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn target_key(&self) -> &Key {
        &self.target_key
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn header(&self) -> Option<&AttributeHeader> {
        self.header.as_ref()
    }

    pub fn is_aggregate(&self) -> bool {
        self.header.is_some()
    }

    pub fn is_wrapped(&self) -> bool {
        self.kind == AttributeKind::Wrap
    }
}

/// Ordered, immutable set of attribute specs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeHeader {
    attributes: Vec<AttributeSpec>,
    options: ResolvedOptions,
}

impl AttributeHeader {
    /// Build a header from the closure DSL.
    pub fn build<F>(options: HeaderOptions, block: F) -> Result<Self>
    where
        F: FnOnce(&mut HeaderDsl),
    {
        let mut dsl = HeaderDsl::new();
        block(&mut dsl);
        Self::from_spec(&HeaderSpec::new(options, dsl.into_directives()))
    }

    /// Resolve a declarative spec. Fails with `DuplicateAttribute` when two
    /// attributes of one block end up under the same target key.
    pub fn from_spec(spec: &HeaderSpec) -> Result<Self> {
        let options = ResolvedOptions::root(&spec.options);
        let header = builder::resolve(&spec.attributes, options)?;
        event!(
            Level::DEBUG,
            attributes = header.len(),
            symbolize_keys = header.options.symbolize_keys,
            "attribute header built"
        );
        Ok(header)
    }

    /// Header of plain attributes whose source and target keys coincide.
    pub fn identity<I, K>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self::build(HeaderOptions::default(), |h| {
            for name in names {
                h.attribute(name);
            }
        })
    }

    pub(crate) fn from_parts(attributes: Vec<AttributeSpec>, options: ResolvedOptions) -> Self {
        Self {
            attributes,
            options,
        }
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, target_key: &Key) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.target_key == *target_key)
    }

    /// Keys this header writes at its own level, including the ones unwrap
    /// groups lift into it.
    pub fn target_keys(&self) -> Vec<&Key> {
        let mut keys = Vec::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            match (&attribute.kind, &attribute.header) {
                (AttributeKind::Unwrap, Some(nested)) => keys.extend(nested.target_keys()),
                _ => keys.push(&attribute.target_key),
            }
        }
        keys
    }
}

impl fmt::Display for AttributeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_level(
            f: &mut fmt::Formatter<'_>,
            header: &AttributeHeader,
            depth: usize,
        ) -> fmt::Result {
            let indent = "  ".repeat(depth);
            for attribute in header.attributes() {
                match attribute.kind() {
                    AttributeKind::Scalar => writeln!(
                        f,
                        "{}{} <- {:?}",
                        indent,
                        attribute.target_key(),
                        attribute.source_key()
                    )?,
                    AttributeKind::Wrap => writeln!(f, "{}wrap {}", indent, attribute.target_key())?,
                    AttributeKind::Unwrap => {
                        writeln!(f, "{}unwrap {:?}", indent, attribute.source_key())?
                    }
                }
                if let Some(nested) = attribute.header() {
                    write_level(f, nested, depth + 1)?;
                }
            }
            Ok(())
        }
        write_level(f, self, 0)
    }
}
