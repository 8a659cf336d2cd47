//! Tuple transformer: projects a raw tuple through an attribute header.

use crate::core::{Key, Tuple, Value};
use crate::header::{AttributeHeader, AttributeKind};

/// Map `raw` through `header`.
///
/// Pure and total: a missing source key becomes `Value::Null`, raw keys the
/// header does not mention are dropped, values are never coerced. Wrap
/// groups read from the same flat `raw` tuple as their parent, so sibling
/// wraps may share source keys.
pub fn transform(header: &AttributeHeader, raw: &Tuple) -> Tuple {
    let mut mapped = Tuple::with_capacity(header.len());

    for attribute in header.attributes() {
        match (attribute.kind(), attribute.header()) {
            (AttributeKind::Wrap, Some(nested)) => {
                mapped.insert(attribute.target_key(), transform(nested, raw));
            }
            (AttributeKind::Unwrap, Some(nested)) => {
                let inner = match raw.fetch(attribute.source_key()) {
                    Some(Value::Tuple(inner)) => transform(nested, inner),
                    _ => transform(nested, &Tuple::new()),
                };
                mapped.merge(inner);
            }
            _ => {
                let value = raw
                    .fetch(attribute.source_key())
                    .cloned()
                    .unwrap_or(Value::Null);
                mapped.insert(attribute.target_key(), value);
            }
        }
    }

    mapped
}

/// Inverse of [`transform`]: rebuild a raw, string-keyed tuple from a mapped one.
pub fn dump(header: &AttributeHeader, mapped: &Tuple) -> Tuple {
    let mut raw = Tuple::with_capacity(header.len());

    for attribute in header.attributes() {
        match (attribute.kind(), attribute.header()) {
            (AttributeKind::Wrap, Some(nested)) => {
                let empty = Tuple::new();
                let inner = mapped
                    .get(attribute.target_key())
                    .and_then(Value::as_tuple)
                    .unwrap_or(&empty);
                raw.merge(dump(nested, inner));
            }
            (AttributeKind::Unwrap, Some(nested)) => {
                raw.insert(Key::str(attribute.source_key()), dump(nested, mapped));
            }
            _ => {
                let value = mapped
                    .get(attribute.target_key())
                    .cloned()
                    .unwrap_or(Value::Null);
                raw.insert(Key::str(attribute.source_key()), value);
            }
        }
    }

    raw
}

/// A header bound to the transform functions.
#[derive(Debug, Clone)]
pub struct Transformer {
    header: AttributeHeader,
}

impl Transformer {
    pub fn new(header: AttributeHeader) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &AttributeHeader {
        &self.header
    }

    pub fn call(&self, raw: &Tuple) -> Tuple {
        transform(&self.header, raw)
    }

    pub fn dump(&self, mapped: &Tuple) -> Tuple {
        dump(&self.header, mapped)
    }

    /// Lazily map a sequence of raw tuples.
    pub fn map_all<'a, I>(&'a self, tuples: I) -> impl Iterator<Item = Tuple> + 'a
    where
        I: IntoIterator<Item = Tuple>,
        I::IntoIter: 'a,
    {
        tuples.into_iter().map(move |raw| self.call(&raw))
    }
}
