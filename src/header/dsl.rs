use crate::core::Key;
use super::spec::{AttributeDirective, AttributeOptions, HeaderOptions};

/// Closure-based header declaration, collected into [`AttributeDirective`]s.
///
/// ```
/// use relmap::header::{AttributeHeader, HeaderOptions};
///
/// let header = AttributeHeader::build(HeaderOptions::new().symbolize_keys(true), |h| {
///     h.attribute("title");
///     h.wrap_with("details", HeaderOptions::new().prefix("task"), |w| {
///         w.attribute("priority");
///     });
/// })
/// .unwrap();
/// assert_eq!(header.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct HeaderDsl {
    directives: Vec<AttributeDirective>,
}

impl HeaderDsl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&mut self, name: impl Into<Key>) -> &mut Self {
        self.attribute_with(name, AttributeOptions::default())
    }

    pub fn attribute_with(&mut self, name: impl Into<Key>, options: AttributeOptions) -> &mut Self {
        self.directives.push(AttributeDirective::Attribute {
            name: name.into(),
            options,
        });
        self
    }

    pub fn wrap<F>(&mut self, name: impl Into<Key>, block: F) -> &mut Self
    where
        F: FnOnce(&mut HeaderDsl),
    {
        self.wrap_with(name, HeaderOptions::default(), block)
    }

    pub fn wrap_with<F>(&mut self, name: impl Into<Key>, options: HeaderOptions, block: F) -> &mut Self
    where
        F: FnOnce(&mut HeaderDsl),
    {
        let attributes = Self::collect(block);
        self.directives.push(AttributeDirective::Wrap {
            name: name.into(),
            options,
            attributes,
        });
        self
    }

    pub fn unwrap<F>(&mut self, name: impl Into<Key>, block: F) -> &mut Self
    where
        F: FnOnce(&mut HeaderDsl),
    {
        self.unwrap_with(name, HeaderOptions::default(), block)
    }

    pub fn unwrap_with<F>(&mut self, name: impl Into<Key>, options: HeaderOptions, block: F) -> &mut Self
    where
        F: FnOnce(&mut HeaderDsl),
    {
        let attributes = Self::collect(block);
        self.directives.push(AttributeDirective::Unwrap {
            name: name.into(),
            options,
            attributes,
        });
        self
    }

    pub fn exclude(&mut self, name: impl Into<Key>) -> &mut Self {
        self.directives
            .push(AttributeDirective::Exclude { name: name.into() });
        self
    }

    pub fn directives(&self) -> &[AttributeDirective] {
        &self.directives
    }

    pub fn into_directives(self) -> Vec<AttributeDirective> {
        self.directives
    }

    fn collect<F: FnOnce(&mut HeaderDsl)>(block: F) -> Vec<AttributeDirective> {
        let mut nested = HeaderDsl::new();
        block(&mut nested);
        nested.into_directives()
    }
}
