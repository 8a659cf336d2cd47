use std::ops::{Deref, DerefMut};
use crate::header::{HeaderDsl, HeaderOptions};
use crate::mapper::ModelStrategy;

/// Collects mapper definitions.
#[derive(Debug, Default)]
pub struct MapperDsl {
    definitions: Vec<MapperDefinition>,
}

impl MapperDsl {
    /// Define a mapper reading the relation of the same name.
    pub fn define<F>(&mut self, name: impl Into<String>, block: F) -> &mut Self
    where
        F: FnOnce(&mut MapperDefinition),
    {
        let mut definition = MapperDefinition::new(name);
        block(&mut definition);
        self.definitions.push(definition);
        self
    }

    pub(crate) fn into_definitions(self) -> Vec<MapperDefinition> {
        self.definitions
    }
}

/// One `define` block. Dereferences to [`HeaderDsl`] for attribute declarations.
#[derive(Debug)]
pub struct MapperDefinition {
    name: String,
    relation: Option<String>,
    parent: Option<String>,
    options: HeaderOptions,
    model: Option<ModelStrategy>,
    header: HeaderDsl,
}

impl MapperDefinition {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relation: None,
            parent: None,
            options: HeaderOptions::default(),
            model: None,
            header: HeaderDsl::new(),
        }
    }

    pub fn relation(&mut self, name: impl Into<String>) -> &mut Self {
        self.relation = Some(name.into());
        self
    }

    /// Start from another mapper's attributes, options and model.
    pub fn parent(&mut self, name: impl Into<String>) -> &mut Self {
        self.parent = Some(name.into());
        self
    }

    pub fn options(&mut self, options: HeaderOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn model(&mut self, model: ModelStrategy) -> &mut Self {
        self.model = Some(model);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn relation_name(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub(crate) fn header_options(&self) -> &HeaderOptions {
        &self.options
    }

    pub(crate) fn model_strategy(&self) -> Option<&ModelStrategy> {
        self.model.as_ref()
    }
}

impl Deref for MapperDefinition {
    type Target = HeaderDsl;

    fn deref(&self) -> &HeaderDsl {
        &self.header
    }
}

impl DerefMut for MapperDefinition {
    fn deref_mut(&mut self) -> &mut HeaderDsl {
        &mut self.header
    }
}
