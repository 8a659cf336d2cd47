use std::sync::Arc;
use crate::core::{Result, Value};
use crate::storage::{RelationSchema, Restriction};

pub(crate) const DEFAULT_REPOSITORY: &str = "default";

/// Collects `base_relation` declarations.
#[derive(Debug, Default)]
pub struct SchemaDsl {
    relations: Vec<BaseRelation>,
}

impl SchemaDsl {
    pub fn base_relation<F>(&mut self, name: impl Into<String>, block: F) -> &mut Self
    where
        F: FnOnce(&mut BaseRelation),
    {
        let mut relation = BaseRelation::new(name);
        block(&mut relation);
        self.relations.push(relation);
        self
    }

    pub(crate) fn into_relations(self) -> Vec<BaseRelation> {
        self.relations
    }
}

/// A relation declared in the schema: its repository, attributes and key.
#[derive(Debug, Clone)]
pub struct BaseRelation {
    name: String,
    repository: String,
    attributes: Vec<String>,
    primary_key: Option<String>,
}

impl BaseRelation {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: DEFAULT_REPOSITORY.to_string(),
            attributes: Vec::new(),
            primary_key: None,
        }
    }

    pub fn repository(&mut self, name: impl Into<String>) -> &mut Self {
        self.repository = name.into();
        self
    }

    pub fn attribute(&mut self, name: impl Into<String>) -> &mut Self {
        self.attributes.push(name.into());
        self
    }

    pub fn primary_key(&mut self, attribute: impl Into<String>) -> &mut Self {
        self.primary_key = Some(attribute.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository_name(&self) -> &str {
        &self.repository
    }

    pub(crate) fn to_schema(&self) -> RelationSchema {
        let schema = RelationSchema::new(self.name.clone(), self.attributes.iter().cloned());
        match &self.primary_key {
            Some(key) => schema.primary_key(key.clone()),
            None => schema,
        }
    }
}

pub(crate) type ViewDefinition = Arc<dyn Fn(&[Value]) -> Result<Restriction> + Send + Sync>;

/// Custom views of one relation, declared with `Setup::relation`.
#[derive(Default)]
pub struct RelationDsl {
    views: Vec<(String, ViewDefinition)>,
}

impl RelationDsl {
    pub fn view<F>(&mut self, name: impl Into<String>, view: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Restriction> + Send + Sync + 'static,
    {
        self.views.push((name.into(), Arc::new(view)));
        self
    }

    pub(crate) fn into_views(self) -> Vec<(String, ViewDefinition)> {
        self.views
    }
}
