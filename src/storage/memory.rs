use super::{MemoryRelation, RelationSchema};
use crate::config::RepositoryConfig;
use crate::core::{LookupKind, Result, RomError};
use std::collections::HashMap;
use std::sync::Arc;

/// Repository backed by the memory adapter: a named set of relations.
pub struct MemoryRepository {
    config: RepositoryConfig,
    relations: HashMap<String, Arc<MemoryRelation>>,
}

impl MemoryRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            relations: HashMap::new(),
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Ok(Self::new(RepositoryConfig::from_url(url)?))
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Create a relation
    pub fn create_relation(&mut self, schema: RelationSchema) -> Result<Arc<MemoryRelation>> {
        let relation = Arc::new(self.build_relation(schema));
        self.attach_relation(Arc::clone(&relation))?;
        Ok(relation)
    }

    /// Build a relation with this repository's settings without registering it.
    pub fn build_relation(&self, schema: RelationSchema) -> MemoryRelation {
        MemoryRelation::new(schema).strict(self.config.strict_attributes)
    }

    /// Register an already built relation under its schema name.
    pub fn attach_relation(&mut self, relation: Arc<MemoryRelation>) -> Result<()> {
        let name = relation.schema().name().to_string();
        if self.relations.contains_key(&name) {
            return Err(RomError::RelationExists(name));
        }
        self.relations.insert(name, relation);
        Ok(())
    }

    /// Drop a relation
    pub fn drop_relation(&mut self, name: &str) -> Result<()> {
        if self.relations.remove(name).is_none() {
            return Err(RomError::not_found(LookupKind::Relation, name));
        }
        Ok(())
    }

    /// Get a shared handle on a relation
    pub fn relation(&self, name: &str) -> Result<Arc<MemoryRelation>> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| RomError::not_found(LookupKind::Relation, name))
    }

    pub fn relation_exists(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Relation names, sorted
    pub fn list_relations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.relations.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new(RepositoryConfig::default())
    }
}
