use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use crate::command::CommandRegistry;
use crate::core::{LookupKind, Result, RomError};
use crate::mapper::{MappedRelation, Mapper};
use crate::storage::Relation;

/// Finalized registry of relations, mappers and commands. Read-only.
pub struct Env {
    pub(crate) relations: HashMap<String, Arc<dyn Relation>>,
    pub(crate) mappers: HashMap<String, MapperEntry>,
    pub(crate) commands: HashMap<String, CommandRegistry>,
}

/// A mapper together with the relation it reads.
pub(crate) struct MapperEntry {
    pub(crate) mapper: Arc<Mapper>,
    pub(crate) relation: String,
}

impl Env {
    pub fn relation(&self, name: &str) -> Result<Arc<dyn Relation>> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| RomError::not_found(LookupKind::Relation, name))
    }

    pub fn mapper(&self, name: &str) -> Result<Arc<Mapper>> {
        self.mappers
            .get(name)
            .map(|entry| Arc::clone(&entry.mapper))
            .ok_or_else(|| RomError::not_found(LookupKind::Mapper, name))
    }

    /// The relation a mapper is bound to, mapped through it.
    pub fn read(&self, name: &str) -> Result<MappedRelation> {
        let entry = self
            .mappers
            .get(name)
            .ok_or_else(|| RomError::not_found(LookupKind::Mapper, name))?;
        let relation = self.relation(&entry.relation)?;
        Ok(entry.mapper.call(relation))
    }

    pub fn command(&self, relation: &str) -> Result<&CommandRegistry> {
        self.commands
            .get(relation)
            .ok_or_else(|| RomError::not_found(LookupKind::Command, relation))
    }

    pub fn relation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.relations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn mapper_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("relations", &self.relation_names())
            .field("mappers", &self.mapper_names())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
