//! Declarative setup: repositories, schema, relation views, mappers and
//! commands, finalized once into an [`Env`].

mod commands;
mod env;
mod mappers;
mod schema;

pub use commands::CommandDsl;
pub use env::Env;
pub use mappers::{MapperDefinition, MapperDsl};
pub use schema::{BaseRelation, RelationDsl, SchemaDsl};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Level, event};
use crate::command::{Command, CommandDefinition, CommandRegistry};
use crate::config::RepositoryConfig;
use crate::core::{LookupKind, Result, RomError};
use crate::header::{AttributeDirective, AttributeHeader, HeaderOptions, HeaderSpec};
use crate::mapper::{Mapper, ModelStrategy};
use crate::storage::{MemoryRelation, MemoryRepository, Relation};
use env::MapperEntry;
use schema::ViewDefinition;

pub struct Setup {
    repositories: HashMap<String, MemoryRepository>,
    schema: Vec<BaseRelation>,
    views: Vec<(String, Vec<(String, ViewDefinition)>)>,
    mappers: Vec<MapperDefinition>,
    commands: Vec<(String, Vec<CommandDefinition>)>,
    invalid_commands: Vec<String>,
    env: Option<Arc<Env>>,
}

/// Parent state a child mapper starts from.
struct ResolvedMapper {
    relation: String,
    options: HeaderOptions,
    directives: Vec<AttributeDirective>,
    model: ModelStrategy,
}

impl Setup {
    /// A setup with no repositories.
    pub fn new() -> Self {
        Self {
            repositories: HashMap::new(),
            schema: Vec::new(),
            views: Vec::new(),
            mappers: Vec::new(),
            commands: Vec::new(),
            invalid_commands: Vec::new(),
            env: None,
        }
    }

    /// A setup with a single in-memory `default` repository.
    pub fn memory() -> Self {
        Self::new().with_repository(schema::DEFAULT_REPOSITORY, RepositoryConfig::default())
    }

    pub fn with_repository(mut self, name: impl Into<String>, config: RepositoryConfig) -> Self {
        self.repositories.insert(name.into(), MemoryRepository::new(config));
        self
    }

    pub fn repository_url(self, name: impl Into<String>, url: &str) -> Result<Self> {
        let config = RepositoryConfig::from_url(url)?;
        Ok(self.with_repository(name, config))
    }

    pub fn schema<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaDsl),
    {
        let mut dsl = SchemaDsl::default();
        block(&mut dsl);
        self.schema.extend(dsl.into_relations());
        self
    }

    pub fn relation<F>(&mut self, name: impl Into<String>, block: F) -> &mut Self
    where
        F: FnOnce(&mut RelationDsl),
    {
        let mut dsl = RelationDsl::default();
        block(&mut dsl);
        self.views.push((name.into(), dsl.into_views()));
        self
    }

    pub fn mappers<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut MapperDsl),
    {
        let mut dsl = MapperDsl::default();
        block(&mut dsl);
        self.mappers.extend(dsl.into_definitions());
        self
    }

    pub fn commands<F>(&mut self, relation: impl Into<String>, block: F) -> &mut Self
    where
        F: FnOnce(&mut CommandDsl),
    {
        let mut dsl = CommandDsl::default();
        block(&mut dsl);
        match dsl.into_definitions() {
            Ok(definitions) => self.commands.push((relation.into(), definitions)),
            Err(RomError::InvalidArguments(message)) => self.invalid_commands.push(message),
            Err(err) => self.invalid_commands.push(err.to_string()),
        }
        self
    }

    pub fn repository(&self, name: &str) -> Result<&MemoryRepository> {
        self.repositories
            .get(name)
            .ok_or_else(|| RomError::not_found(LookupKind::Repository, name))
    }

    pub fn resolve(&self, name: &str) -> Option<&MemoryRepository> {
        self.repositories.get(name)
    }

    pub fn env(&self) -> Option<&Arc<Env>> {
        self.env.as_ref()
    }

    /// Build every declared relation, mapper and command into an [`Env`].
    ///
    /// Succeeds once; later calls fail with `EnvAlreadyFinalized`. A failed
    /// call leaves the repositories untouched and reports the same error again.
    pub fn finalize(&mut self) -> Result<Arc<Env>> {
        if self.env.is_some() {
            return Err(RomError::EnvAlreadyFinalized);
        }
        if let Some(message) = self.invalid_commands.first() {
            return Err(RomError::InvalidArguments(message.clone()));
        }

        let relations = self.build_relations()?;
        self.install_views(&relations)?;
        let mappers = self.build_mappers(&relations)?;
        let commands = self.build_commands(&relations)?;
        self.register_relations(&relations)?;

        let env = Arc::new(Env {
            relations: relations
                .into_iter()
                .map(|(name, relation)| (name, relation as Arc<dyn Relation>))
                .collect(),
            mappers,
            commands,
        });
        event!(
            Level::DEBUG,
            relations = env.relations.len(),
            mappers = env.mappers.len(),
            commands = env.commands.len(),
            "environment finalized"
        );
        self.env = Some(Arc::clone(&env));
        Ok(env)
    }

    /// Relations are built detached; they join their repositories only
    /// once the whole environment has been built.
    fn build_relations(&self) -> Result<HashMap<String, Arc<MemoryRelation>>> {
        let mut relations = HashMap::new();
        for base in &self.schema {
            let repository = self.repository(base.repository_name())?;
            if relations.contains_key(base.name()) || repository.relation_exists(base.name()) {
                return Err(RomError::RelationExists(base.name().to_string()));
            }
            let relation = repository.build_relation(base.to_schema());
            relations.insert(base.name().to_string(), Arc::new(relation));
        }
        Ok(relations)
    }

    fn register_relations(&mut self, relations: &HashMap<String, Arc<MemoryRelation>>) -> Result<()> {
        for base in &self.schema {
            let Some(relation) = relations.get(base.name()) else {
                continue;
            };
            let repository = self
                .repositories
                .get_mut(base.repository_name())
                .ok_or_else(|| RomError::not_found(LookupKind::Repository, base.repository_name()))?;
            repository.attach_relation(Arc::clone(relation))?;
        }
        Ok(())
    }

    fn install_views(&self, relations: &HashMap<String, Arc<MemoryRelation>>) -> Result<()> {
        for (name, views) in &self.views {
            let relation = relations
                .get(name)
                .ok_or_else(|| RomError::not_found(LookupKind::Relation, name))?;
            for (view, definition) in views {
                let definition = Arc::clone(definition);
                relation.define_view(view.clone(), move |args| definition(args))?;
            }
        }
        Ok(())
    }

    fn build_mappers(
        &self,
        relations: &HashMap<String, Arc<MemoryRelation>>,
    ) -> Result<HashMap<String, MapperEntry>> {
        let mut resolved: HashMap<String, ResolvedMapper> = HashMap::new();
        let mut mappers = HashMap::new();

        for definition in &self.mappers {
            let parent = match definition.parent_name() {
                Some(parent) => Some(
                    resolved
                        .get(parent)
                        .ok_or_else(|| RomError::not_found(LookupKind::Mapper, parent))?,
                ),
                None => None,
            };

            let relation = definition
                .relation_name()
                .map(str::to_string)
                .or_else(|| parent.map(|p| p.relation.clone()))
                .unwrap_or_else(|| definition.name().to_string());
            if !relations.contains_key(&relation) {
                return Err(RomError::not_found(LookupKind::Relation, relation));
            }

            let (options, directives, model) = match parent {
                Some(parent) => (
                    definition.header_options().clone().or(&parent.options),
                    merge_directives(&parent.directives, definition.directives()),
                    definition
                        .model_strategy()
                        .cloned()
                        .unwrap_or_else(|| parent.model.clone()),
                ),
                None => (
                    definition.header_options().clone(),
                    definition.directives().to_vec(),
                    definition.model_strategy().cloned().unwrap_or_default(),
                ),
            };

            let header = AttributeHeader::from_spec(&HeaderSpec::new(options.clone(), directives.clone()))?;
            let mapper = Mapper::new(definition.name(), header).with_model(model.clone());
            mappers.insert(
                definition.name().to_string(),
                MapperEntry {
                    mapper: Arc::new(mapper),
                    relation: relation.clone(),
                },
            );
            resolved.insert(
                definition.name().to_string(),
                ResolvedMapper {
                    relation,
                    options,
                    directives,
                    model,
                },
            );
        }

        // Relations without a mapper of their own read through their declared attributes.
        for (name, relation) in relations {
            if mappers.contains_key(name) {
                continue;
            }
            let header = AttributeHeader::identity(relation.attributes())?;
            mappers.insert(
                name.clone(),
                MapperEntry {
                    mapper: Arc::new(Mapper::new(name.clone(), header)),
                    relation: name.clone(),
                },
            );
        }
        Ok(mappers)
    }

    fn build_commands(
        &self,
        relations: &HashMap<String, Arc<MemoryRelation>>,
    ) -> Result<HashMap<String, CommandRegistry>> {
        let mut registries: HashMap<String, CommandRegistry> = HashMap::new();
        for (name, definitions) in &self.commands {
            let relation = relations
                .get(name)
                .ok_or_else(|| RomError::not_found(LookupKind::Relation, name))?;
            let registry = registries
                .entry(name.clone())
                .or_insert_with(|| CommandRegistry::new(name.clone()));
            for definition in definitions {
                let relation: Arc<dyn Relation> = relation.clone();
                registry.register(Command::new(definition.clone(), relation));
            }
        }
        Ok(registries)
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent directives first, overridden in place by same-named child
/// directives; the rest of the child's directives follow in order.
fn merge_directives(parent: &[AttributeDirective], child: &[AttributeDirective]) -> Vec<AttributeDirective> {
    let mut merged = parent.to_vec();
    for directive in child {
        let existing = merged
            .iter()
            .position(|d| !d.is_exclude() && !directive.is_exclude() && d.name() == directive.name());
        match existing {
            Some(idx) => merged[idx] = directive.clone(),
            None => merged.push(directive.clone()),
        }
    }
    merged
}
