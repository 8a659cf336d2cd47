//! Mappers bind an attribute header and a model strategy to a relation name.

pub mod model;

pub use model::{Loaded, Model, ModelBuilder, ModelStrategy};

use std::sync::Arc;
use serde::de::DeserializeOwned;
use tracing::{Level, event};
use crate::core::{Result, Tuple};
use crate::header::AttributeHeader;
use crate::storage::{Relation, TupleIter};
use crate::transform::Transformer;

/// Stateless beyond its header and model strategy, so one mapper can serve
/// any number of enumerations.
#[derive(Debug, Clone)]
pub struct Mapper {
    name: String,
    transformer: Transformer,
    model: ModelStrategy,
}

impl Mapper {
    pub fn new(name: impl Into<String>, header: AttributeHeader) -> Self {
        Self {
            name: name.into(),
            transformer: Transformer::new(header),
            model: ModelStrategy::Tuple,
        }
    }

    pub fn with_model(mut self, model: ModelStrategy) -> Self {
        self.model = model;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &AttributeHeader {
        self.transformer.header()
    }

    pub fn model(&self) -> &ModelStrategy {
        &self.model
    }

    /// Map one raw tuple and build the configured model from it.
    pub fn load(&self, tuple: &Tuple) -> Loaded {
        self.model.apply(self.transformer.call(tuple))
    }

    /// Map one raw tuple straight into a serde-deserializable type.
    pub fn load_as<T: DeserializeOwned>(&self, tuple: &Tuple) -> Result<T> {
        let mapped = self.transformer.call(tuple);
        Ok(serde_json::from_value(mapped.to_json())?)
    }

    /// Turn a loaded value back into a raw tuple.
    pub fn dump(&self, loaded: &Loaded) -> Tuple {
        self.transformer.dump(loaded.attributes())
    }

    /// Lazily map a relation. Nothing is read until the result is enumerated.
    pub fn call(self: &Arc<Self>, relation: Arc<dyn Relation>) -> MappedRelation {
        MappedRelation {
            mapper: Arc::clone(self),
            relation,
        }
    }
}

/// A relation seen through a mapper.
///
/// Each enumeration reads the relation again; nothing is cached.
#[derive(Clone)]
pub struct MappedRelation {
    mapper: Arc<Mapper>,
    relation: Arc<dyn Relation>,
}

impl MappedRelation {
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn relation(&self) -> &dyn Relation {
        self.relation.as_ref()
    }

    pub fn iter(&self) -> Result<MappedIter<'_>> {
        event!(
            Level::DEBUG,
            mapper = %self.mapper.name,
            relation = %self.relation.name(),
            "enumerating mapped relation"
        );
        Ok(MappedIter {
            mapper: &self.mapper,
            tuples: self.relation.tuples()?,
        })
    }

    pub fn first(&self) -> Result<Option<Loaded>> {
        Ok(self.iter()?.next())
    }

    pub fn to_vec(&self) -> Result<Vec<Loaded>> {
        Ok(self.iter()?.collect())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.iter()?.count())
    }

    pub fn to_vec_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.relation
            .tuples()?
            .map(|tuple| self.mapper.load_as(&tuple))
            .collect()
    }
}

pub struct MappedIter<'a> {
    mapper: &'a Mapper,
    tuples: TupleIter<'a>,
}

impl Iterator for MappedIter<'_> {
    type Item = Loaded;

    fn next(&mut self) -> Option<Self::Item> {
        self.tuples.next().map(|tuple| self.mapper.load(&tuple))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Key, Value};
    use crate::header::{AttributeOptions, HeaderOptions};
    use crate::storage::{MemoryRelation, RelationSchema};
    use serde::Deserialize;

    fn users() -> Arc<MemoryRelation> {
        let relation = MemoryRelation::new(RelationSchema::new(
            "users",
            ["user_id", "first_name", "email"],
        ));
        relation
            .insert(
                Tuple::new()
                    .with("user_id", 1)
                    .with("first_name", "Jane")
                    .with("email", "jane@doe.org"),
            )
            .unwrap();
        Arc::new(relation)
    }

    fn mapper() -> Arc<Mapper> {
        let header = AttributeHeader::build(HeaderOptions::new().symbolize_keys(true), |h| {
            h.attribute_with("id", AttributeOptions::new().source("user_id"));
            h.attribute_with("name", AttributeOptions::new().source("first_name"));
        })
        .unwrap();
        Arc::new(Mapper::new("users", header))
    }

    #[test]
    fn test_load_plain_tuple() {
        let loaded = mapper().load(&Tuple::new().with("user_id", 7));
        assert_eq!(
            loaded,
            Tuple::new()
                .with(Key::sym("id"), 7)
                .with(Key::sym("name"), Value::Null)
        );
    }

    #[test]
    fn test_load_named_model() {
        let mapper = Mapper::new("users", mapper().header().clone())
            .with_model(ModelStrategy::named("User"));
        let loaded = mapper.load(&Tuple::new().with("user_id", 7));
        let model = loaded.as_model().unwrap();
        assert_eq!(model.name(), "User");
        assert_eq!(model.get("id"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_call_is_restartable_and_live() {
        let relation = users();
        let mapped = mapper().call(relation.clone());

        assert_eq!(mapped.count().unwrap(), 1);
        relation
            .insert(Tuple::new().with("user_id", 2).with("first_name", "Joe"))
            .unwrap();
        assert_eq!(mapped.count().unwrap(), 2);

        let first = mapped.first().unwrap().unwrap();
        assert_eq!(first.get("name"), Some(&Value::Text("Jane".into())));
    }

    #[test]
    fn test_load_as_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
        }

        let users: Vec<User> = mapper().call(users()).to_vec_as().unwrap();
        assert_eq!(
            users,
            vec![User {
                id: 1,
                name: "Jane".into()
            }]
        );
    }

    #[test]
    fn test_dump_restores_raw_keys() {
        let mapper = mapper();
        let loaded = mapper.load(&Tuple::new().with("user_id", 1).with("first_name", "Jane"));
        assert_eq!(
            mapper.dump(&loaded),
            Tuple::new().with("user_id", 1).with("first_name", "Jane")
        );
    }
}
