use std::fmt;
use std::sync::Arc;
use serde::{Serialize, Serializer};
use crate::core::{Tuple, Value};

/// Builds a model out of a mapped tuple.
pub trait ModelBuilder: Send + Sync {
    fn build(&self, attributes: Tuple) -> Model;
}

impl<F> ModelBuilder for F
where
    F: Fn(Tuple) -> Model + Send + Sync,
{
    fn build(&self, attributes: Tuple) -> Model {
        self(attributes)
    }
}

/// How a mapper turns mapped tuples into the values it hands out.
#[derive(Clone, Default)]
pub enum ModelStrategy {
    /// Hand out the mapped tuple as is.
    #[default]
    Tuple,
    /// Wrap the mapped tuple in a [`Model`] with this name.
    Named(String),
    Custom(Arc<dyn ModelBuilder>),
}

impl ModelStrategy {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn custom<B: ModelBuilder + 'static>(builder: B) -> Self {
        Self::Custom(Arc::new(builder))
    }

    pub(crate) fn apply(&self, attributes: Tuple) -> Loaded {
        match self {
            Self::Tuple => Loaded::Tuple(attributes),
            Self::Named(name) => Loaded::Model(Model::new(name.clone(), attributes)),
            Self::Custom(builder) => Loaded::Model(builder.build(attributes)),
        }
    }
}

impl fmt::Debug for ModelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tuple => write!(f, "Tuple"),
            Self::Named(name) => write!(f, "Named({:?})", name),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// A named record with attribute readers, what a mapper with a model hands out.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    attributes: Tuple,
}

impl Model {
    pub fn new(name: impl Into<String>, attributes: Tuple) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute reader, by name regardless of key type.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.fetch(attribute)
    }

    pub fn attributes(&self) -> &Tuple {
        &self.attributes
    }

    pub fn into_attributes(self) -> Tuple {
        self.attributes
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} {}>", self.name, self.attributes)
    }
}

/// A loaded result: the mapped tuple, or the model built from it.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Tuple(Tuple),
    Model(Model),
}

impl Loaded {
    pub fn attributes(&self) -> &Tuple {
        match self {
            Self::Tuple(tuple) => tuple,
            Self::Model(model) => model.attributes(),
        }
    }

    pub fn into_tuple(self) -> Tuple {
        match self {
            Self::Tuple(tuple) => tuple,
            Self::Model(model) => model.into_attributes(),
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(model) => Some(model),
            Self::Tuple(_) => None,
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes().fetch(attribute)
    }
}

impl Serialize for Loaded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes().serialize(serializer)
    }
}

impl PartialEq<Tuple> for Loaded {
    fn eq(&self, other: &Tuple) -> bool {
        matches!(self, Self::Tuple(tuple) if tuple == other)
    }
}
