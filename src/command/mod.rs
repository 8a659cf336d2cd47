//! Commands: validated create/update/delete operations bound to a relation,
//! plus the registry that runs them under the try/result protocol.

pub mod definition;
pub mod evaluator;
pub mod execute;
pub mod registry;

pub use definition::{CommandDefinition, InputHandler, Validator};
pub use evaluator::{Dispatched, Evaluator};
pub use execute::{BoundCommand, Command};
pub use registry::{CommandRegistry, try_command};

use std::fmt;
use crate::core::Tuple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Create,
    Update,
    Delete,
}

impl CommandKind {
    /// Infer the kind from a conventional command name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// How many tuples a command promises to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultArity {
    /// Exactly one; anything else is a `TupleCountMismatch`.
    One,
    #[default]
    Many,
}

/// Tuples a command affected, shaped by its result arity.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    One(Tuple),
    Many(Vec<Tuple>),
}

impl CommandOutput {
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(tuples) => tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn one(&self) -> Option<&Tuple> {
        match self {
            Self::One(tuple) => Some(tuple),
            Self::Many(_) => None,
        }
    }

    pub fn into_tuples(self) -> Vec<Tuple> {
        match self {
            Self::One(tuple) => vec![tuple],
            Self::Many(tuples) => tuples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(CommandKind::from_name("create"), Some(CommandKind::Create));
        assert_eq!(CommandKind::from_name("archive"), None);
    }

    #[test]
    fn test_output_shapes() {
        let one = CommandOutput::One(Tuple::new().with("id", 1));
        assert_eq!(one.len(), 1);
        assert!(one.one().is_some());

        let many = CommandOutput::Many(vec![]);
        assert!(many.is_empty());
        assert!(many.one().is_none());
        assert!(many.into_tuples().is_empty());
    }
}
