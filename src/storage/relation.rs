use std::fmt;
use std::sync::Arc;
use crate::core::{Key, Result, Tuple, Value};

/// Lazily produced raw tuples of one enumeration of a relation.
pub type TupleIter<'a> = Box<dyn Iterator<Item = Tuple> + 'a>;

type TuplePredicate = Arc<dyn Fn(&Tuple) -> bool + Send + Sync>;

/// Which tuples of a relation an update or delete applies to.
#[derive(Clone, Default)]
pub enum Restriction {
    #[default]
    All,
    /// Every entry must be present in the tuple with an equal value.
    Equals(Tuple),
    Predicate(TuplePredicate),
}

impl Restriction {
    pub fn all() -> Self {
        Self::All
    }

    pub fn by(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::Equals(Tuple::new().with(key, value))
    }

    pub fn matching(filter: Tuple) -> Self {
        Self::Equals(filter)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Tuple) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        match self {
            Self::All => true,
            Self::Equals(filter) => tuple.matches(filter),
            Self::Predicate(f) => f(tuple),
        }
    }
}

impl fmt::Debug for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Equals(filter) => write!(f, "Equals({})", filter),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// A named set of raw tuples plus the write operations commands dispatch to.
///
/// Enumeration is restartable: every call to [`Relation::tuples`] starts a
/// fresh pass over the current contents. Writes return the tuples they
/// affected so commands can check result arity.
pub trait Relation: Send + Sync {
    fn name(&self) -> &str;

    /// Declared attribute names, in declaration order. Empty when the
    /// relation is schemaless.
    fn attributes(&self) -> Vec<String>;

    fn tuples(&self) -> Result<TupleIter<'_>>;

    /// Resolve a named view (like `by_id`) with its arguments into a restriction.
    fn restrict(&self, view: &str, args: &[Value]) -> Result<Restriction>;

    fn select(&self, restriction: &Restriction) -> Result<Vec<Tuple>> {
        Ok(self.tuples()?.filter(|t| restriction.matches(t)).collect())
    }

    fn insert(&self, tuple: Tuple) -> Result<Vec<Tuple>>;

    fn update(&self, restriction: &Restriction, changes: &Tuple) -> Result<Vec<Tuple>>;

    fn delete(&self, restriction: &Restriction) -> Result<Vec<Tuple>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_matching() {
        let tuple = Tuple::new().with("id", 1).with("name", "Jane");
        assert!(Restriction::all().matches(&tuple));
        assert!(Restriction::by("id", 1).matches(&tuple));
        assert!(!Restriction::by("id", 2).matches(&tuple));
        assert!(Restriction::predicate(|t| t.fetch("name").is_some()).matches(&tuple));
    }

    #[test]
    fn test_restriction_debug() {
        assert_eq!(format!("{:?}", Restriction::by("id", 1)), r#"Equals({"id" => 1})"#);
    }
}
