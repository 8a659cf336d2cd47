use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{Level, event};
use crate::core::{CommandError, LookupKind, Result, RomError, Tuple, Value};
use super::relation::{Relation, Restriction, TupleIter};

type ViewFn = Arc<dyn Fn(&[Value]) -> Result<Restriction> + Send + Sync>;

/// Declared shape of a base relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchema {
    name: String,
    attributes: Vec<String>,
    primary_key: Option<String>,
}

impl RelationSchema {
    pub fn new<I, S>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            primary_key: None,
        }
    }

    pub fn primary_key(mut self, attribute: impl Into<String>) -> Self {
        self.primary_key = Some(attribute.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }
}

/// In-memory relation used by the memory adapter.
pub struct MemoryRelation {
    schema: RelationSchema,
    strict: bool,
    tuples: RwLock<Vec<Tuple>>,
    views: RwLock<HashMap<String, ViewFn>>,
}

impl MemoryRelation {
    pub fn new(schema: RelationSchema) -> Self {
        Self {
            schema,
            strict: true,
            tuples: RwLock::new(Vec::new()),
            views: RwLock::new(HashMap::new()),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn schema(&self) -> &RelationSchema {
        &self.schema
    }

    /// Register a named view usable from `restrict` and bound commands.
    pub fn define_view<F>(&self, name: impl Into<String>, view: F) -> Result<()>
    where
        F: Fn(&[Value]) -> Result<Restriction> + Send + Sync + 'static,
    {
        let mut views = self.views.write()?;
        views.insert(name.into(), Arc::new(view));
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.tuples.read()?.len())
    }

    fn validate_tuple(&self, tuple: &Tuple) -> Result<()> {
        if !self.strict || self.schema.attributes.is_empty() {
            return Ok(());
        }
        for key in tuple.keys() {
            if !self.schema.has_attribute(key.name()) {
                return Err(CommandError::rejected(format!(
                    "relation '{}' has no attribute '{}'",
                    self.schema.name,
                    key.name()
                ))
                .into());
            }
        }
        Ok(())
    }

    fn check_uniqueness(&self, tuples: &[Tuple], candidate: &Tuple, ignore: Option<usize>) -> Result<()> {
        let Some(key) = self.schema.key() else {
            return Ok(());
        };
        let value = match candidate.fetch(key) {
            None | Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };

        let taken = tuples
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != ignore)
            .any(|(_, existing)| existing.fetch(key) == Some(value));

        if taken {
            return Err(CommandError::rejected(format!(
                "unique constraint violation: '{}.{}' already contains {}",
                self.schema.name, key, value
            ))
            .into());
        }
        Ok(())
    }
}

impl Relation for MemoryRelation {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn attributes(&self) -> Vec<String> {
        self.schema.attributes.clone()
    }

    fn tuples(&self) -> Result<TupleIter<'_>> {
        let snapshot = self.tuples.read()?.clone();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn restrict(&self, view: &str, args: &[Value]) -> Result<Restriction> {
        if let Some(view_fn) = self.views.read()?.get(view).cloned() {
            return view_fn(args);
        }

        let attribute = view
            .strip_prefix("by_")
            .filter(|attr| self.schema.attributes.is_empty() || self.schema.has_attribute(attr))
            .ok_or_else(|| {
                RomError::not_found(LookupKind::View, format!("{}.{}", self.schema.name, view))
            })?;

        match args {
            [value] => Ok(Restriction::by(attribute, value.clone())),
            _ => Err(RomError::InvalidArguments(format!(
                "view '{}' takes 1 argument, got {}",
                view,
                args.len()
            ))),
        }
    }

    fn insert(&self, tuple: Tuple) -> Result<Vec<Tuple>> {
        self.validate_tuple(&tuple)?;
        let mut tuples = self.tuples.write()?;
        self.check_uniqueness(&tuples, &tuple, None)?;
        tuples.push(tuple.clone());
        event!(Level::TRACE, relation = %self.schema.name, "tuple inserted");
        Ok(vec![tuple])
    }

    fn update(&self, restriction: &Restriction, changes: &Tuple) -> Result<Vec<Tuple>> {
        self.validate_tuple(changes)?;
        let mut tuples = self.tuples.write()?;

        let targets: Vec<usize> = tuples
            .iter()
            .enumerate()
            .filter(|(_, t)| restriction.matches(t))
            .map(|(idx, _)| idx)
            .collect();

        // Apply every change to a copy first; nothing is stored unless all
        // updated tuples pass the uniqueness check.
        let mut projected = tuples.clone();
        for &idx in &targets {
            let next = &mut projected[idx];
            for (key, value) in changes.iter() {
                // Keep the stored key type when the tuple already has the attribute.
                let stored = next
                    .keys()
                    .find(|k| k.name() == key.name())
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                next.insert(stored, value.clone());
            }
        }
        for &idx in &targets {
            self.check_uniqueness(&projected, &projected[idx], Some(idx))?;
        }

        let updated = targets.iter().map(|&idx| projected[idx].clone()).collect();
        *tuples = projected;
        Ok(updated)
    }

    fn delete(&self, restriction: &Restriction) -> Result<Vec<Tuple>> {
        let mut tuples = self.tuples.write()?;
        let (removed, kept): (Vec<Tuple>, Vec<Tuple>) =
            tuples.drain(..).partition(|t| restriction.matches(t));
        *tuples = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> MemoryRelation {
        MemoryRelation::new(RelationSchema::new("users", ["id", "name"]).primary_key("id"))
    }

    #[test]
    fn test_insert_and_enumerate() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1).with("name", "Jane")).unwrap();
        relation.insert(Tuple::new().with("id", 2).with("name", "Joe")).unwrap();

        assert_eq!(relation.tuples().unwrap().count(), 2);
        // Every enumeration starts over.
        assert_eq!(relation.tuples().unwrap().count(), 2);
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let relation = users();
        let err = relation.insert(Tuple::new().with("id", 1).with("age", 3)).unwrap_err();
        assert!(matches!(err, RomError::Command(CommandError::Rejected(_))));

        let lax = users().strict(false);
        assert!(lax.insert(Tuple::new().with("id", 1).with("age", 3)).is_ok());
    }

    #[test]
    fn test_primary_key_uniqueness() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1)).unwrap();
        assert!(relation.insert(Tuple::new().with("id", 1)).is_err());
        relation.insert(Tuple::new().with("id", 2)).unwrap();

        let err = relation
            .update(&Restriction::by("id", 2), &Tuple::new().with("id", 1))
            .unwrap_err();
        assert!(err.is_command_error());
    }

    #[test]
    fn test_update_returns_affected() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1).with("name", "Jane")).unwrap();
        relation.insert(Tuple::new().with("id", 2).with("name", "Joe")).unwrap();

        let updated = relation
            .update(&Restriction::by("id", 1), &Tuple::new().with("name", "Jane Doe"))
            .unwrap();
        assert_eq!(updated, vec![Tuple::new().with("id", 1).with("name", "Jane Doe")]);

        let all = relation.update(&Restriction::all(), &Tuple::new().with("name", "X")).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_failed_update_leaves_relation_untouched() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1).with("name", "Jane")).unwrap();
        relation.insert(Tuple::new().with("id", 2).with("name", "Joe")).unwrap();

        let err = relation
            .update(&Restriction::all(), &Tuple::new().with("id", 5))
            .unwrap_err();
        assert!(matches!(err, RomError::Command(CommandError::Rejected(_))));

        let ids: Vec<Value> = relation
            .tuples()
            .unwrap()
            .map(|t| t.fetch("id").cloned().unwrap())
            .collect();
        assert_eq!(ids, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_delete_returns_removed() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1)).unwrap();
        relation.insert(Tuple::new().with("id", 2)).unwrap();

        let removed = relation.delete(&Restriction::by("id", 1)).unwrap();
        assert_eq!(removed, vec![Tuple::new().with("id", 1)]);
        assert_eq!(relation.count().unwrap(), 1);
    }

    #[test]
    fn test_builtin_and_custom_views() {
        let relation = users();
        relation.insert(Tuple::new().with("id", 1).with("name", "Jane")).unwrap();

        let by_id = relation.restrict("by_id", &[Value::Integer(1)]).unwrap();
        assert_eq!(relation.select(&by_id).unwrap().len(), 1);

        assert!(matches!(
            relation.restrict("by_age", &[Value::Integer(1)]),
            Err(RomError::NotFound { kind: LookupKind::View, .. })
        ));
        assert!(matches!(
            relation.restrict("by_id", &[]),
            Err(RomError::InvalidArguments(_))
        ));

        relation
            .define_view("named", |args| match args {
                [Value::Text(prefix)] => {
                    let prefix = prefix.clone();
                    Ok(Restriction::predicate(move |t| {
                        t.fetch("name")
                            .and_then(Value::as_str)
                            .is_some_and(|n| n.starts_with(&prefix))
                    }))
                }
                _ => Err(RomError::InvalidArguments("named takes a prefix".into())),
            })
            .unwrap();
        let named = relation.restrict("named", &["Ja".into()]).unwrap();
        assert_eq!(relation.select(&named).unwrap().len(), 1);
    }
}

impl std::fmt::Debug for MemoryRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let views: Vec<String> = self
            .views
            .read()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MemoryRelation")
            .field("schema", &self.schema)
            .field("strict", &self.strict)
            .field("tuples", &self.tuples)
            .field("views", &views)
            .finish()
    }
}
