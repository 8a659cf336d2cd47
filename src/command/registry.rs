use std::collections::HashMap;
use crate::core::{LookupKind, Result, RomError};
use crate::result::CommandResult;
use super::{Command, Evaluator};

/// Commands of one relation, by name.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    relation: String,
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            commands: HashMap::new(),
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Register a command under its own name, replacing any earlier one.
    pub fn register(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name().to_string(), command)
    }

    pub fn get(&self, name: &str) -> Result<&Command> {
        self.commands
            .get(name)
            .ok_or_else(|| RomError::not_found(LookupKind::Command, format!("{}.{}", self.relation, name)))
    }

    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run `f` with an evaluator over this registry.
    ///
    /// Command errors raised inside come back as `CommandResult::Failure`;
    /// any other error propagates as `Err`.
    pub fn attempt<T, F>(&self, f: F) -> Result<CommandResult<T>>
    where
        F: FnOnce(&Evaluator<'_>) -> Result<T>,
    {
        let evaluator = Evaluator::new(self);
        try_command(|| f(&evaluator))
    }
}

/// Evaluate `f`, converting command failures into `CommandResult::Failure`.
pub fn try_command<T, F>(f: F) -> Result<CommandResult<T>>
where
    F: FnOnce() -> Result<T>,
{
    CommandResult::capture(f())
}
