use std::fmt;
use std::sync::Arc;
use tracing::{Level, event, info_span};
use crate::core::{CommandError, Result, RomError, Tuple, Value};
use crate::storage::{Relation, Restriction};
use super::{CommandDefinition, CommandKind, CommandOutput, ResultArity};

/// A command definition bound to the relation it writes to.
///
/// Holds no state between calls; the relation is shared, not owned.
#[derive(Clone)]
pub struct Command {
    definition: Arc<CommandDefinition>,
    relation: Arc<dyn Relation>,
}

impl Command {
    pub fn new(definition: CommandDefinition, relation: Arc<dyn Relation>) -> Self {
        Self {
            definition: Arc::new(definition),
            relation,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn kind(&self) -> CommandKind {
        self.definition.kind()
    }

    pub fn arity(&self) -> ResultArity {
        self.definition.arity()
    }

    pub fn relation(&self) -> &dyn Relation {
        self.relation.as_ref()
    }

    /// Immediate form: build, validate and run in one step.
    ///
    /// - create: `[input]`
    /// - update: `[changes]`, applied to the whole relation
    /// - delete: `[]` for the whole relation, or `[filter]`
    pub fn call(&self, args: &[Value]) -> Result<CommandOutput> {
        match (self.kind(), args) {
            (CommandKind::Create, [Value::Tuple(input)]) => {
                self.run(&Restriction::All, Some(input.clone()))
            }
            (CommandKind::Update, [Value::Tuple(changes)]) => {
                self.run(&Restriction::All, Some(changes.clone()))
            }
            (CommandKind::Delete, []) => self.run(&Restriction::All, None),
            (CommandKind::Delete, [Value::Tuple(filter)]) => {
                self.run(&Restriction::matching(filter.clone()), None)
            }
            _ => Err(self.bad_arguments(args)),
        }
    }

    /// Builder form: restrict the relation through a named view and return
    /// a command waiting for its final invocation.
    ///
    /// `args` is `[view, view_args...]`; no arguments bind the whole relation.
    pub fn bind(&self, args: &[Value]) -> Result<BoundCommand> {
        let restriction = match args {
            [] => Restriction::All,
            [Value::Text(view), view_args @ ..] => self.relation.restrict(view, view_args)?,
            _ => return Err(self.bad_arguments(args)),
        };
        Ok(BoundCommand {
            command: self.clone(),
            restriction,
        })
    }

    pub(crate) fn run(&self, restriction: &Restriction, input: Option<Tuple>) -> Result<CommandOutput> {
        let span = info_span!(
            "relmap.command",
            relation = %self.relation.name(),
            command = %self.name(),
            kind = %self.kind()
        );
        let _enter = span.enter();

        let result = self.dispatch(restriction, input).and_then(|tuples| self.shape(tuples));
        match &result {
            Ok(output) => event!(Level::DEBUG, affected = output.len(), "command succeeded"),
            Err(RomError::Command(err)) => event!(Level::WARN, error = %err, "command failed"),
            Err(err) => event!(Level::ERROR, error = %err, "command errored"),
        }
        result
    }

    fn dispatch(&self, restriction: &Restriction, input: Option<Tuple>) -> Result<Vec<Tuple>> {
        match self.kind() {
            CommandKind::Create => {
                let input = self.prepare(input.unwrap_or_default())?;
                self.relation.insert(input)
            }
            CommandKind::Update => {
                let changes = self.prepare(input.unwrap_or_default())?;
                self.check_targets(restriction)?;
                self.relation.update(restriction, &changes)
            }
            CommandKind::Delete => {
                let targets = self.check_targets(restriction)?;
                if let Some(validator) = self.definition.validator_ref() {
                    for tuple in &targets {
                        validator.validate(tuple).map_err(CommandError::Validation)?;
                    }
                }
                self.relation.delete(restriction)
            }
        }
    }

    /// Input handler first, then the validator on what it produced.
    fn prepare(&self, input: Tuple) -> Result<Tuple> {
        let input = match self.definition.input_handler() {
            Some(handler) => handler.process(input)?,
            None => input,
        };
        if let Some(validator) = self.definition.validator_ref() {
            validator.validate(&input).map_err(CommandError::Validation)?;
        }
        Ok(input)
    }

    /// `:one` commands must not touch anything unless exactly one tuple is targeted.
    fn check_targets(&self, restriction: &Restriction) -> Result<Vec<Tuple>> {
        let targets = self.relation.select(restriction)?;
        if self.arity() == ResultArity::One && targets.len() != 1 {
            return Err(self.count_mismatch(targets.len()));
        }
        Ok(targets)
    }

    fn shape(&self, mut tuples: Vec<Tuple>) -> Result<CommandOutput> {
        match self.arity() {
            ResultArity::Many => Ok(CommandOutput::Many(tuples)),
            ResultArity::One if tuples.len() == 1 => Ok(CommandOutput::One(tuples.remove(0))),
            ResultArity::One => Err(self.count_mismatch(tuples.len())),
        }
    }

    fn count_mismatch(&self, actual: usize) -> RomError {
        CommandError::TupleCountMismatch {
            command: self.name().to_string(),
            expected: 1,
            actual,
        }
        .into()
    }

    fn bad_arguments(&self, args: &[Value]) -> RomError {
        let kinds: Vec<&str> = args.iter().map(Value::type_name).collect();
        RomError::InvalidArguments(format!(
            "{} command '{}' does not accept ({})",
            self.kind(),
            self.name(),
            kinds.join(", ")
        ))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("definition", &self.definition)
            .field("relation", &self.relation.name())
            .finish()
    }
}

/// A command restricted to part of its relation, awaiting execution.
#[derive(Debug, Clone)]
pub struct BoundCommand {
    command: Command,
    restriction: Restriction,
}

impl BoundCommand {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    /// Run a bound update with the given changes.
    pub fn set(&self, changes: Tuple) -> Result<CommandOutput> {
        match self.command.kind() {
            CommandKind::Update => self.command.run(&self.restriction, Some(changes)),
            kind => Err(RomError::InvalidArguments(format!(
                "set is only available on update commands, not {}",
                kind
            ))),
        }
    }

    /// Run a bound delete.
    pub fn execute(&self) -> Result<CommandOutput> {
        match self.command.kind() {
            CommandKind::Delete => self.command.run(&self.restriction, None),
            kind => Err(RomError::InvalidArguments(format!(
                "{} commands need input; use set or call",
                kind
            ))),
        }
    }

    /// Final invocation with the same argument shapes as `Command::call`.
    pub fn call(&self, args: &[Value]) -> Result<CommandOutput> {
        match (self.command.kind(), args) {
            (CommandKind::Update, [Value::Tuple(changes)]) => self.set(changes.clone()),
            (CommandKind::Delete, []) => self.execute(),
            _ => Err(self.command.bad_arguments(args)),
        }
    }
}
