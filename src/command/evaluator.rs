use crate::core::{Result, Value};
use super::{BoundCommand, Command, CommandOutput, CommandRegistry};

/// What the arity-based `dispatch` ended up doing.
#[derive(Debug, Clone)]
pub enum Dispatched {
    Executed(CommandOutput),
    Bound(BoundCommand),
}

impl Dispatched {
    pub fn into_output(self) -> Option<CommandOutput> {
        match self {
            Self::Executed(output) => Some(output),
            Self::Bound(_) => None,
        }
    }

    pub fn into_bound(self) -> Option<BoundCommand> {
        match self {
            Self::Executed(_) => None,
            Self::Bound(bound) => Some(bound),
        }
    }
}

/// Looks up commands by name inside a `try` block.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a CommandRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, name: &str) -> Result<&'a Command> {
        self.registry.get(name)
    }

    /// Immediate form.
    pub fn execute(&self, name: &str, args: &[Value]) -> Result<CommandOutput> {
        self.resolve(name)?.call(args)
    }

    /// Builder form.
    pub fn bind(&self, name: &str, args: &[Value]) -> Result<BoundCommand> {
        self.resolve(name)?.bind(args)
    }

    /// Pick the form from the argument count: at most one argument executes,
    /// more bind a view.
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Result<Dispatched> {
        let command = self.resolve(name)?;
        if args.len() <= 1 {
            Ok(Dispatched::Executed(command.call(args)?))
        } else {
            Ok(Dispatched::Bound(command.bind(args)?))
        }
    }
}
