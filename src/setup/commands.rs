use crate::command::{CommandDefinition, CommandKind};
use crate::core::{Result, RomError};

/// Collects command definitions of one relation.
#[derive(Debug, Default)]
pub struct CommandDsl {
    definitions: Vec<Result<CommandDefinition>>,
}

impl CommandDsl {
    /// Define a command whose kind follows from its name (`create`,
    /// `update` or `delete`). Other names fail at finalize; use `define_as`.
    pub fn define<F>(&mut self, name: &str, block: F) -> &mut Self
    where
        F: FnOnce(CommandDefinition) -> CommandDefinition,
    {
        let definition = CommandKind::from_name(name)
            .map(|kind| block(CommandDefinition::new(name, kind)))
            .ok_or_else(|| {
                RomError::InvalidArguments(format!(
                    "cannot infer the kind of command '{}'; use define_as",
                    name
                ))
            });
        self.definitions.push(definition);
        self
    }

    pub fn define_as<F>(&mut self, name: &str, kind: CommandKind, block: F) -> &mut Self
    where
        F: FnOnce(CommandDefinition) -> CommandDefinition,
    {
        self.definitions.push(Ok(block(CommandDefinition::new(name, kind))));
        self
    }

    pub(crate) fn into_definitions(self) -> Result<Vec<CommandDefinition>> {
        self.definitions.into_iter().collect()
    }
}
