use crate::core::{CommandError, Result, RomError};

/// Outcome of a command run under the try protocol.
///
/// Only command failures land in `Failure`; anything else stays an `Err`
/// on the surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult<T> {
    Success(T),
    Failure(CommandError),
}

impl<T> CommandResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CommandError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CommandResult<U> {
        match self {
            Self::Success(value) => CommandResult::Success(f(value)),
            Self::Failure(err) => CommandResult::Failure(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(err) => Err(RomError::Command(err)),
        }
    }

    /// Sort a crate result into the protocol: command errors become
    /// `Failure`, every other error is handed back untouched.
    pub(crate) fn capture(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Success(value)),
            Err(RomError::Command(err)) => Ok(Self::Failure(err)),
            Err(other) => Err(other),
        }
    }
}

impl<T> From<CommandError> for CommandResult<T> {
    fn from(err: CommandError) -> Self {
        Self::Failure(err)
    }
}
