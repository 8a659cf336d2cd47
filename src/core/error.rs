use std::fmt;
use thiserror::Error;

/// What kind of name a failed lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Repository,
    Relation,
    Mapper,
    Command,
    View,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => write!(f, "repository"),
            Self::Relation => write!(f, "relation"),
            Self::Mapper => write!(f, "mapper"),
            Self::Command => write!(f, "command"),
            Self::View => write!(f, "view"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("Duplicate attribute: '{0}' is mapped more than once")]
    DuplicateAttribute(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("No {kind} named '{name}'")]
    NotFound { kind: LookupKind, name: String },

    #[error("Environment is already finalized")]
    EnvAlreadyFinalized,

    #[error("Relation '{0}' already exists")]
    RelationExists(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl RomError {
    pub fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Errors of this family are the ones `try` turns into a `Failure`.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Self::Command(_))
    }
}

pub type Result<T> = std::result::Result<T, RomError>;

impl<T> From<std::sync::PoisonError<T>> for RomError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for RomError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Domain-level command failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    #[error("Command '{command}' expected {expected} tuple(s), got {actual}")]
    TupleCountMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("Rejected by relation: {0}")]
    Rejected(String),
}

impl CommandError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn is_tuple_count_mismatch(&self) -> bool {
        matches!(self, Self::TupleCountMismatch { .. })
    }

    pub fn validation_errors(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ValidationError> for RomError {
    fn from(err: ValidationError) -> Self {
        Self::Command(CommandError::Validation(err))
    }
}

/// Attribute-level messages produced by a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    messages: Vec<(String, String)>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new().add(attribute, message)
    }

    pub fn add(mut self, attribute: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.push((attribute.into(), message.into()));
        self
    }

    pub fn messages(&self) -> &[(String, String)] {
        &self.messages
    }

    pub fn messages_for(&self, attribute: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(attr, _)| attr == attribute)
            .map(|(_, msg)| msg.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .messages
            .iter()
            .map(|(attr, msg)| format!("{} {}", attr, msg))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_family() {
        let err: RomError = CommandError::rejected("nope").into();
        assert!(err.is_command_error());
        assert!(!RomError::EnvAlreadyFinalized.is_command_error());
        assert!(!RomError::not_found(LookupKind::Command, "create").is_command_error());
    }

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::on("name", "must be filled").add("email", "is invalid");
        assert_eq!(err.messages_for("name"), vec!["must be filled"]);
        assert_eq!(err.to_string(), "name must be filled, email is invalid");
    }

    #[test]
    fn test_not_found_message() {
        let err = RomError::not_found(LookupKind::Repository, "sqlite");
        assert_eq!(err.to_string(), "No repository named 'sqlite'");
    }
}
