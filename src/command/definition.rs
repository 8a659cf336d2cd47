use std::fmt;
use std::sync::Arc;
use crate::core::{Result, Tuple, ValidationError};
use crate::header::AttributeHeader;
use crate::transform::transform;
use super::{CommandKind, ResultArity};

/// Turns raw command input into the tuple handed to the relation.
pub trait InputHandler: Send + Sync {
    fn process(&self, input: Tuple) -> Result<Tuple>;
}

impl<F> InputHandler for F
where
    F: Fn(Tuple) -> Tuple + Send + Sync,
{
    fn process(&self, input: Tuple) -> Result<Tuple> {
        Ok(self(input))
    }
}

/// A header used as input handler projects the input: unknown keys are
/// dropped, declared ones are renamed.
impl InputHandler for AttributeHeader {
    fn process(&self, input: Tuple) -> Result<Tuple> {
        Ok(transform(self, &input))
    }
}

/// Runs before a command reaches its relation. An error aborts the command
/// with `CommandError::Validation`.
pub trait Validator: Send + Sync {
    fn validate(&self, input: &Tuple) -> std::result::Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Tuple) -> std::result::Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, input: &Tuple) -> std::result::Result<(), ValidationError> {
        self(input)
    }
}

/// Declaration of a command, before it is bound to a relation.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    kind: CommandKind,
    input: Option<Arc<dyn InputHandler>>,
    validator: Option<Arc<dyn Validator>>,
    result: ResultArity,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            kind,
            input: None,
            validator: None,
            result: ResultArity::Many,
        }
    }

    pub fn input<H: InputHandler + 'static>(mut self, handler: H) -> Self {
        self.input = Some(Arc::new(handler));
        self
    }

    pub fn validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn result(mut self, arity: ResultArity) -> Self {
        self.result = arity;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn arity(&self) -> ResultArity {
        self.result
    }

    pub(crate) fn input_handler(&self) -> Option<&dyn InputHandler> {
        self.input.as_deref()
    }

    pub(crate) fn validator_ref(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("input", &self.input.is_some())
            .field("validator", &self.validator.is_some())
            .field("result", &self.result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Key;

    #[test]
    fn test_defaults() {
        let def = CommandDefinition::new("create", CommandKind::Create);
        assert_eq!(def.arity(), ResultArity::Many);
        assert!(def.input_handler().is_none());
        assert!(def.validator_ref().is_none());
    }

    #[test]
    fn test_header_as_input_projects() {
        let header = AttributeHeader::identity(["name"]).unwrap();
        let def = CommandDefinition::new("create", CommandKind::Create).input(header);
        let processed = def
            .input_handler()
            .unwrap()
            .process(Tuple::new().with("name", "Jane").with("admin", true))
            .unwrap();
        assert_eq!(processed, Tuple::new().with("name", "Jane"));
    }

    #[test]
    fn test_closure_input_and_validator() {
        let def = CommandDefinition::new("create", CommandKind::Create)
            .input(|t: Tuple| t.with(Key::str("active"), true))
            .validator(|t: &Tuple| {
                if t.fetch("name").is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::on("name", "is missing"))
                }
            });

        let processed = def.input_handler().unwrap().process(Tuple::new()).unwrap();
        assert_eq!(processed, Tuple::new().with("active", true));
        assert!(def.validator_ref().unwrap().validate(&processed).is_err());
    }
}
