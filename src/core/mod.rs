pub mod error;
pub mod types;
pub mod value;

pub use error::{CommandError, LookupKind, Result, RomError, ValidationError};
pub use types::{Key, Tuple};
pub use value::Value;
