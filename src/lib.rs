// ============================================================================
// relmap: relation mapping toolkit
// ============================================================================

//! Attribute headers describe how raw tuples are renamed, nested and
//! flattened; mappers apply them to relations; commands write back through
//! validated create/update/delete operations.
//!
//! ```
//! use relmap::{AttributeHeader, HeaderOptions, Key, Mapper, Tuple};
//!
//! let header = AttributeHeader::build(HeaderOptions::new().symbolize_keys(true), |h| {
//!     h.attribute("id");
//!     h.wrap_with("contact", HeaderOptions::new().prefix("contact"), |w| {
//!         w.attribute("email");
//!     });
//! })
//! .unwrap();
//!
//! let mapper = Mapper::new("users", header);
//! let loaded = mapper.load(&Tuple::new().with("id", 1).with("contact_email", "jane@doe.org"));
//!
//! let contact = Tuple::new().with(Key::sym("email"), "jane@doe.org");
//! assert_eq!(loaded, Tuple::new().with(Key::sym("id"), 1).with(Key::sym("contact"), contact));
//! ```

pub mod command;
pub mod config;
pub mod core;
pub mod header;
pub mod mapper;
pub mod result;
pub mod setup;
pub mod storage;
pub mod transform;

// Re-export main types for convenience
pub use command::{
    BoundCommand, Command, CommandDefinition, CommandKind, CommandOutput, CommandRegistry,
    Dispatched, Evaluator, ResultArity, try_command,
};
pub use config::{Adapter, RepositoryConfig};
pub use crate::core::{CommandError, Key, LookupKind, Result, RomError, Tuple, ValidationError, Value};
pub use header::{
    AttributeDirective, AttributeHeader, AttributeOptions, AttributeSpec, HeaderOptions, HeaderSpec,
    Prefix,
};
pub use mapper::{Loaded, MappedRelation, Mapper, Model, ModelStrategy};
pub use result::CommandResult;
pub use setup::{Env, Setup};
pub use storage::{MemoryRelation, MemoryRepository, Relation, RelationSchema, Restriction};
pub use transform::{Transformer, dump, transform};
