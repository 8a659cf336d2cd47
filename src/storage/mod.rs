pub mod memory;
pub mod relation;
pub mod table;

pub use memory::MemoryRepository;
pub use relation::{Relation, Restriction, TupleIter};
pub use table::{MemoryRelation, RelationSchema};
