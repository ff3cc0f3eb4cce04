pub mod memory;
pub mod owner;
pub mod refs;
pub mod table;

pub use memory::EntityStore;
pub use owner::{OwnerTable, RefsPair};
pub use refs::VisitRefs;
pub use table::Table;
