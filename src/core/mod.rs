pub mod entity;
pub mod error;
pub mod patch;
pub mod types;

pub use entity::{Entity, Location, User, Visit, age_at};
pub use error::{Result, StoreError};
pub use patch::{LocationPatch, Patch, UserPatch, VisitPatch};
pub use types::{Capacity, EntityKind, Gender, SECONDS_PER_YEAR};
