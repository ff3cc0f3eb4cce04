// ============================================================================
// travelsdb Library
// ============================================================================

pub mod config;
pub mod core;
pub mod loader;
pub mod mutation;
pub mod query;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use config::AppConfig;
pub use crate::core::{
    Capacity, Entity, EntityKind, Gender, Location, LocationPatch, Patch, Result, StoreError,
    User, UserPatch, Visit, VisitPatch,
};
pub use loader::{Batch, LoadError, Loader};
pub use mutation::MutationService;
pub use query::{AverageFilter, QueryEngine, VisitFilter, VisitSummary};
pub use storage::EntityStore;
pub use web::{AppState, build_router};
