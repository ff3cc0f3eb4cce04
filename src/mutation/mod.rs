use crate::core::{Entity, EntityKind, Patch, Result, StoreError};
use crate::storage::EntityStore;
use std::sync::Arc;
use tracing::debug;

/// Online creates and updates.
///
/// Both operations validate everything up front; a rejected call leaves the
/// store exactly as it was.
#[derive(Clone)]
pub struct MutationService {
    store: Arc<EntityStore>,
}

impl MutationService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Stores a new entity. Visits are linked to their user and location,
    /// which must already exist.
    pub fn create(&self, entity: Entity) -> Result<()> {
        let kind = entity.kind();
        let id = entity.id();
        if !entity.is_valid() {
            debug!(%kind, id, "rejected invalid entity");
            return Err(StoreError::InvalidEntity(kind));
        }
        self.store.insert(entity).inspect_err(|err| {
            debug!(%kind, id, error = %err, "create rejected");
        })
    }

    /// Applies a patch to an existing entity.
    pub fn update(&self, kind: EntityKind, id: u32, patch: Patch) -> Result<()> {
        self.store.update(kind, id, patch).inspect_err(|err| {
            debug!(%kind, id, error = %err, "update rejected");
        })
    }
}
