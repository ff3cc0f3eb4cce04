use super::types::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: u32 },

    #[error("{kind} id {id} exceeds store capacity {capacity}")]
    CapacityExceeded {
        kind: EntityKind,
        id: u32,
        capacity: u32,
    },

    #[error("Referenced {kind} {id} does not exist")]
    MissingReference { kind: EntityKind, id: u32 },

    #[error("Invalid {0} entity")]
    InvalidEntity(EntityKind),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: u32) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// True for the errors a client caused by sending something the store
    /// cannot accept (as opposed to missing ids or internal failures).
    pub fn is_bad_request(&self) -> bool {
        !matches!(self, Self::NotFound { .. } | Self::LockError(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
