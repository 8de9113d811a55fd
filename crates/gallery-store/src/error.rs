use std::fmt;

use gallery_types::AppId;

/// Kinds of records held by a metadata store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    App,
    Comment,
    Report,
    ModerationAction,
    Message,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => write!(f, "app"),
            Self::Comment => write!(f, "comment"),
            Self::Report => write!(f, "report"),
            Self::ModerationAction => write!(f, "moderation action"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record a mutation targets does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// A write would violate a store constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Linking `child` under `parent` would make `child` its own ancestor.
    #[error("attributing {child} to {parent} would create a cycle")]
    AttributionCycle { child: AppId, parent: AppId },

    /// The backend cannot be reached or refused the request.
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("metadata store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` for the structured "record does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
