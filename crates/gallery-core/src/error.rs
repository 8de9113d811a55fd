use std::io;
use std::path::PathBuf;

use gallery_blob::BlobError;
use gallery_search::SearchError;
use gallery_store::{Entity, StoreError};
use gallery_types::{AppId, ProjectId, UserId};
use thiserror::Error;

/// Rejected remix attribution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributionError {
    #[error("app {0} cannot be remixed from itself")]
    SelfReference(AppId),

    #[error("attributing {child} to {parent} would create a cycle")]
    Cycle { child: AppId, parent: AppId },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("project {project} of {developer} not found")]
    ProjectNotFound { developer: UserId, project: ProjectId },

    #[error("export failed: {0}")]
    Failed(String),
}

/// Caller-facing errors of the gallery.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Publishing is switched off by configuration.
    #[error("gallery is disabled")]
    Disabled,

    #[error("{kind} not found: {id}")]
    NotFound { kind: Entity, id: String },

    #[error("attribution rejected: {0}")]
    Attribution(#[from] AttributionError),

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl GalleryError {
    pub fn not_found(kind: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StoreError> for GalleryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { kind: entity, id },
            StoreError::AttributionCycle { child, parent } if child == parent => {
                Self::Attribution(AttributionError::SelfReference(child))
            }
            StoreError::AttributionCycle { child, parent } => {
                Self::Attribution(AttributionError::Cycle { child, parent })
            }
            other => Self::Store(other),
        }
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;
