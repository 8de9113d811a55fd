//! Publication and moderation coordinator for the app gallery.
//!
//! Keeps the metadata store, blob store and search index consistent while
//! apps are published, updated and deleted, runs the abuse report workflow
//! and maintains remix attribution. This is the main entry point for
//! services embedding the gallery.
//!
//! # Components
//!
//! - [`PublicationCoordinator`] -- publish / update / delete sagas
//! - [`ModerationEngine`] -- reports, audit log, deactivation
//! - [`AttributionGraph`] -- remix lineage, cycle-free
//! - [`Mailbox`] -- direct messages
//! - [`Catalog`] -- lookups, listings, keyword search, reindexing
//! - [`Social`] -- comments, likes, downloads
//! - [`Reconciler`] -- orphaned blob and stale index repair
//!
//! [`Gallery`] wires all of them to one [`GalleryConfig`] and one set of
//! [`Collaborators`].

pub mod attribution;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exporter;
pub mod gallery;
pub mod keys;
pub mod mailbox;
pub mod moderation;
pub mod publication;
pub mod reconcile;
pub mod saga;
pub mod social;
pub mod thumbnail;

#[cfg(test)]
mod testing;

pub use attribution::AttributionGraph;
pub use catalog::{Catalog, ReindexReport};
pub use config::{GalleryConfig, GallerySettings};
pub use error::{AttributionError, ConfigError, ExportError, GalleryError, GalleryResult};
pub use exporter::{Bundle, BundleExporter, InMemoryExporter};
pub use gallery::{Collaborators, Gallery, InMemoryBackends};
pub use keys::KeyScheme;
pub use mailbox::Mailbox;
pub use moderation::ModerationEngine;
pub use publication::{PublicationCoordinator, PublishRequest, Published};
pub use reconcile::{Reconciler, SweepReport};
pub use saga::{SagaReport, SagaStep, StepOutcome, StepRecord};
pub use social::Social;
pub use thumbnail::{fit_within, Thumbnailer};

// Re-export key types
pub use gallery_blob::{BlobKey, BlobOptions, BlobStore, ImageTransformer};
pub use gallery_search::{SearchDocument, SearchIndex};
pub use gallery_store::{MetadataStore, NewModerationAction};
pub use gallery_types::{
    ActionType, AppId, GalleryApp, Message, MessageId, ModerationAction, Page, ProjectId, Report,
    ReportId, UserId,
};
