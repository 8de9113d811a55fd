//! Metadata storage for the app gallery.
//!
//! The metadata store is the single source of truth for the gallery: apps,
//! comments, like memberships, abuse reports, the moderation audit trail and
//! mailbox messages all live here. Blob storage and the search index are
//! secondary and may lag behind it.
//!
//! # Storage Backends
//!
//! All backends implement the [`MetadataStore`] trait:
//!
//! - [`InMemoryMetadataStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Creating an app allocates its id; ids are never reused.
//! 2. Missing rows are `Ok(None)` on reads and `StoreError::NotFound` on writes.
//! 3. Counters are mutated atomically by the store, never by callers.
//! 4. Moderation actions are append-only; messages are soft-deleted.
//! 5. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::{Entity, StoreError, StoreResult};
pub use memory::InMemoryMetadataStore;
pub use records::{AppOrder, AppQuery, NewApp, NewModerationAction, NewReport};
pub use traits::MetadataStore;
