//! Foundation types for the community app gallery.
//!
//! Every other gallery crate depends on `gallery-types`. The records here
//! are plain data: persistence, blob storage and search live behind traits
//! in their own crates.
//!
//! # Key Types
//!
//! - [`GalleryApp`] -- A published app and its counters, flags and lineage
//! - [`Report`] / [`ModerationAction`] -- Abuse reports and their audit trail
//! - [`Comment`] / [`Message`] -- Social records
//! - [`AppId`] and friends -- UUID v7 identifiers
//! - [`Page`] -- A listing page with a total count

pub mod app;
pub mod error;
pub mod ids;
pub mod moderation;
pub mod page;
pub mod social;

pub use app::{AppMetadata, GalleryApp};
pub use error::TypeError;
pub use ids::{ActionId, AppId, CommentId, MessageId, ProjectId, ReportId, UserId};
pub use moderation::{ActionType, ModerationAction, Report};
pub use page::Page;
pub use social::{Comment, Message};
