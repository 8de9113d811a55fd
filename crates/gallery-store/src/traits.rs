use chrono::{DateTime, Utc};
use gallery_types::{
    AppId, AppMetadata, Comment, GalleryApp, Message, MessageId, ModerationAction, Page, Report,
    ReportId, UserId,
};

use crate::error::StoreResult;
use crate::records::{AppQuery, NewApp, NewModerationAction, NewReport};

/// Durable record storage for the gallery.
///
/// All implementations must satisfy these invariants:
/// - Reads of a single record return `Ok(None)` when it does not exist.
/// - Mutations targeting a missing record return `StoreError::NotFound`,
///   never a transport error.
/// - Counter and membership mutations are atomic: a like is counted at most
///   once per user and `like_count` never drops below zero.
/// - Moderation actions are append-only.
/// - Attribution links never form a cycle, even under concurrent writers.
/// - Soft-deleted messages are kept but never listed.
pub trait MetadataStore: Send + Sync {
    // ---- Apps ----

    /// Create an app row, allocating its id. The row starts active.
    fn create_app(&self, app: &NewApp) -> StoreResult<GalleryApp>;

    fn get_app(&self, id: &AppId) -> StoreResult<Option<GalleryApp>>;

    /// Overwrite the editable metadata and bump `updated_at`.
    fn update_app_metadata(&self, id: &AppId, metadata: &AppMetadata)
        -> StoreResult<GalleryApp>;

    /// Remove an app and, best effort, its comments and likes. Reports and
    /// moderation actions are kept for audit. Returns `true` if the app
    /// existed.
    fn delete_app(&self, id: &AppId) -> StoreResult<bool>;

    fn list_apps(&self, query: &AppQuery, start: usize, count: usize)
        -> StoreResult<Page<GalleryApp>>;

    fn count_apps(&self, active_only: bool) -> StoreResult<u64>;

    fn set_active(&self, id: &AppId, active: bool) -> StoreResult<()>;

    /// Atomically add one download. Returns the new count.
    fn increment_downloads(&self, id: &AppId) -> StoreResult<u64>;

    /// Make `parent` the attribution parent of `child`, replacing any
    /// earlier parent. The ancestor walk from `parent` and the write happen
    /// atomically; if the walk reaches `child` nothing is written and
    /// `StoreError::AttributionCycle` is returned.
    fn link_attribution(&self, child: &AppId, parent: &AppId) -> StoreResult<()>;

    /// Apps whose attribution parent is `parent`.
    fn children_of(&self, parent: &AppId) -> StoreResult<Vec<GalleryApp>>;

    // ---- Likes ----

    /// Record that `user` likes `app`. Idempotent. Returns the like count.
    fn add_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64>;

    /// Withdraw a like. Idempotent. Returns the like count.
    fn remove_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64>;

    fn is_liked(&self, app: &AppId, user: &UserId) -> StoreResult<bool>;

    // ---- Comments ----

    fn add_comment(&self, app: &AppId, author: &UserId, text: &str) -> StoreResult<Comment>;

    /// Comments on an app, oldest first.
    fn comments_for(&self, app: &AppId) -> StoreResult<Vec<Comment>>;

    // ---- Reports ----

    fn create_report(&self, report: &NewReport) -> StoreResult<Report>;

    fn get_report(&self, id: &ReportId) -> StoreResult<Option<Report>>;

    /// Mark a report resolved at `at`. Resolving an already resolved report
    /// returns it unchanged, keeping the original `resolved_at`.
    fn resolve_report(&self, id: &ReportId, at: DateTime<Utc>) -> StoreResult<Report>;

    /// Reports newest first, optionally only the unresolved ones.
    fn list_reports(&self, open_only: bool, start: usize, count: usize)
        -> StoreResult<Vec<Report>>;

    fn has_reported(&self, app: &AppId, reporter: &UserId) -> StoreResult<bool>;

    // ---- Moderation audit ----

    fn append_action(&self, action: &NewModerationAction) -> StoreResult<ModerationAction>;

    /// All actions recorded for a report, in insertion order.
    fn actions_for(&self, report: &ReportId) -> StoreResult<Vec<ModerationAction>>;

    // ---- Messages ----

    fn insert_message(&self, sender: &UserId, receiver: &UserId, body: &str)
        -> StoreResult<Message>;

    fn get_message(&self, id: &MessageId) -> StoreResult<Option<Message>>;

    /// Listed (not soft-deleted) messages for a receiver, oldest first.
    fn messages_for(&self, receiver: &UserId) -> StoreResult<Vec<Message>>;

    fn mark_message_read(&self, id: &MessageId) -> StoreResult<()>;

    fn soft_delete_message(&self, id: &MessageId) -> StoreResult<()>;
}
