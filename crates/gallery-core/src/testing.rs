//! Test double wrapping the in-memory metadata store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use gallery_store::{
    AppQuery, InMemoryMetadataStore, MetadataStore, NewApp, NewModerationAction, NewReport,
    StoreResult,
};
use gallery_types::{
    AppId, AppMetadata, Comment, GalleryApp, Message, MessageId, ModerationAction, Page, Report,
    ReportId, UserId,
};

type Hook = Box<dyn FnOnce(&InMemoryMetadataStore) + Send>;

/// Delegates to an [`InMemoryMetadataStore`], counting app reads and
/// optionally running a one-shot hook right before the next attribution
/// link. The hook sees the inner store, so it can commit a competing write
/// in the gap a racing request would use.
pub(crate) struct ScriptedStore {
    inner: Arc<InMemoryMetadataStore>,
    app_reads: AtomicUsize,
    before_link: Mutex<Option<Hook>>,
}

impl ScriptedStore {
    pub(crate) fn new(inner: Arc<InMemoryMetadataStore>) -> Self {
        Self {
            inner,
            app_reads: AtomicUsize::new(0),
            before_link: Mutex::new(None),
        }
    }

    pub(crate) fn app_reads(&self) -> usize {
        self.app_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_reads(&self) {
        self.app_reads.store(0, Ordering::SeqCst);
    }

    pub(crate) fn before_next_link(&self, hook: impl FnOnce(&InMemoryMetadataStore) + Send + 'static) {
        *self.before_link.lock().unwrap() = Some(Box::new(hook));
    }
}

impl MetadataStore for ScriptedStore {
    fn create_app(&self, app: &NewApp) -> StoreResult<GalleryApp> {
        self.inner.create_app(app)
    }

    fn get_app(&self, id: &AppId) -> StoreResult<Option<GalleryApp>> {
        self.app_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_app(id)
    }

    fn update_app_metadata(
        &self,
        id: &AppId,
        metadata: &AppMetadata,
    ) -> StoreResult<GalleryApp> {
        self.inner.update_app_metadata(id, metadata)
    }

    fn delete_app(&self, id: &AppId) -> StoreResult<bool> {
        self.inner.delete_app(id)
    }

    fn list_apps(
        &self,
        query: &AppQuery,
        start: usize,
        count: usize,
    ) -> StoreResult<Page<GalleryApp>> {
        self.inner.list_apps(query, start, count)
    }

    fn count_apps(&self, active_only: bool) -> StoreResult<u64> {
        self.inner.count_apps(active_only)
    }

    fn set_active(&self, id: &AppId, active: bool) -> StoreResult<()> {
        self.inner.set_active(id, active)
    }

    fn increment_downloads(&self, id: &AppId) -> StoreResult<u64> {
        self.inner.increment_downloads(id)
    }

    fn link_attribution(&self, child: &AppId, parent: &AppId) -> StoreResult<()> {
        let hook = self.before_link.lock().unwrap().take();
        if let Some(hook) = hook {
            hook(&self.inner);
        }
        self.inner.link_attribution(child, parent)
    }

    fn children_of(&self, parent: &AppId) -> StoreResult<Vec<GalleryApp>> {
        self.inner.children_of(parent)
    }

    fn add_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64> {
        self.inner.add_like(app, user)
    }

    fn remove_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64> {
        self.inner.remove_like(app, user)
    }

    fn is_liked(&self, app: &AppId, user: &UserId) -> StoreResult<bool> {
        self.inner.is_liked(app, user)
    }

    fn add_comment(&self, app: &AppId, author: &UserId, text: &str) -> StoreResult<Comment> {
        self.inner.add_comment(app, author, text)
    }

    fn comments_for(&self, app: &AppId) -> StoreResult<Vec<Comment>> {
        self.inner.comments_for(app)
    }

    fn create_report(&self, report: &NewReport) -> StoreResult<Report> {
        self.inner.create_report(report)
    }

    fn get_report(&self, id: &ReportId) -> StoreResult<Option<Report>> {
        self.inner.get_report(id)
    }

    fn resolve_report(&self, id: &ReportId, at: DateTime<Utc>) -> StoreResult<Report> {
        self.inner.resolve_report(id, at)
    }

    fn list_reports(
        &self,
        open_only: bool,
        start: usize,
        count: usize,
    ) -> StoreResult<Vec<Report>> {
        self.inner.list_reports(open_only, start, count)
    }

    fn has_reported(&self, app: &AppId, reporter: &UserId) -> StoreResult<bool> {
        self.inner.has_reported(app, reporter)
    }

    fn append_action(&self, action: &NewModerationAction) -> StoreResult<ModerationAction> {
        self.inner.append_action(action)
    }

    fn actions_for(&self, report: &ReportId) -> StoreResult<Vec<ModerationAction>> {
        self.inner.actions_for(report)
    }

    fn insert_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        body: &str,
    ) -> StoreResult<Message> {
        self.inner.insert_message(sender, receiver, body)
    }

    fn get_message(&self, id: &MessageId) -> StoreResult<Option<Message>> {
        self.inner.get_message(id)
    }

    fn messages_for(&self, receiver: &UserId) -> StoreResult<Vec<Message>> {
        self.inner.messages_for(receiver)
    }

    fn mark_message_read(&self, id: &MessageId) -> StoreResult<()> {
        self.inner.mark_message_read(id)
    }

    fn soft_delete_message(&self, id: &MessageId) -> StoreResult<()> {
        self.inner.soft_delete_message(id)
    }
}
