use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use gallery_types::{
    ActionId, AppId, AppMetadata, Comment, CommentId, GalleryApp, Message, MessageId,
    ModerationAction, Page, Report, ReportId, UserId,
};
use tracing::debug;

use crate::error::{Entity, StoreError, StoreResult};
use crate::records::{AppOrder, AppQuery, NewApp, NewModerationAction, NewReport};
use crate::traits::MetadataStore;

/// In-memory, HashMap-based metadata store.
///
/// Intended for tests and embedding. All records live behind a single
/// `RwLock`, so every mutation (counters included) is atomic with respect
/// to every other. Records are cloned on read.
///
/// The store can be switched offline to simulate an unreachable backend:
/// every call then fails with [`StoreError::Unavailable`].
pub struct InMemoryMetadataStore {
    state: RwLock<StoreState>,
    offline: AtomicBool,
}

#[derive(Default)]
struct StoreState {
    apps: HashMap<AppId, AppRow>,
    likes: HashSet<(AppId, UserId)>,
    comments: Vec<Comment>,
    reports: Vec<Report>,
    actions: Vec<ModerationAction>,
    messages: Vec<Message>,
    /// Logical clock ordering apps by their last create or edit.
    clock: u64,
}

struct AppRow {
    app: GalleryApp,
    touched: u64,
}

impl StoreState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn app_mut(&mut self, id: &AppId) -> StoreResult<&mut AppRow> {
        self.apps
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(Entity::App, id))
    }

    fn report_mut(&mut self, id: &ReportId) -> StoreResult<&mut Report> {
        self.reports
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::not_found(Entity::Report, id))
    }

    fn message_mut(&mut self, id: &MessageId) -> StoreResult<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| StoreError::not_found(Entity::Message, id))
    }
}

impl InMemoryMetadataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate the backend going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of app rows, active or not.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.apps.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no apps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.ensure_online()?;
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.ensure_online()?;
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn create_app(&self, app: &NewApp) -> StoreResult<GalleryApp> {
        let mut state = self.write()?;
        let now = Utc::now();
        let record = GalleryApp {
            id: AppId::new(),
            project_id: app.project_id,
            project_name: app.project_name.clone(),
            developer_id: app.developer_id.clone(),
            title: app.metadata.title.clone(),
            description: app.metadata.description.clone(),
            more_info: app.metadata.more_info.clone(),
            credit: app.metadata.credit.clone(),
            created_at: now,
            updated_at: now,
            download_count: 0,
            like_count: 0,
            active: true,
            attribution_parent: None,
        };
        let touched = state.tick();
        state.apps.insert(
            record.id,
            AppRow {
                app: record.clone(),
                touched,
            },
        );
        debug!(app_id = %record.id, "app row created");
        Ok(record)
    }

    fn get_app(&self, id: &AppId) -> StoreResult<Option<GalleryApp>> {
        let state = self.read()?;
        Ok(state.apps.get(id).map(|row| row.app.clone()))
    }

    fn update_app_metadata(
        &self,
        id: &AppId,
        metadata: &AppMetadata,
    ) -> StoreResult<GalleryApp> {
        let mut state = self.write()?;
        let touched = state.tick();
        let row = state.app_mut(id)?;
        row.app.title = metadata.title.clone();
        row.app.description = metadata.description.clone();
        row.app.more_info = metadata.more_info.clone();
        row.app.credit = metadata.credit.clone();
        row.app.updated_at = Utc::now();
        row.touched = touched;
        Ok(row.app.clone())
    }

    fn delete_app(&self, id: &AppId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.apps.remove(id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|c| &c.app_id != id);
        state.likes.retain(|(app, _)| app != id);
        debug!(app_id = %id, "app row deleted");
        Ok(true)
    }

    fn list_apps(
        &self,
        query: &AppQuery,
        start: usize,
        count: usize,
    ) -> StoreResult<Page<GalleryApp>> {
        let state = self.read()?;
        let mut rows: Vec<&AppRow> = state
            .apps
            .values()
            .filter(|row| !query.active_only || row.app.active)
            .filter(|row| {
                query
                    .developer
                    .as_ref()
                    .map_or(true, |dev| &row.app.developer_id == dev)
            })
            .collect();

        match query.order {
            AppOrder::Recent => rows.sort_by(|a, b| b.touched.cmp(&a.touched)),
            AppOrder::MostDownloaded => rows.sort_by(|a, b| {
                b.app
                    .download_count
                    .cmp(&a.app.download_count)
                    .then(b.touched.cmp(&a.touched))
            }),
        }

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(start)
            .take(count)
            .map(|row| row.app.clone())
            .collect();
        Ok(Page::new(items, total))
    }

    fn count_apps(&self, active_only: bool) -> StoreResult<u64> {
        let state = self.read()?;
        let count = state
            .apps
            .values()
            .filter(|row| !active_only || row.app.active)
            .count();
        Ok(count as u64)
    }

    fn set_active(&self, id: &AppId, active: bool) -> StoreResult<()> {
        let mut state = self.write()?;
        state.app_mut(id)?.app.active = active;
        Ok(())
    }

    fn increment_downloads(&self, id: &AppId) -> StoreResult<u64> {
        let mut state = self.write()?;
        let row = state.app_mut(id)?;
        row.app.download_count += 1;
        Ok(row.app.download_count)
    }

    fn link_attribution(&self, child: &AppId, parent: &AppId) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.apps.contains_key(parent) {
            return Err(StoreError::not_found(Entity::App, parent));
        }
        state.app_mut(child)?;

        // Walk up from the parent under the write lock.
        let mut seen = HashSet::new();
        let mut cursor = Some(*parent);
        while let Some(current) = cursor {
            if &current == child {
                return Err(StoreError::AttributionCycle {
                    child: *child,
                    parent: *parent,
                });
            }
            if !seen.insert(current) {
                break;
            }
            cursor = state
                .apps
                .get(&current)
                .and_then(|row| row.app.attribution_parent);
        }

        state.app_mut(child)?.app.attribution_parent = Some(*parent);
        debug!(child = %child, parent = %parent, "attribution linked");
        Ok(())
    }

    fn children_of(&self, parent: &AppId) -> StoreResult<Vec<GalleryApp>> {
        let state = self.read()?;
        let mut children: Vec<GalleryApp> = state
            .apps
            .values()
            .filter(|row| row.app.attribution_parent.as_ref() == Some(parent))
            .map(|row| row.app.clone())
            .collect();
        children.sort_by_key(|app| app.id);
        Ok(children)
    }

    fn add_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64> {
        let mut state = self.write()?;
        if !state.apps.contains_key(app) {
            return Err(StoreError::not_found(Entity::App, app));
        }
        let inserted = state.likes.insert((*app, user.clone()));
        let row = state.app_mut(app)?;
        if inserted {
            row.app.like_count += 1;
        }
        Ok(row.app.like_count)
    }

    fn remove_like(&self, app: &AppId, user: &UserId) -> StoreResult<u64> {
        let mut state = self.write()?;
        if !state.apps.contains_key(app) {
            return Err(StoreError::not_found(Entity::App, app));
        }
        let removed = state.likes.remove(&(*app, user.clone()));
        let row = state.app_mut(app)?;
        if removed {
            row.app.like_count = row.app.like_count.saturating_sub(1);
        }
        Ok(row.app.like_count)
    }

    fn is_liked(&self, app: &AppId, user: &UserId) -> StoreResult<bool> {
        let state = self.read()?;
        Ok(state.likes.contains(&(*app, user.clone())))
    }

    fn add_comment(&self, app: &AppId, author: &UserId, text: &str) -> StoreResult<Comment> {
        let mut state = self.write()?;
        if !state.apps.contains_key(app) {
            return Err(StoreError::not_found(Entity::App, app));
        }
        let comment = Comment {
            id: CommentId::new(),
            app_id: *app,
            author_id: author.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    fn comments_for(&self, app: &AppId) -> StoreResult<Vec<Comment>> {
        let state = self.read()?;
        Ok(state
            .comments
            .iter()
            .filter(|c| &c.app_id == app)
            .cloned()
            .collect())
    }

    fn create_report(&self, report: &NewReport) -> StoreResult<Report> {
        let mut state = self.write()?;
        let record = Report {
            id: ReportId::new(),
            app_id: report.app_id,
            reporter_id: report.reporter_id.clone(),
            offender_id: report.offender_id.clone(),
            text: report.text.clone(),
            created_at: Utc::now(),
            resolved: false,
            resolved_at: None,
        };
        state.reports.push(record.clone());
        Ok(record)
    }

    fn get_report(&self, id: &ReportId) -> StoreResult<Option<Report>> {
        let state = self.read()?;
        Ok(state.reports.iter().find(|r| &r.id == id).cloned())
    }

    fn resolve_report(&self, id: &ReportId, at: DateTime<Utc>) -> StoreResult<Report> {
        let mut state = self.write()?;
        let report = state.report_mut(id)?;
        if !report.resolved {
            report.resolved = true;
            report.resolved_at = Some(at);
        }
        Ok(report.clone())
    }

    fn list_reports(
        &self,
        open_only: bool,
        start: usize,
        count: usize,
    ) -> StoreResult<Vec<Report>> {
        let state = self.read()?;
        Ok(state
            .reports
            .iter()
            .rev()
            .filter(|r| !open_only || r.is_open())
            .skip(start)
            .take(count)
            .cloned()
            .collect())
    }

    fn has_reported(&self, app: &AppId, reporter: &UserId) -> StoreResult<bool> {
        let state = self.read()?;
        Ok(state
            .reports
            .iter()
            .any(|r| &r.app_id == app && &r.reporter_id == reporter))
    }

    fn append_action(&self, action: &NewModerationAction) -> StoreResult<ModerationAction> {
        let mut state = self.write()?;
        if !state.reports.iter().any(|r| r.id == action.report_id) {
            return Err(StoreError::not_found(Entity::Report, action.report_id));
        }
        let record = ModerationAction {
            id: ActionId::new(),
            report_id: action.report_id,
            app_id: action.app_id,
            message_id: action.message_id,
            moderator_id: action.moderator_id.clone(),
            action_type: action.action_type,
            moderator_name: action.moderator_name.clone(),
            message_preview: action.message_preview.clone(),
            created_at: Utc::now(),
        };
        state.actions.push(record.clone());
        Ok(record)
    }

    fn actions_for(&self, report: &ReportId) -> StoreResult<Vec<ModerationAction>> {
        let state = self.read()?;
        Ok(state
            .actions
            .iter()
            .filter(|a| &a.report_id == report)
            .cloned()
            .collect())
    }

    fn insert_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        body: &str,
    ) -> StoreResult<Message> {
        let mut state = self.write()?;
        let message = Message {
            id: MessageId::new(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            body: body.to_string(),
            created_at: Utc::now(),
            read: false,
            deleted: false,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    fn get_message(&self, id: &MessageId) -> StoreResult<Option<Message>> {
        let state = self.read()?;
        Ok(state.messages.iter().find(|m| &m.id == id).cloned())
    }

    fn messages_for(&self, receiver: &UserId) -> StoreResult<Vec<Message>> {
        let state = self.read()?;
        Ok(state
            .messages
            .iter()
            .filter(|m| &m.receiver_id == receiver && m.is_listed())
            .cloned()
            .collect())
    }

    fn mark_message_read(&self, id: &MessageId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.message_mut(id)?.read = true;
        Ok(())
    }

    fn soft_delete_message(&self, id: &MessageId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.message_mut(id)?.deleted = true;
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMetadataStore")
            .field("app_count", &self.len())
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}
