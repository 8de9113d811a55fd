//! Abuse reports and moderator actions.
//!
//! A report starts open and is resolved at most once. Every moderator
//! decision is appended to an audit log keyed by report. Deactivation hides
//! an app without deleting anything.

use std::sync::Arc;

use chrono::Utc;
use gallery_search::SearchIndex;
use gallery_store::{Entity, MetadataStore, NewModerationAction, NewReport};
use gallery_types::{AppId, ModerationAction, Report, ReportId, UserId};
use tracing::{info, warn};

use crate::error::{GalleryError, GalleryResult};

pub struct ModerationEngine {
    store: Arc<dyn MetadataStore>,
    search: Arc<dyn SearchIndex>,
}

impl ModerationEngine {
    pub fn new(store: Arc<dyn MetadataStore>, search: Arc<dyn SearchIndex>) -> Self {
        Self { store, search }
    }

    /// File an open report against an app. The app's developer at this
    /// moment is recorded as the offender.
    pub fn add_report(&self, app: &AppId, reporter: &UserId, text: &str) -> GalleryResult<ReportId> {
        let app = self
            .store
            .get_app(app)?
            .ok_or_else(|| GalleryError::not_found(Entity::App, app))?;
        let report = self.store.create_report(&NewReport {
            app_id: app.id,
            reporter_id: reporter.clone(),
            offender_id: app.developer_id.clone(),
            text: text.to_string(),
        })?;
        info!(report_id = %report.id, app_id = %app.id, reporter = %reporter, "report filed");
        Ok(report.id)
    }

    /// Resolve a report. Returns `false` if the report does not exist or
    /// belongs to another app. Resolving twice keeps the first timestamp.
    pub fn mark_resolved(&self, report: &ReportId, app: &AppId) -> GalleryResult<bool> {
        match self.store.get_report(report)? {
            Some(r) if &r.app_id == app => {
                let resolved = self.store.resolve_report(report, Utc::now())?;
                info!(report_id = %report, resolved_at = ?resolved.resolved_at, "report resolved");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn record_moderation_action(
        &self,
        action: &NewModerationAction,
    ) -> GalleryResult<ModerationAction> {
        let recorded = self.store.append_action(action)?;
        info!(
            report_id = %recorded.report_id,
            action = %recorded.action_type,
            moderator = %recorded.moderator_id,
            "moderation action recorded"
        );
        Ok(recorded)
    }

    pub fn list_moderation_actions(&self, report: &ReportId) -> GalleryResult<Vec<ModerationAction>> {
        Ok(self.store.actions_for(report)?)
    }

    /// Hide an app from listings and search. Returns `false` for an unknown
    /// app. Removing it from the index is best effort; listings filter on
    /// the flag regardless.
    pub fn deactivate_app(&self, app: &AppId) -> GalleryResult<bool> {
        match self.store.set_active(app, false) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        if let Err(e) = self.search.unindex(app) {
            warn!(app_id = %app, error = %e, "unindex after deactivation failed");
        }
        info!(app_id = %app, "app deactivated");
        Ok(true)
    }

    /// `false` for unknown apps.
    pub fn is_active(&self, app: &AppId) -> GalleryResult<bool> {
        Ok(self.store.get_app(app)?.map_or(false, |a| a.active))
    }

    /// Open reports, newest first.
    pub fn recent_reports(&self, start: usize, count: usize) -> GalleryResult<Vec<Report>> {
        Ok(self.store.list_reports(true, start, count)?)
    }

    /// All reports, newest first.
    pub fn all_reports(&self, start: usize, count: usize) -> GalleryResult<Vec<Report>> {
        Ok(self.store.list_reports(false, start, count)?)
    }

    pub fn is_reported_by(&self, app: &AppId, user: &UserId) -> GalleryResult<bool> {
        Ok(self.store.has_reported(app, user)?)
    }
}
