//! Insert payloads and listing queries accepted by a [`MetadataStore`].
//!
//! [`MetadataStore`]: crate::MetadataStore

use gallery_types::{ActionType, AppId, AppMetadata, MessageId, ProjectId, ReportId, UserId};

/// Fields supplied when a new app row is created. The store allocates the
/// id and timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewApp {
    pub project_id: ProjectId,
    pub project_name: String,
    pub developer_id: UserId,
    pub metadata: AppMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewReport {
    pub app_id: AppId,
    pub reporter_id: UserId,
    pub offender_id: UserId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewModerationAction {
    pub report_id: ReportId,
    pub app_id: AppId,
    pub message_id: Option<MessageId>,
    pub moderator_id: UserId,
    pub action_type: ActionType,
    pub moderator_name: String,
    pub message_preview: String,
}

/// Sort order of an app listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppOrder {
    /// Most recently created or edited first.
    Recent,
    /// Highest download count first, recency breaking ties.
    MostDownloaded,
}

/// A paginated app listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppQuery {
    pub order: AppOrder,
    pub developer: Option<UserId>,
    /// Drop deactivated apps. Public listings always set this.
    pub active_only: bool,
}

impl AppQuery {
    pub fn recent() -> Self {
        Self {
            order: AppOrder::Recent,
            developer: None,
            active_only: true,
        }
    }

    pub fn most_downloaded() -> Self {
        Self {
            order: AppOrder::MostDownloaded,
            developer: None,
            active_only: true,
        }
    }

    pub fn by_developer(developer: UserId) -> Self {
        Self {
            order: AppOrder::Recent,
            developer: Some(developer),
            active_only: true,
        }
    }

    /// Include deactivated apps as well.
    pub fn including_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }
}
