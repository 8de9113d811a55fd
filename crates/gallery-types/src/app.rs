use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AppId, ProjectId, UserId};

/// A published, publicly listable wrapper around a user's project bundle.
///
/// Blob locations are not stored on the record: they are derived from `id`
/// by the gallery's key scheme, so a developer-chosen name can never steer
/// where artifacts land.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryApp {
    pub id: AppId,
    pub project_id: ProjectId,
    /// Name of the source project at publish time; the bundle file name is
    /// derived from it.
    pub project_name: String,
    pub developer_id: UserId,
    pub title: String,
    pub description: String,
    pub more_info: String,
    pub credit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub download_count: u64,
    pub like_count: u64,
    /// Cleared by moderation. Inactive apps are hidden from listings and
    /// search but keep all of their data.
    pub active: bool,
    /// The app this one was remixed from, if any.
    pub attribution_parent: Option<AppId>,
}

impl GalleryApp {
    /// The editable metadata fields of this app.
    pub fn metadata(&self) -> AppMetadata {
        AppMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            more_info: self.more_info.clone(),
            credit: self.credit.clone(),
        }
    }

    /// Returns `true` if this app was remixed from another app.
    pub fn is_remix(&self) -> bool {
        self.attribution_parent.is_some()
    }
}

/// Developer-editable metadata of a gallery app.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub title: String,
    pub description: String,
    pub more_info: String,
    pub credit: String,
}
