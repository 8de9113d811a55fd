use chrono::{DateTime, Utc};
use gallery_types::{AppId, GalleryApp, UserId};
use serde::{Deserialize, Serialize};

use crate::tokenize::tokenize;

/// The searchable projection of a gallery app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub app_id: AppId,
    pub title: String,
    pub description: String,
    pub credit: String,
    pub developer_id: UserId,
    /// Orders hits, newest first.
    pub updated_at: DateTime<Utc>,
}

impl SearchDocument {
    pub fn from_app(app: &GalleryApp) -> Self {
        Self {
            app_id: app.id,
            title: app.title.clone(),
            description: app.description.clone(),
            credit: app.credit.clone(),
            developer_id: app.developer_id.clone(),
            updated_at: app.updated_at,
        }
    }

    /// All tokens of the searchable fields.
    pub fn tokens(&self) -> Vec<String> {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.credit.as_str(),
            self.developer_id.as_str(),
        ]
        .into_iter()
        .flat_map(tokenize)
        .collect()
    }
}

impl From<&GalleryApp> for SearchDocument {
    fn from(app: &GalleryApp) -> Self {
        Self::from_app(app)
    }
}
