//! Remix lineage between gallery apps.
//!
//! Each app names at most one parent, so the lineage is a forest. Writes
//! that would make an app its own ancestor are rejected.

use std::sync::Arc;

use gallery_store::MetadataStore;
use gallery_types::{AppId, GalleryApp};
use tracing::info;

use crate::error::{AttributionError, GalleryResult};

pub struct AttributionGraph {
    store: Arc<dyn MetadataStore>,
}

impl AttributionGraph {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Record that `child` was remixed from `parent`, replacing any earlier
    /// parent. The cycle check runs inside the store together with the
    /// write, so concurrent opposite links cannot both succeed.
    pub fn save_attribution(&self, child: &AppId, parent: &AppId) -> GalleryResult<()> {
        if child == parent {
            return Err(AttributionError::SelfReference(*child).into());
        }
        self.store.link_attribution(child, parent)?;
        info!(child = %child, parent = %parent, "attribution saved");
        Ok(())
    }

    /// The app `app` was remixed from. `None` for originals and unknown apps.
    pub fn remixed_from(&self, app: &AppId) -> GalleryResult<Option<AppId>> {
        Ok(self
            .store
            .get_app(app)?
            .and_then(|a| a.attribution_parent))
    }

    /// Active apps remixed from `app`.
    pub fn remixed_to(&self, app: &AppId) -> GalleryResult<Vec<GalleryApp>> {
        let mut children = self.store.children_of(app)?;
        children.retain(|c| c.active);
        Ok(children)
    }
}
