//! Read side of the gallery: lookups, listings, keyword search.
//!
//! The search index can be stale. Every hit is re-read from the metadata
//! store and dropped if the app is gone or inactive, so deleted and
//! deactivated apps never surface regardless of index state.

use std::sync::Arc;

use gallery_search::{SearchDocument, SearchIndex};
use gallery_store::{AppQuery, Entity, MetadataStore};
use gallery_types::{AppId, GalleryApp, Page, UserId};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{GalleryError, GalleryResult};

/// Index hits fetched per round trip while filtering search results.
const SCAN_BATCH: usize = 100;

/// Outcome of a bulk reindex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub indexed: usize,
    pub unindexed: usize,
    pub failed: usize,
}

pub struct Catalog {
    store: Arc<dyn MetadataStore>,
    search: Arc<dyn SearchIndex>,
}

impl Catalog {
    pub fn new(store: Arc<dyn MetadataStore>, search: Arc<dyn SearchIndex>) -> Self {
        Self { store, search }
    }

    /// Look up an app by id, active or not.
    pub fn get_app(&self, id: &AppId) -> GalleryResult<GalleryApp> {
        self.store
            .get_app(id)?
            .ok_or_else(|| GalleryError::not_found(Entity::App, id))
    }

    pub fn recent_apps(&self, start: usize, count: usize) -> GalleryResult<Page<GalleryApp>> {
        Ok(self.store.list_apps(&AppQuery::recent(), start, count)?)
    }

    pub fn most_downloaded_apps(
        &self,
        start: usize,
        count: usize,
    ) -> GalleryResult<Page<GalleryApp>> {
        Ok(self.store.list_apps(&AppQuery::most_downloaded(), start, count)?)
    }

    pub fn developer_apps(
        &self,
        developer: &UserId,
        start: usize,
        count: usize,
    ) -> GalleryResult<Page<GalleryApp>> {
        let query = AppQuery::by_developer(developer.clone());
        Ok(self.store.list_apps(&query, start, count)?)
    }

    /// Number of active apps.
    pub fn num_apps(&self) -> GalleryResult<u64> {
        Ok(self.store.count_apps(true)?)
    }

    /// Active apps matching all `keywords`, in index order.
    ///
    /// Hits are checked against the store only until the requested page is
    /// filled. `total` is exact once the scan reaches the last hit. A scan
    /// that stops early still counts the unchecked hits, so `total` is then
    /// an upper bound.
    pub fn find_apps(
        &self,
        keywords: &str,
        start: usize,
        count: usize,
    ) -> GalleryResult<Page<GalleryApp>> {
        let wanted = start.saturating_add(count);
        let mut visible = Vec::new();
        let mut hidden = 0u64;
        let mut total: u64;
        let mut offset = 0;

        'scan: loop {
            let hits = self.search.find(keywords, offset, SCAN_BATCH)?;
            total = hits.total;
            for id in &hits.ids {
                if visible.len() >= wanted {
                    break 'scan;
                }
                match self.store.get_app(id)? {
                    Some(app) if app.active => visible.push(app),
                    _ => hidden += 1,
                }
            }
            offset += hits.ids.len();
            if hits.ids.is_empty() || offset as u64 >= hits.total || visible.len() >= wanted {
                break;
            }
        }

        let items = visible.into_iter().skip(start).take(count).collect();
        Ok(Page::new(items, total.saturating_sub(hidden)))
    }

    /// Rebuild index entries for up to `limit` apps, most recent first.
    /// Active apps are indexed, inactive ones removed.
    pub fn reindex_all(&self, limit: usize) -> GalleryResult<ReindexReport> {
        let report = reindex_apps(self.store.as_ref(), self.search.as_ref(), limit)?;
        info!(
            indexed = report.indexed,
            unindexed = report.unindexed,
            failed = report.failed,
            "reindex complete"
        );
        Ok(report)
    }
}

/// Walk the metadata store and bring the index in line with it. Index
/// failures are counted; store failures abort.
pub(crate) fn reindex_apps(
    store: &dyn MetadataStore,
    search: &dyn SearchIndex,
    limit: usize,
) -> GalleryResult<ReindexReport> {
    let query = AppQuery::recent().including_inactive();
    let mut report = ReindexReport::default();
    let mut start = 0;

    while start < limit {
        let batch = SCAN_BATCH.min(limit - start);
        let page = store.list_apps(&query, start, batch)?;
        if page.is_empty() {
            break;
        }
        start += page.len();
        for app in &page.items {
            let result = if app.active {
                search.index(&SearchDocument::from_app(app)).map(|()| true)
            } else {
                search.unindex(&app.id).map(|_| false)
            };
            match result {
                Ok(true) => report.indexed += 1,
                Ok(false) => report.unindexed += 1,
                Err(e) => {
                    warn!(app_id = %app.id, error = %e, "reindex of app failed");
                    report.failed += 1;
                }
            }
        }
    }
    Ok(report)
}
