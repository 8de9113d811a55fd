//! Manual repair of drift between the metadata store and the secondary
//! stores.
//!
//! Deletes and publishes only guarantee the metadata write. A failed blob
//! delete leaves an orphaned bundle or thumbnail behind and a failed index
//! write leaves the index stale. [`Reconciler::sweep`] fixes both. It is
//! idempotent and never runs on a request path.

use std::sync::Arc;

use gallery_blob::{BlobKey, BlobStore};
use gallery_search::SearchIndex;
use gallery_store::MetadataStore;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{reindex_apps, ReindexReport};
use crate::error::GalleryResult;
use crate::keys::{KeyScheme, APPS_PREFIX};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Blobs removed because their app no longer exists.
    pub orphans_deleted: Vec<BlobKey>,
    /// Orphans whose delete failed; a later sweep retries them.
    pub orphans_failed: usize,
    pub reindex: ReindexReport,
}

pub struct Reconciler {
    keys: KeyScheme,
    store: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    search: Arc<dyn SearchIndex>,
}

impl Reconciler {
    pub fn new(
        keys: KeyScheme,
        store: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        search: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            keys,
            store,
            blobs,
            search,
        }
    }

    pub fn sweep(&self) -> GalleryResult<SweepReport> {
        let mut report = SweepReport::default();

        for key in self.blobs.list(self.keys.bucket(), APPS_PREFIX)? {
            let Some(app) = self.keys.app_of(&key) else {
                warn!(key = %key, "unrecognized blob under the apps prefix");
                continue;
            };
            if self.store.get_app(&app)?.is_some() {
                continue;
            }
            match self.blobs.delete(&key) {
                Ok(_) => report.orphans_deleted.push(key),
                Err(e) => {
                    warn!(key = %key, error = %e, "orphan delete failed");
                    report.orphans_failed += 1;
                }
            }
        }

        report.reindex = reindex_apps(self.store.as_ref(), self.search.as_ref(), usize::MAX)?;

        info!(
            orphans = report.orphans_deleted.len(),
            orphans_failed = report.orphans_failed,
            indexed = report.reindex.indexed,
            unindexed = report.reindex.unindexed,
            "sweep complete"
        );
        Ok(report)
    }
}
