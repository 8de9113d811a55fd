//! Publishing, updating and deleting gallery apps.
//!
//! Each operation is a saga over three stores. The metadata write comes
//! first and is the only step whose failure is returned to the caller; the
//! bundle, thumbnail and search steps are attempted afterwards and their
//! failures are logged and recorded in the [`SagaReport`].

use std::sync::Arc;

use gallery_blob::{BlobOptions, BlobStore};
use gallery_search::{SearchDocument, SearchIndex};
use gallery_store::{Entity, MetadataStore, NewApp};
use gallery_types::{AppId, AppMetadata, GalleryApp, ProjectId, UserId};
use tracing::{debug, error, info, warn};

use crate::config::GalleryConfig;
use crate::error::{GalleryError, GalleryResult};
use crate::exporter::BundleExporter;
use crate::gallery::Collaborators;
use crate::keys::KeyScheme;
use crate::saga::{SagaReport, SagaStep};
use crate::thumbnail::Thumbnailer;

/// Everything needed to publish a project as a new gallery app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishRequest {
    pub project_id: ProjectId,
    pub title: String,
    pub project_name: String,
    pub description: String,
    pub more_info: String,
    pub credit: String,
    pub developer_id: UserId,
}

impl PublishRequest {
    pub fn metadata(&self) -> AppMetadata {
        AppMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            more_info: self.more_info.clone(),
            credit: self.credit.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub app: GalleryApp,
    pub saga: SagaReport,
}

pub struct PublicationCoordinator {
    config: Arc<GalleryConfig>,
    keys: KeyScheme,
    store: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    search: Arc<dyn SearchIndex>,
    exporter: Arc<dyn BundleExporter>,
    thumbnails: Thumbnailer,
}

impl PublicationCoordinator {
    pub fn new(config: Arc<GalleryConfig>, collaborators: &Collaborators) -> Self {
        Self {
            keys: KeyScheme::from_config(&config),
            thumbnails: Thumbnailer::new(
                Arc::clone(&collaborators.images),
                config.thumbnail_max_px,
            ),
            store: Arc::clone(&collaborators.store),
            blobs: Arc::clone(&collaborators.blobs),
            search: Arc::clone(&collaborators.search),
            exporter: Arc::clone(&collaborators.exporter),
            config,
        }
    }

    pub fn keys(&self) -> &KeyScheme {
        &self.keys
    }

    // ---------------------------------------------------------------
    // Publish / update
    // ---------------------------------------------------------------

    /// Create the app record, then export the bundle, copy the staged
    /// thumbnail and index the app. The app is returned as soon as its
    /// record exists.
    pub fn publish(&self, request: &PublishRequest) -> GalleryResult<Published> {
        self.ensure_enabled()?;

        let app = self.store.create_app(&NewApp {
            project_id: request.project_id,
            project_name: request.project_name.clone(),
            developer_id: request.developer_id.clone(),
            metadata: request.metadata(),
        })?;

        let mut saga = SagaReport::new(app.id);
        saga.done(SagaStep::CreateMetadata);
        self.export_bundle(&app, &mut saga);
        self.copy_thumbnail(&app, &mut saga);
        self.index(&app, &mut saga);
        saga.log("publish");

        info!(app_id = %app.id, developer = %app.developer_id, "app published");
        Ok(Published { app, saga })
    }

    /// Write new metadata, re-export the bundle over the old one, reindex,
    /// and copy a fresh thumbnail if `has_new_image`.
    pub fn update(&self, app: &GalleryApp, has_new_image: bool) -> GalleryResult<SagaReport> {
        self.ensure_enabled()?;

        let updated = self.store.update_app_metadata(&app.id, &app.metadata())?;
        let mut saga = SagaReport::new(updated.id);
        saga.done(SagaStep::UpdateMetadata);
        self.export_bundle(&updated, &mut saga);
        self.index(&updated, &mut saga);
        if has_new_image {
            self.copy_thumbnail(&updated, &mut saga);
        }
        saga.log("update");
        Ok(saga)
    }

    /// Write new metadata and reindex. Blobs are left alone.
    pub fn update_metadata(&self, app: &GalleryApp) -> GalleryResult<SagaReport> {
        self.ensure_enabled()?;

        let updated = self.store.update_app_metadata(&app.id, &app.metadata())?;
        let mut saga = SagaReport::new(updated.id);
        saga.done(SagaStep::UpdateMetadata);
        self.index(&updated, &mut saga);
        saga.log("update_metadata");
        Ok(saga)
    }

    /// Re-export the bundle of an existing app from its source project.
    pub fn update_source(&self, id: &AppId) -> GalleryResult<SagaReport> {
        self.ensure_enabled()?;

        let app = self
            .store
            .get_app(id)?
            .ok_or_else(|| GalleryError::not_found(Entity::App, id))?;
        let mut saga = SagaReport::new(app.id);
        self.export_bundle(&app, &mut saga);
        saga.log("update_source");
        Ok(saga)
    }

    // ---------------------------------------------------------------
    // Delete
    // ---------------------------------------------------------------

    /// Remove the record, the index entry and both blobs. Every step is
    /// attempted even if an earlier one failed. A metadata store failure is
    /// returned after the remaining steps ran.
    pub fn delete_app(&self, id: &AppId) -> GalleryResult<SagaReport> {
        let mut saga = SagaReport::new(*id);
        let mut store_failure = None;

        match self.store.delete_app(id) {
            Ok(true) => saga.done(SagaStep::DeleteMetadata),
            Ok(false) => saga.skipped(SagaStep::DeleteMetadata, "no metadata record"),
            Err(e) => {
                error!(app_id = %id, error = %e, "metadata delete failed");
                saga.failed(SagaStep::DeleteMetadata, &e);
                store_failure = Some(e);
            }
        }

        match self.search.unindex(id) {
            Ok(true) => saga.done(SagaStep::UnindexSearch),
            Ok(false) => saga.skipped(SagaStep::UnindexSearch, "not indexed"),
            Err(e) => {
                warn!(app_id = %id, error = %e, "unindex failed");
                saga.failed(SagaStep::UnindexSearch, e);
            }
        }

        for (step, key) in [
            (SagaStep::DeleteBundle, self.keys.source_key(id)),
            (SagaStep::DeleteImage, self.keys.image_key(id)),
        ] {
            match self.blobs.delete(&key) {
                Ok(true) => saga.done(step),
                Ok(false) => saga.skipped(step, "no blob"),
                Err(e) => {
                    warn!(app_id = %id, key = %key, error = %e, "blob delete failed");
                    saga.failed(step, e);
                }
            }
        }

        saga.log("delete");
        match store_failure {
            Some(e) => Err(GalleryError::Store(e)),
            None => Ok(saga),
        }
    }

    // ---------------------------------------------------------------
    // Best-effort steps
    // ---------------------------------------------------------------

    fn export_bundle(&self, app: &GalleryApp, saga: &mut SagaReport) {
        let step = SagaStep::ExportBundle;
        let bundle = match self
            .exporter
            .export(&app.developer_id, app.project_id, &app.project_name)
        {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(app_id = %app.id, project = %app.project_id, error = %e, "bundle export failed");
                saga.failed(step, e);
                return;
            }
        };

        let key = self.keys.source_key(&app.id);
        let options = BlobOptions::new(&self.config.bundle_content_type)
            .with_metadata("title", bundle.file_name.as_str());
        match self.blobs.write(&key, &bundle.bytes, &options) {
            Ok(()) => {
                debug!(app_id = %app.id, key = %key, size = bundle.bytes.len(), "bundle stored");
                saga.done(step);
            }
            Err(e) => {
                warn!(app_id = %app.id, key = %key, error = %e, "bundle write failed");
                saga.failed(step, e);
            }
        }
    }

    fn copy_thumbnail(&self, app: &GalleryApp, saga: &mut SagaReport) {
        let step = SagaStep::CopyThumbnail;
        let staged = self.keys.project_image_key(app.project_id);
        let bytes = match self.blobs.read(&staged) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(app_id = %app.id, key = %staged, "no staged thumbnail");
                saga.skipped(step, "no staged image");
                return;
            }
            Err(e) => {
                warn!(app_id = %app.id, key = %staged, error = %e, "staged thumbnail read failed");
                saga.failed(step, e);
                return;
            }
        };

        let image = match self.thumbnails.prepare(&bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!(app_id = %app.id, error = %e, "thumbnail resize failed");
                saga.failed(step, e);
                return;
            }
        };

        let key = self.keys.image_key(&app.id);
        let options = BlobOptions::new(&self.config.image_content_type);
        match self.blobs.write(&key, &image, &options) {
            Ok(()) => {
                debug!(app_id = %app.id, key = %key, "thumbnail stored");
                saga.done(step);
            }
            Err(e) => {
                warn!(app_id = %app.id, key = %key, error = %e, "thumbnail write failed");
                saga.failed(step, e);
            }
        }
    }

    /// Index an active app. Inactive apps are removed from the index
    /// instead, so an edit never resurfaces a deactivated app.
    fn index(&self, app: &GalleryApp, saga: &mut SagaReport) {
        let step = SagaStep::IndexSearch;
        if !app.active {
            match self.search.unindex(&app.id) {
                Ok(_) => saga.skipped(step, "app is inactive"),
                Err(e) => {
                    warn!(app_id = %app.id, error = %e, "unindex of inactive app failed");
                    saga.failed(step, e);
                }
            }
            return;
        }
        match self.search.index(&SearchDocument::from_app(app)) {
            Ok(()) => saga.done(step),
            Err(e) => {
                warn!(app_id = %app.id, error = %e, "indexing failed");
                saga.failed(step, e);
            }
        }
    }

    fn ensure_enabled(&self) -> GalleryResult<()> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(GalleryError::Disabled)
        }
    }
}

impl std::fmt::Debug for PublicationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationCoordinator")
            .field("enabled", &self.config.enabled)
            .field("keys", &self.keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_blob::{Dimensions, ImageTransformer, RawImage, RawImageTransformer};

    use crate::error::ExportError;
    use crate::exporter::Bundle;
    use crate::gallery::InMemoryBackends;
    use crate::saga::StepOutcome;

    fn enabled_config() -> Arc<GalleryConfig> {
        Arc::new(GalleryConfig {
            enabled: true,
            bucket: "gallery-test".into(),
            ..GalleryConfig::default()
        })
    }

    fn setup() -> (InMemoryBackends, PublicationCoordinator) {
        let backends = InMemoryBackends::new();
        let coordinator = PublicationCoordinator::new(enabled_config(), &backends.collaborators());
        (backends, coordinator)
    }

    fn request(project: u64) -> PublishRequest {
        PublishRequest {
            project_id: ProjectId(project),
            title: "Ball Game".into(),
            project_name: "BallGame".into(),
            description: "Bounce the ball".into(),
            more_info: "https://example.org/ball".into(),
            credit: "tutorial".into(),
            developer_id: "dev".into(),
        }
    }

    // ---------------------------------------------------------------
    // Publish
    // ---------------------------------------------------------------

    #[test]
    fn publish_writes_all_three_stores() {
        let (backends, coordinator) = setup();
        backends
            .exporter
            .insert(&"dev".into(), ProjectId(1), b"PK-bundle".to_vec());
        let staged = coordinator.keys().project_image_key(ProjectId(1));
        backends
            .blobs
            .write(&staged, &RawImage::solid(400, 100, [1, 1, 1]).encode(), &BlobOptions::default())
            .unwrap();

        let published = coordinator.publish(&request(1)).unwrap();
        let app = &published.app;
        assert!(published.saga.is_clean(), "{:?}", published.saga);
        assert_eq!(app.title, "Ball Game");

        let source = coordinator.keys().source_key(&app.id);
        assert_eq!(backends.blobs.read(&source).unwrap().unwrap(), b"PK-bundle");
        let opts = backends.blobs.read_options(&source).unwrap().unwrap();
        assert_eq!(opts.content_type, "application/zip");
        assert_eq!(opts.cache_control, "no-cache");
        assert_eq!(opts.metadata.get("title").map(String::as_str), Some("BallGame.aia"));

        let image = backends
            .blobs
            .read(&coordinator.keys().image_key(&app.id))
            .unwrap()
            .unwrap();
        assert_eq!(
            RawImageTransformer.dimensions(&image).unwrap(),
            Dimensions::new(200, 50)
        );
        assert_eq!(
            backends
                .blobs
                .read_options(&coordinator.keys().image_key(&app.id))
                .unwrap()
                .unwrap()
                .content_type,
            "image/jpeg"
        );

        assert_eq!(backends.search.find("ball", 0, 10).unwrap().ids, vec![app.id]);
    }

    #[test]
    fn missing_staged_image_is_skipped() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(2), vec![1]);
        let published = coordinator.publish(&request(2)).unwrap();
        assert!(published.saga.is_clean());
        assert!(matches!(
            published.saga.outcome(SagaStep::CopyThumbnail),
            Some(StepOutcome::Skipped(_))
        ));
    }

    #[test]
    fn publish_survives_blob_and_index_outages() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(3), vec![1]);
        backends.blobs.set_offline(true);
        backends.search.set_offline(true);

        let published = coordinator.publish(&request(3)).unwrap();
        assert_eq!(published.saga.failures().count(), 3);
        assert!(backends.store.get_app(&published.app.id).unwrap().is_some());
    }

    #[test]
    fn publish_fails_when_metadata_store_is_down() {
        let (backends, coordinator) = setup();
        backends.store.set_offline(true);
        let err = coordinator.publish(&request(4)).unwrap_err();
        assert!(matches!(err, GalleryError::Store(_)));
        backends.store.set_offline(false);
        assert!(backends.blobs.is_empty());
        assert!(backends.search.is_empty().unwrap());
    }

    #[test]
    fn export_failure_is_recorded() {
        let (_backends, coordinator) = setup();
        let published = coordinator.publish(&request(5)).unwrap();
        assert!(matches!(
            published.saga.outcome(SagaStep::ExportBundle),
            Some(StepOutcome::Failed(_))
        ));
    }

    #[test]
    fn disabled_gallery_rejects_publication() {
        let backends = InMemoryBackends::new();
        let coordinator =
            PublicationCoordinator::new(Arc::new(GalleryConfig::default()), &backends.collaborators());
        assert!(matches!(
            coordinator.publish(&request(1)),
            Err(GalleryError::Disabled)
        ));
        assert!(matches!(
            coordinator.update_source(&AppId::new()),
            Err(GalleryError::Disabled)
        ));
        assert!(backends.store.is_empty());
    }

    // ---------------------------------------------------------------
    // Update
    // ---------------------------------------------------------------

    #[test]
    fn update_overwrites_metadata_bundle_and_index() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(1), b"v1".to_vec());
        let mut app = coordinator.publish(&request(1)).unwrap().app;

        backends.exporter.insert(&"dev".into(), ProjectId(1), b"v2".to_vec());
        app.title = "Space Race".into();
        let saga = coordinator.update(&app, false).unwrap();
        assert!(saga.is_clean());
        assert_eq!(saga.outcome(SagaStep::CopyThumbnail), None);

        let stored = backends.store.get_app(&app.id).unwrap().unwrap();
        assert_eq!(stored.title, "Space Race");
        let source = coordinator.keys().source_key(&app.id);
        assert_eq!(backends.blobs.read(&source).unwrap().unwrap(), b"v2");
        assert!(backends.search.find("ball", 0, 10).unwrap().ids.is_empty());
        assert_eq!(backends.search.find("space", 0, 10).unwrap().ids, vec![app.id]);
    }

    #[test]
    fn update_keeps_inactive_app_out_of_index() {
        let (backends, coordinator) = setup();
        let mut app = coordinator.publish(&request(1)).unwrap().app;
        backends.store.set_active(&app.id, false).unwrap();
        backends.search.unindex(&app.id).unwrap();

        app.title = "Ball Game Deluxe".into();
        let saga = coordinator.update(&app, false).unwrap();
        assert!(matches!(
            saga.outcome(SagaStep::IndexSearch),
            Some(StepOutcome::Skipped(_))
        ));
        assert!(!backends.search.contains(&app.id));

        coordinator.update_metadata(&app).unwrap();
        assert!(!backends.search.contains(&app.id));
        assert_eq!(backends.store.get_app(&app.id).unwrap().unwrap().title, "Ball Game Deluxe");
    }

    #[test]
    fn bundle_title_comes_from_exporter() {
        struct NamedExporter;

        impl BundleExporter for NamedExporter {
            fn export(
                &self,
                _developer: &UserId,
                _project: ProjectId,
                _project_name: &str,
            ) -> Result<Bundle, ExportError> {
                Ok(Bundle {
                    file_name: "ball-game-v2.aia".into(),
                    bytes: b"PK".to_vec(),
                })
            }
        }

        let backends = InMemoryBackends::new();
        let mut collaborators = backends.collaborators();
        collaborators.exporter = Arc::new(NamedExporter);
        let coordinator = PublicationCoordinator::new(enabled_config(), &collaborators);

        let app = coordinator.publish(&request(1)).unwrap().app;
        let opts = backends
            .blobs
            .read_options(&coordinator.keys().source_key(&app.id))
            .unwrap()
            .unwrap();
        assert_eq!(opts.metadata.get("title").map(String::as_str), Some("ball-game-v2.aia"));
    }

    #[test]
    fn update_with_new_image_copies_thumbnail() {
        let (backends, coordinator) = setup();
        let app = coordinator.publish(&request(8)).unwrap().app;
        let small = RawImage::solid(50, 50, [2, 2, 2]).encode();
        backends
            .blobs
            .write(&coordinator.keys().project_image_key(ProjectId(8)), &small, &BlobOptions::default())
            .unwrap();

        let saga = coordinator.update(&app, true).unwrap();
        assert_eq!(saga.outcome(SagaStep::CopyThumbnail), Some(&StepOutcome::Done));
        let image = backends
            .blobs
            .read(&coordinator.keys().image_key(&app.id))
            .unwrap()
            .unwrap();
        assert_eq!(image, small);
    }

    #[test]
    fn update_of_missing_app_is_not_found() {
        let (_backends, coordinator) = setup();
        let mut app = coordinator.publish(&request(1)).unwrap().app;
        app.id = AppId::new();
        assert!(coordinator.update(&app, false).unwrap_err().is_not_found());
        assert!(coordinator.update_source(&app.id).unwrap_err().is_not_found());
    }

    #[test]
    fn update_metadata_leaves_blobs() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(1), b"v1".to_vec());
        let mut app = coordinator.publish(&request(1)).unwrap().app;
        backends.exporter.insert(&"dev".into(), ProjectId(1), b"v2".to_vec());

        app.description = "New words".into();
        let saga = coordinator.update_metadata(&app).unwrap();
        assert_eq!(saga.outcome(SagaStep::ExportBundle), None);
        let source = coordinator.keys().source_key(&app.id);
        assert_eq!(backends.blobs.read(&source).unwrap().unwrap(), b"v1");

        let saga = coordinator.update_source(&app.id).unwrap();
        assert_eq!(saga.outcome(SagaStep::ExportBundle), Some(&StepOutcome::Done));
        assert_eq!(backends.blobs.read(&source).unwrap().unwrap(), b"v2");
    }

    // ---------------------------------------------------------------
    // Delete
    // ---------------------------------------------------------------

    #[test]
    fn delete_removes_everything() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(1), vec![1]);
        let app = coordinator.publish(&request(1)).unwrap().app;

        let saga = coordinator.delete_app(&app.id).unwrap();
        assert_eq!(saga.outcome(SagaStep::DeleteMetadata), Some(&StepOutcome::Done));
        assert_eq!(saga.outcome(SagaStep::UnindexSearch), Some(&StepOutcome::Done));
        assert_eq!(saga.outcome(SagaStep::DeleteBundle), Some(&StepOutcome::Done));
        assert!(matches!(
            saga.outcome(SagaStep::DeleteImage),
            Some(StepOutcome::Skipped(_))
        ));
        assert!(backends.store.get_app(&app.id).unwrap().is_none());
        assert!(backends.blobs.is_empty());
        assert!(backends.search.is_empty().unwrap());
    }

    #[test]
    fn delete_continues_past_blob_failure() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(1), vec![1]);
        let app = coordinator.publish(&request(1)).unwrap().app;
        backends.blobs.set_offline(true);

        let saga = coordinator.delete_app(&app.id).unwrap();
        assert!(matches!(
            saga.outcome(SagaStep::DeleteBundle),
            Some(StepOutcome::Failed(_))
        ));
        assert!(backends.store.get_app(&app.id).unwrap().is_none());
        assert!(!backends.search.contains(&app.id));
    }

    #[test]
    fn delete_attempts_cleanup_when_metadata_fails() {
        let (backends, coordinator) = setup();
        backends.exporter.insert(&"dev".into(), ProjectId(1), vec![1]);
        let app = coordinator.publish(&request(1)).unwrap().app;
        backends.store.set_offline(true);

        let err = coordinator.delete_app(&app.id).unwrap_err();
        assert!(matches!(err, GalleryError::Store(_)));
        assert!(!backends.search.contains(&app.id));
        assert!(!backends
            .blobs
            .exists(&coordinator.keys().source_key(&app.id))
            .unwrap());
    }

    #[test]
    fn delete_of_unknown_app_skips_metadata() {
        let (_backends, coordinator) = setup();
        let saga = coordinator.delete_app(&AppId::new()).unwrap();
        assert!(saga.is_clean());
        assert!(matches!(
            saga.outcome(SagaStep::DeleteMetadata),
            Some(StepOutcome::Skipped(_))
        ));
    }
}
