use std::sync::Arc;

use gallery_blob::{BlobStore, ImageTransformer, InMemoryBlobStore, RawImageTransformer};
use gallery_search::{InMemorySearchIndex, SearchIndex};
use gallery_store::{InMemoryMetadataStore, MetadataStore};
use tracing::info;

use crate::attribution::AttributionGraph;
use crate::catalog::Catalog;
use crate::config::{GalleryConfig, GallerySettings};
use crate::error::GalleryResult;
use crate::exporter::{BundleExporter, InMemoryExporter};
use crate::keys::KeyScheme;
use crate::mailbox::Mailbox;
use crate::moderation::ModerationEngine;
use crate::publication::PublicationCoordinator;
use crate::reconcile::Reconciler;
use crate::social::Social;

/// The external systems the gallery coordinates.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn MetadataStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub search: Arc<dyn SearchIndex>,
    pub exporter: Arc<dyn BundleExporter>,
    pub images: Arc<dyn ImageTransformer>,
}

/// In-memory backends with their concrete types kept, so callers can seed
/// data and inject faults.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackends {
    pub store: Arc<InMemoryMetadataStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub search: Arc<InMemorySearchIndex>,
    pub exporter: Arc<InMemoryExporter>,
}

impl InMemoryBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trait-object handles to these backends, with the raw raster
    /// transformer for thumbnails.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            blobs: self.blobs.clone(),
            search: self.search.clone(),
            exporter: self.exporter.clone(),
            images: Arc::new(RawImageTransformer),
        }
    }
}

/// High-level gallery API: every component wired to one set of
/// collaborators and one configuration.
pub struct Gallery {
    config: Arc<GalleryConfig>,
    publication: PublicationCoordinator,
    moderation: ModerationEngine,
    attribution: AttributionGraph,
    mailbox: Mailbox,
    catalog: Catalog,
    social: Social,
    reconciler: Reconciler,
}

impl Gallery {
    /// Validate `config` and wire the components.
    pub fn new(config: GalleryConfig, collaborators: Collaborators) -> GalleryResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let keys = KeyScheme::from_config(&config);

        let gallery = Self {
            publication: PublicationCoordinator::new(Arc::clone(&config), &collaborators),
            moderation: ModerationEngine::new(
                Arc::clone(&collaborators.store),
                Arc::clone(&collaborators.search),
            ),
            attribution: AttributionGraph::new(Arc::clone(&collaborators.store)),
            mailbox: Mailbox::new(Arc::clone(&collaborators.store)),
            catalog: Catalog::new(
                Arc::clone(&collaborators.store),
                Arc::clone(&collaborators.search),
            ),
            social: Social::new(Arc::clone(&collaborators.store)),
            reconciler: Reconciler::new(
                keys,
                Arc::clone(&collaborators.store),
                Arc::clone(&collaborators.blobs),
                Arc::clone(&collaborators.search),
            ),
            config,
        };
        info!(
            enabled = gallery.config.enabled,
            bucket = %gallery.config.bucket,
            "gallery initialized"
        );
        Ok(gallery)
    }

    /// A gallery over fresh in-memory backends.
    pub fn in_memory(config: GalleryConfig) -> GalleryResult<(Self, InMemoryBackends)> {
        let backends = InMemoryBackends::new();
        let gallery = Self::new(config, backends.collaborators())?;
        Ok((gallery, backends))
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn settings(&self) -> GallerySettings {
        self.config.settings()
    }

    pub fn publication(&self) -> &PublicationCoordinator {
        &self.publication
    }

    pub fn moderation(&self) -> &ModerationEngine {
        &self.moderation
    }

    pub fn attribution(&self) -> &AttributionGraph {
        &self.attribution
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn social(&self) -> &Social {
        &self.social
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
