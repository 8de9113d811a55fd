use std::collections::HashMap;
use std::sync::RwLock;

use gallery_types::{ProjectId, UserId};

use crate::error::ExportError;
use crate::keys::bundle_file_name;

/// An exported project bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Produces the downloadable bundle of a developer's project.
pub trait BundleExporter: Send + Sync {
    fn export(
        &self,
        developer: &UserId,
        project: ProjectId,
        project_name: &str,
    ) -> Result<Bundle, ExportError>;
}

/// Exporter serving pre-registered bundle bytes.
#[derive(Default)]
pub struct InMemoryExporter {
    projects: RwLock<HashMap<(UserId, ProjectId), Vec<u8>>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, developer: &UserId, project: ProjectId, bytes: Vec<u8>) {
        if let Ok(mut projects) = self.projects.write() {
            projects.insert((developer.clone(), project), bytes);
        }
    }

    pub fn remove(&self, developer: &UserId, project: ProjectId) {
        if let Ok(mut projects) = self.projects.write() {
            projects.remove(&(developer.clone(), project));
        }
    }
}

impl BundleExporter for InMemoryExporter {
    fn export(
        &self,
        developer: &UserId,
        project: ProjectId,
        project_name: &str,
    ) -> Result<Bundle, ExportError> {
        let projects = self
            .projects
            .read()
            .map_err(|_| ExportError::Failed("exporter lock poisoned".into()))?;
        let bytes = projects
            .get(&(developer.clone(), project))
            .cloned()
            .ok_or_else(|| ExportError::ProjectNotFound {
                developer: developer.clone(),
                project,
            })?;
        Ok(Bundle {
            file_name: bundle_file_name(project_name),
            bytes,
        })
    }
}

impl std::fmt::Debug for InMemoryExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.projects.read().map(|p| p.len()).unwrap_or(0);
        f.debug_struct("InMemoryExporter")
            .field("projects", &count)
            .finish()
    }
}
