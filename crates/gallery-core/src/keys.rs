//! Blob key derivation.
//!
//! Every blob key is derived from a stable id, never from a name a developer
//! chose:
//!
//! ```text
//! gallery/apps/<app id>/aia            published bundle
//! gallery/apps/<app id>/image          published thumbnail
//! gallery/projects/<project id>/image  thumbnail staged by the editor
//! ```

use std::str::FromStr;

use gallery_blob::BlobKey;
use gallery_types::{AppId, ProjectId};

use crate::config::GalleryConfig;

pub const APPS_PREFIX: &str = "gallery/apps/";
pub const PROJECTS_PREFIX: &str = "gallery/projects/";
const SOURCE_SUFFIX: &str = "aia";
const IMAGE_SUFFIX: &str = "image";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyScheme {
    bucket: String,
}

impl KeyScheme {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn source_key(&self, app: &AppId) -> BlobKey {
        BlobKey::new(&self.bucket, format!("{APPS_PREFIX}{app}/{SOURCE_SUFFIX}"))
    }

    pub fn image_key(&self, app: &AppId) -> BlobKey {
        BlobKey::new(&self.bucket, format!("{APPS_PREFIX}{app}/{IMAGE_SUFFIX}"))
    }

    pub fn project_image_key(&self, project: ProjectId) -> BlobKey {
        BlobKey::new(
            &self.bucket,
            format!("{PROJECTS_PREFIX}{project}/{IMAGE_SUFFIX}"),
        )
    }

    /// The app a key under [`APPS_PREFIX`] belongs to.
    pub fn app_of(&self, key: &BlobKey) -> Option<AppId> {
        if key.bucket != self.bucket {
            return None;
        }
        let rest = key.name.strip_prefix(APPS_PREFIX)?;
        let (id, _) = rest.split_once('/')?;
        AppId::from_str(id).ok()
    }
}

/// File name a bundle is downloaded as: the project name reduced to
/// filename-safe characters, plus `.aia`.
pub fn bundle_file_name(project_name: &str) -> String {
    format!("{}.aia", normalize_for_filename(project_name))
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn normalize_for_filename(name: &str) -> String {
    let normalized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if normalized.is_empty() {
        "project".into()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_and_distinct() {
        let keys = KeyScheme::new("bucket");
        let app = AppId::new();
        let source = keys.source_key(&app);
        let image = keys.image_key(&app);
        let staged = keys.project_image_key(ProjectId(42));

        assert_eq!(source.bucket, "bucket");
        assert_eq!(source.name, format!("gallery/apps/{app}/aia"));
        assert_eq!(image.name, format!("gallery/apps/{app}/image"));
        assert_eq!(staged.name, "gallery/projects/42/image");
        assert_ne!(source, image);
        assert_ne!(keys.image_key(&AppId::new()), image);
    }

    #[test]
    fn keys_are_deterministic() {
        let keys = KeyScheme::new("b");
        let app = AppId::new();
        assert_eq!(keys.source_key(&app), keys.source_key(&app));
    }

    #[test]
    fn app_of_parses_app_keys_only() {
        let keys = KeyScheme::new("b");
        let app = AppId::new();
        assert_eq!(keys.app_of(&keys.source_key(&app)), Some(app));
        assert_eq!(keys.app_of(&keys.image_key(&app)), Some(app));
        assert_eq!(keys.app_of(&keys.project_image_key(ProjectId(1))), None);
        assert_eq!(keys.app_of(&BlobKey::new("b", "gallery/apps/junk/aia")), None);
        assert_eq!(keys.app_of(&KeyScheme::new("other").source_key(&app)), None);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(bundle_file_name("HelloPurr"), "HelloPurr.aia");
        assert_eq!(bundle_file_name("My Game/../x"), "My_Game_.._x.aia");
        assert_eq!(bundle_file_name("  "), "project.aia");
        assert_eq!(normalize_for_filename("Café"), "Caf_");
    }
}
