use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Gallery configuration, read once at startup.
///
/// ```toml
/// enabled = true
/// bucket = "gallery-bucket"
/// thumbnail_max_px = 200
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Feature switch for publishing. Reads, deletes and moderation work
    /// either way.
    pub enabled: bool,
    /// Bucket holding bundles and thumbnails.
    pub bucket: String,
    /// Longest allowed thumbnail side in pixels.
    pub thumbnail_max_px: u32,
    pub bundle_content_type: String,
    pub image_content_type: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket: String::new(),
            thumbnail_max_px: 200,
            bundle_content_type: "application/zip".into(),
            image_content_type: "image/jpeg".into(),
        }
    }
}

impl GalleryConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), enabled = config.enabled, "gallery config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail_max_px == 0 {
            return Err(ConfigError::Invalid("thumbnail_max_px must be positive".into()));
        }
        if self.enabled && self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "bucket must be set when the gallery is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> GallerySettings {
        GallerySettings {
            enabled: self.enabled,
            bucket: self.bucket.clone(),
        }
    }
}

/// The part of the configuration clients may see.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GallerySettings {
    pub enabled: bool,
    pub bucket: String,
}
