use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a blob: a bucket and an object name within it.
///
/// Object names use `/` as a separator, e.g. `gallery/apps/<id>/aia`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlobKey {
    pub bucket: String,
    pub name: String,
}

impl BlobKey {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// Returns `true` if the object name starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({self})")
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.bucket, self.name)
    }
}

/// Who may read a blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    PublicRead,
    Private,
}

/// Options stored alongside a blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobOptions {
    pub content_type: String,
    pub visibility: Visibility,
    pub cache_control: String,
    /// User metadata, e.g. the download file name of a bundle.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl BlobOptions {
    /// Public-read, `no-cache` options with the given content type.
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for BlobOptions {
    fn default() -> Self {
        Self {
            content_type: "application/octet-stream".into(),
            visibility: Visibility::PublicRead,
            cache_control: "no-cache".into(),
            metadata: BTreeMap::new(),
        }
    }
}
