use crate::error::BlobResult;
use crate::key::{BlobKey, BlobOptions};

/// Object storage for bundles and thumbnails.
///
/// Writes overwrite. Reads and deletes of a missing blob are not errors:
/// `read` returns `Ok(None)` and `delete` returns `Ok(false)`.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `key`, replacing any existing blob and its options.
    fn write(&self, key: &BlobKey, bytes: &[u8], options: &BlobOptions) -> BlobResult<()>;

    fn read(&self, key: &BlobKey) -> BlobResult<Option<Vec<u8>>>;

    /// Options the blob was written with.
    fn read_options(&self, key: &BlobKey) -> BlobResult<Option<BlobOptions>>;

    /// Remove a blob. Returns `true` if it existed.
    fn delete(&self, key: &BlobKey) -> BlobResult<bool>;

    /// Keys in `bucket` whose name starts with `prefix`, sorted by name.
    fn list(&self, bucket: &str, prefix: &str) -> BlobResult<Vec<BlobKey>>;

    fn exists(&self, key: &BlobKey) -> BlobResult<bool> {
        Ok(self.read(key)?.is_some())
    }
}

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn larger_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Image decoding and scaling. Callers decide when and to what size.
pub trait ImageTransformer: Send + Sync {
    fn dimensions(&self, bytes: &[u8]) -> BlobResult<Dimensions>;

    /// Scale the image to exactly `target`.
    fn resize(&self, bytes: &[u8], target: Dimensions) -> BlobResult<Vec<u8>>;
}
