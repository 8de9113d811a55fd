use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::key::{BlobKey, BlobOptions};
use crate::traits::BlobStore;

struct StoredBlob {
    bytes: Vec<u8>,
    options: BlobOptions,
}

/// In-memory blob store backed by a `BTreeMap`.
///
/// Can be switched offline to simulate an unreachable bucket.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<BlobKey, StoredBlob>>,
    offline: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_lock(&self) -> BlobResult<RwLockReadGuard<'_, BTreeMap<BlobKey, StoredBlob>>> {
        self.ensure_online()?;
        self.blobs.read().map_err(|_| BlobError::LockPoisoned)
    }

    fn write_lock(&self) -> BlobResult<RwLockWriteGuard<'_, BTreeMap<BlobKey, StoredBlob>>> {
        self.ensure_online()?;
        self.blobs.write().map_err(|_| BlobError::LockPoisoned)
    }

    fn ensure_online(&self) -> BlobResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("in-memory blob store is offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn write(&self, key: &BlobKey, bytes: &[u8], options: &BlobOptions) -> BlobResult<()> {
        let mut blobs = self.write_lock()?;
        blobs.insert(
            key.clone(),
            StoredBlob {
                bytes: bytes.to_vec(),
                options: options.clone(),
            },
        );
        debug!(key = %key, size = bytes.len(), "blob written");
        Ok(())
    }

    fn read(&self, key: &BlobKey) -> BlobResult<Option<Vec<u8>>> {
        let blobs = self.read_lock()?;
        Ok(blobs.get(key).map(|b| b.bytes.clone()))
    }

    fn read_options(&self, key: &BlobKey) -> BlobResult<Option<BlobOptions>> {
        let blobs = self.read_lock()?;
        Ok(blobs.get(key).map(|b| b.options.clone()))
    }

    fn delete(&self, key: &BlobKey) -> BlobResult<bool> {
        let mut blobs = self.write_lock()?;
        Ok(blobs.remove(key).is_some())
    }

    fn list(&self, bucket: &str, prefix: &str) -> BlobResult<Vec<BlobKey>> {
        let blobs = self.read_lock()?;
        Ok(blobs
            .keys()
            .filter(|k| k.bucket == bucket && k.has_prefix(prefix))
            .cloned()
            .collect())
    }

    fn exists(&self, key: &BlobKey) -> BlobResult<bool> {
        let blobs = self.read_lock()?;
        Ok(blobs.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> BlobKey {
        BlobKey::new("bucket", name)
    }

    #[test]
    fn write_read_overwrite() {
        let store = InMemoryBlobStore::new();
        let k = key("gallery/apps/1/aia");
        store.write(&k, b"one", &BlobOptions::new("application/zip")).unwrap();
        store.write(&k, b"two", &BlobOptions::new("application/zip")).unwrap();
        assert_eq!(store.read(&k).unwrap().as_deref(), Some(&b"two"[..]));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.read_options(&k).unwrap().unwrap().content_type,
            "application/zip"
        );
    }

    #[test]
    fn missing_blob_is_none_and_delete_false() {
        let store = InMemoryBlobStore::new();
        assert!(store.read(&key("nope")).unwrap().is_none());
        assert!(!store.delete(&key("nope")).unwrap());
        assert!(!store.exists(&key("nope")).unwrap());
    }

    #[test]
    fn list_filters_bucket_and_prefix() {
        let store = InMemoryBlobStore::new();
        let opts = BlobOptions::default();
        store.write(&key("gallery/apps/b/aia"), b"", &opts).unwrap();
        store.write(&key("gallery/apps/a/aia"), b"", &opts).unwrap();
        store.write(&key("gallery/projects/1/image"), b"", &opts).unwrap();
        store
            .write(&BlobKey::new("other", "gallery/apps/c/aia"), b"", &opts)
            .unwrap();

        let keys = store.list("bucket", "gallery/apps/").unwrap();
        let names: Vec<_> = keys.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["gallery/apps/a/aia", "gallery/apps/b/aia"]);
    }

    #[test]
    fn offline_store_fails() {
        let store = InMemoryBlobStore::new();
        store.set_offline(true);
        let err = store.write(&key("k"), b"x", &BlobOptions::default()).unwrap_err();
        assert!(matches!(err, BlobError::Unavailable(_)));
        assert!(store.delete(&key("k")).is_err());
        store.set_offline(false);
        assert!(store.is_empty());
    }
}
