//! File-backed blob store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<bucket>/objects/<name>        blob bytes
//! <root>/<bucket>/options/<name>.json   BlobOptions as JSON
//! ```
//!
//! Every write goes to a temp file in the destination directory which is
//! then persisted over the target, so readers never observe a torn blob.
//! Temp files are removed on drop if the write fails midway.
//!
//! The options sidecar is written before the object. If the object write
//! then fails, the previous sidecar is put back (or removed for a new key)
//! before the error is returned.
//!
//! The empty bucket is stored under `_default`, which is therefore not
//! accepted as a bucket name.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BlobError, BlobResult};
use crate::key::{BlobKey, BlobOptions};
use crate::traits::BlobStore;

const OBJECTS_DIR: &str = "objects";
const OPTIONS_DIR: &str = "options";
const TEMP_PREFIX: &str = ".blob-";
/// Directory name used for the empty bucket.
const DEFAULT_BUCKET_DIR: &str = "_default";

#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> BlobResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> BlobResult<PathBuf> {
        if bucket.is_empty() {
            return Ok(self.root.join(DEFAULT_BUCKET_DIR));
        }
        if bucket == DEFAULT_BUCKET_DIR {
            return Err(BlobError::InvalidKey(format!(
                "bucket name {bucket:?} is reserved"
            )));
        }
        check_component(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, key: &BlobKey) -> BlobResult<PathBuf> {
        let mut path = self.bucket_dir(&key.bucket)?.join(OBJECTS_DIR);
        for part in name_components(&key.name)? {
            path.push(part);
        }
        Ok(path)
    }

    fn options_path(&self, key: &BlobKey) -> BlobResult<PathBuf> {
        let mut path = self.bucket_dir(&key.bucket)?.join(OPTIONS_DIR);
        for part in name_components(&key.name)? {
            path.push(part);
        }
        let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        file_name.push(".json");
        path.set_file_name(file_name);
        Ok(path)
    }
}

impl BlobStore for FsBlobStore {
    fn write(&self, key: &BlobKey, bytes: &[u8], options: &BlobOptions) -> BlobResult<()> {
        let object_path = self.object_path(key)?;
        let options_path = self.options_path(key)?;
        let encoded = serde_json::to_vec_pretty(options)
            .map_err(|e| BlobError::Serialization(e.to_string()))?;

        let previous = read_optional(&options_path)?;
        write_atomic(&options_path, &encoded)?;
        if let Err(e) = write_atomic(&object_path, bytes) {
            let restored = match previous {
                Some(old) => write_atomic(&options_path, &old),
                None => remove_optional(&options_path).map(|_| ()),
            };
            if let Err(restore) = restored {
                warn!(key = %key, error = %restore, "options sidecar left ahead of object");
            }
            return Err(e);
        }
        debug!(key = %key, size = bytes.len(), path = %object_path.display(), "blob written");
        Ok(())
    }

    fn read(&self, key: &BlobKey) -> BlobResult<Option<Vec<u8>>> {
        read_optional(&self.object_path(key)?)
    }

    fn read_options(&self, key: &BlobKey) -> BlobResult<Option<BlobOptions>> {
        match read_optional(&self.options_path(key)?)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| BlobError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &BlobKey) -> BlobResult<bool> {
        let existed = remove_optional(&self.object_path(key)?)?;
        remove_optional(&self.options_path(key)?)?;
        if existed {
            debug!(key = %key, "blob deleted");
        }
        Ok(existed)
    }

    fn list(&self, bucket: &str, prefix: &str) -> BlobResult<Vec<BlobKey>> {
        let objects = self.bucket_dir(bucket)?.join(OBJECTS_DIR);
        if !objects.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&objects).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&objects) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if name.starts_with(prefix) {
                keys.push(BlobKey::new(bucket, name));
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &BlobKey) -> BlobResult<bool> {
        Ok(self.object_path(key)?.is_file())
    }
}

fn check_component(part: &str) -> BlobResult<()> {
    if part.is_empty()
        || part == "."
        || part == ".."
        || part.contains('/')
        || part.contains('\\')
        || part.starts_with(TEMP_PREFIX)
    {
        return Err(BlobError::InvalidKey(format!("bad path component {part:?}")));
    }
    Ok(())
}

fn name_components(name: &str) -> BlobResult<Vec<&str>> {
    if name.is_empty() {
        return Err(BlobError::InvalidKey("empty object name".into()));
    }
    let parts: Vec<&str> = name.split('/').collect();
    for part in &parts {
        check_component(part)?;
    }
    Ok(parts)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> BlobResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| BlobError::InvalidKey(format!("no parent for {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_optional(path: &Path) -> BlobResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_optional(path: &Path) -> BlobResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
