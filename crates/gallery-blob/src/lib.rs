//! Blob storage for the app gallery.
//!
//! Bundles and thumbnails are opaque byte blobs addressed by a [`BlobKey`]
//! (bucket plus object name). The metadata store never holds blob bytes; it
//! only derives keys from app ids.
//!
//! # Backends
//!
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsBlobStore`] -- one file per blob under a root directory, written
//!   through a temp file and persisted atomically
//!
//! # Images
//!
//! Image codecs sit behind the [`ImageTransformer`] trait. The crate ships
//! [`RawImageTransformer`], which works on the uncompressed [`RawImage`]
//! format and scales with nearest-neighbour sampling.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod raster;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use key::{BlobKey, BlobOptions, Visibility};
pub use memory::InMemoryBlobStore;
pub use raster::{RawImage, RawImageTransformer};
pub use traits::{BlobStore, Dimensions, ImageTransformer};
