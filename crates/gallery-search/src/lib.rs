//! Keyword search over published apps.
//!
//! The index is a secondary structure: it may lag behind or disagree with the
//! metadata store, so callers re-check every hit against the store before
//! returning it.
//!
//! # Key Types
//!
//! - [`SearchIndex`] -- The index contract
//! - [`SearchDocument`] -- The searchable projection of an app
//! - [`SearchPage`] -- A page of matching app ids with a total
//! - [`InMemorySearchIndex`] -- Token-set index for tests and embedding

pub mod document;
pub mod error;
pub mod memory;
pub mod tokenize;
pub mod traits;

pub use document::SearchDocument;
pub use error::{SearchError, SearchResult};
pub use memory::InMemorySearchIndex;
pub use tokenize::tokenize;
pub use traits::{SearchIndex, SearchPage};
