use gallery_types::AppId;

use crate::document::SearchDocument;
use crate::error::SearchResult;

/// A page of search hits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Matching app ids, best first.
    pub ids: Vec<AppId>,
    /// Total number of matches, across all pages.
    pub total: u64,
}

/// Keyword index over gallery apps.
///
/// Indexing an app that is already present replaces its document.
pub trait SearchIndex: Send + Sync {
    fn index(&self, doc: &SearchDocument) -> SearchResult<()>;

    /// Remove an app. Returns `true` if it was indexed.
    fn unindex(&self, id: &AppId) -> SearchResult<bool>;

    /// Apps matching every keyword in `keywords`, paged.
    fn find(&self, keywords: &str, start: usize, count: usize) -> SearchResult<SearchPage>;

    /// Number of indexed documents.
    fn len(&self) -> SearchResult<usize>;

    fn is_empty(&self) -> SearchResult<bool> {
        Ok(self.len()? == 0)
    }
}
