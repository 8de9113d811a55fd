//! Token-set search index held in memory.
//!
//! Each document is reduced to the set of its tokens. A query matches a
//! document when every query token is a prefix of at least one document
//! token, so `ball` finds "Balloon Pop". Hits are ordered by the document's
//! `updated_at`, newest first.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use gallery_types::AppId;
use tracing::debug;

use crate::document::SearchDocument;
use crate::error::{SearchError, SearchResult};
use crate::tokenize::tokenize;
use crate::traits::{SearchIndex, SearchPage};

struct IndexedDoc {
    doc: SearchDocument,
    tokens: BTreeSet<String>,
}

impl IndexedDoc {
    fn matches(&self, query: &[String]) -> bool {
        query.iter().all(|q| {
            self.tokens
                .range(q.clone()..)
                .next()
                .map_or(false, |t| t.starts_with(q.as_str()))
        })
    }
}

pub struct InMemorySearchIndex {
    docs: RwLock<HashMap<AppId, IndexedDoc>>,
    offline: AtomicBool,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate the index becoming unreachable (or recovering).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns `true` if `id` is indexed. Ignores the offline switch.
    pub fn contains(&self, id: &AppId) -> bool {
        self.docs
            .read()
            .map(|docs| docs.contains_key(id))
            .unwrap_or(false)
    }

    fn read(&self) -> SearchResult<RwLockReadGuard<'_, HashMap<AppId, IndexedDoc>>> {
        self.ensure_online()?;
        self.docs.read().map_err(|_| SearchError::LockPoisoned)
    }

    fn write(&self) -> SearchResult<RwLockWriteGuard<'_, HashMap<AppId, IndexedDoc>>> {
        self.ensure_online()?;
        self.docs.write().map_err(|_| SearchError::LockPoisoned)
    }

    fn ensure_online(&self) -> SearchResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SearchError::Unavailable("in-memory index is offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemorySearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex for InMemorySearchIndex {
    fn index(&self, doc: &SearchDocument) -> SearchResult<()> {
        let tokens = doc.tokens().into_iter().collect();
        let mut docs = self.write()?;
        docs.insert(
            doc.app_id,
            IndexedDoc {
                doc: doc.clone(),
                tokens,
            },
        );
        debug!(app_id = %doc.app_id, "document indexed");
        Ok(())
    }

    fn unindex(&self, id: &AppId) -> SearchResult<bool> {
        let mut docs = self.write()?;
        Ok(docs.remove(id).is_some())
    }

    fn find(&self, keywords: &str, start: usize, count: usize) -> SearchResult<SearchPage> {
        let query = tokenize(keywords);
        if query.is_empty() {
            return Ok(SearchPage::default());
        }

        let docs = self.read()?;
        let mut hits: Vec<&SearchDocument> = docs
            .values()
            .filter(|d| d.matches(&query))
            .map(|d| &d.doc)
            .collect();
        hits.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.app_id.cmp(&a.app_id))
        });

        Ok(SearchPage {
            total: hits.len() as u64,
            ids: hits.into_iter().skip(start).take(count).map(|d| d.app_id).collect(),
        })
    }

    fn len(&self) -> SearchResult<usize> {
        Ok(self.read()?.len())
    }
}

impl std::fmt::Debug for InMemorySearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.docs.read().map(|d| d.len()).unwrap_or(0);
        f.debug_struct("InMemorySearchIndex")
            .field("documents", &count)
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn doc(title: &str, minutes_ago: i64) -> SearchDocument {
        SearchDocument {
            app_id: AppId::new(),
            title: title.into(),
            description: String::new(),
            credit: String::new(),
            developer_id: "dev".into(),
            updated_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    // ---------------------------------------------------------------
    // Matching
    // ---------------------------------------------------------------

    #[test]
    fn all_keywords_must_match() {
        let index = InMemorySearchIndex::new();
        let ball = doc("Ball Game", 0);
        let other = doc("Ball Tracker", 0);
        index.index(&ball).unwrap();
        index.index(&other).unwrap();

        let page = index.find("ball game", 0, 10).unwrap();
        assert_eq!(page.ids, vec![ball.app_id]);
        assert_eq!(index.find("ball", 0, 10).unwrap().total, 2);
    }

    #[test]
    fn keywords_match_token_prefixes_case_insensitively() {
        let index = InMemorySearchIndex::new();
        let d = doc("Balloon Pop", 0);
        index.index(&d).unwrap();
        assert_eq!(index.find("BALL", 0, 10).unwrap().ids, vec![d.app_id]);
        assert!(index.find("loon", 0, 10).unwrap().ids.is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        let index = InMemorySearchIndex::new();
        index.index(&doc("Anything", 0)).unwrap();
        assert_eq!(index.find("  ", 0, 10).unwrap(), SearchPage::default());
    }

    #[test]
    fn hits_are_newest_first_and_paged() {
        let index = InMemorySearchIndex::new();
        let old = doc("Quiz old", 30);
        let mid = doc("Quiz mid", 20);
        let new = doc("Quiz new", 10);
        for d in [&mid, &old, &new] {
            index.index(d).unwrap();
        }
        let page = index.find("quiz", 0, 10).unwrap();
        assert_eq!(page.ids, vec![new.app_id, mid.app_id, old.app_id]);

        let second = index.find("quiz", 1, 1).unwrap();
        assert_eq!(second.ids, vec![mid.app_id]);
        assert_eq!(second.total, 3);
    }

    // ---------------------------------------------------------------
    // Maintenance
    // ---------------------------------------------------------------

    #[test]
    fn reindex_replaces_document() {
        let index = InMemorySearchIndex::new();
        let mut d = doc("Old Title", 0);
        index.index(&d).unwrap();
        d.title = "New Title".into();
        index.index(&d).unwrap();

        assert_eq!(index.len().unwrap(), 1);
        assert!(index.find("old", 0, 10).unwrap().ids.is_empty());
        assert_eq!(index.find("new", 0, 10).unwrap().ids, vec![d.app_id]);
    }

    #[test]
    fn unindex_reports_presence() {
        let index = InMemorySearchIndex::new();
        let d = doc("Gone", 0);
        index.index(&d).unwrap();
        assert!(index.unindex(&d.app_id).unwrap());
        assert!(!index.unindex(&d.app_id).unwrap());
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn offline_index_fails_but_keeps_documents() {
        let index = InMemorySearchIndex::new();
        let d = doc("Kept", 0);
        index.index(&d).unwrap();
        index.set_offline(true);
        assert!(matches!(
            index.find("kept", 0, 10).unwrap_err(),
            SearchError::Unavailable(_)
        ));
        assert!(index.unindex(&d.app_id).is_err());
        assert!(index.contains(&d.app_id));
    }
}
