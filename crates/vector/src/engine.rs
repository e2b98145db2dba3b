use navigator_common::{AppConfig, NavigatorError, Result};
use navigator_data::RecordStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider};
use crate::manager::RetrievalCacheManager;
use crate::types::{score_from_distance, CacheStatus, ScoredRecord};

/// Semantic search over the use case records
///
/// One instance per process, shared behind an `Arc`. Calls are blocking:
/// the first one after startup may validate or rebuild the embedding cache
/// while holding the manager lock, and concurrent callers wait for it.
pub struct SemanticSearch {
    store: Arc<RecordStore>,
    manager: Mutex<RetrievalCacheManager>,
    default_top_k: usize,
}

impl SemanticSearch {
    pub fn new(
        store: Arc<RecordStore>,
        provider: Arc<dyn EmbeddingProvider>,
        cache: CacheStore,
        default_top_k: usize,
    ) -> Self {
        let manager = RetrievalCacheManager::new(store.clone(), provider, cache);
        Self {
            store,
            manager: Mutex::new(manager),
            default_top_k: default_top_k.max(1),
        }
    }

    /// Build the facade with the fastembed provider and configured paths
    ///
    /// Never fails: an unusable model surfaces on the first embedding call
    /// and leaves semantic search degraded.
    pub fn from_config(config: &AppConfig, store: Arc<RecordStore>) -> Self {
        let provider = FastEmbedProvider::from_config(config);
        info!(
            "Semantic search using {} (cache: {})",
            provider.model_id(),
            config.cache_dir.display()
        );

        Self::new(
            store,
            Arc::new(provider),
            CacheStore::new(config.cache_paths()),
            config.default_top_k,
        )
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Validate or rebuild the cache now instead of on the first query
    pub fn prepare(&self) -> Result<CacheStatus> {
        let mut manager = self.manager.lock();
        manager.ensure_ready()?;
        Ok(manager.status())
    }

    /// The `k` records nearest to `query`, best first
    ///
    /// Blank queries and `k == 0` return nothing without touching the
    /// embedding model.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredRecord>> {
        let query = query.trim();
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        debug!("Semantic search: {:?} (k={})", query, k);
        let neighbors = self.manager.lock().nearest(query, k)?;

        neighbors
            .into_iter()
            .map(|neighbor| {
                let record = self.store.get(neighbor.position).ok_or_else(|| {
                    NavigatorError::internal(format!(
                        "index position {} outside record store",
                        neighbor.position
                    ))
                })?;
                Ok(ScoredRecord {
                    position: neighbor.position,
                    record: record.clone(),
                    distance: neighbor.distance,
                    score: score_from_distance(neighbor.distance),
                })
            })
            .collect()
    }

    /// [`search`](Self::search) with the configured result count
    pub fn search_default(&self, query: &str) -> Result<Vec<ScoredRecord>> {
        self.search(query, self.default_top_k)
    }

    pub fn status(&self) -> CacheStatus {
        self.manager.lock().status()
    }

    /// Current state without waiting; `None` while a validation or rebuild
    /// holds the manager
    pub fn try_status(&self) -> Option<CacheStatus> {
        self.manager.try_lock().map(|manager| manager.status())
    }

    /// Drop the persisted cache and rebuild it from the record store
    pub fn force_rebuild(&self) -> Result<CacheStatus> {
        let mut manager = self.manager.lock();
        manager.force_rebuild()?;
        Ok(manager.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_records, ConceptEmbedder};
    use crate::types::CacheState;
    use navigator_common::CachePaths;
    use std::path::Path;

    fn facade(dir: &Path, embedder: &Arc<ConceptEmbedder>) -> SemanticSearch {
        SemanticSearch::new(
            Arc::new(RecordStore::from_records(sample_records())),
            embedder.clone(),
            CacheStore::new(CachePaths::in_dir(dir)),
            2,
        )
    }

    #[test]
    fn test_hiring_query_finds_resume_screening() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);

        let results = search.search("employee hiring automation", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, 0);
        assert_eq!(results[0].record.company, "Unilever");
        assert!(results[0].score > 0.5 && results[0].score <= 1.0);
    }

    #[test]
    fn test_self_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);

        for (i, text) in search.store().embedding_texts().iter().enumerate() {
            let results = search.search(text, 1).unwrap();
            assert_eq!(results[0].position, i);
            assert!(results[0].distance < 1e-5);
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);

        let first = search.search("customer retention", 3).unwrap();
        let second = search.search("customer retention", 3).unwrap();
        let positions = |r: &[ScoredRecord]| r.iter().map(|s| (s.position, s.distance)).collect::<Vec<_>>();
        assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn test_k_bounds_and_blank_query() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);

        assert!(search.search("   ", 3).unwrap().is_empty());
        assert!(search.search("churn", 0).unwrap().is_empty());
        assert_eq!(embedder.batch_calls(), 0);

        let all = search.search("churn", 100).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));

        assert_eq!(search.search_default("churn").unwrap().len(), 2);
    }

    #[test]
    fn test_deleted_cache_rebuilds_on_first_search() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        facade(dir.path(), &embedder).prepare().unwrap();

        let paths = CachePaths::in_dir(dir.path());
        std::fs::remove_file(&paths.embeddings).unwrap();
        std::fs::remove_file(&paths.manifest).unwrap();

        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);
        let results = search.search("predictive maintenance", 1).unwrap();
        assert_eq!(results[0].position, 1);

        // One batch for the records, one for the query
        assert_eq!(embedder.batch_calls(), 2);
        assert_eq!(embedder.texts_embedded(), 4);
        assert_eq!(search.status().rebuilds, 1);
        assert!(CacheStore::new(paths).load().unwrap().is_some());
    }

    #[test]
    fn test_degraded_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        embedder.set_failing(true);
        let search = facade(dir.path(), &embedder);

        assert!(search.prepare().unwrap_err().is_semantic_unavailable());
        assert!(search.search("churn", 1).unwrap_err().is_semantic_unavailable());
        assert_eq!(search.status().state, CacheState::Degraded);

        embedder.set_failing(false);
        let status = search.force_rebuild().unwrap();
        assert!(status.semantic_available());
        assert_eq!(search.search("churn", 1).unwrap()[0].position, 2);
    }

    #[test]
    fn test_try_status_does_not_wait() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = facade(dir.path(), &embedder);

        let status = search.try_status().unwrap();
        assert_eq!(status.state, CacheState::Uninitialized);
        assert_eq!(status.records, 3);

        let guard = search.manager.lock();
        assert!(search.try_status().is_none());
        drop(guard);

        search.prepare().unwrap();
        assert_eq!(search.try_status().unwrap().state, CacheState::Ready);
    }

    #[test]
    fn test_concurrent_first_queries_rebuild_once() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ConceptEmbedder::new());
        let search = Arc::new(facade(dir.path(), &embedder));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let search = search.clone();
                std::thread::spawn(move || search.search("hiring", 1).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap()[0].position, 0);
        }

        assert_eq!(search.status().rebuilds, 1);
        assert_eq!(embedder.texts_embedded(), 3 + 4);
    }
}
