use navigator_common::{NavigatorError, Result};
use navigator_data::RecordStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEntry, CacheStore, Fingerprint};
use crate::embedding::EmbeddingProvider;
use crate::index::{Neighbor, RetrievalIndex};
use crate::types::{CacheState, CacheStatus};

/// Outcome of checking the persisted cache against the record store
enum Validation {
    Missing,
    Stale(String),
    Corrupt(String),
    Valid(RetrievalIndex),
}

/// Owns the retrieval index and keeps it in sync with the record store
///
/// The persisted cache is checked once per process. A missing, stale or
/// corrupt cache triggers a full rebuild; a failed rebuild leaves the
/// manager degraded until [`force_rebuild`](Self::force_rebuild) succeeds.
pub struct RetrievalCacheManager {
    store: Arc<RecordStore>,
    provider: Arc<dyn EmbeddingProvider>,
    cache: CacheStore,
    state: CacheState,
    index: Option<RetrievalIndex>,
    rebuilds: usize,
}

impl RetrievalCacheManager {
    pub fn new(store: Arc<RecordStore>, provider: Arc<dyn EmbeddingProvider>, cache: CacheStore) -> Self {
        Self {
            store,
            provider,
            cache,
            state: CacheState::Uninitialized,
            index: None,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// The loaded index, once READY
    pub fn index(&self) -> Option<&RetrievalIndex> {
        self.index.as_ref()
    }

    pub fn status(&self) -> CacheStatus {
        let index = self.index.as_ref();
        CacheStatus {
            state: self.state,
            records: self.store.count(),
            indexed: index.map_or(0, RetrievalIndex::len),
            dimension: index.filter(|i| !i.is_empty()).map(RetrievalIndex::dimension),
            model: self.provider.model_id().to_string(),
            rebuilds: self.rebuilds,
        }
    }

    fn transition(&mut self, next: CacheState) {
        if self.state != next {
            info!("Retrieval cache: {} -> {}", self.state.as_str(), next.as_str());
            self.state = next;
        }
    }

    /// Validate or rebuild so that queries can be served
    ///
    /// Returns `SemanticSearchUnavailable` when the manager is degraded.
    pub fn ensure_ready(&mut self) -> Result<()> {
        match self.state {
            CacheState::Ready => return Ok(()),
            CacheState::Degraded => {
                return Err(NavigatorError::semantic_unavailable(
                    "retrieval cache is degraded",
                ))
            }
            _ => {}
        }

        self.transition(CacheState::Validating);
        match self.validate() {
            Validation::Valid(index) => {
                self.transition(CacheState::Valid);
                info!(
                    "Embedding cache is valid: {} rows x {} dims",
                    index.len(),
                    index.dimension()
                );
                self.index = Some(index);
                self.transition(CacheState::Ready);
                Ok(())
            }
            Validation::Missing => {
                info!("No embedding cache found, building one");
                self.rebuild()
            }
            Validation::Stale(reason) => {
                warn!("Embedding cache is stale: {}", reason);
                self.rebuild()
            }
            Validation::Corrupt(reason) => {
                warn!("Embedding cache is unusable: {}", reason);
                self.rebuild()
            }
        }
    }

    fn validate(&self) -> Validation {
        let current = Fingerprint::compute(self.provider.model_id(), &self.store.embedding_texts());

        let entry = match self.cache.load() {
            Ok(Some(entry)) => entry,
            Ok(None) => return Validation::Missing,
            Err(e) => return Validation::Corrupt(e.to_string()),
        };

        if let Some(reason) = entry.fingerprint.mismatch(&current) {
            return Validation::Stale(reason);
        }

        match RetrievalIndex::build(&entry.embeddings) {
            Ok(index) => Validation::Valid(index),
            Err(e) => Validation::Corrupt(e.to_string()),
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        self.transition(CacheState::Rebuilding);
        self.index = None;

        let start = Instant::now();
        match self.build_and_persist() {
            Ok(index) => {
                self.rebuilds += 1;
                info!(
                    "Rebuilt embedding cache: {} rows x {} dims in {:.2?}",
                    index.len(),
                    index.dimension(),
                    start.elapsed()
                );
                self.index = Some(index);
                self.transition(CacheState::Ready);
                Ok(())
            }
            Err(e) => {
                error!("Embedding cache rebuild failed: {}", e);
                self.transition(CacheState::Degraded);
                Err(NavigatorError::semantic_unavailable(
                    "embedding cache rebuild failed",
                ))
            }
        }
    }

    fn build_and_persist(&self) -> Result<RetrievalIndex> {
        let texts = self.store.embedding_texts();
        let fingerprint = Fingerprint::compute(self.provider.model_id(), &texts);

        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            debug!("Embedding {} records", texts.len());
            self.provider.embed_batch(&texts)?
        };

        if embeddings.len() != texts.len() {
            return Err(NavigatorError::embedding(format!(
                "provider returned {} embeddings for {} records",
                embeddings.len(),
                texts.len()
            )));
        }

        let index = RetrievalIndex::build(&embeddings)?;
        let entry = CacheEntry {
            fingerprint,
            dimension: index.dimension(),
            embeddings,
        };

        // Serving from memory still works when the cache dir is read-only
        if let Err(e) = self.cache.persist(&entry) {
            warn!("Failed to persist embedding cache: {}", e);
        }

        Ok(index)
    }

    /// Delete the persisted cache and rebuild it
    ///
    /// This is the only way out of degraded state.
    pub fn force_rebuild(&mut self) -> Result<()> {
        info!("Forced embedding cache rebuild requested");
        if let Err(e) = self.cache.clear() {
            warn!("Failed to remove embedding cache: {}", e);
        }
        self.rebuild()
    }

    fn rebuild_after_dimension_mismatch(&mut self, query_dimension: usize) -> Result<()> {
        warn!(
            "Query embedding has dimension {}, index has {}; invalidating cache",
            query_dimension,
            self.index.as_ref().map_or(0, RetrievalIndex::dimension)
        );
        if let Err(e) = self.cache.clear() {
            warn!("Failed to remove embedding cache: {}", e);
        }
        self.rebuild()
    }

    /// Embed `text` and return its `k` nearest records
    ///
    /// A query embedding failure is reported as `SemanticSearchUnavailable`
    /// without changing the cache state.
    pub fn nearest(&mut self, text: &str, k: usize) -> Result<Vec<Neighbor>> {
        self.ensure_ready()?;

        if k == 0 || self.index.as_ref().map_or(true, RetrievalIndex::is_empty) {
            return Ok(Vec::new());
        }

        let vector = self.provider.embed(text).map_err(|e| {
            warn!("Query embedding failed: {}", e);
            NavigatorError::semantic_unavailable("query embedding failed")
        })?;

        let index_dimension = self.index.as_ref().map_or(0, RetrievalIndex::dimension);
        if vector.len() != index_dimension {
            self.rebuild_after_dimension_mismatch(vector.len())?;

            let rebuilt_dimension = self.index.as_ref().map_or(0, RetrievalIndex::dimension);
            if vector.len() != rebuilt_dimension {
                return Err(NavigatorError::semantic_unavailable(
                    "query embedding does not match the index",
                ));
            }
        }

        let index = self
            .index
            .as_ref()
            .ok_or_else(|| NavigatorError::semantic_unavailable("retrieval index not loaded"))?;
        index.query(&vector, k)
    }
}
