//! Navigator Semantic Retrieval
//!
//! Embedding generation, an exact cosine index over the use case records,
//! the on-disk embedding cache with fingerprint invalidation, and the query
//! facade shared by the search API and the assistant.

mod cache;
mod embedding;
mod engine;
mod index;
mod manager;
mod similarity;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cache::{CacheEntry, CacheManifest, CacheStore, Fingerprint};
pub use embedding::{resolve_model, EmbeddingProvider, FastEmbedProvider};
pub use engine::SemanticSearch;
pub use index::{Neighbor, RetrievalIndex};
pub use manager::RetrievalCacheManager;
pub use similarity::normalize;
pub use types::{score_from_distance, CacheState, CacheStatus, ScoredRecord};
