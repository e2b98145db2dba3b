use navigator_data::UseCaseRecord;
use serde::Serialize;

/// Semantic search hit
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    /// Position of the record in the store
    pub position: usize,

    /// The matched record
    pub record: UseCaseRecord,

    /// Cosine distance to the query (0.0 to 2.0)
    pub distance: f32,

    /// Similarity score for display (0.0 to 1.0)
    pub score: f32,
}

/// Map a cosine distance in `[0, 2]` onto a `[0, 1]` score
pub fn score_from_distance(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

/// Lifecycle of the retrieval cache within one process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Nothing checked yet
    Uninitialized,
    /// Reading and checking the persisted cache
    Validating,
    /// Persisted cache matches the record store
    Valid,
    /// Embedding every record and writing a fresh cache
    Rebuilding,
    /// Index loaded, queries are served
    Ready,
    /// Rebuild failed; only keyword search and filters work
    Degraded,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Validating => "validating",
            Self::Valid => "valid",
            Self::Rebuilding => "rebuilding",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        }
    }
}

/// Snapshot of the retrieval cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub state: CacheState,

    /// Records in the store
    pub records: usize,

    /// Records in the loaded index
    pub indexed: usize,

    /// Embedding dimension of the loaded index
    pub dimension: Option<usize>,

    /// Embedding model identifier
    pub model: String,

    /// Full rebuilds performed by this process
    pub rebuilds: usize,
}

impl CacheStatus {
    pub fn semantic_available(&self) -> bool {
        self.state == CacheState::Ready
    }
}
