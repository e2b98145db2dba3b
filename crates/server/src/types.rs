use navigator_data::{FilteredRecord, UseCaseRecord};
use navigator_vector::{CacheState, ScoredRecord};
use serde::{Deserialize, Serialize};

/// Use case as rendered by the API
#[derive(Debug, Clone, Serialize)]
pub struct UseCaseItem {
    /// Position in the dataset; stable for the process lifetime
    pub position: usize,
    pub company: String,
    pub use_case_name: String,
    pub business_function: String,
    pub ai_type: String,
    pub outcome: String,
    pub source_link: Option<String>,
    pub business_function_slug: String,
    pub ai_type_slug: String,
    /// Display label derived from the slug
    pub business_function_label: String,
    /// Display label derived from the slug
    pub ai_type_label: String,
}

impl UseCaseItem {
    pub fn new(position: usize, record: &UseCaseRecord) -> Self {
        Self {
            position,
            company: record.company.clone(),
            use_case_name: record.use_case_name.clone(),
            business_function: record.business_function.clone(),
            ai_type: record.ai_type.clone(),
            outcome: record.outcome.clone(),
            source_link: record.source_url().map(str::to_string),
            business_function_slug: record.business_function_slug.clone(),
            ai_type_slug: record.ai_type_slug.clone(),
            business_function_label: record.business_function_label(),
            ai_type_label: record.ai_type_label(),
        }
    }
}

impl From<FilteredRecord<'_>> for UseCaseItem {
    fn from(filtered: FilteredRecord<'_>) -> Self {
        Self::new(filtered.position, filtered.record)
    }
}

/// Filtered listing
#[derive(Debug, Serialize)]
pub struct UseCaseListResponse {
    /// Records in the dataset
    pub total: usize,
    /// Records that passed the filters
    pub count: usize,
    pub items: Vec<UseCaseItem>,
}

/// Semantic search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query text
    #[serde(default)]
    pub q: String,

    /// Top K results; the configured default when absent
    pub top_k: Option<usize>,
}

/// Semantic search hit
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    /// Similarity for display (0.0 - 1.0)
    pub score: f32,
    /// Cosine distance (0.0 - 2.0)
    pub distance: f32,
    #[serde(flatten)]
    pub use_case: UseCaseItem,
}

impl From<ScoredRecord> for SearchResultItem {
    fn from(scored: ScoredRecord) -> Self {
        Self {
            score: scored.score,
            distance: scored.distance,
            use_case: UseCaseItem::new(scored.position, &scored.record),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchResultItem>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
    pub semantic_state: CacheState,
}

/// Assistant request
#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub question: String,

    /// Context size; the configured default when absent
    pub top_k: Option<usize>,
}

/// How the assistant context was retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Semantic,
    Keyword,
    Catalogue,
}

/// Assistant response
#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub answer: String,
    pub model: String,
    pub context_source: ContextSource,
    pub context: Vec<UseCaseItem>,
}
