use serde::{Deserialize, Serialize};

use crate::slug::format_slug;

/// One curated AI adoption case study
///
/// Records are immutable once loaded; their position in the
/// [`RecordStore`](crate::RecordStore) is their identity for the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCaseRecord {
    /// Company name
    pub company: String,

    /// Short title of the use case
    pub use_case_name: String,

    /// Business function (e.g. "Human Resources")
    pub business_function: String,

    /// AI technology family (e.g. "NLP")
    pub ai_type: String,

    /// Reported outcome
    pub outcome: String,

    /// Source URL, empty when unknown
    pub source_link: String,

    /// Slug of `business_function` used for exact-match filtering
    pub business_function_slug: String,

    /// Slug of `ai_type` used for exact-match filtering
    pub ai_type_slug: String,
}

impl UseCaseRecord {
    /// Text fed to the embedding model for this record
    ///
    /// The rule is part of the cache fingerprint: changing it invalidates
    /// every persisted embedding cache.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {} used {} for {}. {}",
            self.use_case_name, self.company, self.ai_type, self.business_function, self.outcome
        )
    }

    /// Source URL, `None` when blank
    pub fn source_url(&self) -> Option<&str> {
        let link = self.source_link.trim();
        (!link.is_empty()).then_some(link)
    }

    /// Display label for the business function slug
    pub fn business_function_label(&self) -> String {
        format_slug(&self.business_function_slug)
    }

    /// Display label for the AI type slug
    pub fn ai_type_label(&self) -> String {
        format_slug(&self.ai_type_slug)
    }
}
