//! Deterministic embedding provider for tests
//!
//! Words belonging to a small set of business concepts land on a shared
//! dimension per concept, everything else is hashed into a few buckets.
//! Texts about the same concept therefore end up close in cosine space
//! without downloading a model.

use navigator_common::{NavigatorError, Result};
use navigator_data::{slugify, UseCaseRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::embedding::EmbeddingProvider;

const CONCEPTS: &[&[&str]] = &[
    &[
        "hiring", "hire", "recruit", "recruiting", "recruitment", "resume", "resumes", "employee",
        "employees", "candidate", "candidates", "screening", "talent", "hr", "human", "resources",
    ],
    &[
        "maintenance", "predictive", "equipment", "machine", "downtime", "factory", "manufacturing",
        "cv", "vision", "sensor", "sensors",
    ],
    &[
        "churn", "retention", "telecom", "subscriber", "subscribers", "customer", "customers",
    ],
    &["fraud", "fraudulent", "transaction", "transactions", "banking", "payments", "risk"],
    &["chatbot", "assistant", "support", "conversational", "service", "tickets"],
    &["forecast", "forecasting", "demand", "inventory", "supply", "logistics"],
];

const STOPWORDS: &[&str] = &["a", "an", "and", "by", "for", "in", "of", "the", "to", "used", "with"];

const HASH_BUCKETS: usize = 16;
const CONCEPT_WEIGHT: f32 = 1.0;
const HASH_WEIGHT: f32 = 0.25;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Concept-bucket embedder that counts its calls
pub struct ConceptEmbedder {
    model_id: String,
    padding: usize,
    failing: AtomicBool,
    batch_calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl Default for ConceptEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConceptEmbedder {
    pub fn new() -> Self {
        Self {
            model_id: "concept-test-model".to_string(),
            padding: 0,
            failing: AtomicBool::new(false),
            batch_calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    /// Same embeddings under a different model identifier
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Append `padding` zero dimensions to every vector
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Make every following call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed_batch` calls, single-text embeds included
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Total number of texts embedded
    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    pub fn dimension(&self) -> usize {
        CONCEPTS.len() + HASH_BUCKETS + self.padding
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension()];

        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty() && !STOPWORDS.contains(t));

        for token in tokens {
            match CONCEPTS.iter().position(|words| words.contains(&token)) {
                Some(concept) => vector[concept] += CONCEPT_WEIGHT,
                None => {
                    let bucket = (fnv1a(token) % HASH_BUCKETS as u64) as usize;
                    vector[CONCEPTS.len() + bucket] += HASH_WEIGHT;
                }
            }
        }

        vector
    }
}

impl EmbeddingProvider for ConceptEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(NavigatorError::embedding("test embedder is switched off"));
        }

        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Build a record with derived slugs
pub fn record(
    company: &str,
    use_case_name: &str,
    business_function: &str,
    ai_type: &str,
    outcome: &str,
) -> UseCaseRecord {
    UseCaseRecord {
        company: company.to_string(),
        use_case_name: use_case_name.to_string(),
        business_function: business_function.to_string(),
        ai_type: ai_type.to_string(),
        outcome: outcome.to_string(),
        source_link: String::new(),
        business_function_slug: slugify(business_function),
        ai_type_slug: slugify(ai_type),
    }
}

/// Three clearly separated use cases: hiring, maintenance, churn
pub fn sample_records() -> Vec<UseCaseRecord> {
    vec![
        record(
            "Unilever",
            "Resume screening",
            "HR",
            "NLP",
            "Automated first-round candidate screening",
        ),
        record(
            "Siemens",
            "Predictive maintenance",
            "Manufacturing",
            "Computer Vision",
            "Reduced unplanned equipment downtime",
        ),
        record(
            "Vodafone",
            "Churn prediction",
            "Telecom",
            "Machine Learning",
            "Improved subscriber retention",
        ),
    ]
}
