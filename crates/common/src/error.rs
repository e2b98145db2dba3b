/// Navigator error types
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    /// Source dataset missing, unreadable or lacking required columns
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// Embedding model could not be loaded or failed to embed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Persisted cache is unreadable or does not match its own manifest
    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    /// Semantic search cannot serve queries (rebuild failed)
    #[error("Semantic search unavailable: {0}")]
    SemanticSearchUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hosted chat completion error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NavigatorError {
    /// Create data load error
    pub fn data_load<S: Into<String>>(msg: S) -> Self {
        Self::DataLoad(msg.into())
    }

    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create cache corruption error
    pub fn cache_corruption<S: Into<String>>(msg: S) -> Self {
        Self::CacheCorruption(msg.into())
    }

    /// Create semantic search unavailable error
    pub fn semantic_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::SemanticSearchUnavailable(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create LLM error
    pub fn llm<S: Into<String>>(msg: S) -> Self {
        Self::Llm(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the semantic layer is down but keyword search still works
    pub fn is_semantic_unavailable(&self) -> bool {
        matches!(self, Self::SemanticSearchUnavailable(_))
    }
}

// HTTP response conversion
impl NavigatorError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::DataLoad(_) => 500,
            Self::Embedding(_) => 503,
            Self::CacheCorruption(_) => 500,
            Self::SemanticSearchUnavailable(_) => 503,
            Self::Config(_) => 503,
            Self::Internal(_) => 500,
            Self::Llm(_) => 502,
            Self::Network(_) => 503,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Other(_) => 500,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Only the variants that are allowed to reach the user carry their own
    /// text; everything else collapses to a generic message so that file
    /// paths and library internals stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::DataLoad(msg) => format!("The use case dataset could not be loaded: {}", msg),
            Self::SemanticSearchUnavailable(_) | Self::Embedding(_) | Self::CacheCorruption(_) => {
                "Semantic search is temporarily unavailable. Keyword search and filters still work."
                    .to_string()
            }
            Self::InvalidInput(msg) => msg.clone(),
            Self::NotFound(msg) => format!("Not found: {}", msg),
            Self::Config(msg) => msg.clone(),
            Self::Llm(_) | Self::Network(_) => {
                "The AI assistant could not be reached. Please try again later.".to_string()
            }
            Self::Json(_) => "Malformed request body".to_string(),
            Self::Internal(_) | Self::Io(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(NavigatorError::invalid_input("x").status_code(), 400);
        assert_eq!(NavigatorError::not_found("x").status_code(), 404);
        assert_eq!(NavigatorError::semantic_unavailable("x").status_code(), 503);
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = NavigatorError::semantic_unavailable("model weights missing at /root/.cache/x");
        assert!(!err.user_message().contains("/root"));

        let io = NavigatorError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "/srv/data/cache/embeddings.bin",
        ));
        assert_eq!(io.user_message(), "Internal server error");
    }

    #[test]
    fn test_is_semantic_unavailable() {
        assert!(NavigatorError::semantic_unavailable("down").is_semantic_unavailable());
        assert!(!NavigatorError::embedding("down").is_semantic_unavailable());
    }
}
