use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use navigator_common::{AppConfig, NavigatorError, Result};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Turns text into fixed-length vectors
///
/// Implementations are pure functions of their input once loaded: the same
/// text always yields the same vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the underlying model; part of the cache fingerprint
    fn model_id(&self) -> &str;

    /// Embed every text, preserving length and order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| NavigatorError::embedding("model returned no embedding"))
    }
}

/// Resolve a configured model identifier to a fastembed model
///
/// Accepts the short name (`all-MiniLM-L6-v2`), the full model code
/// (`sentence-transformers/all-MiniLM-L6-v2`) or the enum name
/// (`AllMiniLML6V2`), case-insensitively.
pub fn resolve_model(model_id: &str) -> Result<EmbeddingModel> {
    let wanted = model_id.trim().to_lowercase();

    TextEmbedding::list_supported_models()
        .into_iter()
        .find(|info| {
            let code = info.model_code.to_lowercase();
            code == wanted
                || code.rsplit('/').next() == Some(wanted.as_str())
                || format!("{:?}", info.model).to_lowercase() == wanted
        })
        .map(|info| info.model)
        .ok_or_else(|| {
            NavigatorError::embedding(format!("unsupported embedding model '{}'", model_id))
        })
}

/// Sentence embeddings computed locally with fastembed (ONNX runtime)
///
/// The model id is resolved and the model downloaded/loaded on the first
/// embedding call, then kept for the lifetime of the process. A failed load
/// (including an unknown model id) is retried on the next call.
pub struct FastEmbedProvider {
    model_id: String,
    cache_dir: PathBuf,
    batch_size: usize,
    loaded: Mutex<Option<TextEmbedding>>,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_id", &self.model_id)
            .field("cache_dir", &self.cache_dir)
            .field("batch_size", &self.batch_size)
            .field("loaded", &self.loaded.lock().is_some())
            .finish()
    }
}

impl FastEmbedProvider {
    /// Create a provider; does not touch the model yet
    pub fn new(model_id: impl Into<String>, cache_dir: PathBuf, batch_size: usize) -> Self {
        Self {
            model_id: model_id.into(),
            cache_dir,
            batch_size: batch_size.max(1),
            loaded: Mutex::new(None),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.embedding_model.clone(),
            config.model_cache_dir.clone(),
            config.embed_batch_size,
        )
    }

    fn load_model(&self) -> Result<TextEmbedding> {
        let model = resolve_model(&self.model_id)?;
        let has_cached_model = self.cache_dir.exists()
            && self
                .cache_dir
                .read_dir()
                .is_ok_and(|mut entries| entries.next().is_some());

        if has_cached_model {
            info!("Loading embedding model {} from cache", self.model_id);
        } else {
            info!("Downloading embedding model {} (first time only)", self.model_id);
        }

        let start = Instant::now();
        let model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(self.cache_dir.clone())
                .with_show_download_progress(!has_cached_model),
        )
        .map_err(|e| NavigatorError::embedding(format!("failed to load model: {}", e)))?;

        info!(
            "Embedding model {} ready in {:.2?}",
            self.model_id,
            start.elapsed()
        );
        Ok(model)
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.loaded.lock();
        if guard.is_none() {
            *guard = Some(self.load_model()?);
        }
        let model = guard
            .as_mut()
            .ok_or_else(|| NavigatorError::internal("embedding model slot empty after load"))?;

        debug!("Embedding {} texts (batch size {})", texts.len(), self.batch_size);
        let embeddings = model
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| NavigatorError::embedding(format!("failed to generate embeddings: {}", e)))?;

        if embeddings.len() != texts.len() {
            return Err(NavigatorError::embedding(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(embeddings)
    }
}
