use actix_web::web;

pub mod assistant;
pub mod cache;
pub mod search;
pub mod system;
pub mod use_cases;

/// Register every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(system::health)
        .service(use_cases::list_use_cases)
        .service(use_cases::get_use_case)
        .service(use_cases::filters)
        .service(search::search)
        .service(search::search_stats)
        .service(cache::rebuild_cache)
        .service(assistant::ask_assistant);
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::web;
    use async_trait::async_trait;
    use navigator_common::{AppConfig, CachePaths, Result};
    use navigator_data::RecordStore;
    use navigator_llm::{Assistant, ChatClient, ChatRequest, OpenRouterClient};
    use navigator_vector::testing::{sample_records, ConceptEmbedder};
    use navigator_vector::{CacheStore, SemanticSearch};
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::state::AppState;

    /// Chat backend that always returns the same answer
    pub struct CannedChat(String);

    impl CannedChat {
        pub fn answering(answer: &str) -> Self {
            Self(answer.to_string())
        }
    }

    #[async_trait]
    impl ChatClient for CannedChat {
        async fn complete(&self, _request: ChatRequest) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// State over the three sample records with a deterministic embedder
    ///
    /// Without a chat backend the assistant has no API key configured.
    pub fn test_state_with(
        chat: Option<CannedChat>,
    ) -> (web::Data<AppState>, Arc<ConceptEmbedder>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cache_dir = dir.path().to_path_buf();

        let embedder = Arc::new(ConceptEmbedder::new());
        let search = Arc::new(SemanticSearch::new(
            Arc::new(RecordStore::from_records(sample_records())),
            embedder.clone(),
            CacheStore::new(CachePaths::in_dir(dir.path())),
            2,
        ));

        let client: Arc<dyn ChatClient> = match chat {
            Some(chat) => Arc::new(chat),
            None => Arc::new(OpenRouterClient::new("http://127.0.0.1:9", None).unwrap()),
        };
        let assistant = Arc::new(Assistant::from_config(client, &config));

        (
            web::Data::new(AppState::new(config, search, assistant)),
            embedder,
            dir,
        )
    }

    pub fn test_state() -> (web::Data<AppState>, TempDir) {
        let (state, _embedder, dir) = test_state_with(None);
        (state, dir)
    }
}
