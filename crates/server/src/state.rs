use navigator_common::{AppConfig, Result};
use navigator_data::RecordStore;
use navigator_llm::{Assistant, ChatClient, OpenRouterClient};
use navigator_vector::SemanticSearch;
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Semantic search facade; owns the record store
    pub search: Arc<SemanticSearch>,

    /// Assistant backed by the hosted chat API
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(config: AppConfig, search: Arc<SemanticSearch>, assistant: Arc<Assistant>) -> Self {
        Self {
            config,
            search,
            assistant,
        }
    }

    /// Load the dataset and wire up the production collaborators
    ///
    /// Fails only when the dataset cannot be loaded; the embedding model is
    /// not touched here.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(RecordStore::load(&config.data_path)?);
        info!("Loaded {} use cases", store.count());

        let search = Arc::new(SemanticSearch::from_config(&config, store));
        let client: Arc<dyn ChatClient> = Arc::new(OpenRouterClient::from_config(&config)?);
        let assistant = Arc::new(Assistant::from_config(client, &config));

        Ok(Self::new(config, search, assistant))
    }

    pub fn store(&self) -> &RecordStore {
        self.search.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use actix_web::{test, web, App};

    const CSV: &str = "company,use_case_name,business_function,ai_type,outcome,source_link\n\
                       Unilever,Resume screening,HR,NLP,Faster hiring,\n\
                       Vodafone,Churn prediction,Telecom,Machine Learning,Lower churn,\n";

    #[actix_web::test]
    async fn test_unknown_embedding_model_keeps_catalogue_up() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("use_cases.csv");
        std::fs::write(&data_path, CSV).unwrap();

        let mut config = AppConfig::default();
        config.data_path = data_path;
        config.cache_dir = dir.path().join("cache");
        config.model_cache_dir = dir.path().join("models");
        config.embedding_model = "no-such-model".to_string();

        let state = web::Data::new(AppState::from_config(config).unwrap());
        assert_eq!(state.store().count(), 2);

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/search?q=hiring").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 503);

        let req = test::TestRequest::get().uri("/use-cases").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);

        let req = test::TestRequest::get().uri("/filters").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["semantic_state"], "degraded");
    }
}
