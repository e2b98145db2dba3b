use actix_web::{post, web, HttpResponse};
use navigator_common::NavigatorError;
use navigator_data::{filter_records, FilterCriteria, RecordStore};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{AssistantRequest, AssistantResponse, ContextSource, UseCaseItem};

/// Context positions for `question`
///
/// Semantic search first; when it is unavailable the keyword filter, and
/// when that finds nothing the start of the catalogue.
fn keyword_context(store: &RecordStore, question: &str, k: usize) -> (ContextSource, Vec<usize>) {
    let criteria = FilterCriteria {
        text: Some(question.to_string()),
        ..Default::default()
    };
    let matches: Vec<usize> = filter_records(store, &criteria)
        .into_iter()
        .take(k)
        .map(|m| m.position)
        .collect();

    if matches.is_empty() {
        (ContextSource::Catalogue, (0..store.count().min(k)).collect())
    } else {
        (ContextSource::Keyword, matches)
    }
}

/// Answer a question about AI use cases
#[post("/assistant")]
pub async fn ask_assistant(
    req: web::Json<AssistantRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let AssistantRequest { question, top_k } = req.into_inner();
    if question.trim().is_empty() {
        return Err(NavigatorError::invalid_input("question must not be empty").into());
    }
    let k = top_k.unwrap_or(state.config.assistant_context_k);

    let search = state.search.clone();
    let text = question.clone();
    let semantic = web::block(move || search.search(&text, k)).await?;

    let (context_source, positions) = match semantic {
        Ok(hits) => (
            ContextSource::Semantic,
            hits.into_iter().map(|hit| hit.position).collect(),
        ),
        Err(e) if e.is_semantic_unavailable() => {
            warn!("Semantic context unavailable, using keyword fallback");
            keyword_context(state.store(), &question, k)
        }
        Err(e) => return Err(e.into()),
    };

    let store = state.store();
    let context: Vec<_> = positions
        .iter()
        .filter_map(|&p| store.get(p).map(|record| (p, record)))
        .collect();
    info!(
        "Assistant context: {} records ({:?})",
        context.len(),
        context_source
    );

    let records: Vec<_> = context.iter().map(|(_, record)| *record).collect();
    let answer = state.assistant.answer(&question, &records).await?;

    Ok(HttpResponse::Ok().json(AssistantResponse {
        answer,
        model: state.assistant.model().to_string(),
        context_source,
        context: context
            .into_iter()
            .map(|(position, record)| UseCaseItem::new(position, record))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{test_state_with, CannedChat};
    use actix_web::{test, App};
    use navigator_vector::testing::sample_records;

    #[::core::prelude::v1::test]
    fn test_keyword_context_fallbacks() {
        let store = RecordStore::from_records(sample_records());

        let (source, positions) = keyword_context(&store, "Vodafone", 5);
        assert_eq!(source, ContextSource::Keyword);
        assert_eq!(positions, vec![2]);

        let (source, positions) = keyword_context(&store, "mining in Chile", 2);
        assert_eq!(source, ContextSource::Catalogue);
        assert_eq!(positions, vec![0, 1]);
    }

    #[actix_web::test]
    async fn test_assistant_uses_semantic_context() {
        let (state, _embedder, _dir) = test_state_with(Some(CannedChat::answering("Use NLP.")));
        let app = test::init_service(App::new().app_data(state).service(ask_assistant)).await;

        let req = test::TestRequest::post()
            .uri("/assistant")
            .set_json(serde_json::json!({"question": "employee hiring automation", "top_k": 1}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["answer"], "Use NLP.");
        assert_eq!(body["context_source"], "semantic");
        assert_eq!(body["context"][0]["company"], "Unilever");
    }

    #[actix_web::test]
    async fn test_assistant_falls_back_when_degraded() {
        let (state, embedder, _dir) = test_state_with(Some(CannedChat::answering("Churn models.")));
        embedder.set_failing(true);
        let app = test::init_service(App::new().app_data(state).service(ask_assistant)).await;

        let req = test::TestRequest::post()
            .uri("/assistant")
            .set_json(serde_json::json!({"question": "Vodafone"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["answer"], "Churn models.");
        assert_eq!(body["context_source"], "keyword");
        assert_eq!(body["context"][0]["company"], "Vodafone");
    }

    #[actix_web::test]
    async fn test_assistant_without_key_is_503() {
        let (state, _embedder, _dir) = test_state_with(None);
        let app = test::init_service(App::new().app_data(state).service(ask_assistant)).await;

        let req = test::TestRequest::post()
            .uri("/assistant")
            .set_json(serde_json::json!({"question": "What is churn prediction?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 503);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "assistant API key not configured");
    }

    #[actix_web::test]
    async fn test_blank_question_is_400() {
        let (state, _embedder, _dir) = test_state_with(Some(CannedChat::answering("unused")));
        let app = test::init_service(App::new().app_data(state).service(ask_assistant)).await;

        let req = test::TestRequest::post()
            .uri("/assistant")
            .set_json(serde_json::json!({"question": "  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
