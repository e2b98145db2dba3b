use actix_web::{get, web, HttpResponse};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{SearchQuery, SearchResponse, SearchResultItem};

/// Semantic search over the use cases
#[get("/search")]
pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let SearchQuery { q, top_k } = query.into_inner();
    let top_k = top_k.unwrap_or(state.search.default_top_k());

    // May validate or rebuild the embedding cache on first use
    let search = state.search.clone();
    let text = q.clone();
    let scored = web::block(move || search.search(&text, top_k)).await??;

    let results: Vec<SearchResultItem> = scored.into_iter().map(SearchResultItem::from).collect();

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: q,
        count: results.len(),
        results,
    }))
}

/// Retrieval cache status
#[get("/search/stats")]
pub async fn search_stats(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let engine = state.search.clone();
    let status = web::block(move || engine.status()).await?;

    Ok(HttpResponse::Ok().json(status))
}
