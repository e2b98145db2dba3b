use actix_web::{post, web, HttpResponse};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

/// Delete the persisted embedding cache and rebuild it
#[post("/cache/rebuild")]
pub async fn rebuild_cache(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    info!("Embedding cache rebuild requested over HTTP");

    let search = state.search.clone();
    let status = web::block(move || search.force_rebuild()).await??;

    Ok(HttpResponse::Ok().json(status))
}
