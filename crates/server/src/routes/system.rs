use actix_web::{get, web, HttpResponse};
use navigator_vector::CacheState;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness plus a summary of the semantic layer
///
/// Never waits on the retrieval cache: while a validation or rebuild holds
/// it, the semantic state is reported as `rebuilding`.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let semantic_state = state
        .search
        .try_status()
        .map_or(CacheState::Rebuilding, |status| status.state);

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        records: state.store().count(),
        semantic_state,
    })
}
