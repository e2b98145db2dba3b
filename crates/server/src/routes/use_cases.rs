use actix_web::{get, web, HttpResponse};
use navigator_common::NavigatorError;
use navigator_data::{facets, filter_records, FilterCriteria};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{UseCaseItem, UseCaseListResponse};

/// List use cases, optionally filtered by facet and keyword
#[get("/use-cases")]
pub async fn list_use_cases(
    query: web::Query<FilterCriteria>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let store = state.store();
    let items: Vec<UseCaseItem> = filter_records(store, &query)
        .into_iter()
        .map(UseCaseItem::from)
        .collect();

    debug!("Use case listing: {} of {} records", items.len(), store.count());

    HttpResponse::Ok().json(UseCaseListResponse {
        total: store.count(),
        count: items.len(),
        items,
    })
}

/// Single use case by dataset position
#[get("/use-cases/{position}")]
pub async fn get_use_case(
    position: web::Path<usize>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let position = position.into_inner();
    let record = state
        .store()
        .get(position)
        .ok_or_else(|| NavigatorError::not_found(format!("use case {}", position)))?;

    Ok(HttpResponse::Ok().json(UseCaseItem::new(position, record)))
}

/// Facet values for the business function and AI type filters
#[get("/filters")]
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(facets(state.store()))
}
