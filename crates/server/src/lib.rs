//! Navigator HTTP Server
//!
//! Actix-web REST API over the use case catalogue: listing and filters,
//! semantic search, cache maintenance and the assistant.

mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use navigator_common::{AppConfig, NavigatorError, Result};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// Load the dataset, warm the retrieval cache and serve until shutdown
///
/// Only a dataset that cannot be loaded aborts startup. A failed cache
/// preparation leaves semantic search degraded while the rest of the API
/// keeps working.
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_address = config.server_bind_address();
    let state = web::Data::new(AppState::from_config(config)?);

    let search = state.search.clone();
    match web::block(move || search.prepare()).await {
        Ok(Ok(status)) => info!(
            "Semantic search ready: {} records, model {}",
            status.indexed, status.model
        ),
        Ok(Err(e)) => warn!("Semantic search unavailable at startup: {}", e),
        Err(e) => warn!("Cache preparation task failed: {}", e),
    }

    info!("Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .map_err(|e| NavigatorError::config(format!("failed to bind {}: {}", bind_address, e)))?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
