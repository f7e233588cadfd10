//! WatchFinder HTTP Server
//!
//! Actix-web REST API over the retrieval service

mod error;
mod routes;
mod state;
mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use watchfinder_common::Result;

pub use error::ApiError;
pub use routes::configure;
pub use state::AppState;
pub use types::{AskRequest, AskResponse, ErrorResponse, RefreshResponse, StatsResponse};

/// Serve the API until the process is stopped
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let bind_addr = state.config.server_bind_address();
    let data = web::Data::new(state);

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
