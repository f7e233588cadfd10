use actix_web::{get, post, web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{RefreshResponse, StatsResponse};

/// Reload the catalog and swap in a freshly built index
#[post("/refresh")]
pub async fn refresh(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    info!("Index refresh requested");

    let index_stats = state.retrieval.refresh(state.source.as_ref()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        success: true,
        stats: index_stats,
    }))
}

/// Active index statistics
#[get("/stats")]
pub async fn stats(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let index_stats = state.retrieval.stats().await;

    Ok(HttpResponse::Ok().json(StatsResponse {
        stats: index_stats,
        embedding_model: state.retrieval.model_name().to_string(),
        top_k: state.retrieval.default_top_k(),
    }))
}
