use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use tracing::debug;
use watchfinder_common::WatchFinderError;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// Semantic search over the catalog
#[post("/ask")]
pub async fn ask(
    request: web::Json<AskRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    if request.query.trim().is_empty() {
        return Err(WatchFinderError::invalid_input("Query cannot be empty").into());
    }

    let top_k = request.top_k.unwrap_or_else(|| state.retrieval.default_top_k());
    debug!("Ask: {:?} (top_k={})", request.query, top_k);

    let results = state.retrieval.ask(&request.query, top_k).await?;
    let retrieved_documents = results.iter().map(|r| r.text.clone()).collect();

    Ok(HttpResponse::Ok().json(AskResponse {
        query: request.query,
        retrieved_documents,
        results,
    }))
}
