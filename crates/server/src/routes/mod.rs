mod ask;
mod index;
mod system;

use actix_web::web;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ask::ask)
        .service(index::refresh)
        .service(index::stats)
        .service(system::health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;
    use watchfinder_catalog::{DocumentSource, InMemorySource};
    use watchfinder_common::AppConfig;
    use watchfinder_embed::HashingEmbedder;
    use watchfinder_vector::{RetrievalService, ServiceOptions};

    /// Index built from `indexed`; `/refresh` reloads from `refresh_source`
    async fn test_state(indexed: &[&str], refresh_source: &[&str]) -> Arc<AppState> {
        let model = Arc::new(HashingEmbedder::new(256).unwrap());
        let initial = InMemorySource::from_texts(indexed.iter().copied());
        let retrieval = RetrievalService::new(model, &initial, ServiceOptions::default())
            .await
            .unwrap();
        let source: Arc<dyn DocumentSource> =
            Arc::new(InMemorySource::from_texts(refresh_source.iter().copied()));
        Arc::new(AppState::new(AppConfig::default(), Arc::new(retrieval), source))
    }

    #[actix_web::test]
    async fn test_ask_deduplicates_identical_documents() {
        let docs = [
            "red leather watch, $50",
            "blue steel watch, $200",
            "red leather watch, $50",
        ];
        let state = test_state(&docs, &docs).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/ask")
            .set_json(serde_json::json!({ "query": "red watch", "top_k": 3 }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["query"], "red watch");
        let retrieved = body["retrieved_documents"].as_array().unwrap();
        assert_eq!(retrieved.len(), 2);
        assert!(retrieved.contains(&serde_json::json!("red leather watch, $50")));
        assert!(retrieved.contains(&serde_json::json!("blue steel watch, $200")));
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_ask_rejects_empty_query() {
        let state = test_state(&["red watch"], &[]).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/ask")
            .set_json(serde_json::json!({ "query": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_ask_rejects_zero_top_k() {
        let state = test_state(&["red watch"], &[]).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/ask")
            .set_json(serde_json::json!({ "query": "red", "top_k": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_refresh_then_stats() {
        let state = test_state(&["red watch"], &["blue watch", "steel watch", ""]).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/stats").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["documents"], 1);
        assert_eq!(body["dimension"], 256);
        assert_eq!(body["embedding_model"], "hashing-256");
        assert_eq!(body["top_k"], 10);

        let req = test::TestRequest::post().uri("/refresh").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["documents"], 3);
        assert_eq!(body["indexed"], 2);
        assert_eq!(body["degenerate"], 1);

        let req = test::TestRequest::get().uri("/stats").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["documents"], 3);
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
