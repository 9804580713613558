use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::services::CompanyCatalog;

/// Assembles the API router. No authentication; cross-origin access is
/// limited to the configured local origins.
pub fn build_router(catalog: Arc<CompanyCatalog>, allowed_origins: &[String]) -> Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/companies/", get(handlers::companies::list_companies))
        .route("/api/batch/{company}/", post(handlers::ask::ask_batch))
        .route("/api/{company}/", post(handlers::ask::ask_question))
        .layer(Extension(catalog))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EmbeddingCache;
    use crate::document::TextChunker;
    use crate::providers::testing::StubProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_router(root: &std::path::Path) -> Router {
        let provider = Arc::new(StubProvider::new(vec![1.0, 0.0]));
        let cache = Arc::new(EmbeddingCache::new(
            root.join("embedding_cache"),
            provider.clone(),
            TextChunker::new(200, 5),
        ));
        let catalog = Arc::new(CompanyCatalog::new(
            vec!["Acme".to_string()],
            root.to_path_buf(),
            cache,
            provider,
        ));
        std::fs::create_dir_all(root.join("Acme")).unwrap();
        catalog.warm().await.unwrap();
        build_router(catalog, &["http://localhost".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn companies_route_returns_the_configured_list() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/companies/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let companies: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(companies, vec!["Acme"]);
    }

    #[tokio::test]
    async fn unknown_company_maps_to_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/Initech/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("\"What risks?\""))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
