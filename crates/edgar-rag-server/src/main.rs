use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use edgar_rag_server::cache::EmbeddingCache;
use edgar_rag_server::config::Settings;
use edgar_rag_server::document::TextChunker;
use edgar_rag_server::providers::build_provider;
use edgar_rag_server::router::build_router;
use edgar_rag_server::services::CompanyCatalog;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,edgar_rag_server=debug".to_string()),
        )
        .with_target(true)
        .init();

    info!("Starting EDGAR RAG server...");

    let settings = Settings::load()?;
    info!("Configuration loaded");

    let provider = build_provider(&settings.provider)?;
    let chunker = TextChunker::new(settings.rag.chunk_size, settings.rag.min_chunk_chars);
    let cache = Arc::new(EmbeddingCache::new(
        settings.data.cache_dir.clone(),
        provider.clone(),
        chunker,
    ));

    let catalog = Arc::new(CompanyCatalog::new(
        settings.data.companies.clone(),
        settings.data.root.clone(),
        cache,
        provider,
    ));

    // Build or load every company's embedding tables before serving, the same
    // embeddings the question endpoints search against.
    info!("Warming embedding caches for {} companies", settings.data.companies.len());
    catalog.warm().await?;
    info!("Embedding caches ready");

    let app = build_router(catalog, &settings.server.allowed_origins)?;

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
