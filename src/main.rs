// 允许未使用的代码（库模块在二进制侧不会全部用到）
#![allow(dead_code)]

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;

mod api;
mod external;
mod models;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize upstream catalog client
    let catalog = external::CatalogClient::new();

    // Start cache cleanup task
    let cache_cleanup_task = external::cache::CacheCleanupTask::new(
        catalog.cache.clone(),
        Duration::from_secs(5 * 60), // 每5分钟清理一次
    );
    tokio::spawn(cache_cleanup_task.start());

    // Build our application with routes
    let app = Router::new()
        .route("/", get(|| async { "Movie Mirror Backend API v1.0" }))
        // Health and stats
        .route("/api/health", get(api::health::health_check))
        .route("/api/stats", get(api::health::get_stats))
        .route("/api/cache/cleanup", post(api::health::cleanup_cache))
        .route("/api/cache/clear", post(api::health::clear_cache))
        // Catalog
        .route("/api/listing", get(api::movies::get_listing))
        .route("/api/categories", get(api::movies::get_categories))
        .route("/api/detail/*path", get(api::movies::get_movie_detail))
        // Page proxy
        .route("/api/proxy/page", get(api::proxy::proxy_page))
        // Stream proxy
        .route("/api/proxy/stream/*target", get(api::proxy::proxy_stream))
        .layer(CorsLayer::permissive())
        .with_state(api::AppState { catalog });

    // Run the server - 从环境变量读取配置
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("📊 Cache cleanup task started (interval: 5 minutes)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
