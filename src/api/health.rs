use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use super::response::success;
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.catalog.upstream().configured_base().as_str(),
    }))
}

/// 获取系统统计信息
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let cache_stats = state.catalog.get_cache_stats();

    success(json!({
        "catalog_cache": {
            "listing_cache_size": cache_stats.listing_cache_size,
            "details_cache_size": cache_stats.details_cache_size,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 清理缓存
pub async fn cleanup_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.catalog.cleanup_cache();

    success(json!({
        "message": "Cache cleanup completed",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 清空所有缓存
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.catalog.clear_cache();

    success(json!({
        "message": "All caches cleared",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
