use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{ApiError, ApiResult};
use super::response::success;
use super::AppState;
use crate::models::all_categories;
use crate::services::link_classifier;

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub page: Option<u32>,
    pub category: Option<String>,
    pub query: Option<String>,
}

/// 列表端点：搜索 > 分类 > 首页，返回 { movies: [...] }
///
/// 上游抓取失败是 500；抓到了但没解析出条目返回空表。
pub async fn get_listing(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> ApiResult<impl IntoResponse> {
    let movies = if let Some(query) = params.query.as_deref() {
        state.catalog.get_search_results(query).await
    } else if let Some(category) = params.category.as_deref() {
        state.catalog.get_category_movies(category, params.page).await
    } else {
        state.catalog.get_homepage_movies(params.page).await
    }?;

    Ok(success(json!({ "movies": movies })))
}

/// 详情端点：{ movie, links: { watch, download } }，无标题即 404
pub async fn get_movie_detail(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let movie = state
        .catalog
        .get_movie_details(&path)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No movie at /{}", path)))?;

    let links = link_classifier::classify(&movie.download_links);

    Ok(success(json!({ "movie": movie, "links": links })))
}

/// 分类表（静态数据）
pub async fn get_categories() -> impl IntoResponse {
    success(json!({ "categories": all_categories() }))
}
