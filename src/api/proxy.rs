use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::external::FetchError;
use crate::services::{
    clean_page, decode_stream_target, is_manifest_request, rewrite_manifest, ScriptStripMode,
};

#[derive(Debug, Deserialize)]
pub struct PageProxyParams {
    pub url: String,
    /// 脚本剥离策略: all | trackers | none（默认 trackers）
    pub scripts: Option<String>,
}

/// 页面清洗代理
///
/// 服务端抓取任意 HTML 页面，注入 base、剥广告后原样吐回，
/// 供沙盒播放器和通用抓取端点内嵌使用。
pub async fn proxy_page(
    State(state): State<AppState>,
    Query(params): Query<PageProxyParams>,
) -> ApiResult<Response> {
    let url = Url::parse(&params.url)
        .map_err(|_| ApiError::BadRequest("url parameter must be an absolute URL".to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::BadRequest(
            "url parameter must be http(s)".to_string(),
        ));
    }

    let mode = match params.scripts.as_deref() {
        None | Some("trackers") => ScriptStripMode::KnownTrackers,
        Some("all") => ScriptStripMode::All,
        Some("none") => ScriptStripMode::None,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "unknown scripts mode: {}",
                other
            )))
        }
    };

    let response = state
        .catalog
        .upstream()
        .fetch_raw(&url)
        .await
        .map_err(proxy_error)?;
    let html = response.text().await.map_err(|e| ApiError::ProxyUpstream {
        status: None,
        message: e.to_string(),
    })?;

    let cleaned = clean_page(&html, &url, mode);

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(cleaned))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// 流代理：清单重写，其余透传
///
/// 路径参数是百分号编码（或播放器变体的 base64）的绝对 URL；
/// 解码失败是调用方错误（400），不是崩溃。
pub async fn proxy_stream(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> ApiResult<Response> {
    let url = decode_stream_target(&target).ok_or_else(|| {
        ApiError::BadRequest(
            "stream target must be a percent-encoded or base64 absolute URL".to_string(),
        )
    })?;

    let response = state
        .catalog
        .upstream()
        .fetch_raw(&url)
        .await
        .map_err(proxy_error)?;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if is_manifest_request(&url, content_type.as_deref()) {
        // 清单模式：每一行都重写回代理
        let content = response.text().await.map_err(|e| ApiError::ProxyUpstream {
            status: None,
            message: e.to_string(),
        })?;
        let rewritten = rewrite_manifest(&content, &url);

        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/vnd.apple.mpegurl")
            .header("Access-Control-Allow-Origin", "*")
            .header("Cache-Control", "no-cache")
            .body(Body::from(rewritten))
            .map_err(|e| ApiError::Internal(e.to_string()))
    } else {
        // 透传模式：响应体原样流回去，保留上游内容类型
        let content_type =
            content_type.unwrap_or_else(|| "application/octet-stream".to_string());

        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", content_type)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::from_stream(response.bytes_stream()))
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}

/// 代理路径的错误映射：已知上游状态码就透传
fn proxy_error(err: FetchError) -> ApiError {
    match err {
        FetchError::Status { status } => ApiError::ProxyUpstream {
            status: Some(status),
            message: format!("upstream returned status {}", status),
        },
        FetchError::Transport(message) => ApiError::ProxyUpstream {
            status: None,
            message,
        },
    }
}
