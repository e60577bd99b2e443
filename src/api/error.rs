use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::external::FetchError;

/// 统一的API错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 未找到资源
    NotFound(String),
    /// 请求参数错误
    BadRequest(String),
    /// 上游抓取失败（列表/详情路径，对外统一 500）
    UpstreamFetch(String),
    /// 代理目标抓取失败（已知上游状态码就透传）
    ProxyUpstream {
        status: Option<u16>,
        message: String,
    },
    /// 内部服务器错误
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::UpstreamFetch(msg) => write!(f, "Upstream fetch failed: {}", msg),
            ApiError::ProxyUpstream { status, message } => match status {
                Some(status) => write!(f, "Proxy upstream failed ({}): {}", status, message),
                None => write!(f, "Proxy upstream failed: {}", message),
            },
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// 从FetchError转换（非代理路径：抓取失败对外就是 500）
impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::UpstreamFetch(err.to_string())
    }
}

/// 实现IntoResponse，将错误转换为HTTP响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::UpstreamFetch(ref msg) => {
                tracing::error!("Upstream fetch failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    "Failed to fetch from upstream".to_string(),
                )
            }
            ApiError::ProxyUpstream {
                status: upstream_status,
                ref message,
            } => {
                tracing::error!("Proxy upstream failed: {}", message);
                let status = upstream_status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, "proxy_upstream_error", message.clone())
            }
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
