//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`reservations`] - 预订管理接口
//! - [`tables`] - 桌台管理接口 (含入座/离座)
//!
//! Request bodies are `{"data": {...}}` and read through [`DataPayload`];
//! every response is `{"data": ...}` or the shared error body.

pub mod health;
pub mod reservations;
pub mod tables;

use axum::extract::{FromRequest, Request};
use axum::{Json, Router, middleware};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::rules::fields::{self, Payload};
use crate::utils::{AppError, AppResult};

/// The `data` member of a JSON request body
///
/// Malformed JSON and a missing `data` member are both `InvalidRequest`.
#[derive(Debug, Clone)]
pub struct DataPayload(pub Payload);

impl<S> FromRequest<S> for DataPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;
        fields::payload(body).map(DataPayload)
    }
}

/// Numeric path id; anything else names no resource
pub fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>().map_err(|_| AppError::not_found(raw))
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// 未知路由 - 统一错误格式
async fn fallback(uri: http::Uri) -> AppError {
    AppError::not_found(uri.path())
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(reservations::router())
        .merge(tables::router())
        .fallback(fallback)
}

/// Build the fully configured application
///
/// Used by both the HTTP server and router tests.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Trace - Request spans
        .layer(TraceLayer::new_for_http())
        // Request logging - outermost, executed first
        .layer(middleware::from_fn(log_request))
}
