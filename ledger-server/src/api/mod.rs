//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共)
//! - [`cards`] - 客户卡查询、关闭、结清
//! - [`customers`] - 客户列表、详情、新建
//! - [`orders`] - 订单录入和列表
//! - [`deliveries`] - 送货记录
//! - [`dashboard`] - 年月报表和全局卡片指标 (管理员)
//!
//! 除 `/health` 外所有路由都要求 JWT，并限定在当前用户的分店内。

pub mod cards;
pub mod customers;
pub mod dashboard;
pub mod deliveries;
pub mod health;
pub mod orders;

use axum::{Router, middleware};
use http::{HeaderName, Request, Response};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP 请求日志中间件
async fn log_request(
    request: Request<axum::body::Body>,
    next: middleware::Next,
) -> Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let started = std::time::Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        request_id = %request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {} {}",
        method,
        uri,
        response.status()
    );

    response
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(cards::router())
        .merge(customers::router())
        .merge(orders::router())
        .merge(deliveries::router())
        .merge(dashboard::router())
}

/// Build the fully configured application (middleware + state)
///
/// Used by the HTTP server and by the integration tests.
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // JWT 认证 - require_auth 内部跳过非 /api/ 路径
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // 请求日志 (在 request id 之内，能读到 id)
        .layer(middleware::from_fn(log_request))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
