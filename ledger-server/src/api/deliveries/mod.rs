//! Delivery API 模块 (送货记录)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/deliveries", post(handler::create))
}
