//! Card API 模块 (客户卡)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub use handler::CardDetail;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cards", get(handler::list))
        .route("/api/card/{id}", get(handler::get_by_id).patch(handler::update))
}
