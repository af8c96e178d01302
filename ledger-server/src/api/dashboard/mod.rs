//! Dashboard API 模块 (管理员)
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /api/dashboard | GET | 年月报表 + 全局卡片指标 + 佣金 | ADMIN |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub use handler::DashboardReport;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dashboard", get(handler::get_report))
        .route_layer(middleware::from_fn(require_admin))
}
