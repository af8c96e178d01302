//! Ledger Server - 客户卡账本后台服务
//!
//! # 架构概述
//!
//! 表单写入 SQLite，读取接口把数据按卡片 / 客户 / 年月预先汇总后返回 JSON。
//!
//! - **数据库** (`db`): SQLite (sqlx) + 嵌入式迁移
//! - **聚合** (`aggregation`): 年月报表、全局卡片指标 (纯函数)
//! - **认证** (`auth`): JWT 验证，令牌由外部身份服务签发
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、启动错误、服务器
//! ├── auth/          # JWT 认证、管理员中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── aggregation/   # 年月 / 卡片汇总
//! ├── db/            # 连接池、迁移、repository
//! ├── money.rs       # 金额存储与佣金
//! └── utils/         # 错误、日志、时间、输入验证
//! ```

pub mod aggregation;
pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod money;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 .env，初始化日志
///
/// 日志参数直接读环境变量，因为此时完整的 [`Config`] 还没有加载。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(Some(&log_level), Some(log_json), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __            __
   / /   ___  ____/ /___ ____  _____
  / /   / _ \/ __  / __ `/ _ \/ ___/
 / /___/  __/ /_/ / /_/ /  __/ /
/_____/\___/\__,_/\__, /\___/_/
                 /____/
    "#
    );
}
