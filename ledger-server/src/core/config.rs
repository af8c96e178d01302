use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 未设置分店费率时的默认佣金 (%)
pub const DEFAULT_COMMISSION_RATE: Decimal = Decimal::from_parts(27, 0, 0, false, 0);

/// 默认业务时区
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Africa::Kinshasa;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite:{WORK_DIR}/database/ledger.db | SQLite 地址 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Africa/Kinshasa | 按月汇总使用的业务时区 |
/// | DEFAULT_COMMISSION_RATE | 27 | 分店未设置费率时的佣金 (%) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时 (毫秒) |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE / JWT_EXPIRATION_MINUTES | | 令牌验证 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/ledger HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 连接地址
    pub database_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区
    pub timezone: Tz,
    /// 默认佣金费率 (%)
    pub default_commission_rate: Decimal,
    pub log_level: String,
    pub log_json: bool,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；值无法解析时返回错误而不是静默回退。
    pub fn from_env() -> Result<Self, ServerError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| default_database_url(&work_dir));

        let timezone = match std::env::var("TIMEZONE") {
            Ok(name) => Tz::from_str(&name)
                .map_err(|_| ServerError::Config(format!("Unknown TIMEZONE: {name}")))?,
            Err(_) => DEFAULT_TIMEZONE,
        };

        let default_commission_rate = match std::env::var("DEFAULT_COMMISSION_RATE") {
            Ok(rate) => Decimal::from_str(rate.trim()).map_err(|_| {
                ServerError::Config(format!("Invalid DEFAULT_COMMISSION_RATE: {rate}"))
            })?,
            Err(_) => DEFAULT_COMMISSION_RATE,
        };

        let jwt = JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone,
            default_commission_rate,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            jwt,
        })
    }

    /// 测试配置：内存数据库，固定密钥，不读环境变量
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16, jwt: JwtConfig) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_url: default_database_url(&work_dir),
            work_dir,
            http_port,
            environment: "development".into(),
            timezone: DEFAULT_TIMEZONE,
            default_commission_rate: DEFAULT_COMMISSION_RATE,
            log_level: "info".into(),
            log_json: false,
            shutdown_timeout_ms: 1000,
            jwt,
        }
    }

    /// 数据库目录: {work_dir}/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录: {work_dir}/logs
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn default_database_url(work_dir: &str) -> String {
    format!("sqlite:{}/database/ledger.db", work_dir.trim_end_matches('/'))
}
