use std::path::PathBuf;

use chrono_tz::Tz;

use crate::rules::BookingPolicy;
use crate::rules::temporal::parse_weekday;
use crate::utils::time::{parse_hm, parse_timezone};
use crate::utils::{AppError, AppResult};

/// 服务器配置 - 预订服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | `<WORK_DIR>/reservations.db` | SQLite 文件, `:memory:` 为内存库 |
/// | HTTP_PORT | 5001 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 文件日志目录 |
/// | TIMEZONE | UTC | 餐厅所在时区 |
/// | OPENING_TIME | 10:30 | 最早可预订时间 |
/// | LAST_SEATING_TIME | 21:30 | 最晚可预订时间 |
/// | CLOSED_WEEKDAY | tue | 休息日 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/reservations HTTP_PORT=8080 TIMEZONE=Europe/Madrid cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 餐厅所在时区
    pub timezone: Tz,
    /// 营业时间和休息日
    pub booking: BookingPolicy,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；格式错误的变量返回 `ConfigError`。
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let work_dir = var("WORK_DIR").unwrap_or_else(|| "./data".into());
        let database_path = var("DATABASE_PATH").unwrap_or_else(|| {
            PathBuf::from(&work_dir)
                .join("reservations.db")
                .to_string_lossy()
                .into_owned()
        });

        let default_policy = BookingPolicy::default();
        let opening = match var("OPENING_TIME") {
            Some(v) => parse_hm(v.trim()).map_err(|_| invalid("OPENING_TIME", &v))?,
            None => default_policy.opening,
        };
        let last_seating = match var("LAST_SEATING_TIME") {
            Some(v) => parse_hm(v.trim()).map_err(|_| invalid("LAST_SEATING_TIME", &v))?,
            None => default_policy.last_seating,
        };
        let closed_day = match var("CLOSED_WEEKDAY") {
            Some(v) => parse_weekday(&v)?,
            None => default_policy.closed_day,
        };

        Ok(Self {
            work_dir,
            database_path,
            http_port: parse_or("HTTP_PORT", var("HTTP_PORT"), 5001)?,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR"),
            timezone: match var("TIMEZONE") {
                Some(v) => parse_timezone(v.trim())?,
                None => chrono_tz::UTC,
            },
            booking: BookingPolicy::new(opening, last_seating, closed_day)?,
            shutdown_timeout_ms: parse_or("SHUTDOWN_TIMEOUT_MS", var("SHUTDOWN_TIMEOUT_MS"), 10000)?,
        })
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 是否使用内存数据库
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> AppResult<T> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| invalid(key, &v)),
        None => Ok(default),
    }
}

fn invalid(key: &str, value: &str) -> AppError {
    AppError::config(format!("Invalid value for {key}: {value}")).with_detail("variable", key)
}
