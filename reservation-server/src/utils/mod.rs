//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::error)
//! - [`Clock`] - 营业时区的 "现在"
//! - 日志等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode, ErrorResponse};
pub use result::AppResult;
pub use time::{Clock, FixedClock, SystemClock};
