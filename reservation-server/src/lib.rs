//! Reservation Server - 餐厅预订与桌台占用服务
//!
//! # 架构概述
//!
//! - **校验管道** (`rules`): 字段、营业时间、状态转换规则
//! - **桌台占用** (`occupancy`): 入座 / 离座，单事务双写
//! - **数据库** (`db`): 嵌入式 SQLite (sqlx)
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! reservation-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── rules/         # 校验管道
//! ├── occupancy/     # 桌台占用管理
//! ├── db/            # 数据库层
//! └── utils/         # 错误、日志、时钟
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod occupancy;
pub mod rules;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use occupancy::OccupancyManager;
pub use rules::{BookingPolicy, Pipeline};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env, 读取配置, 初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____                                  __  _
   / __ \___  ________  ______   ______ _/ /_(_)___  ____  _____
  / /_/ / _ \/ ___/ _ \/ ___/ | / / __ `/ __/ / __ \/ __ \/ ___/
 / _, _/  __(__  )  __/ /   | |/ / /_/ / /_/ / /_/ / / / (__  )
/_/ |_|\___/____/\___/_/    |___/\__,_/\__/_/\____/_/ /_/____/
    "#
    );
}
