use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::occupancy::OccupancyManager;
use crate::utils::{AppError, AppResult, Clock, SystemClock};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 的成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 嵌入式数据库连接池 |
/// | occupancy | Arc<OccupancyManager> | 入座/离座协调 (按桌台加锁) |
/// | clock | Arc<dyn Clock> | 营业时区时钟 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 桌台占用管理
    pub occupancy: Arc<OccupancyManager>,
    /// 营业时区时钟 (测试中可替换)
    pub clock: Arc<dyn Clock>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: DbService, clock: Arc<dyn Clock>) -> Self {
        let occupancy = Arc::new(OccupancyManager::new(db.pool.clone()));
        Self {
            config,
            pool: db.pool,
            occupancy,
            clock,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保目录存在)
    /// 2. 数据库 (DATABASE_PATH, 执行迁移)
    /// 3. 系统时钟 (TIMEZONE)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = if config.is_in_memory() {
            DbService::in_memory().await?
        } else {
            if let Some(parent) = Path::new(&config.database_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            DbService::new(&config.database_path).await?
        };

        let clock = Arc::new(SystemClock::new(config.timezone));
        Ok(Self::new(config.clone(), db, clock))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("occupancy", &self.occupancy)
            .finish_non_exhaustive()
    }
}
