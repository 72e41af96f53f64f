//! Server Implementation
//!
//! HTTP 服务器启动和优雅关闭

use std::time::Duration;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = api::build_app(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!(
            %addr,
            timezone = %self.config.timezone,
            environment = %self.config.environment,
            "Reservation server starting"
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown_timeout = Duration::from_millis(self.config.shutdown_timeout_ms);

        let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            let _ = shutdown_tx.send(());
        });
        let mut serve = std::pin::pin!(serve.into_future());

        // 收到关闭信号后, 最多等待 shutdown_timeout 让进行中的请求完成
        tokio::select! {
            result = &mut serve => {
                result.map_err(|e| AppError::internal(format!("HTTP server failed: {e}")))?;
            }
            _ = async {
                let _ = shutdown_rx.await;
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!(
                    timeout_ms = self.config.shutdown_timeout_ms,
                    "Graceful shutdown timed out, dropping open connections"
                );
            }
        }

        state.pool.close().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}
