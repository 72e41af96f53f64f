//! Dining Table API Handlers

use axum::extract::{Path, State};
use shared::models::DiningTable;

use crate::api::{DataPayload, parse_id};
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::rules;
use crate::utils::{ApiResponse, AppError, AppResult};

/// GET /tables - 获取所有桌台 (按名称排序)
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.pool).await?;
    Ok(ApiResponse::success(tables))
}

/// POST /tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    DataPayload(data): DataPayload,
) -> AppResult<ApiResponse<DiningTable>> {
    let create = rules::validate_table_create(&data)?;
    let table = dining_table::create(&state.pool, create).await?;

    tracing::info!(table_id = table.table_id, name = %table.table_name, "Table created");

    Ok(ApiResponse::created(table))
}

/// GET /tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DiningTable>> {
    let id = parse_id(&id)?;
    let table = dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::table_not_found(id))?;
    Ok(ApiResponse::success(table))
}

/// PUT /tables/:id/seat - 入座
pub async fn seat(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    DataPayload(data): DataPayload,
) -> AppResult<ApiResponse<DiningTable>> {
    let id = parse_id(&id)?;
    let table = state.occupancy.seat(id, &data).await?;
    Ok(ApiResponse::success(table))
}

/// DELETE /tables/:id/seat - 离座
pub async fn unseat(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DiningTable>> {
    let id = parse_id(&id)?;
    let table = state.occupancy.unseat(id).await?;
    Ok(ApiResponse::success(table))
}
