//! Reservation API Handlers

use axum::extract::{Path, Query, State};
use shared::models::{DiningTable, Reservation, ReservationQuery, ReservationStatus};

use crate::api::{DataPayload, parse_id};
use crate::core::ServerState;
use crate::db::repository::{dining_table, reservation};
use crate::rules::{self, fields, status};
use crate::utils::{ApiResponse, AppError, AppResult};

async fn load(state: &ServerState, id: i64) -> AppResult<Reservation> {
    reservation::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(id))
}

/// GET /reservations - 按日期列出 / 按手机号搜索 / 全部
///
/// `date` wins over `mobile_number` when both are given.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<ApiResponse<Vec<Reservation>>> {
    let date = query.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let mobile = query
        .mobile_number
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let rows = match (date, mobile) {
        (Some(date), _) => {
            if !fields::is_date_pattern(date) {
                return Err(AppError::invalid_format(
                    "date",
                    "date must be formatted as YYYY-MM-DD",
                ));
            }
            reservation::find_by_date(&state.pool, date).await?
        }
        (None, Some(mobile)) => reservation::search_by_mobile(&state.pool, mobile).await?,
        (None, None) => reservation::find_all(&state.pool).await?,
    };
    Ok(ApiResponse::success(rows))
}

/// POST /reservations - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    DataPayload(data): DataPayload,
) -> AppResult<ApiResponse<Reservation>> {
    let create = rules::validate_reservation_create(&data, &state.config.booking, state.clock())?;
    let created = reservation::create(&state.pool, create).await?;

    tracing::info!(
        reservation_id = created.reservation_id,
        date = %created.reservation_date,
        time = %created.reservation_time,
        people = created.people,
        "Reservation created"
    );

    Ok(ApiResponse::created(created))
}

/// GET /reservations/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Reservation>> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(load(&state, id).await?))
}

/// PUT /reservations/:id - 更新预订 (已完成的预订不可修改)
///
/// A seated reservation keeps its status and must still fit its table.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    DataPayload(data): DataPayload,
) -> AppResult<ApiResponse<Reservation>> {
    let id = parse_id(&id)?;
    let existing = load(&state, id).await?;
    let seating = match existing.status {
        ReservationStatus::Seated => dining_table::find_by_reservation(&state.pool, id).await?,
        _ => None,
    };

    let update = rules::validate_reservation_update(
        &data,
        &existing,
        seating.as_ref(),
        &state.config.booking,
        state.clock(),
    )?;
    let updated = reservation::update(&state.pool, id, existing.status, update).await?;

    tracing::info!(reservation_id = id, "Reservation updated");

    Ok(ApiResponse::success(updated))
}

/// PUT /reservations/:id/status - 仅更新状态
///
/// Finishing a seated reservation releases its table.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    DataPayload(data): DataPayload,
) -> AppResult<ApiResponse<Reservation>> {
    let id = parse_id(&id)?;
    let existing = load(&state, id).await?;
    let next = status::required_status(&data)?;
    status::check_status_change(&existing, next)?;

    let updated = match (existing.status, next) {
        (ReservationStatus::Seated, ReservationStatus::Finished) => {
            state.occupancy.finish(id).await?
        }
        (from, to) => reservation::update_status(&state.pool, id, from, to).await?,
    };

    tracing::info!(
        reservation_id = id,
        from = %existing.status,
        to = %next,
        "Reservation status changed"
    );

    Ok(ApiResponse::success(updated))
}

/// GET /reservations/:id/table - 获取预订所在桌台
pub async fn get_table(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DiningTable>> {
    let id = parse_id(&id)?;
    load(&state, id).await?;

    let table = dining_table::find_by_reservation(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Table for reservation {id}"))
                .with_detail("reservation_id", id)
        })?;
    Ok(ApiResponse::success(table))
}
