//! 状态转换守卫
//!
//! States: `booked` (initial), `seated`, `finished`, `cancelled`.
//! Seating and finishing happen through the table seat/unseat operations,
//! so the create and full-update paths refuse to set them directly.

use serde_json::Value;
use shared::models::{Reservation, ReservationStatus};

use super::fields::Payload;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Parse a status value; only the four known states are accepted
pub fn parse_status(value: &Value) -> AppResult<ReservationStatus> {
    let Value::String(raw) = value else {
        return Err(invalid_status(&value.to_string()));
    };
    raw.parse::<ReservationStatus>()
        .map_err(|_| invalid_status(raw))
}

/// Optional `status` member of a create/update payload
pub fn payload_status(data: &Payload) -> AppResult<Option<ReservationStatus>> {
    match data.get("status") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_status(value).map(Some),
    }
}

/// Required `status` member of a status-only update
pub fn required_status(data: &Payload) -> AppResult<ReservationStatus> {
    match data.get("status") {
        None | Some(Value::Null) => Err(AppError::required("status")),
        Some(value) => parse_status(value),
    }
}

/// New reservations start `booked`
pub fn check_create_status(status: Option<ReservationStatus>) -> AppResult<()> {
    match status {
        None | Some(ReservationStatus::Booked) => Ok(()),
        Some(other) => Err(forbidden_status(other)),
    }
}

/// Full update may keep or cancel, never seat or finish
pub fn check_update_status(status: Option<ReservationStatus>) -> AppResult<()> {
    match status {
        Some(s @ (ReservationStatus::Seated | ReservationStatus::Finished)) => {
            Err(forbidden_status(s))
        }
        _ => Ok(()),
    }
}

/// Status-only change
///
/// `seated` is entered through a table seat and left through a table
/// release (`finished`), so the stored status never disagrees with the
/// table that holds the reservation.
pub fn check_status_change(existing: &Reservation, next: ReservationStatus) -> AppResult<()> {
    match (existing.status, next) {
        (ReservationStatus::Seated, ReservationStatus::Seated | ReservationStatus::Finished) => {
            Ok(())
        }
        (ReservationStatus::Seated, _) => Err(still_seated(existing)),
        (_, ReservationStatus::Seated) => Err(AppError::with_message(
            ErrorCode::ReservationStatusInvalid,
            "Reservations are seated through a table",
        )
        .with_detail("field", "status")),
        _ => Ok(()),
    }
}

/// A seated reservation keeps its status on a full update
pub fn check_seated_status_kept(
    existing: &Reservation,
    status: Option<ReservationStatus>,
) -> AppResult<()> {
    match status {
        Some(next) if existing.status == ReservationStatus::Seated && next != existing.status => {
            Err(still_seated(existing))
        }
        _ => Ok(()),
    }
}

/// Finished reservations are immutable
pub fn check_not_finished(existing: &Reservation) -> AppResult<()> {
    if existing.status == ReservationStatus::Finished {
        return Err(AppError::with_message(
            ErrorCode::ReservationFinished,
            "Finished reservations cannot be updated",
        )
        .with_detail("reservation_id", existing.reservation_id));
    }
    Ok(())
}

fn still_seated(existing: &Reservation) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationAlreadySeated,
        format!(
            "Reservation {} is seated; release its table first",
            existing.reservation_id
        ),
    )
    .with_detail("reservation_id", existing.reservation_id)
}

fn invalid_status(raw: &str) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationStatusInvalid,
        format!("Unknown reservation status: {raw}"),
    )
    .with_detail("field", "status")
}

fn forbidden_status(status: ReservationStatus) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationStatusInvalid,
        format!("Reservation cannot have a status of '{status}'"),
    )
    .with_detail("field", "status")
}
