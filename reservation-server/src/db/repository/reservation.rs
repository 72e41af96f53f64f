//! Reservation Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Reservation, ReservationCreate, ReservationStatus, ReservationUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const RESERVATION_SELECT: &str = "SELECT reservation_id, first_name, last_name, mobile_number, reservation_date, reservation_time, people, status, created_at, updated_at FROM reservations";

/// Characters stripped from stored phone numbers before matching
const PHONE_PUNCTUATION: [&str; 5] = [" ", "-", "(", ")", "+"];

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} ORDER BY reservation_date, reservation_time, reservation_id");
    let rows = sqlx::query_as::<_, Reservation>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Reservations of one day, ordered by time
pub async fn find_by_date(pool: &SqlitePool, date: &str) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "{RESERVATION_SELECT} WHERE reservation_date = ? ORDER BY reservation_time, reservation_id"
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Partial match on the digits of the mobile number, ordered by date
///
/// Punctuation is ignored on both sides: `555 0100`, `(555) 0100` and
/// `555-0100` all match the query `5550`.
pub async fn search_by_mobile(pool: &SqlitePool, mobile: &str) -> RepoResult<Vec<Reservation>> {
    let digits = digits_only(mobile);
    if digits.is_empty() {
        return Ok(Vec::new());
    }

    let normalized = PHONE_PUNCTUATION
        .iter()
        .fold("mobile_number".to_string(), |expr, ch| {
            format!("REPLACE({expr}, '{ch}', '')")
        });
    let sql = format!(
        "{RESERVATION_SELECT} WHERE {normalized} LIKE ? ORDER BY reservation_date, reservation_time, reservation_id"
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(format!("%{digits}%"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE reservation_id = ?");
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: ReservationCreate) -> RepoResult<Reservation> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reservations (first_name, last_name, mobile_number, reservation_date, reservation_time, people, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) RETURNING reservation_id",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.mobile_number)
    .bind(&data.reservation_date)
    .bind(&data.reservation_time)
    .bind(data.people)
    .bind(data.status)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

/// Replace every editable field; `status` is kept when the update carries none
///
/// Only applies while the stored status is still `from`.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    from: ReservationStatus,
    data: ReservationUpdate,
) -> RepoResult<Reservation> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE reservations SET first_name = ?1, last_name = ?2, mobile_number = ?3, reservation_date = ?4, reservation_time = ?5, people = ?6, status = COALESCE(?7, status), updated_at = ?8 WHERE reservation_id = ?9 AND status = ?10",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.mobile_number)
    .bind(&data.reservation_date)
    .bind(&data.reservation_time)
    .bind(data.people)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(match find_by_id(pool, id).await? {
            Some(current) => stale(id, current.status),
            None => RepoError::NotFound(format!("Reservation {id} not found")),
        });
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
) -> RepoResult<Reservation> {
    let mut conn = pool.acquire().await?;
    set_status(&mut *conn, id, from, to).await?;
    drop(conn);

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

/// Status write usable inside a transaction (`&mut *tx`)
///
/// Only applies while the stored status is still `from`.
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE reservations SET status = ?1, updated_at = ?2 WHERE reservation_id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        let current = sqlx::query_scalar::<_, ReservationStatus>(
            "SELECT status FROM reservations WHERE reservation_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        return Err(match current {
            Some(current) => stale(id, current),
            None => RepoError::NotFound(format!("Reservation {id} not found")),
        });
    }
    Ok(())
}

/// The row moved on since it was read
fn stale(id: i64, current: ReservationStatus) -> RepoError {
    match current {
        ReservationStatus::Finished => RepoError::Conflict(
            ErrorCode::ReservationFinished,
            format!("Reservation {id} is finished"),
        ),
        other => RepoError::Conflict(
            ErrorCode::ReservationStatusInvalid,
            format!("Reservation {id} is now {other}"),
        ),
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
