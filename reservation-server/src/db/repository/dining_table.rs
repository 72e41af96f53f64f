//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{DiningTable, DiningTableCreate};
use sqlx::{SqliteConnection, SqlitePool};

const TABLE_SELECT: &str =
    "SELECT table_id, table_name, capacity, reservation_id, created_at, updated_at FROM tables";

/// All tables sorted by name
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("{TABLE_SELECT} ORDER BY table_name, table_id");
    let rows = sqlx::query_as::<_, DiningTable>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE table_id = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The table currently seating a reservation, if any
pub async fn find_by_reservation(
    pool: &SqlitePool,
    reservation_id: i64,
) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE reservation_id = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(reservation_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tables (table_name, capacity, reservation_id, created_at, updated_at) VALUES (?1, ?2, NULL, ?3, ?3) RETURNING table_id",
    )
    .bind(&data.table_name)
    .bind(data.capacity)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

/// Point a free table at a reservation (transaction step)
///
/// Only succeeds while the table is still free. A reservation already
/// held by another table trips `idx_tables_reservation` and is reported
/// as `ReservationAlreadySeated`.
pub async fn assign_reservation(
    conn: &mut SqliteConnection,
    table_id: i64,
    reservation_id: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tables SET reservation_id = ?1, updated_at = ?2 WHERE table_id = ?3 AND reservation_id IS NULL",
    )
    .bind(reservation_id)
    .bind(now)
    .bind(table_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict(
            ErrorCode::ReservationAlreadySeated,
            format!("Reservation {reservation_id} is already seated"),
        ),
        other => other.into(),
    })?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::TableOccupied,
            format!("Table {table_id} is occupied"),
        ));
    }
    Ok(())
}

/// Clear the occupying reservation (transaction step)
///
/// Only succeeds while the table still seats `reservation_id`.
pub async fn release_reservation(
    conn: &mut SqliteConnection,
    table_id: i64,
    reservation_id: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tables SET reservation_id = NULL, updated_at = ?1 WHERE table_id = ?2 AND reservation_id = ?3",
    )
    .bind(now)
    .bind(table_id)
    .bind(reservation_id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::TableNotOccupied,
            format!("Table {table_id} is not occupied"),
        ));
    }
    Ok(())
}
