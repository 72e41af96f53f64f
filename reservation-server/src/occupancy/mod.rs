//! 桌台占用管理 - 入座 / 离座
//!
//! Seating ties a free table to a `booked` reservation and marks the
//! reservation `seated`; unseating frees the table and marks the
//! reservation `finished`. Both writes of an operation share one SQLite
//! transaction.
//!
//! Concurrent requests for the same table are serialized by a per-table
//! async mutex, and the table write only applies while the row still has
//! the expected occupancy, so a second process cannot double-assign either.

use std::sync::Arc;

use dashmap::DashMap;
use shared::models::{DiningTable, Reservation, ReservationStatus};
use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::repository::{dining_table, reservation};
use crate::rules::fields::{self, Payload};
use crate::rules::Pipeline;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Values checked before a seat write
pub struct SeatContext<'a> {
    pub table: &'a DiningTable,
    pub reservation: &'a Reservation,
}

fn capacity_fits(ctx: &SeatContext<'_>) -> AppResult<()> {
    let SeatContext { table, reservation } = ctx;
    if !table.fits(reservation.people) {
        return Err(AppError::with_message(
            ErrorCode::TableCapacityExceeded,
            format!(
                "Table {} cannot fit {} people (capacity {})",
                table.table_name, reservation.people, table.capacity
            ),
        )
        .with_detail("capacity", table.capacity)
        .with_detail("people", reservation.people));
    }
    Ok(())
}

fn table_free(ctx: &SeatContext<'_>) -> AppResult<()> {
    if ctx.table.is_occupied() {
        return Err(occupied(ctx.table));
    }
    Ok(())
}

fn reservation_booked(ctx: &SeatContext<'_>) -> AppResult<()> {
    let reservation = ctx.reservation;
    match reservation.status {
        ReservationStatus::Booked => Ok(()),
        ReservationStatus::Seated => Err(AppError::with_message(
            ErrorCode::ReservationAlreadySeated,
            format!("Reservation {} is already seated", reservation.reservation_id),
        )
        .with_detail("reservation_id", reservation.reservation_id)),
        other => Err(AppError::with_message(
            ErrorCode::ReservationStatusInvalid,
            format!(
                "Reservation {} is {} and cannot be seated",
                reservation.reservation_id, other
            ),
        )
        .with_detail("reservation_id", reservation.reservation_id)),
    }
}

fn table_occupied(table: &DiningTable) -> AppResult<()> {
    if !table.is_occupied() {
        return Err(AppError::with_message(
            ErrorCode::TableNotOccupied,
            format!("Table {} is not occupied", table.table_name),
        )
        .with_detail("table_id", table.table_id));
    }
    Ok(())
}

fn occupied(table: &DiningTable) -> AppError {
    AppError::with_message(
        ErrorCode::TableOccupied,
        format!("Table {} is occupied", table.table_name),
    )
    .with_detail("table_id", table.table_id)
}

/// capacity → table free → reservation booked
pub fn seat_rules<'a>() -> Pipeline<SeatContext<'a>> {
    Pipeline::new("seat")
        .step("capacity", capacity_fits)
        .step("table_free", table_free)
        .step("reservation_booked", reservation_booked)
}

pub fn unseat_rules() -> Pipeline<DiningTable> {
    Pipeline::new("unseat").step("table_occupied", table_occupied)
}

/// Seat / unseat coordinator
///
/// Holds one lock per existing table id; ids that name no table never get one.
#[derive(Debug)]
pub struct OccupancyManager {
    pool: SqlitePool,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl OccupancyManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: DashMap::new(),
        }
    }

    async fn load_table(&self, table_id: i64) -> AppResult<DiningTable> {
        dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| AppError::table_not_found(table_id))
    }

    /// Take the table's lock and read the row under it
    async fn lock_table(&self, table_id: i64) -> AppResult<(OwnedMutexGuard<()>, DiningTable)> {
        self.load_table(table_id).await?;

        let lock = self.locks.entry(table_id).or_default().clone();
        let guard = lock.lock_owned().await;
        let table = self.load_table(table_id).await?;
        Ok((guard, table))
    }

    /// Seat the reservation named in `data` at `table_id`
    ///
    /// Returns the table after the write.
    pub async fn seat(&self, table_id: i64, data: &Payload) -> AppResult<DiningTable> {
        let reservation_id = fields::require_reservation_id(data)?;

        let (_guard, table) = self.lock_table(table_id).await?;
        let reservation = reservation::find_by_id(&self.pool, reservation_id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(reservation_id))?;

        seat_rules().run(&SeatContext {
            table: &table,
            reservation: &reservation,
        })?;

        let mut tx = self.pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
        dining_table::assign_reservation(&mut *tx, table_id, reservation_id).await?;
        reservation::set_status(
            &mut *tx,
            reservation_id,
            ReservationStatus::Booked,
            ReservationStatus::Seated,
        )
        .await?;
        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            table_id,
            reservation_id,
            people = reservation.people,
            "Reservation seated"
        );

        self.load_table(table_id).await
    }

    /// Free `table_id` and finish the reservation it was seating
    ///
    /// Returns the table after the write.
    pub async fn unseat(&self, table_id: i64) -> AppResult<DiningTable> {
        let (_guard, table) = self.lock_table(table_id).await?;
        unseat_rules().run(&table)?;
        let reservation_id = table.reservation_id.ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotOccupied, "Table is not occupied")
        })?;

        self.release(table_id, reservation_id).await?;
        self.load_table(table_id).await
    }

    /// Finish a seated reservation, freeing the table it occupies
    ///
    /// Returns the reservation after the write.
    pub async fn finish(&self, reservation_id: i64) -> AppResult<Reservation> {
        let seating = dining_table::find_by_reservation(&self.pool, reservation_id)
            .await?
            .ok_or_else(|| not_seated(reservation_id))?;

        let (_guard, table) = self.lock_table(seating.table_id).await?;
        if table.reservation_id != Some(reservation_id) {
            return Err(not_seated(reservation_id));
        }

        self.release(table.table_id, reservation_id).await?;
        reservation::find_by_id(&self.pool, reservation_id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(reservation_id))
    }

    /// Clear the table and finish its reservation in one transaction
    ///
    /// Caller holds the table's lock.
    async fn release(&self, table_id: i64, reservation_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
        dining_table::release_reservation(&mut *tx, table_id, reservation_id).await?;
        reservation::set_status(
            &mut *tx,
            reservation_id,
            ReservationStatus::Seated,
            ReservationStatus::Finished,
        )
        .await?;
        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(table_id, reservation_id, "Table released");
        Ok(())
    }
}

fn not_seated(reservation_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationStatusInvalid,
        format!("Reservation {reservation_id} is not seated at any table"),
    )
    .with_detail("reservation_id", reservation_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use serde_json::{Value, json};
    use shared::models::{DiningTableCreate, ReservationCreate};

    async fn seed_table(pool: &SqlitePool, capacity: i32) -> DiningTable {
        dining_table::create(
            pool,
            DiningTableCreate {
                table_name: format!("T{capacity}"),
                capacity,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_reservation(pool: &SqlitePool, people: i32) -> Reservation {
        reservation::create(
            pool,
            ReservationCreate {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                mobile_number: "555-0100".to_string(),
                reservation_date: "2030-01-09".to_string(),
                reservation_time: "18:00".to_string(),
                people,
                status: ReservationStatus::Booked,
            },
        )
        .await
        .unwrap()
    }

    fn seat_body(reservation_id: i64) -> Payload {
        match json!({ "reservation_id": reservation_id }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn status_of(pool: &SqlitePool, id: i64) -> ReservationStatus {
        reservation::find_by_id(pool, id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_seat_then_unseat() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let table = seed_table(&pool, 4).await;
        let res = seed_reservation(&pool, 4).await;

        let seated = manager.seat(table.table_id, &seat_body(res.reservation_id)).await.unwrap();
        assert_eq!(seated.reservation_id, Some(res.reservation_id));
        assert_eq!(status_of(&pool, res.reservation_id).await, ReservationStatus::Seated);

        let freed = manager.unseat(table.table_id).await.unwrap();
        assert_eq!(freed.reservation_id, None);
        assert_eq!(status_of(&pool, res.reservation_id).await, ReservationStatus::Finished);
    }

    #[tokio::test]
    async fn test_capacity_is_inclusive() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let table = seed_table(&pool, 4).await;
        let party_of_five = seed_reservation(&pool, 5).await;

        let err = manager
            .seat(table.table_id, &seat_body(party_of_five.reservation_id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableCapacityExceeded);
        assert_eq!(status_of(&pool, party_of_five.reservation_id).await, ReservationStatus::Booked);
    }

    #[tokio::test]
    async fn test_seat_precondition_order() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let table = seed_table(&pool, 2).await;
        let res = seed_reservation(&pool, 2).await;

        let err = manager.seat(table.table_id, &Payload::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        // missing table reported before missing reservation
        let err = manager.seat(999, &seat_body(998)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        let err = manager.seat(table.table_id, &seat_body(998)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationNotFound);

        // capacity reported before occupancy
        manager.seat(table.table_id, &seat_body(res.reservation_id)).await.unwrap();
        let big = seed_reservation(&pool, 3).await;
        let err = manager.seat(table.table_id, &seat_body(big.reservation_id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableCapacityExceeded);

        let other = seed_reservation(&pool, 1).await;
        let err = manager.seat(table.table_id, &seat_body(other.reservation_id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableOccupied);
    }

    #[tokio::test]
    async fn test_only_booked_reservations_are_seated() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let first = seed_table(&pool, 4).await;
        let second = seed_table(&pool, 6).await;
        let res = seed_reservation(&pool, 2).await;

        manager.seat(first.table_id, &seat_body(res.reservation_id)).await.unwrap();
        let err = manager.seat(second.table_id, &seat_body(res.reservation_id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationAlreadySeated);

        manager.unseat(first.table_id).await.unwrap();
        let err = manager.seat(second.table_id, &seat_body(res.reservation_id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationStatusInvalid);
    }

    #[tokio::test]
    async fn test_unseat_free_table_rejected() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let table = seed_table(&pool, 2).await;

        let err = manager.unseat(table.table_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotOccupied);

        let err = manager.unseat(12345).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_unknown_tables_take_no_lock() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());

        for id in [999, -1, i64::MAX] {
            let err = manager.seat(id, &seat_body(1)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::TableNotFound);
            let err = manager.unseat(id).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::TableNotFound);
        }
        assert!(manager.locks.is_empty());

        let table = seed_table(&pool, 2).await;
        let _ = manager.unseat(table.table_id).await;
        let _ = manager.unseat(table.table_id).await;
        assert_eq!(manager.locks.len(), 1);
    }

    #[tokio::test]
    async fn test_finish_releases_table() {
        let pool = test_pool().await;
        let manager = OccupancyManager::new(pool.clone());
        let table = seed_table(&pool, 4).await;
        let res = seed_reservation(&pool, 3).await;

        let err = manager.finish(res.reservation_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationStatusInvalid);

        manager.seat(table.table_id, &seat_body(res.reservation_id)).await.unwrap();
        let finished = manager.finish(res.reservation_id).await.unwrap();
        assert_eq!(finished.status, ReservationStatus::Finished);

        let freed = dining_table::find_by_id(&pool, table.table_id).await.unwrap().unwrap();
        assert_eq!(freed.reservation_id, None);
    }

    #[tokio::test]
    async fn test_concurrent_seats_assign_once() {
        let pool = test_pool().await;
        let manager = Arc::new(OccupancyManager::new(pool.clone()));
        let table = seed_table(&pool, 4).await;
        let a = seed_reservation(&pool, 2).await;
        let b = seed_reservation(&pool, 2).await;

        let body_a = seat_body(a.reservation_id);
        let body_b = seat_body(b.reservation_id);
        let (ra, rb) = tokio::join!(
            manager.seat(table.table_id, &body_a),
            manager.seat(table.table_id, &body_b),
        );

        let results = [ra, rb];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(err.code, ErrorCode::TableOccupied);

        let statuses = [
            status_of(&pool, a.reservation_id).await,
            status_of(&pool, b.reservation_id).await,
        ];
        assert_eq!(
            statuses.iter().filter(|s| **s == ReservationStatus::Seated).count(),
            1
        );
    }
}
