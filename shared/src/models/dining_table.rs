//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// `reservation_id` is the occupying reservation; `None` means the table is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub table_id: i64,
    pub table_name: String,
    pub capacity: i32,
    pub reservation_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiningTable {
    pub fn is_occupied(&self) -> bool {
        self.reservation_id.is_some()
    }

    pub fn fits(&self, people: i32) -> bool {
        people <= self.capacity
    }
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub table_name: String,
    pub capacity: i32,
}

/// Seat payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRequest {
    pub reservation_id: i64,
}
