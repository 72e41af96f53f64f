//! 预订规则 - 校验管道
//!
//! - [`fields`] - 字段校验 (纯函数)
//! - [`temporal`] - 营业时间规则
//! - [`status`] - 状态转换守卫
//! - [`pipeline`] - 有序、短路的规则链
//!
//! Handlers call the `validate_*` entry points, which run the matching
//! pipeline and turn the raw payload into a typed model.

pub mod fields;
pub mod pipeline;
pub mod status;
pub mod temporal;

pub use fields::Payload;
pub use pipeline::Pipeline;
pub use temporal::{BookingPolicy, BookingSlot};

use std::cell::OnceCell;

use shared::models::{
    DiningTable, DiningTableCreate, Reservation, ReservationCreate, ReservationUpdate,
};

use crate::utils::{AppError, AppResult, Clock, ErrorCode};

/// Request-scoped values shared by the reservation rules
pub struct ReservationContext<'a> {
    pub data: &'a Payload,
    /// Stored record, present on update
    pub existing: Option<&'a Reservation>,
    /// Table currently holding the stored record
    pub seating: Option<&'a DiningTable>,
    pub policy: &'a BookingPolicy,
    pub clock: &'a dyn Clock,
    slot: OnceCell<AppResult<BookingSlot>>,
}

impl<'a> ReservationContext<'a> {
    pub fn new(data: &'a Payload, policy: &'a BookingPolicy, clock: &'a dyn Clock) -> Self {
        Self {
            data,
            existing: None,
            seating: None,
            policy,
            clock,
            slot: OnceCell::new(),
        }
    }

    pub fn with_existing(
        mut self,
        existing: &'a Reservation,
        seating: Option<&'a DiningTable>,
    ) -> Self {
        self.existing = Some(existing);
        self.seating = seating;
        self
    }

    /// Requested date and time, parsed on first use
    fn slot(&self) -> AppResult<BookingSlot> {
        self.slot
            .get_or_init(|| {
                BookingSlot::parse(
                    fields::required_str(self.data, "reservation_date")?,
                    fields::required_str(self.data, "reservation_time")?,
                )
            })
            .clone()
    }
}

// ==================== Steps ====================

fn existing_not_finished(ctx: &ReservationContext<'_>) -> AppResult<()> {
    match ctx.existing {
        Some(existing) => status::check_not_finished(existing),
        None => Ok(()),
    }
}

fn first_name(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_first_name(ctx.data)
}

fn last_name(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_last_name(ctx.data)
}

fn mobile_number(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_mobile_number(ctx.data)
}

fn reservation_date(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_reservation_date(ctx.data)
}

fn reservation_time(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_reservation_time(ctx.data)
}

fn people(ctx: &ReservationContext<'_>) -> AppResult<()> {
    fields::check_people(ctx.data)
}

fn calendar(ctx: &ReservationContext<'_>) -> AppResult<()> {
    ctx.slot().map(|_| ())
}

fn not_closed_day(ctx: &ReservationContext<'_>) -> AppResult<()> {
    temporal::check_not_closed_day(&ctx.slot()?, ctx.policy)
}

fn not_past_date(ctx: &ReservationContext<'_>) -> AppResult<()> {
    temporal::check_not_past_date(&ctx.slot()?, ctx.clock)
}

fn not_earlier_today(ctx: &ReservationContext<'_>) -> AppResult<()> {
    temporal::check_not_earlier_today(&ctx.slot()?, ctx.clock)
}

fn within_hours(ctx: &ReservationContext<'_>) -> AppResult<()> {
    temporal::check_within_hours(&ctx.slot()?, ctx.policy)
}

fn create_status(ctx: &ReservationContext<'_>) -> AppResult<()> {
    status::check_create_status(status::payload_status(ctx.data)?)
}

fn update_status(ctx: &ReservationContext<'_>) -> AppResult<()> {
    status::check_update_status(status::payload_status(ctx.data)?)
}

fn seated_status_kept(ctx: &ReservationContext<'_>) -> AppResult<()> {
    match ctx.existing {
        Some(existing) => {
            status::check_seated_status_kept(existing, status::payload_status(ctx.data)?)
        }
        None => Ok(()),
    }
}

/// A seated party still fits the table holding it
fn seating_capacity(ctx: &ReservationContext<'_>) -> AppResult<()> {
    let Some(table) = ctx.seating else {
        return Ok(());
    };
    let people = fields::positive_int(ctx.data, "people")?;
    if !table.fits(people) {
        return Err(AppError::with_message(
            ErrorCode::TableCapacityExceeded,
            format!(
                "Table {} cannot fit {} people (capacity {})",
                table.table_name, people, table.capacity
            ),
        )
        .with_detail("capacity", table.capacity)
        .with_detail("people", people));
    }
    Ok(())
}

// ==================== Pipelines ====================

fn reservation_field_rules<'a>() -> Pipeline<ReservationContext<'a>> {
    Pipeline::new("reservation_fields")
        .step("first_name", first_name)
        .step("last_name", last_name)
        .step("mobile_number", mobile_number)
        .step("reservation_date", reservation_date)
        .step("reservation_time", reservation_time)
        .step("people", people)
}

fn temporal_rules<'a>() -> Pipeline<ReservationContext<'a>> {
    Pipeline::new("temporal")
        .step("calendar", calendar)
        .step("not_closed_day", not_closed_day)
        .step("not_past_date", not_past_date)
        .step("not_earlier_today", not_earlier_today)
        .step("within_hours", within_hours)
}

/// fields → temporal → status (create)
pub fn create_reservation_rules<'a>() -> Pipeline<ReservationContext<'a>> {
    Pipeline::new("create_reservation")
        .then(reservation_field_rules())
        .then(temporal_rules())
        .step("create_status", create_status)
}

fn seating_rules<'a>() -> Pipeline<ReservationContext<'a>> {
    Pipeline::new("seating")
        .step("seated_status_kept", seated_status_kept)
        .step("seating_capacity", seating_capacity)
}

/// existing not finished → fields → temporal → status → seating (update)
pub fn update_reservation_rules<'a>() -> Pipeline<ReservationContext<'a>> {
    Pipeline::new("update_reservation")
        .step("not_finished", existing_not_finished)
        .then(reservation_field_rules())
        .then(temporal_rules())
        .step("update_status", update_status)
        .then(seating_rules())
}

/// table name → name length → capacity
pub fn create_table_rules() -> Pipeline<Payload> {
    Pipeline::new("create_table")
        .step("table_name", fields::check_table_name)
        .step("table_name_length", fields::check_table_name_length)
        .step("capacity", fields::check_capacity)
}

// ==================== Entry points ====================

/// Validate a create payload and build the insert model
pub fn validate_reservation_create(
    data: &Payload,
    policy: &BookingPolicy,
    clock: &dyn Clock,
) -> AppResult<ReservationCreate> {
    let ctx = ReservationContext::new(data, policy, clock);
    create_reservation_rules().run(&ctx)?;

    Ok(ReservationCreate {
        first_name: trimmed(data, "first_name")?,
        last_name: trimmed(data, "last_name")?,
        mobile_number: trimmed(data, "mobile_number")?,
        reservation_date: trimmed(data, "reservation_date")?,
        reservation_time: time_of(data)?,
        people: fields::positive_int(data, "people")?,
        status: status::payload_status(data)?.unwrap_or_default(),
    })
}

/// Validate a full-update payload against the stored record
///
/// `seating` is the table holding `existing`, if it is seated.
pub fn validate_reservation_update(
    data: &Payload,
    existing: &Reservation,
    seating: Option<&DiningTable>,
    policy: &BookingPolicy,
    clock: &dyn Clock,
) -> AppResult<ReservationUpdate> {
    let ctx = ReservationContext::new(data, policy, clock).with_existing(existing, seating);
    update_reservation_rules().run(&ctx)?;

    Ok(ReservationUpdate {
        first_name: trimmed(data, "first_name")?,
        last_name: trimmed(data, "last_name")?,
        mobile_number: trimmed(data, "mobile_number")?,
        reservation_date: trimmed(data, "reservation_date")?,
        reservation_time: time_of(data)?,
        people: fields::positive_int(data, "people")?,
        status: status::payload_status(data)?,
    })
}

pub fn validate_table_create(data: &Payload) -> AppResult<DiningTableCreate> {
    create_table_rules().run(data)?;

    Ok(DiningTableCreate {
        table_name: trimmed(data, "table_name")?,
        capacity: fields::positive_int(data, "capacity")?,
    })
}

fn trimmed(data: &Payload, field: &str) -> AppResult<String> {
    fields::required_str(data, field).map(|s| s.trim().to_string())
}

fn time_of(data: &Payload) -> AppResult<String> {
    fields::required_str(data, "reservation_time").map(|t| fields::normalize_time(t).to_string())
}
