//! 营业时间规则 - 预订日期/时间是否可订
//!
//! Checks run in a fixed order, each reporting its own error:
//! closed day, past date, earlier today, outside service hours.
//! Both service-hour bounds are bookable.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::utils::time::{parse_date, parse_hm};
use crate::utils::{AppError, AppResult, Clock, ErrorCode};

/// 默认开始接受预订时间 10:30
pub const DEFAULT_OPENING: NaiveTime = match NaiveTime::from_hms_opt(10, 30, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// 默认最后入座时间 21:30
pub const DEFAULT_LAST_SEATING: NaiveTime = match NaiveTime::from_hms_opt(21, 30, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// Opening hours and closed day of the restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Earliest bookable time (inclusive)
    pub opening: NaiveTime,
    /// Latest bookable time (inclusive)
    pub last_seating: NaiveTime,
    pub closed_day: Weekday,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            opening: DEFAULT_OPENING,
            last_seating: DEFAULT_LAST_SEATING,
            closed_day: Weekday::Tue,
        }
    }
}

impl BookingPolicy {
    pub fn new(opening: NaiveTime, last_seating: NaiveTime, closed_day: Weekday) -> AppResult<Self> {
        if opening > last_seating {
            return Err(AppError::config(format!(
                "Opening time {} is after last seating time {}",
                opening.format("%H:%M"),
                last_seating.format("%H:%M")
            )));
        }
        Ok(Self {
            opening,
            last_seating,
            closed_day,
        })
    }
}

/// A calendar-valid requested date and time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl BookingSlot {
    /// Parse pattern-valid `YYYY-MM-DD` and `HH:MM[:SS]` strings
    ///
    /// Values that match the pattern but name no real date or time
    /// (`2024-02-30`, `25:10`) are `InvalidFormat`.
    pub fn parse(date: &str, time: &str) -> AppResult<Self> {
        let date = parse_date(date).map_err(|_| {
            AppError::invalid_format(
                "reservation_date",
                format!("reservation_date {date} is not a valid date"),
            )
        })?;
        let hm = time.get(..5).unwrap_or(time);
        let time = parse_hm(hm).map_err(|_| {
            AppError::invalid_format(
                "reservation_time",
                format!("reservation_time {time} is not a valid time"),
            )
        })?;
        Ok(Self { date, time })
    }
}

pub fn check_not_closed_day(slot: &BookingSlot, policy: &BookingPolicy) -> AppResult<()> {
    if slot.date.weekday() == policy.closed_day {
        return Err(AppError::with_message(
            ErrorCode::ReservationClosedDay,
            format!("We are closed on {}.", weekday_name(policy.closed_day)),
        )
        .with_detail("field", "reservation_date"));
    }
    Ok(())
}

/// Date granularity: any time today passes this check
pub fn check_not_past_date(slot: &BookingSlot, clock: &dyn Clock) -> AppResult<()> {
    if slot.date < clock.today() {
        return Err(AppError::with_message(
            ErrorCode::ReservationInPast,
            "Reservation must be in the future.",
        )
        .with_detail("field", "reservation_date"));
    }
    Ok(())
}

/// Minute precision: booking the current minute is allowed
pub fn check_not_earlier_today(slot: &BookingSlot, clock: &dyn Clock) -> AppResult<()> {
    if slot.date == clock.today() && slot.time < clock.minute_now() {
        return Err(AppError::with_message(
            ErrorCode::ReservationInPast,
            "Reservation must be later today.",
        )
        .with_detail("field", "reservation_time"));
    }
    Ok(())
}

pub fn check_within_hours(slot: &BookingSlot, policy: &BookingPolicy) -> AppResult<()> {
    if slot.time < policy.opening || slot.time > policy.last_seating {
        return Err(AppError::with_message(
            ErrorCode::ReservationOutsideHours,
            format!(
                "Reservation must be between {} and {}.",
                policy.opening.format("%H:%M"),
                policy.last_seating.format("%H:%M")
            ),
        )
        .with_detail("field", "reservation_time"));
    }
    Ok(())
}

/// Parse `mon`, `Tuesday`, `TUE` ...
pub fn parse_weekday(value: &str) -> AppResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| AppError::config(format!("Unknown weekday: {value}")))
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mondays",
        Weekday::Tue => "Tuesdays",
        Weekday::Wed => "Wednesdays",
        Weekday::Thu => "Thursdays",
        Weekday::Fri => "Fridays",
        Weekday::Sat => "Saturdays",
        Weekday::Sun => "Sundays",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedClock;

    // 2030-01-07 is a Monday
    fn clock() -> FixedClock {
        FixedClock::at("2030-01-07", "12:00").unwrap()
    }

    fn slot(date: &str, time: &str) -> BookingSlot {
        BookingSlot::parse(date, time).unwrap()
    }

    fn check_bookable(slot: &BookingSlot, policy: &BookingPolicy, clock: &dyn Clock) -> AppResult<()> {
        check_not_closed_day(slot, policy)?;
        check_not_past_date(slot, clock)?;
        check_not_earlier_today(slot, clock)?;
        check_within_hours(slot, policy)
    }

    fn code(result: AppResult<()>) -> Option<ErrorCode> {
        result.err().map(|e| e.code)
    }

    #[test]
    fn test_slot_parse_rejects_impossible_values() {
        assert_eq!(
            BookingSlot::parse("2024-02-30", "12:00").unwrap_err().code,
            ErrorCode::InvalidFormat
        );
        assert_eq!(
            BookingSlot::parse("2030-01-08", "25:10").unwrap_err().code,
            ErrorCode::InvalidFormat
        );
        assert_eq!(slot("2030-01-08", "18:00:45").time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn test_closed_tuesday_rejected_at_any_time() {
        let policy = BookingPolicy::default();
        for time in ["10:30", "12:00", "21:30", "03:00"] {
            let result = check_bookable(&slot("2030-01-08", time), &policy, &clock());
            assert_eq!(code(result), Some(ErrorCode::ReservationClosedDay), "{time}");
        }
    }

    #[test]
    fn test_closed_day_checked_before_past_date() {
        // 2024-07-02 is a Tuesday in the past
        let result = check_bookable(&slot("2024-07-02", "12:00"), &BookingPolicy::default(), &clock());
        assert_eq!(code(result), Some(ErrorCode::ReservationClosedDay));
    }

    #[test]
    fn test_past_date_rejected() {
        let result = check_bookable(&slot("2030-01-06", "18:00"), &BookingPolicy::default(), &clock());
        assert_eq!(code(result), Some(ErrorCode::ReservationInPast));
    }

    #[test]
    fn test_earlier_today_rejected_later_today_accepted() {
        let policy = BookingPolicy::default();
        let c = clock();
        assert_eq!(
            code(check_bookable(&slot("2030-01-07", "11:59"), &policy, &c)),
            Some(ErrorCode::ReservationInPast)
        );
        assert!(check_bookable(&slot("2030-01-07", "12:00"), &policy, &c).is_ok());
        assert!(check_bookable(&slot("2030-01-07", "18:30"), &policy, &c).is_ok());
    }

    #[test]
    fn test_future_date_accepts_any_service_time() {
        let policy = BookingPolicy::default();
        let c = FixedClock::at("2030-01-07", "21:00").unwrap();
        assert!(check_bookable(&slot("2030-01-09", "10:30"), &policy, &c).is_ok());
    }

    #[test]
    fn test_service_hour_bounds_are_inclusive() {
        let policy = BookingPolicy::default();
        let c = clock();
        let date = "2030-01-09";
        assert_eq!(
            code(check_bookable(&slot(date, "10:29"), &policy, &c)),
            Some(ErrorCode::ReservationOutsideHours)
        );
        assert!(check_bookable(&slot(date, "10:30"), &policy, &c).is_ok());
        assert!(check_bookable(&slot(date, "21:30"), &policy, &c).is_ok());
        assert_eq!(
            code(check_bookable(&slot(date, "21:31"), &policy, &c)),
            Some(ErrorCode::ReservationOutsideHours)
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = BookingPolicy::new(
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            Weekday::Sun,
        )
        .unwrap();
        let c = clock();
        // 2030-01-08 is a Tuesday, open under this policy
        assert!(check_bookable(&slot("2030-01-08", "17:00"), &policy, &c).is_ok());
        assert_eq!(
            code(check_bookable(&slot("2030-01-13", "18:00"), &policy, &c)),
            Some(ErrorCode::ReservationClosedDay)
        );
        assert_eq!(
            code(check_bookable(&slot("2030-01-08", "12:00"), &policy, &c)),
            Some(ErrorCode::ReservationOutsideHours)
        );
    }

    #[test]
    fn test_policy_rejects_inverted_hours() {
        let err = BookingPolicy::new(DEFAULT_LAST_SEATING, DEFAULT_OPENING, Weekday::Tue).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("tue").unwrap(), Weekday::Tue);
        assert_eq!(parse_weekday("Sunday").unwrap(), Weekday::Sun);
        assert!(parse_weekday("someday").is_err());
    }

    #[test]
    fn test_closed_day_message_names_the_day() {
        let err = check_not_closed_day(&slot("2030-01-08", "12:00"), &BookingPolicy::default())
            .unwrap_err();
        assert_eq!(err.message, "We are closed on Tuesdays.");
    }
}
