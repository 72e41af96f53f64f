//! 字段校验 - 请求体字段的纯函数检查
//!
//! Every check reads one member of the `data` object and reports the first
//! problem with the field name in `details.field`.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::utils::{AppError, AppResult};

/// Request body member: `{"data": {...}}`
pub type Payload = Map<String, Value>;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("valid time pattern"));

/// Minimum table name length, in characters
pub const MIN_TABLE_NAME_LEN: usize = 2;

/// Extract the `data` member of a request body
pub fn payload(body: Value) -> AppResult<Payload> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            Some(_) => Err(AppError::invalid_request("data must be an object")),
            None => Err(AppError::invalid_request("Data required.")),
        },
        _ => Err(AppError::invalid_request("Request body must be a JSON object")),
    }
}

/// Non-empty string member
pub fn required_str<'a>(data: &'a Payload, field: &str) -> AppResult<&'a str> {
    match data.get(field) {
        None | Some(Value::Null) => Err(AppError::required(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(AppError::required(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(AppError::invalid_format(
            field,
            format!("{field} must be a string"),
        )),
    }
}

/// Strictly positive whole JSON number that fits in `i32`
pub fn positive_int(data: &Payload, field: &str) -> AppResult<i32> {
    let value = match data.get(field) {
        None | Some(Value::Null) => return Err(AppError::required(field)),
        Some(value) => value,
    };
    whole_number(value)
        .filter(|n| *n > 0)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| {
            AppError::invalid_format(field, format!("{field} must be a positive whole number"))
        })
}

/// `4` and `4.0` are whole, `4.5` and `"4"` are not
fn whole_number(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// ==================== Reservation fields ====================

pub fn check_first_name(data: &Payload) -> AppResult<()> {
    required_str(data, "first_name").map(|_| ())
}

pub fn check_last_name(data: &Payload) -> AppResult<()> {
    required_str(data, "last_name").map(|_| ())
}

pub fn check_mobile_number(data: &Payload) -> AppResult<()> {
    required_str(data, "mobile_number").map(|_| ())
}

/// `YYYY-MM-DD`, pattern only
pub fn check_reservation_date(data: &Payload) -> AppResult<()> {
    let date = required_str(data, "reservation_date")?;
    if !DATE_PATTERN.is_match(date) {
        return Err(AppError::invalid_format(
            "reservation_date",
            "reservation_date must be formatted as YYYY-MM-DD",
        ));
    }
    Ok(())
}

/// Pattern check for query-string dates
pub fn is_date_pattern(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}

/// `HH:MM` (trailing `:SS` tolerated), pattern only
pub fn check_reservation_time(data: &Payload) -> AppResult<()> {
    let time = required_str(data, "reservation_time")?;
    if !TIME_PATTERN.is_match(time) {
        return Err(AppError::invalid_format(
            "reservation_time",
            "reservation_time must be formatted as HH:MM",
        ));
    }
    Ok(())
}

pub fn check_people(data: &Payload) -> AppResult<()> {
    positive_int(data, "people").map(|_| ())
}

/// Stored form of a pattern-valid time: seconds dropped
pub fn normalize_time(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

// ==================== Table fields ====================

pub fn check_table_name(data: &Payload) -> AppResult<()> {
    required_str(data, "table_name").map(|_| ())
}

pub fn check_table_name_length(data: &Payload) -> AppResult<()> {
    let name = required_str(data, "table_name")?;
    if name.chars().count() < MIN_TABLE_NAME_LEN {
        return Err(AppError::invalid_format(
            "table_name",
            "table_name must be more than one character",
        ));
    }
    Ok(())
}

pub fn check_capacity(data: &Payload) -> AppResult<()> {
    positive_int(data, "capacity").map(|_| ())
}

/// Seat payload
pub fn require_reservation_id(data: &Payload) -> AppResult<i64> {
    let value = match data.get("reservation_id") {
        None | Some(Value::Null) => return Err(AppError::required("reservation_id")),
        Some(value) => value,
    };
    whole_number(value).filter(|n| *n > 0).ok_or_else(|| {
        AppError::invalid_format(
            "reservation_id",
            "reservation_id must be a positive whole number",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::ErrorCode;

    fn data(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn field_of(err: &AppError) -> Option<&Value> {
        err.details.as_ref().and_then(|d| d.get("field"))
    }

    #[test]
    fn test_payload_requires_data_object() {
        assert!(payload(json!({"data": {"a": 1}})).is_ok());

        let err = payload(json!({"first_name": "x"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Data required.");

        assert!(payload(json!({"data": "x"})).is_err());
        assert!(payload(json!([1, 2])).is_err());
    }

    #[test]
    fn test_required_str() {
        let d = data(json!({"a": "x", "b": "", "c": "   ", "d": 5, "e": null}));
        assert_eq!(required_str(&d, "a").unwrap(), "x");
        for field in ["b", "c", "e", "missing"] {
            let err = required_str(&d, field).unwrap_err();
            assert_eq!(err.code, ErrorCode::RequiredField);
            assert_eq!(field_of(&err), Some(&json!(field)));
        }
        assert_eq!(required_str(&d, "d").unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_date_pattern_is_anchored() {
        for ok in ["2030-01-02", "2024-02-30"] {
            assert!(check_reservation_date(&data(json!({"reservation_date": ok}))).is_ok());
        }
        for bad in ["2030-1-02", "x2030-01-02", "2030-01-02x", "02/01/2030", "20300102"] {
            let err = check_reservation_date(&data(json!({"reservation_date": bad}))).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFormat, "{bad}");
        }
    }

    #[test]
    fn test_time_pattern() {
        for ok in ["10:30", "25:10", "18:00:00"] {
            assert!(check_reservation_time(&data(json!({"reservation_time": ok}))).is_ok());
        }
        for bad in ["1:30", "10:3", "10-30", "10:30pm", "10:30:0"] {
            assert!(
                check_reservation_time(&data(json!({"reservation_time": bad}))).is_err(),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_people_must_be_positive_whole_number() {
        assert!(check_people(&data(json!({"people": 4}))).is_ok());
        assert!(check_people(&data(json!({"people": 4.0}))).is_ok());
        for bad in [json!(0), json!(-2), json!(2.5), json!("4"), json!(true)] {
            let err = check_people(&data(json!({"people": bad}))).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFormat);
            assert_eq!(field_of(&err), Some(&json!("people")));
        }
        let err = check_people(&data(json!({}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_table_name_length_counts_characters() {
        assert!(check_table_name_length(&data(json!({"table_name": "#1"}))).is_ok());
        assert!(check_table_name_length(&data(json!({"table_name": "桌1"}))).is_ok());
        assert!(check_table_name_length(&data(json!({"table_name": "x"}))).is_err());
        assert!(check_table_name_length(&data(json!({"table_name": "桌"}))).is_err());
    }

    #[test]
    fn test_capacity() {
        assert!(check_capacity(&data(json!({"capacity": 6}))).is_ok());
        assert!(check_capacity(&data(json!({"capacity": 0}))).is_err());
        assert!(check_capacity(&data(json!({"capacity": "6"}))).is_err());
        assert!(check_capacity(&data(json!({"capacity": 3_000_000_000u64}))).is_err());
    }

    #[test]
    fn test_require_reservation_id() {
        assert_eq!(require_reservation_id(&data(json!({"reservation_id": 7}))).unwrap(), 7);
        assert_eq!(
            require_reservation_id(&data(json!({}))).unwrap_err().code,
            ErrorCode::RequiredField
        );
        assert_eq!(
            require_reservation_id(&data(json!({"reservation_id": "7"})))
                .unwrap_err()
                .code,
            ErrorCode::InvalidFormat
        );
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("18:00:59"), "18:00");
        assert_eq!(normalize_time("18:00"), "18:00");
    }
}
