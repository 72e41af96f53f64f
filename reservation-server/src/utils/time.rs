//! 时间工具函数 — 业务时区
//!
//! 预订规则只关心餐厅所在时区的 "今天" 和 "现在"，
//! 通过 [`Clock`] 注入，测试中使用 [`FixedClock`]。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Source of the restaurant's local wall-clock time
pub trait Clock: Send + Sync {
    /// Current local date and time in the restaurant's time zone
    fn now(&self) -> NaiveDateTime;

    /// 今天 (业务时区)
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// 当前时间, 截断到分钟
    fn minute_now(&self) -> NaiveTime {
        truncate_to_minute(self.now().time())
    }
}

/// Production clock: system time converted into a fixed time zone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Clock frozen at a given local moment
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Build from `YYYY-MM-DD` and `HH:MM`
    pub fn at(date: &str, time: &str) -> AppResult<Self> {
        Ok(Self(parse_date(date)?.and_time(parse_hm(time)?)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date: {date}")))
}

/// 解析时间字符串 (HH:MM)
pub fn parse_hm(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time: {time}")))
}

/// 解析时区名称 (IANA, e.g. `Europe/Madrid`)
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::config(format!("Unknown timezone: {name}")))
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
