//! Date coercion and day alignment.
//!
//! Date bounds arrive as instants, epoch milliseconds, or strings. All of them
//! are coerced to `DateTime<Utc>`; anything that cannot be coerced is a
//! validation error. There is no fallback to "now".

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Utc,
};
use serde_json::Value;

use crate::error::{FilterError, Result};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A value that may be coerced into a date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// Already an instant.
    Instant(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    /// RFC 3339, `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS` (read as UTC).
    Text(String),
}

impl DateInput {
    /// Coerce into an instant or fail with a validation error.
    pub fn coerce(&self) -> Result<DateTime<Utc>> {
        match self {
            DateInput::Instant(dt) => within_supported_range(*dt),
            DateInput::EpochMillis(ms) => from_epoch_millis(*ms),
            DateInput::Text(text) => parse_date(text)
                .ok_or_else(|| FilterError::validation(format!("'{text}' is not a valid date")))
                .and_then(within_supported_range),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        DateInput::Instant(dt)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Instant(date.and_time(NaiveTime::MIN).and_utc())
    }
}

impl From<i64> for DateInput {
    fn from(ms: i64) -> Self {
        DateInput::EpochMillis(ms)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

/// Coerce a raw JSON value (number of epoch milliseconds, or string) into an instant.
pub fn coerce_value(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(ms) = n.as_i64() {
                return from_epoch_millis(ms);
            }
            match n.as_f64() {
                Some(ms) if ms.is_finite() => from_epoch_millis(ms.trunc() as i64),
                _ => Err(FilterError::validation(format!("{n} is not a valid timestamp"))),
            }
        }
        Value::String(text) => DateInput::Text(text.clone()).coerce(),
        other => Err(FilterError::validation(format!(
            "{other} cannot be interpreted as a date"
        ))),
    }
}

/// Parse a date string in one of the accepted formats.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn from_epoch_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| FilterError::validation(format!("{ms} is out of the representable date range")))
        .and_then(within_supported_range)
}

/// Reject instants too close to the ends of the representable range for
/// their day boundaries to be computed in any accepted offset.
fn within_supported_range(dt: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let margin = TimeDelta::days(2);
    if dt.checked_sub_signed(margin).is_some() && dt.checked_add_signed(margin).is_some() {
        Ok(dt)
    } else {
        Err(FilterError::validation(format!(
            "{} is too close to the limits of the supported date range",
            dt.to_rfc3339_opts(SecondsFormat::Millis, true)
        )))
    }
}

/// First instant of the day containing `dt`, with days delimited in `offset`.
///
/// `None` when that instant is outside the representable range.
pub fn start_of_day(dt: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local_midnight = dt.with_timezone(&offset).date_naive().and_time(NaiveTime::MIN);
    let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    local_midnight
        .checked_sub_signed(shift)
        .map(|naive| naive.and_utc())
}

/// Last millisecond of the day containing `dt`, with days delimited in `offset`.
///
/// `None` when that instant is outside the representable range.
pub fn end_of_day(dt: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    start_of_day(dt, offset)?
        .checked_add_signed(TimeDelta::days(1))?
        .checked_sub_signed(TimeDelta::milliseconds(1))
}

/// The JSON form used for dates inside predicates.
pub fn to_json(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
