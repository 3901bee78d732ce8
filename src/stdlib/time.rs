//! `timestamp`/`duration` construction and the `getX()` accessor methods.
//!
//! All timestamp accessors resolve against UTC rather than an actual system
//! time zone — there is no portable "system default time zone" available
//! without pulling in a platform tz database, and pinning to UTC keeps
//! evaluation a pure function of its inputs (see `SPEC_FULL.md` §4.9).

use chrono::{DateTime, Datelike, Duration as ChronoDuration, TimeZone, Timelike, Utc};

use crate::error::EvalError;
use crate::value::Value;

pub fn to_timestamp(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Instant(t) => Ok(Value::Instant(*t)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Value::Instant(t.with_timezone(&Utc)))
            .map_err(|e| EvalError::bad_argument("timestamp", format!("'{s}' is not RFC3339: {e}"))),
        Value::Int(seconds) => Ok(Value::Instant(
            Utc.timestamp_opt(*seconds, 0)
                .single()
                .ok_or_else(|| EvalError::bad_argument("timestamp", format!("{seconds} is out of range")))?,
        )),
        other => Err(EvalError::bad_argument(
            "timestamp",
            format!("cannot convert {} to a timestamp", other.type_name()),
        )),
    }
}

pub fn to_duration(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Duration(d) => Ok(Value::Duration(*d)),
        Value::String(s) => parse_duration_string(s)
            .map(Value::Duration)
            .ok_or_else(|| EvalError::bad_argument("duration", format!("'{s}' is not a valid duration"))),
        other => Err(EvalError::bad_argument(
            "duration",
            format!("cannot convert {} to a duration", other.type_name()),
        )),
    }
}

/// Parses durations shaped like `"1h30m"`, `"90s"`, `"500ms"` — the subset
/// of Go's `time.ParseDuration` grammar CEL duration literals use: a
/// sequence of signed decimal runs each followed by a unit (`h`, `m`, `s`,
/// `ms`, `us`, `ns`).
fn parse_duration_string(s: &str) -> Option<ChronoDuration> {
    let mut rest = s.trim();
    if rest.is_empty() {
        return None;
    }
    let negative = rest.starts_with('-');
    if negative || rest.starts_with('+') {
        rest = &rest[1..];
    }

    let mut total = ChronoDuration::zero();
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(rest.len());
        if digits_end == 0 {
            return None;
        }
        let (number, remainder) = rest.split_at(digits_end);
        let unit_end = remainder.find(|c: char| c.is_ascii_digit()).unwrap_or(remainder.len());
        let (unit, next) = remainder.split_at(unit_end);
        let magnitude: f64 = number.parse().ok()?;
        let millis = match unit {
            "h" => magnitude * 3_600_000.0,
            "m" => magnitude * 60_000.0,
            "s" => magnitude * 1_000.0,
            "ms" => magnitude,
            "us" | "µs" => magnitude / 1_000.0,
            "ns" => magnitude / 1_000_000.0,
            _ => return None,
        };
        total = total + ChronoDuration::milliseconds(millis.round() as i64);
        rest = next;
    }
    Some(if negative { -total } else { total })
}

pub fn get_full_year(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.year() as i64))
}

/// 0-based per the JavaScript-style `Date` convention CEL timestamp
/// accessors follow: January is `0`.
pub fn get_month(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.month0() as i64))
}

/// 1-based day of month. Unlike `getMonth`, the day-of-month accessor does
/// not follow the JavaScript `Date` 0-based convention.
pub fn get_date(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.day() as i64))
}

pub fn get_day_of_week(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.weekday().num_days_from_sunday() as i64))
}

pub fn get_hours(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.hour() as i64))
}

pub fn get_minutes(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.minute() as i64))
}

pub fn get_seconds(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int(t.second() as i64))
}

pub fn get_milliseconds(t: &DateTime<Utc>) -> Result<Value, EvalError> {
    Ok(Value::Int((t.timestamp_subsec_millis()) as i64))
}

pub fn duration_hours(d: &ChronoDuration) -> Result<Value, EvalError> {
    Ok(Value::Int(d.num_hours()))
}

pub fn duration_minutes(d: &ChronoDuration) -> Result<Value, EvalError> {
    Ok(Value::Int(d.num_minutes() % 60))
}

pub fn duration_seconds(d: &ChronoDuration) -> Result<Value, EvalError> {
    Ok(Value::Int(d.num_seconds() % 60))
}

pub fn duration_milliseconds(d: &ChronoDuration) -> Result<Value, EvalError> {
    Ok(Value::Int(d.num_milliseconds() % 1000))
}
