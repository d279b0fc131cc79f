//! Schema normalizer
//!
//! Converts the two raw vendor payloads into the canonical tables. Record
//! parsing is lenient: a record either becomes a row (with defaults filled in
//! for anything missing or malformed) or is skipped with a reason. Building a
//! table never fails.

use crate::types::{ChargeSession, DailyAggregate};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Conversion factor from the Wh values of the daily history
pub const WH_PER_KWH: f64 = 1000.0;
/// Energy used when a channel or fee line has no usable value
pub const DEFAULT_ENERGY_KWH: f64 = 0.0;
/// Cost used when a fee line has no usable amount
pub const DEFAULT_COST: f64 = 0.0;
/// Duration used when the stop time is missing or unusable
pub const DEFAULT_DURATION_MIN: f64 = 0.0;
/// Location used when the site name is missing or blank
pub const UNKNOWN_LOCATION: &str = "Unknown";
/// Fee type whose line item carries the session energy and cost
pub const CHARGING_FEE_TYPE: &str = "CHARGING";

/// Outcome of parsing a single raw record
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Row(T),
    Skip(SkipReason),
}

impl<T> Parsed<T> {
    /// The row, if the record was usable
    pub fn row(self) -> Option<T> {
        match self {
            Parsed::Row(row) => Some(row),
            Parsed::Skip(_) => None,
        }
    }
}

/// Why a raw record did not become a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No timestamp, or an epoch of zero
    MissingTimestamp,
    /// A timestamp was present but could not be interpreted
    InvalidTimestamp(String),
    /// The record was not an object of the expected shape
    Malformed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingTimestamp => write!(f, "missing timestamp"),
            SkipReason::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{raw}'"),
            SkipReason::Malformed(msg) => write!(f, "malformed record: {msg}"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDataPoint {
    timestamp: Option<RawTimestampWrapper>,
    values: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTimestampWrapper {
    timestamp: Option<RawEpoch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEpoch {
    seconds: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSession {
    charge_start_date_time: Option<Value>,
    charge_stop_date_time: Option<Value>,
    site_location_name: Option<Value>,
    fees: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawFee {
    fee_type: Option<Value>,
    usage_base: Option<Value>,
    total_due: Option<Value>,
}

/// Read a number that may arrive as a JSON number or a numeric string
///
/// Anything else, and any negative or non-finite result, becomes `default`.
fn lenient_f64(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => default,
    }
}

fn epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Parse a session timestamp
///
/// Accepts RFC 3339 with an offset or `Z`. Naive date-times are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parse one point of the daily history
pub fn parse_data_point(point: &Value) -> Parsed<DailyAggregate> {
    let raw: RawDataPoint = match serde_json::from_value(point.clone()) {
        Ok(raw) => raw,
        Err(e) => return Parsed::Skip(SkipReason::Malformed(e.to_string())),
    };

    let Some(seconds_value) = raw
        .timestamp
        .and_then(|t| t.timestamp)
        .and_then(|t| t.seconds)
    else {
        return Parsed::Skip(SkipReason::MissingTimestamp);
    };

    let date: NaiveDate = match epoch_seconds(&seconds_value) {
        Some(0) => return Parsed::Skip(SkipReason::MissingTimestamp),
        Some(secs) => match DateTime::from_timestamp(secs, 0) {
            Some(dt) => dt.date_naive(),
            None => {
                return Parsed::Skip(SkipReason::InvalidTimestamp(seconds_value.to_string()));
            }
        },
        None if seconds_value.is_null() => return Parsed::Skip(SkipReason::MissingTimestamp),
        None => return Parsed::Skip(SkipReason::InvalidTimestamp(seconds_value.to_string())),
    };

    let values = raw.values.unwrap_or_default();
    let channel = |idx: usize| -> f64 {
        let wh = lenient_f64(
            values.get(idx).and_then(|v| v.get("raw_value")),
            DEFAULT_ENERGY_KWH,
        );
        wh / WH_PER_KWH
    };

    Parsed::Row(DailyAggregate::new(
        date,
        channel(0),
        channel(1),
        channel(2),
        channel(3),
    ))
}

/// Parse one record of the session history
pub fn parse_session(record: &Value) -> Parsed<ChargeSession> {
    let raw: RawSession = match serde_json::from_value(record.clone()) {
        Ok(raw) => raw,
        Err(e) => return Parsed::Skip(SkipReason::Malformed(e.to_string())),
    };

    let start = match raw.charge_start_date_time.as_ref() {
        None | Some(Value::Null) => return Parsed::Skip(SkipReason::MissingTimestamp),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Parsed::Skip(SkipReason::MissingTimestamp);
        }
        Some(Value::String(s)) => match parse_timestamp(s) {
            Some(dt) => dt,
            None => return Parsed::Skip(SkipReason::InvalidTimestamp(s.clone())),
        },
        Some(other) => return Parsed::Skip(SkipReason::InvalidTimestamp(other.to_string())),
    };

    let duration_min = raw
        .charge_stop_date_time
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .map(|stop| (stop - start).num_milliseconds() as f64 / 60_000.0)
        .filter(|minutes| *minutes >= 0.0)
        .unwrap_or(DEFAULT_DURATION_MIN);

    let location = raw
        .site_location_name
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string();

    let charging_fee = raw
        .fees
        .unwrap_or_default()
        .into_iter()
        .filter_map(|fee| serde_json::from_value::<RawFee>(fee).ok())
        .find(|fee| fee.fee_type.as_ref().and_then(Value::as_str) == Some(CHARGING_FEE_TYPE));

    let (kwh, cost) = match charging_fee {
        Some(fee) => (
            lenient_f64(fee.usage_base.as_ref(), DEFAULT_ENERGY_KWH),
            lenient_f64(fee.total_due.as_ref(), DEFAULT_COST),
        ),
        None => (DEFAULT_ENERGY_KWH, DEFAULT_COST),
    };

    Parsed::Row(ChargeSession {
        start,
        duration_min,
        kwh,
        cost,
        location,
    })
}

/// Build the daily aggregate table from the daily history payload
///
/// Points live under `charging_history_graph.data_points`. A payload without
/// that path yields an empty table.
pub fn build_daily_aggregates(payload: &Value) -> Vec<DailyAggregate> {
    let points = payload
        .get("charging_history_graph")
        .and_then(|g| g.get("data_points"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut skipped = 0usize;
    let rows: Vec<DailyAggregate> = points
        .iter()
        .filter_map(|point| match parse_data_point(point) {
            Parsed::Row(row) => Some(row),
            Parsed::Skip(reason) => {
                skipped += 1;
                debug!("Skipping daily history point: {}", reason);
                None
            }
        })
        .collect();

    info!(
        "Parsed {} daily records ({} points skipped)",
        rows.len(),
        skipped
    );
    rows
}

/// Records of the session history, whichever envelope they arrive in
fn session_records(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => map.get("data").map(session_records).unwrap_or_default(),
        _ => &[],
    }
}

/// Build the session table from the session history payload
///
/// Accepts a bare list or an object with a `data` list. Output is sorted
/// ascending by start; equal starts keep their payload order.
pub fn build_charge_sessions(payload: &Value) -> Vec<ChargeSession> {
    let mut skipped = 0usize;
    let mut sessions: Vec<ChargeSession> = session_records(payload)
        .iter()
        .filter_map(|record| match parse_session(record) {
            Parsed::Row(row) => Some(row),
            Parsed::Skip(reason) => {
                skipped += 1;
                debug!("Skipping session record: {}", reason);
                None
            }
        })
        .collect();

    sessions.sort_by_key(|s| s.start);

    info!(
        "Parsed {} charging sessions ({} records skipped)",
        sessions.len(),
        skipped
    );
    sessions
}
