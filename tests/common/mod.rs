//! Common test utilities and helpers for chargeboard tests
//!
//! Builders here produce raw vendor payloads in the shapes the APIs return,
//! so integration tests exercise the normalizer as well as the report.

use chargeboard_core::error::Result;
use chargeboard_report::{Chart, ChartRenderer};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{Value, json};
use std::cell::RefCell;

/// Builder for the daily history payload
#[derive(Default)]
pub struct AggregatePayloadBuilder {
    points: Vec<Value>,
}

impl AggregatePayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a day with energy per channel in Wh: total, home, supercharger, other
    pub fn with_day(mut self, date: NaiveDate, wh: [f64; 4]) -> Self {
        let seconds = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        self.points.push(json!({
            "timestamp": {"timestamp": {"seconds": seconds}},
            "values": wh.iter().map(|v| json!({"raw_value": v})).collect::<Vec<_>>(),
        }));
        self
    }

    /// Add a point without any timestamp
    #[allow(dead_code)]
    pub fn with_undated_point(mut self, total_wh: f64) -> Self {
        self.points.push(json!({"values": [{"raw_value": total_wh}]}));
        self
    }

    /// The payload as returned inside the owner API `response`
    pub fn build(self) -> Value {
        json!({"charging_history_graph": {"data_points": self.points}})
    }
}

/// Builder for one session history record
pub struct SessionRecordBuilder {
    start: DateTime<Utc>,
    minutes: i64,
    location: Option<String>,
    fees: Vec<Value>,
}

impl SessionRecordBuilder {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            minutes: 30,
            location: Some("Test Supercharger".to_string()),
            fees: Vec::new(),
        }
    }

    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    #[allow(dead_code)]
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// A `CHARGING` fee line item
    pub fn with_charging(mut self, kwh: f64, cost: f64) -> Self {
        self.fees.push(json!({
            "feeType": "CHARGING",
            "usageBase": kwh,
            "totalDue": cost,
        }));
        self
    }

    /// A fee line item that carries no energy
    #[allow(dead_code)]
    pub fn with_fee(mut self, fee_type: &str, cost: f64) -> Self {
        self.fees.push(json!({"feeType": fee_type, "usageBase": 0, "totalDue": cost}));
        self
    }

    pub fn build(self) -> Value {
        let stop = self.start + Duration::minutes(self.minutes);
        json!({
            "chargeStartDateTime": self.start.to_rfc3339(),
            "chargeStopDateTime": stop.to_rfc3339(),
            "siteLocationName": self.location,
            "fees": self.fees,
        })
    }
}

/// Wrap session records the way the ownership API does
pub fn session_payload(records: Vec<Value>) -> Value {
    json!({"data": records})
}

/// Renderer that draws nothing and remembers what it was asked for
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingRenderer {
    pub charts: RefCell<Vec<Chart>>,
}

impl ChartRenderer for &RecordingRenderer {
    fn render(&self, chart: &Chart) -> Result<String> {
        self.charts.borrow_mut().push(chart.clone());
        Ok(format!("<svg data-kind=\"{}\"></svg>", chart.kind.id()))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
