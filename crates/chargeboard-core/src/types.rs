//! Canonical charging tables
//!
//! Every downstream computation works on these two row types. The normalizer
//! builds them once per run; afterwards they are only read.

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar day of charging, as reported by the daily history
///
/// Energy channels are in kWh and never negative. The three source channels
/// are reported independently and need not add up to `total_kwh`.
///
/// # Examples
/// ```
/// use chargeboard_core::types::{DailyAggregate, EnergySource};
/// use chrono::NaiveDate;
///
/// let day = DailyAggregate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 10.0, 7.0, 3.0, 0.0);
/// assert_eq!(day.source(EnergySource::Home), 7.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// Calendar date of the row
    pub date: NaiveDate,
    /// Total energy charged that day
    pub total_kwh: f64,
    /// Energy charged at home
    pub home_kwh: f64,
    /// Energy charged at Superchargers
    pub supercharger_kwh: f64,
    /// Energy charged anywhere else
    pub other_kwh: f64,
}

impl DailyAggregate {
    /// Create a new row
    pub fn new(
        date: NaiveDate,
        total_kwh: f64,
        home_kwh: f64,
        supercharger_kwh: f64,
        other_kwh: f64,
    ) -> Self {
        Self {
            date,
            total_kwh,
            home_kwh,
            supercharger_kwh,
            other_kwh,
        }
    }

    /// Energy attributed to one source channel
    pub fn source(&self, source: EnergySource) -> f64 {
        match source {
            EnergySource::Home => self.home_kwh,
            EnergySource::Supercharger => self.supercharger_kwh,
            EnergySource::Other => self.other_kwh,
        }
    }
}

/// One charging event, as reported by the session history
///
/// # Examples
/// ```
/// use chargeboard_core::types::ChargeSession;
/// use chrono::DateTime;
///
/// let session = ChargeSession {
///     start: DateTime::parse_from_rfc3339("2024-01-05T10:00:00-08:00").unwrap(),
///     duration_min: 25.0,
///     kwh: 40.0,
///     cost: 14.0,
///     location: "Gilroy, CA".to_string(),
/// };
/// assert_eq!(session.rate(), Some(0.35));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSession {
    /// Session start, with the offset the vendor reported
    pub start: DateTime<FixedOffset>,
    /// Minutes between start and stop, 0 when unknown
    pub duration_min: f64,
    /// Energy billed by the charging fee line
    pub kwh: f64,
    /// Amount due for the charging fee line
    pub cost: f64,
    /// Site name
    pub location: String,
}

impl ChargeSession {
    /// Start time converted to the display timezone
    pub fn start_in(&self, tz: &Tz) -> DateTime<Tz> {
        self.start.with_timezone(tz)
    }

    /// Price per kWh, or `None` when no energy was billed
    pub fn rate(&self) -> Option<f64> {
        if self.kwh > 0.0 {
            Some(self.cost / self.kwh)
        } else {
            None
        }
    }
}

/// Charging source channel of the daily history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnergySource {
    Home,
    Supercharger,
    Other,
}

impl EnergySource {
    /// All sources in legend order
    pub const ALL: [EnergySource; 3] = [
        EnergySource::Home,
        EnergySource::Supercharger,
        EnergySource::Other,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EnergySource::Home => "Home",
            EnergySource::Supercharger => "Supercharger",
            EnergySource::Other => "Other",
        }
    }
}

impl fmt::Display for EnergySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(kwh: f64, cost: f64) -> ChargeSession {
        ChargeSession {
            start: DateTime::parse_from_rfc3339("2024-03-10T23:30:00+00:00").unwrap(),
            duration_min: 30.0,
            kwh,
            cost,
            location: "Somewhere".to_string(),
        }
    }

    #[test]
    fn test_rate_with_zero_energy() {
        assert_eq!(session(0.0, 5.0).rate(), None);
        assert_eq!(session(20.0, 5.0).rate(), Some(0.25));
    }

    #[test]
    fn test_start_in_timezone() {
        let local = session(1.0, 1.0).start_in(&chrono_tz::Asia::Tokyo);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-03-11 08:30");
    }

    #[test]
    fn test_source_accessor() {
        let day = DailyAggregate::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            12.0,
            5.0,
            4.0,
            3.0,
        );
        let by_source: Vec<f64> = EnergySource::ALL.iter().map(|s| day.source(*s)).collect();
        assert_eq!(by_source, vec![5.0, 4.0, 3.0]);
        assert_eq!(EnergySource::Supercharger.to_string(), "Supercharger");
    }
}
