//! Metrics engine
//!
//! Pure functions over the canonical tables. Every function accepts empty
//! and single-row input and never mutates its arguments. Daily rows may
//! arrive in any order; functions that depend on order sort by date first.

use chargeboard_core::types::{ChargeSession, DailyAggregate, EnergySource};
use chrono::{Datelike, IsoWeek, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Trailing window of the moving average, in days
pub const MOVING_AVERAGE_WINDOW: usize = 7;
/// Number of locations shown in the location ranking
pub const TOP_LOCATIONS: usize = 15;
/// Number of bins of the session duration histogram
pub const DURATION_BINS: usize = 20;

/// Weekday labels, Monday first
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Daily rows in ascending date order
pub fn sorted_by_date(rows: &[DailyAggregate]) -> Vec<DailyAggregate> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|row| row.date);
    sorted
}

/// Running sum of `total_kwh` in date order
pub fn cumulative_energy(rows: &[DailyAggregate]) -> Vec<(NaiveDate, f64)> {
    sorted_by_date(rows)
        .into_iter()
        .scan(0.0, |running, row| {
            *running += row.total_kwh;
            Some((row.date, *running))
        })
        .collect()
}

/// Mean `total_kwh` per weekday, Monday first; weekdays without rows are 0
pub fn weekday_mean_energy(rows: &[DailyAggregate]) -> [f64; 7] {
    let mut sums = [0.0; 7];
    let mut counts = [0usize; 7];
    for row in rows {
        let idx = row.date.weekday().num_days_from_monday() as usize;
        sums[idx] += row.total_kwh;
        counts[idx] += 1;
    }

    let mut means = [0.0; 7];
    for idx in 0..7 {
        if counts[idx] > 0 {
            means[idx] = sums[idx] / counts[idx] as f64;
        }
    }
    means
}

/// Trailing mean of `total_kwh` in date order
///
/// The window expands from one row until it is full. A window of 0 behaves
/// as 1.
pub fn moving_average(rows: &[DailyAggregate], window: usize) -> Vec<(NaiveDate, f64)> {
    let window = window.max(1);
    let sorted = sorted_by_date(rows);
    let mut result = Vec::with_capacity(sorted.len());
    let mut sum = 0.0;

    for (i, row) in sorted.iter().enumerate() {
        sum += row.total_kwh;
        if i >= window {
            sum -= sorted[i - window].total_kwh;
        }
        let len = (i + 1).min(window);
        result.push((row.date, sum / len as f64));
    }
    result
}

/// Session energy per location, the `limit` largest, ascending by energy
///
/// Ties are ordered by location name so the ranking is stable.
pub fn energy_by_location(sessions: &[ChargeSession], limit: usize) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for session in sessions {
        *totals.entry(session.location.as_str()).or_insert(0.0) += session.kwh;
    }

    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(location, kwh)| (location.to_string(), kwh))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let skip = ranked.len().saturating_sub(limit);
    ranked.split_off(skip)
}

/// Session counts by weekday (rows, Monday first) and hour of day (columns)
pub fn hour_weekday_counts(sessions: &[ChargeSession], tz: &Tz) -> [[u32; 24]; 7] {
    let mut counts = [[0u32; 24]; 7];
    for session in sessions {
        let local = session.start_in(tz);
        let day = local.weekday().num_days_from_monday() as usize;
        counts[day][local.hour() as usize] += 1;
    }
    counts
}

/// Daily energy laid out by weekday and ISO week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayWeekEnergy {
    /// Columns in (ISO year, ISO week) order
    #[serde(skip)]
    pub weeks: Vec<IsoWeek>,
    /// `cells[weekday][column]`, Monday first, zero-filled
    pub cells: [Vec<f64>; 7],
}

impl WeekdayWeekEnergy {
    /// Column labels of the form `W{n}`
    pub fn week_labels(&self) -> Vec<String> {
        self.weeks.iter().map(|w| format!("W{}", w.week())).collect()
    }
}

/// Sum of `total_kwh` per (weekday, ISO week)
pub fn weekday_week_energy(rows: &[DailyAggregate]) -> WeekdayWeekEnergy {
    let mut by_cell: BTreeMap<(IsoWeek, usize), f64> = BTreeMap::new();
    for row in rows {
        let key = (
            row.date.iso_week(),
            row.date.weekday().num_days_from_monday() as usize,
        );
        *by_cell.entry(key).or_insert(0.0) += row.total_kwh;
    }

    let mut weeks: Vec<IsoWeek> = by_cell.keys().map(|(week, _)| *week).collect();
    weeks.dedup();

    let mut cells: [Vec<f64>; 7] = std::array::from_fn(|_| vec![0.0; weeks.len()]);
    for ((week, day), kwh) in by_cell {
        if let Ok(col) = weeks.binary_search(&week) {
            cells[day][col] = kwh;
        }
    }

    WeekdayWeekEnergy { weeks, cells }
}

/// Session totals of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub kwh: f64,
    pub cost: f64,
}

/// Session energy and cost per month, ascending by month
pub fn monthly_totals(sessions: &[ChargeSession], tz: &Tz) -> Vec<MonthlyTotal> {
    let mut monthly_map: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for session in sessions {
        let month = session.start_in(tz).format("%Y-%m").to_string();
        let entry = monthly_map.entry(month).or_insert((0.0, 0.0));
        entry.0 += session.kwh;
        entry.1 += session.cost;
    }

    monthly_map
        .into_iter()
        .map(|(month, (kwh, cost))| MonthlyTotal { month, kwh, cost })
        .collect()
}

/// One bin of the duration histogram, `[start, end)` in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u32,
}

/// Equal-width histogram of `duration_min`
///
/// The last bin is closed on the right. When every duration is equal the
/// histogram has a single bin.
pub fn duration_histogram(sessions: &[ChargeSession], bins: usize) -> Vec<HistogramBin> {
    if sessions.is_empty() {
        return Vec::new();
    }

    let (min, max) = sessions
        .iter()
        .map(|s| s.duration_min)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });

    if max <= min {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sessions.len() as u32,
        }];
    }

    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for session in sessions {
        let idx = (((session.duration_min - min) / width) as usize).min(bins - 1);
        histogram[idx].count += 1;
    }
    histogram
}

/// Energy per charging source over all rows, positive sources only
pub fn source_totals(rows: &[DailyAggregate]) -> Vec<(EnergySource, f64)> {
    EnergySource::ALL
        .iter()
        .map(|source| (*source, rows.iter().map(|r| r.source(*source)).sum::<f64>()))
        .filter(|(_, total)| *total > 0.0)
        .collect()
}

/// Headline numbers of the daily table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_kwh: f64,
    pub daily_mean_kwh: f64,
    /// Days with any energy charged
    pub charging_days: usize,
    pub day_count: usize,
    /// Earliest day with the highest total
    pub peak_day: Option<(NaiveDate, f64)>,
    pub supercharger_kwh: f64,
}

impl AggregateSummary {
    pub fn from_rows(rows: &[DailyAggregate]) -> Self {
        let mut summary = Self {
            day_count: rows.len(),
            ..Self::default()
        };

        for row in sorted_by_date(rows) {
            summary.total_kwh += row.total_kwh;
            summary.supercharger_kwh += row.supercharger_kwh;
            if row.total_kwh > 0.0 {
                summary.charging_days += 1;
            }
            match summary.peak_day {
                Some((_, peak)) if peak >= row.total_kwh => {}
                _ => summary.peak_day = Some((row.date, row.total_kwh)),
            }
        }

        if summary.day_count > 0 {
            summary.daily_mean_kwh = summary.total_kwh / summary.day_count as f64;
        }
        summary
    }
}

/// Headline numbers of the session table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub count: usize,
    pub total_kwh: f64,
    pub total_cost: f64,
}

impl SessionSummary {
    pub fn from_sessions(sessions: &[ChargeSession]) -> Self {
        let mut summary = Self::default();
        for session in sessions {
            summary.count += 1;
            summary.total_kwh += session.kwh;
            summary.total_cost += session.cost;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn day(y: i32, m: u32, d: u32, total: f64) -> DailyAggregate {
        DailyAggregate::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), total, 0.0, 0.0, 0.0)
    }

    fn session(start: &str, kwh: f64, cost: f64, minutes: f64, location: &str) -> ChargeSession {
        ChargeSession {
            start: DateTime::parse_from_rfc3339(start).unwrap(),
            duration_min: minutes,
            kwh,
            cost,
            location: location.to_string(),
        }
    }

    fn values(series: &[(NaiveDate, f64)]) -> Vec<f64> {
        series.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_cumulative_energy() {
        let rows = vec![day(2024, 1, 3, 5.0), day(2024, 1, 1, 2.0), day(2024, 1, 2, 3.0)];
        assert_eq!(values(&cumulative_energy(&rows)), vec![2.0, 5.0, 10.0]);
        assert!(cumulative_energy(&[]).is_empty());
    }

    #[test]
    fn test_moving_average_expanding_window() {
        let rows = vec![day(2024, 1, 1, 2.0), day(2024, 1, 2, 3.0), day(2024, 1, 3, 5.0)];
        let avg = values(&moving_average(&rows, MOVING_AVERAGE_WINDOW));
        assert_eq!(avg[0], 2.0);
        assert_eq!(avg[1], 2.5);
        assert!((avg[2] - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_full_window() {
        let rows: Vec<DailyAggregate> = (1..=4).map(|d| day(2024, 1, d, d as f64)).collect();
        assert_eq!(values(&moving_average(&rows, 2)), vec![1.0, 1.5, 2.5, 3.5]);
        assert_eq!(values(&moving_average(&rows, 0)), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_weekday_mean_energy() {
        // 2024-01-01 is a Monday
        let rows = vec![
            day(2024, 1, 1, 4.0),
            day(2024, 1, 8, 8.0),
            day(2024, 1, 7, 3.0),
        ];
        let means = weekday_mean_energy(&rows);
        assert_eq!(means[0], 6.0);
        assert_eq!(means[6], 3.0);
        assert_eq!(means[2], 0.0);
        assert_eq!(weekday_mean_energy(&[]), [0.0; 7]);
    }

    #[test]
    fn test_energy_by_location_top_ascending() {
        let sessions = vec![
            session("2024-01-01T10:00:00Z", 10.0, 0.0, 0.0, "A"),
            session("2024-01-02T10:00:00Z", 30.0, 0.0, 0.0, "B"),
            session("2024-01-03T10:00:00Z", 15.0, 0.0, 0.0, "A"),
            session("2024-01-04T10:00:00Z", 5.0, 0.0, 0.0, "C"),
        ];
        let ranked = energy_by_location(&sessions, 2);
        assert_eq!(
            ranked,
            vec![("A".to_string(), 25.0), ("B".to_string(), 30.0)]
        );
        assert_eq!(energy_by_location(&sessions, TOP_LOCATIONS).len(), 3);
    }

    #[test]
    fn test_hour_weekday_counts_in_timezone() {
        let sessions = vec![
            // Monday 03:00 UTC is Sunday 19:00 in Los Angeles
            session("2024-01-01T03:00:00Z", 1.0, 0.0, 0.0, "A"),
            session("2024-01-01T03:30:00Z", 1.0, 0.0, 0.0, "A"),
        ];
        let utc = hour_weekday_counts(&sessions, &Tz::UTC);
        assert_eq!(utc[0][3], 2);

        let la = hour_weekday_counts(&sessions, &chrono_tz::America::Los_Angeles);
        assert_eq!(la[6][19], 2);
        assert_eq!(la.iter().flatten().sum::<u32>(), 2);
    }

    #[test]
    fn test_hour_weekday_counts_empty_is_full_matrix() {
        let counts = hour_weekday_counts(&[], &Tz::UTC);
        assert_eq!(counts.len(), 7);
        assert!(counts.iter().all(|row| row.len() == 24 && row.iter().all(|c| *c == 0)));
    }

    #[test]
    fn test_weekday_week_energy() {
        // ISO week 52 of 2024 ends on 2024-12-29; 2024-12-30 starts week 1 of 2025
        let rows = vec![
            day(2024, 12, 30, 4.0),
            day(2024, 12, 23, 2.0),
            day(2024, 12, 29, 1.0),
        ];
        let matrix = weekday_week_energy(&rows);
        assert_eq!(matrix.week_labels(), vec!["W52", "W1"]);
        assert_eq!(matrix.cells[0], vec![2.0, 4.0]);
        assert_eq!(matrix.cells[6], vec![1.0, 0.0]);
        assert_eq!(matrix.cells[3], vec![0.0, 0.0]);
    }

    #[test]
    fn test_monthly_totals() {
        let sessions = vec![
            session("2024-02-29T23:30:00-08:00", 40.0, 12.0, 20.0, "A"),
            session("2024-02-10T10:00:00Z", 10.0, 4.5, 20.0, "A"),
        ];
        let utc = monthly_totals(&sessions, &Tz::UTC);
        assert_eq!(utc.len(), 2);
        assert_eq!(utc[0].month, "2024-02");
        assert_eq!(utc[1].month, "2024-03");
        assert_eq!(utc[1].kwh, 40.0);

        let la = monthly_totals(&sessions, &chrono_tz::America::Los_Angeles);
        assert_eq!(la.len(), 1);
        assert_eq!(la[0].kwh, 50.0);
        assert_eq!(la[0].cost, 16.5);
    }

    #[test]
    fn test_duration_histogram() {
        let sessions: Vec<ChargeSession> = [0.0, 5.0, 15.0, 40.0]
            .iter()
            .map(|m| session("2024-01-01T10:00:00Z", 1.0, 1.0, *m, "A"))
            .collect();
        let bins = duration_histogram(&sessions, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 1, 0, 1]);
        assert_eq!(bins[3].end, 40.0);

        let single = duration_histogram(&sessions[..1], DURATION_BINS);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 1);
        assert!(duration_histogram(&[], DURATION_BINS).is_empty());
    }

    #[test]
    fn test_source_totals_positive_only() {
        let rows = vec![
            DailyAggregate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 5.0, 5.0, 0.0, 0.0),
            DailyAggregate::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 9.0, 1.0, 8.0, 0.0),
        ];
        assert_eq!(
            source_totals(&rows),
            vec![(EnergySource::Home, 6.0), (EnergySource::Supercharger, 8.0)]
        );
    }

    #[test]
    fn test_aggregate_summary() {
        let rows = vec![
            day(2024, 1, 2, 7.0),
            day(2024, 1, 1, 7.0),
            day(2024, 1, 3, 0.0),
        ];
        let summary = AggregateSummary::from_rows(&rows);
        assert_eq!(summary.total_kwh, 14.0);
        assert_eq!(summary.charging_days, 2);
        assert_eq!(summary.day_count, 3);
        assert_eq!(
            summary.peak_day,
            Some((NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 7.0))
        );
        assert!((summary.daily_mean_kwh - 14.0 / 3.0).abs() < 1e-12);

        let empty = AggregateSummary::from_rows(&[]);
        assert_eq!(empty.peak_day, None);
        assert_eq!(empty.daily_mean_kwh, 0.0);
    }

    #[test]
    fn test_session_summary() {
        let sessions = vec![
            session("2024-01-01T10:00:00Z", 10.0, 3.25, 0.0, "A"),
            session("2024-01-02T10:00:00Z", 20.0, 6.5, 0.0, "B"),
        ];
        let summary = SessionSummary::from_sessions(&sessions);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_kwh, 30.0);
        assert_eq!(summary.total_cost, 9.75);
    }
}
