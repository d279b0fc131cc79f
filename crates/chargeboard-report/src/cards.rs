//! Summary cards
//!
//! Label/value pairs shown above the charts, plus the card set used when the
//! session history holds exactly one session.

use crate::metrics::{AggregateSummary, SessionSummary};
use chargeboard_core::types::{ChargeSession, DailyAggregate};
use chrono_tz::Tz;
use serde::Serialize;

/// A single label/value card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub label: String,
    pub value: String,
}

impl Card {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Format a number with thousands separators and fixed decimals
///
/// # Examples
/// ```
/// use chargeboard_report::cards::format_grouped;
///
/// assert_eq!(format_grouped(1234567.891, 2), "1,234,567.89");
/// assert_eq!(format_grouped(999.95, 1), "1,000.0");
/// ```
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    for (count, ch) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut result: String = grouped.chars().rev().collect();

    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        result.insert(0, '-');
    }
    result
}

/// Energy with one decimal and thousands separators
pub fn format_kwh(kwh: f64) -> String {
    format!("{} kWh", format_grouped(kwh, 1))
}

/// Currency with two decimals and thousands separators
pub fn format_currency(amount: f64) -> String {
    format!("${}", format_grouped(amount, 2))
}

/// Headline cards for the top of the report
///
/// Daily-history cards come first and only when that table has rows; the
/// session cost card is added when the session table has rows.
pub fn summary_cards(rows: &[DailyAggregate], sessions: &[ChargeSession]) -> Vec<Card> {
    let mut cards = Vec::new();

    if !rows.is_empty() {
        let summary = AggregateSummary::from_rows(rows);
        let peak_kwh = summary.peak_day.map(|(_, kwh)| kwh).unwrap_or_default();

        cards.push(Card::new("Total (31d)", format_kwh(summary.total_kwh)));
        cards.push(Card::new("Daily Avg", format_kwh(summary.daily_mean_kwh)));
        cards.push(Card::new(
            "Charging Days",
            format!("{} / {}", summary.charging_days, summary.day_count),
        ));
        cards.push(Card::new("Peak Day", format!("{peak_kwh:.1} kWh")));
        cards.push(Card::new("Supercharger", format_kwh(summary.supercharger_kwh)));
    }

    if !sessions.is_empty() {
        let summary = SessionSummary::from_sessions(sessions);
        cards.push(Card::new("SC Cost", format_currency(summary.total_cost)));
    }

    cards
}

/// Key figures of a lone session
pub fn single_session_cards(session: &ChargeSession, tz: &Tz) -> Vec<Card> {
    let rate = match session.rate() {
        Some(rate) => format!("${rate:.3}/kWh"),
        None => "n/a".to_string(),
    };

    vec![
        Card::new("Location", session.location.clone()),
        Card::new(
            "Date",
            session.start_in(tz).format("%b %d, %Y").to_string(),
        ),
        Card::new("Energy", format!("{:.1} kWh", session.kwh)),
        Card::new("Cost", format!("${:.2}", session.cost)),
        Card::new("Duration", format!("{:.0} min", session.duration_min)),
        Card::new("Rate", rate),
    ]
}
