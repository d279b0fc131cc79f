//! Terminal output for a finished run

use chargeboard_report::Card;
use prettytable::{Table, format, row};

/// Summary cards as a two-column table
pub fn summary_table(cards: &[Card]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row![b -> "Metric", b -> "Value"]);
    for card in cards {
        table.add_row(row![card.label, r -> card.value]);
    }
    table
}

/// Dividers of the raw payload preview
pub fn preview_heading(name: &str) -> String {
    format!("─── {name} ───")
}

/// Up to `max_chars` characters of pretty JSON, or `(none)`
pub fn payload_preview(payload: Option<&serde_json::Value>, max_chars: usize) -> String {
    match payload {
        Some(value) => {
            let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            text.chars().take(max_chars).collect()
        }
        None => "(none)".to_string(),
    }
}
