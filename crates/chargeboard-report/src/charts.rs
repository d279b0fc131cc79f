//! Chart descriptions
//!
//! A [`Chart`] pairs a [`ChartKind`] with the derived table it plots. Charts
//! are built only from the canonical tables and the metrics computed over
//! them; drawing is left to a [`ChartRenderer`].

use crate::metrics::{self, HistogramBin, WEEKDAY_LABELS};
use crate::theme;
use chargeboard_core::error::Result;
use chargeboard_core::types::{ChargeSession, DailyAggregate, EnergySource};
use chrono::NaiveDateTime;
use chrono_tz::Tz;

/// Every chart the report can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    DailyBySource,
    SourceBreakdown,
    Cumulative,
    MovingAverage,
    WeekdayPattern,
    SourceArea,
    WeekdayWeekHeatmap,
    SessionEnergy,
    SessionCost,
    DurationHistogram,
    CostVsEnergy,
    TopLocations,
    HourWeekdayHeatmap,
    MonthlyTrend,
}

impl ChartKind {
    /// Stable identifier, used as an HTML attribute
    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::DailyBySource => "daily-by-source",
            ChartKind::SourceBreakdown => "source-breakdown",
            ChartKind::Cumulative => "cumulative",
            ChartKind::MovingAverage => "moving-average",
            ChartKind::WeekdayPattern => "weekday-pattern",
            ChartKind::SourceArea => "source-area",
            ChartKind::WeekdayWeekHeatmap => "weekday-week-heatmap",
            ChartKind::SessionEnergy => "session-energy",
            ChartKind::SessionCost => "session-cost",
            ChartKind::DurationHistogram => "duration-histogram",
            ChartKind::CostVsEnergy => "cost-vs-energy",
            ChartKind::TopLocations => "top-locations",
            ChartKind::HourWeekdayHeatmap => "hour-weekday-heatmap",
            ChartKind::MonthlyTrend => "monthly-trend",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::DailyBySource => "Daily Charging (kWh)",
            ChartKind::SourceBreakdown => "Charging Source Breakdown",
            ChartKind::Cumulative => "Cumulative Energy Charged",
            ChartKind::MovingAverage => "Daily Charging with 7-Day Moving Average",
            ChartKind::WeekdayPattern => "Average Daily Charging by Day of Week",
            ChartKind::SourceArea => "Charging Sources Over Time",
            ChartKind::WeekdayWeekHeatmap => "Charging Heatmap (Day vs Week)",
            ChartKind::SessionEnergy => "Energy per Supercharger Session",
            ChartKind::SessionCost => "Cost per Supercharger Session",
            ChartKind::DurationHistogram => "Session Duration Distribution",
            ChartKind::CostVsEnergy => "Cost vs Energy (bubble = duration)",
            ChartKind::TopLocations => "Top Supercharger Locations (by kWh)",
            ChartKind::HourWeekdayHeatmap => "Charging Time Heatmap",
            ChartKind::MonthlyTrend => "Monthly Supercharger Spending",
        }
    }

    /// Horizontal and vertical axis descriptions
    pub fn axes(&self) -> (&'static str, &'static str) {
        match self {
            ChartKind::DailyBySource
            | ChartKind::Cumulative
            | ChartKind::MovingAverage
            | ChartKind::SourceArea
            | ChartKind::SessionEnergy => ("Date", "kWh"),
            ChartKind::SessionCost => ("Date", "Cost ($)"),
            ChartKind::WeekdayPattern => ("Day", "Avg kWh"),
            ChartKind::WeekdayWeekHeatmap => ("Week", ""),
            ChartKind::DurationHistogram => ("Minutes", "Sessions"),
            ChartKind::CostVsEnergy => ("kWh", "Cost ($)"),
            ChartKind::TopLocations => ("Total kWh", ""),
            ChartKind::HourWeekdayHeatmap => ("Hour of Day", ""),
            ChartKind::MonthlyTrend => ("", "kWh"),
            ChartKind::SourceBreakdown => ("", ""),
        }
    }
}

/// A named run of values with its color
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, color: &'static str, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            color,
            values,
        }
    }
}

/// One donut slice
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub color: &'static str,
    pub value: f64,
}

/// One point of the cost/energy scatter
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub kwh: f64,
    pub cost: f64,
    pub duration_min: f64,
    pub location: String,
}

impl Bubble {
    /// Marker radius, growing with duration and never below a floor
    pub fn radius(&self) -> f64 {
        self.duration_min.max(5.0) / 2.0
    }
}

/// The derived table behind a chart
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Stacked columns per category, with an optional line on top
    Columns {
        categories: Vec<String>,
        stacks: Vec<Series>,
        overlay: Option<Series>,
    },
    /// Single columns, each with its own color
    Bars {
        categories: Vec<String>,
        values: Vec<f64>,
        colors: Vec<&'static str>,
    },
    /// Filled areas stacked in order, first layer at the bottom
    Areas {
        categories: Vec<String>,
        layers: Vec<Series>,
    },
    Slices(Vec<Slice>),
    /// Values at irregular points in time
    Timeline {
        points: Vec<(NaiveDateTime, f64)>,
        color: &'static str,
    },
    Histogram {
        bins: Vec<HistogramBin>,
        color: &'static str,
    },
    Bubbles(Vec<Bubble>),
    /// Horizontal bars, listed bottom to top
    Ranking {
        labels: Vec<String>,
        values: Vec<f64>,
        color: &'static str,
    },
    /// `values[row][column]`
    Heatmap {
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
        /// Color scale from the smallest to the largest value
        scale: Vec<&'static str>,
    },
    /// Columns on the primary axis, a line on the secondary axis
    DualAxis {
        categories: Vec<String>,
        bars: Series,
        line: Series,
    },
}

/// A chart ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub data: ChartData,
}

/// Capability to turn a chart into an HTML fragment
pub trait ChartRenderer {
    fn render(&self, chart: &Chart) -> Result<String>;
}

/// The canonical tables and display timezone charts are built from
#[derive(Debug, Clone)]
pub struct Tables<'a> {
    pub rows: &'a [DailyAggregate],
    pub sessions: &'a [ChargeSession],
    pub tz: Tz,
}

fn source_color(source: EnergySource) -> &'static str {
    match source {
        EnergySource::Home => theme::GREEN,
        EnergySource::Supercharger => theme::ACCENT,
        EnergySource::Other => theme::ORANGE,
    }
}

fn date_labels(rows: &[DailyAggregate]) -> Vec<String> {
    rows.iter().map(|r| r.date.format("%b %d").to_string()).collect()
}

impl Chart {
    /// Build the chart of the given kind from the tables
    pub fn build(kind: ChartKind, tables: &Tables<'_>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            data: build_data(kind, tables),
        }
    }
}

fn build_data(kind: ChartKind, tables: &Tables<'_>) -> ChartData {
    let rows = metrics::sorted_by_date(tables.rows);
    let sessions = tables.sessions;

    match kind {
        ChartKind::DailyBySource => ChartData::Columns {
            categories: date_labels(&rows),
            stacks: EnergySource::ALL
                .iter()
                .map(|s| {
                    Series::new(
                        s.label(),
                        source_color(*s),
                        rows.iter().map(|r| r.source(*s)).collect(),
                    )
                })
                .collect(),
            overlay: None,
        },
        ChartKind::SourceBreakdown => ChartData::Slices(
            metrics::source_totals(&rows)
                .into_iter()
                .map(|(source, value)| Slice {
                    label: source.label().to_string(),
                    color: source_color(source),
                    value,
                })
                .collect(),
        ),
        ChartKind::Cumulative => ChartData::Areas {
            categories: date_labels(&rows),
            layers: vec![Series::new(
                "Cumulative",
                theme::ACCENT,
                metrics::cumulative_energy(&rows)
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect(),
            )],
        },
        ChartKind::MovingAverage => ChartData::Columns {
            categories: date_labels(&rows),
            stacks: vec![Series::new(
                "Daily",
                theme::ACCENT,
                rows.iter().map(|r| r.total_kwh).collect(),
            )],
            overlay: Some(Series::new(
                "7-day avg",
                theme::ORANGE,
                metrics::moving_average(&rows, metrics::MOVING_AVERAGE_WINDOW)
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect(),
            )),
        },
        ChartKind::WeekdayPattern => {
            let means = metrics::weekday_mean_energy(&rows);
            let peak = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            ChartData::Bars {
                categories: WEEKDAY_LABELS.iter().map(|d| d.to_string()).collect(),
                colors: means
                    .iter()
                    .map(|v| if *v == peak { theme::ACCENT } else { theme::TEAL })
                    .collect(),
                values: means.to_vec(),
            }
        }
        ChartKind::SourceArea => ChartData::Areas {
            categories: date_labels(&rows),
            layers: [
                EnergySource::Other,
                EnergySource::Supercharger,
                EnergySource::Home,
            ]
            .iter()
            .filter(|s| rows.iter().map(|r| r.source(**s)).sum::<f64>() > 0.0)
            .map(|s| {
                Series::new(
                    s.label(),
                    source_color(*s),
                    rows.iter().map(|r| r.source(*s)).collect(),
                )
            })
            .collect(),
        },
        ChartKind::WeekdayWeekHeatmap => {
            let matrix = metrics::weekday_week_energy(&rows);
            ChartData::Heatmap {
                rows: WEEKDAY_LABELS.iter().map(|d| d.to_string()).collect(),
                columns: matrix.week_labels(),
                values: matrix.cells.to_vec(),
                scale: vec![theme::CARD, theme::ACCENT, theme::GREEN],
            }
        }
        ChartKind::SessionEnergy => ChartData::Timeline {
            points: sessions
                .iter()
                .map(|s| (s.start_in(&tables.tz).naive_local(), s.kwh))
                .collect(),
            color: theme::ACCENT,
        },
        ChartKind::SessionCost => ChartData::Timeline {
            points: sessions
                .iter()
                .map(|s| (s.start_in(&tables.tz).naive_local(), s.cost))
                .collect(),
            color: theme::GREEN,
        },
        ChartKind::DurationHistogram => ChartData::Histogram {
            bins: metrics::duration_histogram(sessions, metrics::DURATION_BINS),
            color: theme::PURPLE,
        },
        ChartKind::CostVsEnergy => ChartData::Bubbles(
            sessions
                .iter()
                .map(|s| Bubble {
                    kwh: s.kwh,
                    cost: s.cost,
                    duration_min: s.duration_min,
                    location: s.location.clone(),
                })
                .collect(),
        ),
        ChartKind::TopLocations => {
            let ranked = metrics::energy_by_location(sessions, metrics::TOP_LOCATIONS);
            let (labels, values) = ranked.into_iter().unzip();
            ChartData::Ranking {
                labels,
                values,
                color: theme::TEAL,
            }
        }
        ChartKind::HourWeekdayHeatmap => {
            let counts = metrics::hour_weekday_counts(sessions, &tables.tz);
            ChartData::Heatmap {
                rows: WEEKDAY_LABELS.iter().map(|d| d.to_string()).collect(),
                columns: (0..24).map(|h| h.to_string()).collect(),
                values: counts
                    .iter()
                    .map(|row| row.iter().map(|c| f64::from(*c)).collect())
                    .collect(),
                scale: vec![theme::CARD, theme::ACCENT],
            }
        }
        ChartKind::MonthlyTrend => {
            let monthly = metrics::monthly_totals(sessions, &tables.tz);
            ChartData::DualAxis {
                categories: monthly.iter().map(|m| m.month.clone()).collect(),
                bars: Series::new("kWh", theme::ACCENT, monthly.iter().map(|m| m.kwh).collect()),
                line: Series::new(
                    "Cost ($)",
                    theme::GREEN,
                    monthly.iter().map(|m| m.cost).collect(),
                ),
            }
        }
    }
}
