//! Section selection and layout grouping
//!
//! The report is described declaratively: a fixed list of sections, each
//! with the data it needs and groups of placed panels. [`select_sections`]
//! picks the sections the tables support, [`flatten`] turns them into a flat
//! run of placed items, and [`group_blocks`] folds that run into headings,
//! two-column grids and full-width blocks.

use crate::charts::ChartKind;
use chargeboard_core::error::{ChargeboardError, Result};
use Panel::{Chart as C, SessionCards};
use Placement::{FullWidth, Paired};

/// How a panel sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Shares a two-column grid with its neighbours
    Paired,
    /// Takes the whole row
    FullWidth,
}

/// Content of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Chart(ChartKind),
    /// Key figures of the only session
    SessionCards,
}

/// What a section needs from the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// At least one daily row
    DailyRows,
    /// Two or more sessions
    MultipleSessions,
    /// Exactly one session
    SingleSession,
}

impl Requirement {
    pub fn is_met(&self, daily_rows: usize, sessions: usize) -> bool {
        match self {
            Requirement::DailyRows => daily_rows > 0,
            Requirement::MultipleSessions => sessions >= 2,
            Requirement::SingleSession => sessions == 1,
        }
    }
}

/// A report section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub heading: &'static str,
    pub requirement: Requirement,
    /// Each group after the first starts a fresh grid
    pub groups: &'static [&'static [(Panel, Placement)]],
}

/// All sections, in page order
pub const SECTIONS: &[Section] = &[
    Section {
        heading: "Overview — Last 31 Days",
        requirement: Requirement::DailyRows,
        groups: &[&[
            (C(ChartKind::DailyBySource), Paired),
            (C(ChartKind::SourceBreakdown), Paired),
        ]],
    },
    Section {
        heading: "Trends & Patterns",
        requirement: Requirement::DailyRows,
        groups: &[&[
            (C(ChartKind::Cumulative), Paired),
            (C(ChartKind::MovingAverage), Paired),
            (C(ChartKind::WeekdayPattern), Paired),
            (C(ChartKind::SourceArea), Paired),
            (C(ChartKind::WeekdayWeekHeatmap), FullWidth),
        ]],
    },
    Section {
        heading: "Supercharger Analysis",
        requirement: Requirement::MultipleSessions,
        groups: &[
            &[
                (C(ChartKind::SessionEnergy), Paired),
                (C(ChartKind::SessionCost), Paired),
                (C(ChartKind::DurationHistogram), Paired),
                (C(ChartKind::CostVsEnergy), Paired),
                (C(ChartKind::TopLocations), FullWidth),
            ],
            &[
                (C(ChartKind::HourWeekdayHeatmap), Paired),
                (C(ChartKind::MonthlyTrend), Paired),
            ],
        ],
    },
    Section {
        heading: "Latest Supercharger Session",
        requirement: Requirement::SingleSession,
        groups: &[&[(SessionCards, FullWidth)]],
    },
];

/// Sections supported by tables of the given sizes
///
/// Fails with [`ChargeboardError::NoUsableData`] when both tables are empty.
pub fn select_sections(daily_rows: usize, sessions: usize) -> Result<Vec<&'static Section>> {
    if daily_rows == 0 && sessions == 0 {
        return Err(ChargeboardError::NoUsableData);
    }
    Ok(SECTIONS
        .iter()
        .filter(|s| s.requirement.is_met(daily_rows, sessions))
        .collect())
}

/// One item of the flat layout sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Placed<T> {
    Heading(String),
    /// Starts a new paired block without a heading
    Break,
    Panel(T, Placement),
}

/// Flatten sections into placed panels
pub fn flatten(sections: &[&Section]) -> Vec<Placed<Panel>> {
    let mut items = Vec::new();
    for section in sections {
        items.push(Placed::Heading(section.heading.to_string()));
        for (i, group) in section.groups.iter().enumerate() {
            if i > 0 {
                items.push(Placed::Break);
            }
            items.extend(
                group
                    .iter()
                    .map(|(panel, placement)| Placed::Panel(*panel, *placement)),
            );
        }
    }
    items
}

/// A laid-out block of the page
#[derive(Debug, Clone, PartialEq)]
pub enum Block<T> {
    Heading(String),
    /// Two-column grid, never empty
    Grid(Vec<T>),
    Full(T),
}

/// Fold placed items into blocks
///
/// Paired panels collect in the open grid, opening one if needed. A heading
/// or break closes the grid and the next paired panel starts a new one. A
/// full-width panel closes the grid and stands alone.
pub fn group_blocks<T>(items: impl IntoIterator<Item = Placed<T>>) -> Vec<Block<T>> {
    let mut blocks = Vec::new();
    let mut grid: Option<Vec<T>> = None;

    fn close<T>(grid: &mut Option<Vec<T>>, blocks: &mut Vec<Block<T>>) {
        if let Some(panels) = grid.take()
            && !panels.is_empty()
        {
            blocks.push(Block::Grid(panels));
        }
    }

    for item in items {
        match item {
            Placed::Heading(text) => {
                close(&mut grid, &mut blocks);
                blocks.push(Block::Heading(text));
            }
            Placed::Break => close(&mut grid, &mut blocks),
            Placed::Panel(panel, Placement::FullWidth) => {
                close(&mut grid, &mut blocks);
                blocks.push(Block::Full(panel));
            }
            Placed::Panel(panel, Placement::Paired) => {
                grid.get_or_insert_with(Vec::new).push(panel);
            }
        }
    }
    close(&mut grid, &mut blocks);
    blocks
}
