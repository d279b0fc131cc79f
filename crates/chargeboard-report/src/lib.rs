//! Metrics and report composition for chargeboard
//!
//! This crate turns the canonical charging tables into derived metrics and
//! composes them, with summary cards and charts, into one self-contained
//! HTML document. Chart drawing sits behind the [`ChartRenderer`] trait;
//! [`SvgRenderer`] draws inline SVG with plotters.

pub mod cards;
pub mod charts;
pub mod document;
pub mod layout;
pub mod metrics;
pub mod svg;
pub mod theme;

pub use cards::{Card, single_session_cards, summary_cards};
pub use charts::{Chart, ChartData, ChartKind, ChartRenderer};
pub use document::ReportComposer;
pub use layout::{Block, Placed, Placement, Section, group_blocks, select_sections};
pub use metrics::{AggregateSummary, SessionSummary};
pub use svg::SvgRenderer;
