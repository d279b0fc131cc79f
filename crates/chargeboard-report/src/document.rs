//! HTML document assembly

use crate::cards::{Card, single_session_cards, summary_cards};
use crate::charts::{Chart, ChartRenderer, Tables};
use crate::layout::{Block, Panel, Placed, flatten, group_blocks, select_sections};
use crate::theme;
use chargeboard_core::error::Result;
use chargeboard_core::types::{ChargeSession, DailyAggregate};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write;
use tracing::{debug, info};

pub const DOCUMENT_TITLE: &str = "Tesla Charging Dashboard";

/// A panel after rendering
#[derive(Debug, Clone, PartialEq)]
enum Rendered {
    Chart { id: &'static str, markup: String },
    Cards(String),
}

/// Builds the dashboard document from the canonical tables
pub struct ReportComposer<R: ChartRenderer> {
    renderer: R,
    tz: Tz,
    generated_at: Option<DateTime<Utc>>,
}

impl<R: ChartRenderer> ReportComposer<R> {
    pub fn new(renderer: R, tz: Tz) -> Self {
        Self {
            renderer,
            tz,
            generated_at: None,
        }
    }

    /// Fix the generation timestamp shown in the header
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Compose the full HTML document
    ///
    /// Fails with `NoUsableData` when both tables are empty and with the
    /// renderer's error when a chart cannot be drawn.
    pub fn compose(&self, rows: &[DailyAggregate], sessions: &[ChargeSession]) -> Result<String> {
        let sections = select_sections(rows.len(), sessions.len())?;
        debug!(
            "Selected sections: {:?}",
            sections.iter().map(|s| s.heading).collect::<Vec<_>>()
        );

        let tables = Tables {
            rows,
            sessions,
            tz: self.tz,
        };

        let mut placed = Vec::new();
        for item in flatten(&sections) {
            placed.push(match item {
                Placed::Heading(text) => Placed::Heading(text),
                Placed::Break => Placed::Break,
                Placed::Panel(panel, placement) => {
                    Placed::Panel(self.render_panel(panel, &tables)?, placement)
                }
            });
        }
        let blocks = group_blocks(placed);

        let generated = self
            .generated_at
            .unwrap_or_else(Utc::now)
            .with_timezone(&self.tz);
        let html = document(
            &generated.format("%Y-%m-%d %H:%M").to_string(),
            &summary_cards(rows, sessions),
            &blocks,
        );
        info!(
            "Composed report with {} sections ({} bytes)",
            sections.len(),
            html.len()
        );
        Ok(html)
    }

    fn render_panel(&self, panel: Panel, tables: &Tables<'_>) -> Result<Rendered> {
        match panel {
            Panel::Chart(kind) => {
                let chart = Chart::build(kind, tables);
                Ok(Rendered::Chart {
                    id: kind.id(),
                    markup: self.renderer.render(&chart)?,
                })
            }
            Panel::SessionCards => {
                let cards = tables
                    .sessions
                    .first()
                    .map(|s| single_session_cards(s, &tables.tz))
                    .unwrap_or_default();
                Ok(Rendered::Cards(cards_html(&cards)))
            }
        }
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn cards_html(cards: &[Card]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<div class="cards">"#);
    for card in cards {
        let _ = write!(
            html,
            r#"<div class="card"><div class="card-label">{}</div><div class="card-value">{}</div></div>"#,
            escape_html(&card.label),
            escape_html(&card.value)
        );
    }
    html.push_str("</div>");
    html
}

fn panel_html(panel: &Rendered, full_width: bool) -> String {
    match panel {
        Rendered::Chart { id, markup } => {
            let class = if full_width { "chart-full" } else { "chart" };
            format!(r#"<div class="{class}" data-chart="{id}">{markup}</div>"#)
        }
        // Cards carry their own frames
        Rendered::Cards(html) => html.clone(),
    }
}

fn stylesheet() -> String {
    format!(
        r#"  :root {{ --bg: {bg}; --card: {card}; --text: {text};
           --accent: {accent}; --grid: {grid}; }}
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ background: var(--bg); color: var(--text);
          font-family: Inter, -apple-system, BlinkMacSystemFont, sans-serif;
          padding: 24px; max-width: 1400px; margin: 0 auto; }}
  h1 {{ font-size: 1.8rem; margin-bottom: 4px; }}
  .subtitle {{ color: {muted}; font-size: 0.85rem; margin-bottom: 24px; }}
  h2 {{ font-size: 1.2rem; margin: 32px 0 12px; color: #ccc; }}
  .cards {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 12px; margin-bottom: 24px; }}
  .card {{ background: var(--card); border-radius: 10px; padding: 16px 20px;
           border: 1px solid var(--grid); }}
  .card-label {{ font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em;
                 color: {muted}; margin-bottom: 4px; }}
  .card-value {{ font-size: 1.3rem; font-weight: 600; }}
  .grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }}
  .chart, .chart-full {{ background: var(--card); border-radius: 10px; padding: 12px;
                         border: 1px solid var(--grid); min-height: 340px; }}
  .chart svg, .chart-full svg {{ width: 100%; height: auto; display: block; }}
  .chart-full {{ margin: 16px 0; }}
  @media (max-width: 900px) {{ .grid {{ grid-template-columns: 1fr; }} }}
  .footer {{ text-align: center; color: #555; font-size: 0.75rem; margin-top: 40px; }}
"#,
        bg = theme::BACKGROUND,
        card = theme::CARD,
        text = theme::TEXT,
        accent = theme::ACCENT,
        grid = theme::GRID,
        muted = theme::MUTED_TEXT,
    )
}

fn document(generated: &str, cards: &[Card], blocks: &[Block<Rendered>]) -> String {
    let mut body = String::new();
    for block in blocks {
        match block {
            Block::Heading(text) => {
                let _ = write!(body, "<h2>{}</h2>", escape_html(text));
            }
            Block::Grid(panels) => {
                body.push_str(r#"<div class="grid">"#);
                for panel in panels {
                    body.push_str(&panel_html(panel, false));
                }
                body.push_str("</div>");
            }
            Block::Full(panel) => body.push_str(&panel_html(panel, true)),
        }
        body.push('\n');
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{DOCUMENT_TITLE}</title>
<style>
{style}</style>
</head>
<body>
<h1>{DOCUMENT_TITLE}</h1>
<p class="subtitle">Generated {generated}</p>
{cards}
{body}<p class="footer">Data from Tesla API · Charts rendered as inline SVG</p>
</body>
</html>
"#,
        style = stylesheet(),
        cards = cards_html(cards),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartData, ChartKind};
    use chargeboard_core::error::ChargeboardError;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::RefCell;

    /// Records every chart it is asked to draw
    #[derive(Default)]
    struct StubRenderer {
        drawn: RefCell<Vec<Chart>>,
    }

    impl ChartRenderer for &StubRenderer {
        fn render(&self, chart: &Chart) -> Result<String> {
            self.drawn.borrow_mut().push(chart.clone());
            Ok(format!("<svg>{}</svg>", chart.kind.id()))
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, chart: &Chart) -> Result<String> {
            Err(ChargeboardError::Render(chart.title.clone()))
        }
    }

    fn row(d: u32, total: f64) -> DailyAggregate {
        DailyAggregate::new(
            NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            total,
            total,
            0.0,
            0.0,
        )
    }

    fn session(day: u32, location: &str) -> ChargeSession {
        ChargeSession {
            start: Utc
                .with_ymd_and_hms(2024, 6, day, 12, 0, 0)
                .unwrap()
                .fixed_offset(),
            duration_min: 30.0,
            kwh: 35.0,
            cost: 12.25,
            location: location.to_string(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 8, 15, 0).unwrap()
    }

    #[test]
    fn test_aggregate_only_document() {
        let stub = StubRenderer::default();
        let html = ReportComposer::new(&stub, Tz::UTC)
            .with_generated_at(fixed_time())
            .compose(&[row(1, 10.0)], &[])
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Generated 2024-06-30 08:15"));
        assert!(html.contains("Overview — Last 31 Days"));
        assert!(html.contains("Trends &amp; Patterns"));
        assert!(!html.contains("Supercharger Analysis"));
        assert!(!html.contains("Latest Supercharger Session"));
        assert!(html.contains(r#"<div class="card-value">10.0 kWh</div>"#));
        assert!(!html.contains("SC Cost"));
        assert!(html.contains(r#"<div class="chart-full" data-chart="weekday-week-heatmap">"#));
        assert!(!html.contains("<script"));

        let kinds: Vec<ChartKind> = stub.drawn.borrow().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChartKind::DailyBySource,
                ChartKind::SourceBreakdown,
                ChartKind::Cumulative,
                ChartKind::MovingAverage,
                ChartKind::WeekdayPattern,
                ChartKind::SourceArea,
                ChartKind::WeekdayWeekHeatmap,
            ]
        );
    }

    #[test]
    fn test_single_session_document() {
        let stub = StubRenderer::default();
        let html = ReportComposer::new(&stub, Tz::UTC)
            .with_generated_at(fixed_time())
            .compose(&[], &[session(3, "Barstow <North>")])
            .unwrap();

        assert!(html.contains("<h2>Latest Supercharger Session</h2>"));
        assert!(html.contains("Barstow &lt;North&gt;"));
        assert!(html.contains("$0.350/kWh"));
        assert!(!html.contains("Supercharger Analysis"));
        assert!(stub.drawn.borrow().is_empty());
    }

    #[test]
    fn test_session_analysis_layout() {
        let stub = StubRenderer::default();
        let sessions = vec![session(1, "A"), session(2, "B"), session(9, "A")];
        let html = ReportComposer::new(&stub, Tz::UTC)
            .compose(&[], &sessions)
            .unwrap();

        assert!(html.contains("<h2>Supercharger Analysis</h2>"));
        assert!(!html.contains("Latest Supercharger Session"));
        // Four paired charts, the full-width ranking, then a new grid
        let analysis = html.split("<h2>Supercharger Analysis</h2>").nth(1).unwrap();
        let grids: Vec<_> = analysis.match_indices(r#"<div class="grid">"#).collect();
        assert_eq!(grids.len(), 2);
        let full = analysis.find(r#"data-chart="top-locations""#).unwrap();
        assert!(grids[0].0 < full && full < grids[1].0);

        let drawn = stub.drawn.borrow();
        let ranking = drawn
            .iter()
            .find(|c| c.kind == ChartKind::TopLocations)
            .unwrap();
        match &ranking.data {
            ChartData::Ranking { labels, values, .. } => {
                assert_eq!(labels, &vec!["B".to_string(), "A".to_string()]);
                assert_eq!(values, &vec![35.0, 70.0]);
            }
            other => panic!("unexpected data {other:?}"),
        }
    }

    #[test]
    fn test_no_usable_data() {
        let result = ReportComposer::new(FailingRenderer, Tz::UTC).compose(&[], &[]);
        assert!(matches!(result, Err(ChargeboardError::NoUsableData)));
    }

    #[test]
    fn test_renderer_error_propagates() {
        let result = ReportComposer::new(FailingRenderer, Tz::UTC).compose(&[row(1, 5.0)], &[]);
        assert!(matches!(result, Err(ChargeboardError::Render(_))));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
