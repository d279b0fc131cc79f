//! Inline SVG chart renderer
//!
//! Draws every [`ChartData`] shape with plotters' SVG backend. The output is
//! a standalone `<svg>` element that the document embeds directly, so the
//! report needs no script runtime.

use crate::charts::{Bubble, Chart, ChartData, ChartKind, ChartRenderer, Series, Slice};
use crate::metrics::HistogramBin;
use crate::theme;
use chargeboard_core::error::{ChargeboardError, Result};
use chrono::{DateTime, NaiveDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use std::f64::consts::PI;
use tracing::debug;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Canvas size of a paired chart
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Renders charts as inline SVG
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Full-width charts get a wider canvas
    fn canvas(&self, kind: ChartKind) -> (u32, u32) {
        match kind {
            ChartKind::WeekdayWeekHeatmap | ChartKind::TopLocations => {
                (self.width * 2, self.height)
            }
            _ => (self.width, self.height),
        }
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, chart: &Chart) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.canvas(chart.kind)).into_drawing_area();
            draw_chart(&root, chart)
                .map_err(|e| ChargeboardError::Render(format!("{}: {}", chart.title, e)))?;
            root.present()
                .map_err(|e| ChargeboardError::Render(format!("{}: {}", chart.title, e)))?;
        }
        debug!("Rendered '{}' ({} bytes of SVG)", chart.title, svg.len());
        Ok(svg)
    }
}

fn color(hex: &str) -> RGBColor {
    let (r, g, b) = theme::rgb(hex);
    RGBColor(r, g, b)
}

fn text_style(size: f64, hex: &str) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&color(hex))
}

fn caption_style() -> TextStyle<'static> {
    text_style(16.0, theme::TEXT)
}

fn label_style() -> TextStyle<'static> {
    text_style(11.0, theme::MUTED_TEXT)
}

/// Upper bound of a value axis starting at zero
fn upper_bound(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// A non-empty range around `[min, max]`
fn padded_range(min: f64, max: f64) -> std::ops::Range<f64> {
    if max > min {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        (min - 1.0)..(max + 1.0)
    }
}

/// Color at position `t` in `[0, 1]` along evenly spaced stops
fn scale_color(stops: &[&str], t: f64) -> RGBColor {
    match stops {
        [] => color(theme::ACCENT),
        [only] => color(only),
        _ => {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let scaled = t * (stops.len() - 1) as f64;
            let i = (scaled.floor() as usize).min(stops.len() - 2);
            let frac = scaled - i as f64;
            let (r0, g0, b0) = theme::rgb(stops[i]);
            let (r1, g1, b1) = theme::rgb(stops[i + 1]);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
            RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
        }
    }
}

/// Label of the category at a segment center
fn category_label(categories: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| categories.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

fn draw_chart(root: &Area<'_>, chart: &Chart) -> DrawResult {
    root.fill(&color(theme::CARD))?;

    match &chart.data {
        ChartData::Columns {
            categories,
            stacks,
            overlay,
        } => draw_columns(root, chart, categories, stacks, overlay.as_ref()),
        ChartData::Bars {
            categories,
            values,
            colors,
        } => draw_bars(root, chart, categories, values, colors),
        ChartData::Areas { categories, layers } => draw_areas(root, chart, categories, layers),
        ChartData::Slices(slices) => draw_donut(root, chart, slices),
        ChartData::Timeline { points, color } => draw_timeline(root, chart, points, color),
        ChartData::Histogram { bins, color } => draw_histogram(root, chart, bins, color),
        ChartData::Bubbles(bubbles) => draw_bubbles(root, chart, bubbles),
        ChartData::Ranking {
            labels,
            values,
            color,
        } => draw_ranking(root, chart, labels, values, color),
        ChartData::Heatmap {
            rows,
            columns,
            values,
            scale,
        } => draw_heatmap(root, chart, rows, columns, values, scale),
        ChartData::DualAxis {
            categories,
            bars,
            line,
        } => draw_dual_axis(root, chart, categories, bars, line),
    }
}

fn draw_no_data(root: &Area<'_>, title: &str) -> DrawResult {
    let area = root.titled(title, caption_style())?;
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data",
        (w as i32 / 2, h as i32 / 2),
        text_style(14.0, theme::MUTED_TEXT).pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;
    Ok(())
}

fn draw_legend<'a, DB: DrawingBackend + 'a, CT: CoordTranslate>(
    chart: &mut ChartContext<'a, DB, CT>,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    chart
        .configure_series_labels()
        .background_style(color(theme::BACKGROUND).mix(0.8))
        .border_style(color(theme::GRID))
        .label_font(text_style(11.0, theme::TEXT))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    Ok(())
}

fn draw_columns(
    root: &Area<'_>,
    chart: &Chart,
    categories: &[String],
    stacks: &[Series],
    overlay: Option<&Series>,
) -> DrawResult {
    if categories.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let n = categories.len();
    let (x_desc, y_desc) = chart.kind.axes();

    let totals: Vec<f64> = (0..n)
        .map(|i| stacks.iter().filter_map(|s| s.values.get(i)).sum())
        .collect();
    let overlay_values = overlay.map(|o| o.values.clone()).unwrap_or_default();
    let y_max = upper_bound(totals.iter().chain(overlay_values.iter()).copied());

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d((0..n as i32).into_segmented(), 0.0..y_max)?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(8)
        .x_label_formatter(&|v| category_label(categories, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .disable_x_mesh()
        .draw()?;

    let opacity = if overlay.is_some() { 0.35 } else { 1.0 };
    let mut bottoms = vec![0.0; n];
    for series in stacks {
        let c = color(series.color);
        let bars: Vec<_> = series
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, v)| {
                let bottom = bottoms[i];
                bottoms[i] += v;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i as i32), bottom),
                        (SegmentValue::Exact(i as i32 + 1), bottom + v),
                    ],
                    c.mix(opacity).filled(),
                );
                bar.set_margin(0, 0, 2, 2);
                bar
            })
            .collect();
        ctx.draw_series(bars)?
            .label(series.label.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 10, y + 4)], c.filled()));
    }

    if let Some(line) = overlay {
        let c = color(line.color);
        ctx.draw_series(LineSeries::new(
            line.values
                .iter()
                .enumerate()
                .map(|(i, v)| (SegmentValue::CenterOf(i as i32), *v)),
            c.stroke_width(3),
        ))?
        .label(line.label.clone())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], c.stroke_width(3)));
    }

    if stacks.len() > 1 || overlay.is_some() {
        draw_legend(&mut ctx)?;
    }
    Ok(())
}

fn draw_bars(
    root: &Area<'_>,
    chart: &Chart,
    categories: &[String],
    values: &[f64],
    colors: &[&'static str],
) -> DrawResult {
    if categories.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let (x_desc, y_desc) = chart.kind.axes();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d(
            (0..categories.len() as i32).into_segmented(),
            0.0..upper_bound(values.iter().copied()),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(categories.len())
        .x_label_formatter(&|v| category_label(categories, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .disable_x_mesh()
        .draw()?;

    ctx.draw_series(values.iter().enumerate().map(|(i, v)| {
        let c = color(colors.get(i).copied().unwrap_or(theme::ACCENT));
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), *v),
            ],
            c.filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;
    Ok(())
}

fn draw_areas(
    root: &Area<'_>,
    chart: &Chart,
    categories: &[String],
    layers: &[Series],
) -> DrawResult {
    if categories.is_empty() || layers.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let n = categories.len();
    let (x_desc, y_desc) = chart.kind.axes();

    // Cumulative tops, one vector per layer
    let mut tops: Vec<Vec<f64>> = Vec::with_capacity(layers.len());
    for layer in layers {
        let below = tops.last().cloned().unwrap_or_else(|| vec![0.0; n]);
        tops.push(
            (0..n)
                .map(|i| below[i] + layer.values.get(i).copied().unwrap_or(0.0))
                .collect(),
        );
    }
    let y_max = upper_bound(tops.last().into_iter().flatten().copied());

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d((0..n as i32).into_segmented(), 0.0..y_max)?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(8)
        .x_label_formatter(&|v| category_label(categories, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .draw()?;

    let single = layers.len() == 1;
    // Top layer first so lower layers paint over it
    for (layer, top) in layers.iter().zip(&tops).rev() {
        let c = color(layer.color);
        let fill = if single { c.mix(0.15) } else { c.mix(0.8) };
        let border = if single { c.stroke_width(2) } else { c.stroke_width(1) };
        ctx.draw_series(
            AreaSeries::new(
                top.iter()
                    .enumerate()
                    .map(|(i, v)| (SegmentValue::CenterOf(i as i32), *v)),
                0.0,
                fill,
            )
            .border_style(border),
        )?
        .label(layer.label.clone())
        .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 10, y + 4)], c.filled()));
    }

    if !single {
        draw_legend(&mut ctx)?;
    }
    Ok(())
}

fn draw_donut(root: &Area<'_>, chart: &Chart, slices: &[Slice]) -> DrawResult {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if slices.is_empty() || total <= 0.0 {
        return draw_no_data(root, &chart.title);
    }

    let area = root.titled(&chart.title, caption_style())?;
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);
    let center = (w * 0.4, h / 2.0);
    let outer = (w.min(h) / 2.0) * 0.85;
    let inner = outer * 0.55;

    let point = |radius: f64, angle: f64| -> (i32, i32) {
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };

    // Start at twelve o'clock, clockwise
    let mut start = -PI / 2.0;
    for (idx, slice) in slices.iter().enumerate() {
        let sweep = 2.0 * PI * slice.value / total;
        let end = start + sweep;
        let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;

        let mut outline: Vec<(i32, i32)> = (0..=steps)
            .map(|k| point(outer, start + sweep * k as f64 / steps as f64))
            .collect();
        outline.extend((0..=steps).rev().map(|k| point(inner, start + sweep * k as f64 / steps as f64)));
        area.draw(&Polygon::new(outline, color(slice.color).filled()))?;

        let mid = start + sweep / 2.0;
        let percent = 100.0 * slice.value / total;
        area.draw(&Text::new(
            format!("{percent:.0}%"),
            point((outer + inner) / 2.0, mid),
            text_style(12.0, "#ffffff").pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;

        let legend_x = (w * 0.78) as i32;
        let legend_y = (h / 2.0) as i32 - 12 * slices.len() as i32 + 24 * idx as i32;
        area.draw(&Rectangle::new(
            [(legend_x, legend_y - 5), (legend_x + 10, legend_y + 5)],
            color(slice.color).filled(),
        ))?;
        area.draw(&Text::new(
            format!("{} ({:.1} kWh)", slice.label, slice.value),
            (legend_x + 16, legend_y),
            text_style(12.0, theme::TEXT).pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;

        start = end;
    }
    Ok(())
}

fn to_days(t: &NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

fn day_label(x: &f64) -> String {
    DateTime::from_timestamp((x * SECONDS_PER_DAY) as i64, 0)
        .map(|d| d.format("%b %d").to_string())
        .unwrap_or_default()
}

fn draw_timeline(
    root: &Area<'_>,
    chart: &Chart,
    points: &[(NaiveDateTime, f64)],
    hex: &str,
) -> DrawResult {
    if points.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let (x_desc, y_desc) = chart.kind.axes();
    let series: Vec<(f64, f64)> = points.iter().map(|(t, v)| (to_days(t), *v)).collect();
    let x_min = series.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = series.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d(
            padded_range(x_min, x_max),
            0.0..upper_bound(series.iter().map(|p| p.1)),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(6)
        .x_label_formatter(&day_label)
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .draw()?;

    let c = color(hex);
    ctx.draw_series(LineSeries::new(series.iter().copied(), c.stroke_width(2)))?;
    ctx.draw_series(series.iter().map(|p| Circle::new(*p, 4, c.filled())))?;
    Ok(())
}

fn draw_histogram(root: &Area<'_>, chart: &Chart, bins: &[HistogramBin], hex: &str) -> DrawResult {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_no_data(root, &chart.title);
    };
    let (x_desc, y_desc) = chart.kind.axes();
    // A single degenerate bin still needs some width
    let (lo, hi) = if last.end > first.start {
        (first.start, last.end)
    } else {
        (first.start - 0.5, first.start + 0.5)
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d(
            padded_range(lo, hi),
            0.0..upper_bound(bins.iter().map(|b| f64::from(b.count))),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .disable_x_mesh()
        .draw()?;

    let c = color(hex);
    ctx.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
        let (start, end) = if b.end > b.start { (b.start, b.end) } else { (lo, hi) };
        let mut bar = Rectangle::new([(start, 0.0), (end, f64::from(b.count))], c.filled());
        bar.set_margin(0, 0, 1, 1);
        bar
    }))?;
    Ok(())
}

fn draw_bubbles(root: &Area<'_>, chart: &Chart, bubbles: &[Bubble]) -> DrawResult {
    if bubbles.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let (x_desc, y_desc) = chart.kind.axes();
    let longest = bubbles.iter().map(|b| b.duration_min).fold(0.0_f64, f64::max);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d(
            0.0..upper_bound(bubbles.iter().map(|b| b.kwh)),
            0.0..upper_bound(bubbles.iter().map(|b| b.cost)),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .draw()?;

    let scale = [theme::PURPLE, theme::TEAL, theme::GREEN];
    ctx.draw_series(bubbles.iter().map(|b| {
        let t = if longest > 0.0 { b.duration_min / longest } else { 0.0 };
        Circle::new(
            (b.kwh, b.cost),
            b.radius().round() as i32,
            scale_color(&scale, t).mix(0.8).filled(),
        )
    }))?;
    Ok(())
}

fn draw_ranking(
    root: &Area<'_>,
    chart: &Chart,
    labels: &[String],
    values: &[f64],
    hex: &str,
) -> DrawResult {
    if labels.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let (x_desc, _) = chart.kind.axes();
    let short: Vec<String> = labels.iter().map(|l| truncate(l, 28)).collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(190)
        .build_cartesian_2d(
            0.0..upper_bound(values.iter().copied()),
            (0..labels.len() as i32).into_segmented(),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_labels(labels.len())
        .y_label_formatter(&|v| category_label(&short, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .disable_y_mesh()
        .draw()?;

    let c = color(hex);
    ctx.draw_series(values.iter().enumerate().map(|(i, v)| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i as i32)),
                (*v, SegmentValue::Exact(i as i32 + 1)),
            ],
            c.filled(),
        );
        bar.set_margin(2, 2, 0, 0);
        bar
    }))?;
    Ok(())
}

fn draw_heatmap(
    root: &Area<'_>,
    chart: &Chart,
    rows: &[String],
    columns: &[String],
    values: &[Vec<f64>],
    scale: &[&'static str],
) -> DrawResult {
    if rows.is_empty() || columns.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let (x_desc, y_desc) = chart.kind.axes();
    let n_rows = rows.len() as i32;
    let max = values.iter().flatten().copied().fold(0.0_f64, f64::max);
    // First row is drawn at the top
    let flipped: Vec<String> = rows.iter().rev().cloned().collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .build_cartesian_2d(
            (0..columns.len() as i32).into_segmented(),
            (0..n_rows).into_segmented(),
        )?;

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(columns.len())
        .y_labels(rows.len())
        .x_label_formatter(&|v| category_label(columns, v))
        .y_label_formatter(&|v| category_label(&flipped, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .disable_mesh()
        .draw()?;

    let cells = values.iter().enumerate().flat_map(|(r, row)| {
        let y = n_rows - 1 - r as i32;
        row.iter().enumerate().map(move |(col, v)| {
            let t = if max > 0.0 { v / max } else { 0.0 };
            let mut cell = Rectangle::new(
                [
                    (SegmentValue::Exact(col as i32), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(col as i32 + 1), SegmentValue::Exact(y + 1)),
                ],
                scale_color(scale, t).filled(),
            );
            cell.set_margin(1, 1, 1, 1);
            cell
        })
    });
    ctx.draw_series(cells)?;
    Ok(())
}

fn draw_dual_axis(
    root: &Area<'_>,
    chart: &Chart,
    categories: &[String],
    bars: &Series,
    line: &Series,
) -> DrawResult {
    if categories.is_empty() {
        return draw_no_data(root, &chart.title);
    }
    let n = categories.len() as i32;
    let (x_desc, y_desc) = chart.kind.axes();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, caption_style())
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(52)
        .right_y_label_area_size(52)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..upper_bound(bars.values.iter().copied()))?
        .set_secondary_coord((0..n).into_segmented(), 0.0..upper_bound(line.values.iter().copied()));

    ctx.configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(categories.len())
        .x_label_formatter(&|v| category_label(categories, v))
        .label_style(label_style())
        .axis_desc_style(label_style())
        .axis_style(color(theme::GRID))
        .bold_line_style(color(theme::GRID))
        .light_line_style(color(theme::CARD))
        .disable_x_mesh()
        .draw()?;

    ctx.configure_secondary_axes()
        .y_desc(line.label.clone())
        .label_style(label_style())
        .axis_style(color(theme::GRID))
        .draw()?;

    let bar_color = color(bars.color);
    ctx.draw_series(bars.values.iter().enumerate().map(|(i, v)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), *v),
            ],
            bar_color.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;

    let line_color = color(line.color);
    let points: Vec<(SegmentValue<i32>, f64)> = line
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (SegmentValue::CenterOf(i as i32), *v))
        .collect();
    ctx.draw_secondary_series(LineSeries::new(points.clone(), line_color.stroke_width(2)))?;
    ctx.draw_secondary_series(
        points
            .into_iter()
            .map(|p| Circle::new(p, 4, line_color.filled())),
    )?;
    Ok(())
}
