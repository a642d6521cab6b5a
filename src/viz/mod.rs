//! Visualization engine: render projection charts to **SVG**.
//!
//! - Line and stacked-bar renderers sharing one scale/axis layout
//! - Dashed tax-bracket overlay lines with per-jurisdiction dash patterns
//! - Hit maps for the shared tooltip (points, bar segments, column totals)
//! - Fixed 800x400 view box scaled by the embedding page

pub mod refline;
pub mod scale;
pub mod stack;
pub mod tooltip;
pub mod types;
pub mod util;

// Re-export types for public API
pub use refline::{BracketOverlay, DeductionRule, LineSegment, OverlayStyle, ReferenceLineSpec};
pub use tooltip::{HitMap, HitShape, TooltipCoordinator, TooltipDisplay};
pub use types::{AxisFormatter, Margins, SeriesSpec, VIEW_HEIGHT, VIEW_WIDTH};

use crate::models::ProjectionPoint;
use anyhow::Result;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_svg::SVGBackend;

use std::path::Path;

use refline::compute_segments;
use scale::{BandScale, LinearScale};
use stack::{max_total, stack_series};
use util::{format_currency, format_percent};

/// Radius of the invisible hover circle around each line-chart point.
const POINT_HIT_RADIUS: f64 = 10.0;

const TICK_LEN: i32 = 5;
const Y_TICK_COUNT: usize = 10;

/// Render a line chart to an SVG file and return its hit map.
///
/// An empty series (or a spec with no keys) writes nothing and returns an
/// empty hit map.
pub fn render_line_chart<P: AsRef<Path>>(
    points: &[ProjectionPoint],
    spec: &SeriesSpec,
    out_path: P,
) -> Result<HitMap> {
    if points.is_empty() || spec.keys.is_empty() {
        return Ok(HitMap::new());
    }
    let height = spec.height.unwrap_or(VIEW_HEIGHT);
    let path_string = out_path.as_ref().to_string_lossy().into_owned();
    let root = SVGBackend::new(path_string.as_str(), (VIEW_WIDTH, height)).into_drawing_area();
    let hits = draw_line_chart(&root, points, spec)?;
    root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(hits)
}

/// Render a stacked bar chart to an SVG file and return its hit map.
///
/// Same empty-input behavior as [`render_line_chart`].
pub fn render_stacked_bar_chart<P: AsRef<Path>>(
    points: &[ProjectionPoint],
    spec: &SeriesSpec,
    out_path: P,
) -> Result<HitMap> {
    if points.is_empty() || spec.keys.is_empty() {
        return Ok(HitMap::new());
    }
    let height = spec.height.unwrap_or(VIEW_HEIGHT);
    let path_string = out_path.as_ref().to_string_lossy().into_owned();
    let root = SVGBackend::new(path_string.as_str(), (VIEW_WIDTH, height)).into_drawing_area();
    let hits = draw_stacked_bar_chart(&root, points, spec)?;
    root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(hits)
}

/// Shared chart geometry: the X and Y scales plus the frame they were built
/// for. Line charts use a linear X over age; bar charts use the band scale.
struct Frame {
    x: BandScale,
    x_linear: LinearScale,
    line: bool,
    y: LinearScale,
    margins: Margins,
    width: u32,
    height: u32,
}

impl Frame {
    fn new(points: &[ProjectionPoint], spec: &SeriesSpec, y_max: f64, line: bool) -> Self {
        let margins = spec.margins.unwrap_or_default();
        let width = VIEW_WIDTH;
        let height = spec.height.unwrap_or(VIEW_HEIGHT);
        let ages: Vec<u32> = points.iter().map(|p| p.age).collect();
        let x_range = (f64::from(margins.left), f64::from(width - margins.right));
        let x_linear = LinearScale::new(
            (
                ages.first().copied().unwrap_or(0) as f64,
                ages.last().copied().unwrap_or(0) as f64,
            ),
            x_range,
        );
        let x = BandScale::new(ages, x_range);
        let y_max = if y_max > 0.0 { y_max } else { 1.0 };
        let y = LinearScale::new(
            (0.0, y_max),
            (
                f64::from(height - margins.bottom),
                f64::from(margins.top),
            ),
        )
        .nice(Y_TICK_COUNT);
        Frame {
            x,
            x_linear,
            line,
            y,
            margins,
            width,
            height,
        }
    }

    fn plot_left(&self) -> f64 {
        f64::from(self.margins.left)
    }

    fn plot_right(&self) -> f64 {
        f64::from(self.width - self.margins.right)
    }

    fn plot_bottom(&self) -> f64 {
        f64::from(self.height - self.margins.bottom)
    }

    /// X pixel where `age`'s mark is drawn: the linear position for line
    /// charts, the band center for bar charts.
    fn age_center(&self, age: u32) -> Option<f64> {
        if self.line {
            self.x
                .domain()
                .contains(&age)
                .then(|| self.x_linear.scale(f64::from(age)))
        } else {
            self.x.position(age).map(|x0| x0 + self.x.bandwidth() / 2.0)
        }
    }

    /// X pixel where `age`'s column starts. Overlay splits happen here.
    fn age_start(&self, age: u32) -> Option<f64> {
        if self.line {
            self.age_center(age)
        } else {
            self.x.position(age)
        }
    }
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

/// Draw a line chart onto any backend. Returns the chart's hit map so the
/// caller can wire the tooltip.
pub fn draw_line_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    points: &[ProjectionPoint],
    spec: &SeriesSpec,
) -> Result<HitMap>
where
    DB: DrawingBackend,
{
    let mut hits = HitMap::new();
    if points.is_empty() || spec.keys.is_empty() {
        return Ok(hits);
    }
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let data_max = spec.y_max.unwrap_or_else(|| {
        points
            .iter()
            .flat_map(|p| spec.keys.iter().map(|k| k.value(p)))
            .fold(0.0, f64::max)
    });
    let frame = Frame::new(points, spec, data_max, true);
    draw_axes(root, spec, &frame)?;

    for (i, &key) in spec.keys.iter().enumerate() {
        let color = spec.color(i);
        let path: Vec<(i32, i32)> = points
            .iter()
            .filter_map(|p| {
                let cx = frame.age_center(p.age)?;
                Some((px(cx), px(frame.y.scale(key.value(p)))))
            })
            .collect();
        root.draw(&PathElement::new(path.clone(), color.stroke_width(2)))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        // Per-point hit circles are hover targets only, never drawn.
        for (p, &(cx, cy)) in points.iter().zip(path.iter()) {
            hits.push(
                HitShape::Circle {
                    cx: f64::from(cx),
                    cy: f64::from(cy),
                    r: POINT_HIT_RADIUS,
                },
                format!(
                    "Age {}\n{}: {}",
                    p.age,
                    key.label(),
                    format_currency(key.value(p))
                ),
            );
        }
    }

    draw_legend(root, spec, &frame)?;
    draw_overlays(root, spec, &frame)?;
    Ok(hits)
}

/// Draw a stacked bar chart onto any backend. Returns the chart's hit map:
/// one target per visible segment, plus a strip above each column carrying
/// its total.
pub fn draw_stacked_bar_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    points: &[ProjectionPoint],
    spec: &SeriesSpec,
) -> Result<HitMap>
where
    DB: DrawingBackend,
{
    let mut hits = HitMap::new();
    if points.is_empty() || spec.keys.is_empty() {
        return Ok(hits);
    }
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let stacked = stack_series(points, &spec.keys);
    let data_max = spec.y_max.unwrap_or_else(|| max_total(&stacked));
    let frame = Frame::new(points, spec, data_max, false);
    draw_axes(root, spec, &frame)?;

    let bw = frame.x.bandwidth();
    for column in &stacked {
        let Some(x0) = frame.x.position(column.age) else {
            continue;
        };
        for (i, band) in column.bands.iter().enumerate() {
            if band.value() <= 0.0 {
                continue;
            }
            let y_top = frame.y.scale(band.upper);
            let y_bottom = frame.y.scale(band.lower);
            let color = spec.color(i);
            root.draw(&Rectangle::new(
                [(px(x0), px(y_top)), (px(x0 + bw), px(y_bottom))],
                color.filled(),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            hits.push(
                HitShape::Rect {
                    x: x0,
                    y: y_top,
                    w: bw,
                    h: y_bottom - y_top,
                },
                format!(
                    "Age {}\n{}: {}",
                    column.age,
                    band.key.label(),
                    format_currency(band.value())
                ),
            );
        }
        // Invisible strip above the stack showing the column total.
        let strip_h = f64::from(frame.margins.top) / 2.0;
        hits.push(
            HitShape::Rect {
                x: x0,
                y: frame.y.scale(column.total) - strip_h,
                w: bw,
                h: strip_h,
            },
            format!(
                "Age {}\nTotal: {}",
                column.age,
                format_currency(column.total)
            ),
        );
    }

    draw_legend(root, spec, &frame)?;
    draw_overlays(root, spec, &frame)?;
    Ok(hits)
}

/// Title, axis lines, ticks, tick labels, and the rotated Y-axis label.
fn draw_axes<DB>(root: &DrawingArea<DB, Shift>, spec: &SeriesSpec, frame: &Frame) -> Result<()>
where
    DB: DrawingBackend,
{
    let axis_style = BLACK.stroke_width(1);
    let label_font = ("sans-serif", 12).into_font().color(&BLACK);
    let bottom = px(frame.plot_bottom());
    let left = px(frame.plot_left());
    let right = px(frame.plot_right());

    root.draw(&Text::new(
        spec.title.clone(),
        (px(f64::from(frame.width) / 2.0), 12),
        ("sans-serif", 16)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    // Axis lines.
    root.draw(&PathElement::new(
        vec![(left, bottom), (right, bottom)],
        axis_style,
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    root.draw(&PathElement::new(
        vec![(left, px(f64::from(frame.margins.top))), (left, bottom)],
        axis_style,
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    // X ticks: one per age, label centered under the mark.
    for &age in frame.x.domain() {
        let Some(cx) = frame.age_center(age) else {
            continue;
        };
        let cx = px(cx);
        root.draw(&PathElement::new(
            vec![(cx, bottom), (cx, bottom + TICK_LEN)],
            axis_style,
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            age.to_string(),
            (cx, bottom + TICK_LEN + 3),
            label_font.clone().pos(Pos::new(HPos::Center, VPos::Top)),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }

    // Y ticks.
    let formatter = spec.y_format.unwrap_or(format_currency);
    for tick in frame.y.ticks(Y_TICK_COUNT) {
        let ty = px(frame.y.scale(tick));
        root.draw(&PathElement::new(
            vec![(left - TICK_LEN, ty), (left, ty)],
            axis_style,
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            formatter(tick),
            (left - TICK_LEN - 3, ty),
            label_font.clone().pos(Pos::new(HPos::Right, VPos::Center)),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }

    // X-axis caption and rotated Y-axis label.
    root.draw(&Text::new(
        "Age".to_string(),
        (
            px((frame.plot_left() + frame.plot_right()) / 2.0),
            bottom + 30,
        ),
        ("sans-serif", 13)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let mid_y = (f64::from(frame.margins.top) + frame.plot_bottom()) / 2.0;
    root.draw(&Text::new(
        spec.y_label.clone(),
        (18, px(mid_y)),
        ("sans-serif", 13)
            .into_font()
            .color(&BLACK)
            .transform(FontTransform::Rotate270)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

/// Horizontal swatch-and-label legend inside the top margin.
fn draw_legend<DB>(root: &DrawingArea<DB, Shift>, spec: &SeriesSpec, frame: &Frame) -> Result<()>
where
    DB: DrawingBackend,
{
    if spec.keys.len() < 2 {
        return Ok(());
    }
    let font = ("sans-serif", 11).into_font().color(&BLACK);
    let y = px(f64::from(frame.margins.top)) - 12;
    let mut x = px(frame.plot_left());
    for (i, key) in spec.keys.iter().enumerate() {
        let label = key.label();
        root.draw(&Rectangle::new(
            [(x, y - 4), (x + 8, y + 4)],
            spec.color(i).filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            label.to_string(),
            (x + 12, y),
            font.clone().pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        // Rough per-character advance keeps entries from overlapping.
        x += 18 + label.len() as i32 * 7;
    }
    Ok(())
}

/// Dashed bracket-threshold lines with a rate label at the right edge.
fn draw_overlays<DB>(root: &DrawingArea<DB, Shift>, spec: &SeriesSpec, frame: &Frame) -> Result<()>
where
    DB: DrawingBackend,
{
    let Some(reference) = &spec.overlay else {
        return Ok(());
    };
    let label_font = ("sans-serif", 10).into_font();
    for overlay in &reference.overlays {
        let pivot_x = match overlay.deduction {
            DeductionRule::AgePivot(adj) => frame.age_start(adj.pivot_age),
            DeductionRule::Flat(_) => None,
        };
        let segments = compute_segments(
            overlay,
            frame.x.domain(),
            frame.y.domain(),
            (frame.plot_left(), frame.plot_right()),
            pivot_x,
        );
        for segment in segments {
            let sy = px(frame.y.scale(segment.threshold));
            draw_dashed_hline(root, segment.x0, segment.x1, sy, &overlay.style)?;
            // Only the segment reaching the right edge gets the label, so a
            // pivot-split threshold is labeled once.
            if segment.x1 >= frame.plot_right() - 0.5 {
                root.draw(&Text::new(
                    format_percent(segment.rate),
                    (px(segment.x1) + 4, sy),
                    label_font
                        .clone()
                        .color(&overlay.style.color)
                        .pos(Pos::new(HPos::Left, VPos::Center)),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}

/// Hand-drawn dash pattern: plotters' SVG backend has no dash attribute, so
/// each on-interval becomes its own short path.
fn draw_dashed_hline<DB>(
    root: &DrawingArea<DB, Shift>,
    x0: f64,
    x1: f64,
    y: i32,
    style: &OverlayStyle,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let stroke = style.color.stroke_width(1);
    let period = style.dash_on + style.dash_off;
    // A zero or negative period cannot advance; fall back to a solid line.
    if period <= 0.0 {
        root.draw(&PathElement::new(vec![(px(x0), y), (px(x1), y)], stroke))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        return Ok(());
    }
    let mut t = x0;
    while t < x1 {
        let end = (t + style.dash_on).min(x1);
        root.draw(&PathElement::new(vec![(px(t), y), (px(end), y)], stroke))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        t += period;
    }
    Ok(())
}
