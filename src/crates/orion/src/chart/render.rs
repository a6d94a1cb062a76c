//! PNG rendering of chart plans with plotters

use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use tracing::{debug, warn};

use super::plan::{ChartPlan, PieSlice, PlotData, Series};
use super::spec::ChartKind;
use super::ChartError;

/// Draws a plan to an image file
pub trait ChartRenderer: Send + Sync {
    fn draw(&self, plan: &ChartPlan, output: &Path) -> Result<(), ChartError>;
}

const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a TrueType font under the sans-serif family, once per process.
///
/// The family is global to plotters, so the first renderer settles it. A
/// different `preferred` path on a later call is ignored and logged.
fn ensure_font(preferred: Option<&Path>) -> bool {
    let registered = FONT.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    debug!(font = %path.display(), "chart font registered");
                    return Some(path);
                }
                Err(_) => warn!(font = %path.display(), "not a usable TrueType font"),
            }
        }

        warn!("no chart font found; charts are drawn without text");
        None
    });

    if let Some(wanted) = preferred.filter(|p| registered.as_deref() != Some(*p)) {
        debug!(
            font = %wanted.display(),
            registered = ?registered,
            "chart font already settled for this process; ignoring"
        );
    }
    registered.is_some()
}

/// Bitmap renderer backed by plotters
///
/// When no font can be registered the chart is still drawn, only without
/// caption, axis labels, legend or slice labels.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
    text: bool,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32, font_path: Option<PathBuf>) -> Self {
        let text = ensure_font(font_path.as_deref());
        Self {
            width: width.max(64),
            height: height.max(64),
            text,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn draws_text(&self) -> bool {
        self.text
    }
}

impl ChartRenderer for PlottersRenderer {
    fn draw(&self, plan: &ChartPlan, output: &Path) -> Result<(), ChartError> {
        let root = BitMapBackend::new(output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        match &plan.data {
            PlotData::Categorical {
                x_label,
                labels,
                series,
            } => self.draw_categorical(&root, plan, x_label, labels, series)?,
            PlotData::Pie { slices, .. } => self.draw_pie(&root, plan.title.as_deref(), slices)?,
        }

        root.present().map_err(render_err)?;
        Ok(())
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).to_rgba()
}

/// Value range over every present point, padded for drawing
fn y_range(series: &[Series], include_zero: bool) -> (f64, f64) {
    let values = series.iter().flat_map(|s| s.points.iter().flatten().copied());
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if lo == hi {
        lo -= 1.0;
        hi += 1.0;
    }
    let margin = (hi - lo) * 0.05;
    (lo - if lo < 0.0 { margin } else { 0.0 }, hi + margin)
}

/// Split a series into runs of consecutive present points
fn segments(points: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (idx, point) in points.iter().enumerate() {
        match point {
            Some(v) => current.push((idx as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

impl PlottersRenderer {
    fn draw_categorical(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        plan: &ChartPlan,
        x_label: &str,
        labels: &[String],
        series: &[Series],
    ) -> Result<(), ChartError> {
        let n = labels.len().max(1) as f64;
        let (y_lo, y_hi) = y_range(series, plan.kind == ChartKind::Bar);

        let mut builder = ChartBuilder::on(root);
        builder.margin(12);
        if self.text {
            if let Some(title) = &plan.title {
                builder.caption(title, (FONT_FAMILY, 22));
            }
            builder.x_label_area_size(40).y_label_area_size(56);
        }
        let mut chart = builder
            .build_cartesian_2d(-0.5..n - 0.5, y_lo..y_hi)
            .map_err(render_err)?;

        if self.text {
            let label_at = |x: &f64| -> String {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len().clamp(1, 24))
                .x_label_formatter(&label_at)
                .x_desc(x_label)
                .label_style((FONT_FAMILY, 12))
                .draw()
                .map_err(render_err)?;
        }

        let width = 0.8 / series.len().max(1) as f64;
        for (j, s) in series.iter().enumerate() {
            let color = series_color(j);

            let anno = match plan.kind {
                ChartKind::Line => {
                    for run in segments(&s.points) {
                        chart
                            .draw_series(LineSeries::new(run, color.stroke_width(2)))
                            .map_err(render_err)?;
                    }
                    let markers = s
                        .points
                        .iter()
                        .enumerate()
                        .filter_map(|(i, p)| p.map(|v| (i as f64, v)))
                        .map(|(x, y)| Circle::new((x, y), 3, color.filled()));
                    chart.draw_series(markers).map_err(render_err)?
                }
                _ => {
                    let bars = s.points.iter().enumerate().filter_map(|(i, p)| {
                        p.map(|v| {
                            let x0 = i as f64 - 0.4 + j as f64 * width;
                            Rectangle::new([(x0, 0.0), (x0 + width, v)], color.filled())
                        })
                    });
                    chart.draw_series(bars).map_err(render_err)?
                }
            };

            if self.text {
                anno.label(s.name.clone()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
            }
        }

        if self.text && !series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .label_font((FONT_FAMILY, 12))
                .draw()
                .map_err(render_err)?;
        }

        Ok(())
    }

    fn draw_pie(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        title: Option<&str>,
        slices: &[PieSlice],
    ) -> Result<(), ChartError> {
        let area = match title.filter(|_| self.text) {
            Some(title) => root.titled(title, (FONT_FAMILY, 22)).map_err(render_err)?,
            None => root.clone(),
        };

        let (w, h) = area.dim_in_pixel();
        let center = (w as f64 / 2.0, h as f64 / 2.0);
        let radius = w.min(h) as f64 * 0.35;

        let mut start = -PI / 2.0;
        for (idx, slice) in slices.iter().enumerate() {
            let sweep = slice.fraction * 2.0 * PI;
            let end = start + sweep;
            let color = series_color(idx);

            let steps = ((sweep.to_degrees()).ceil() as usize).max(2);
            let mut points = Vec::with_capacity(steps + 2);
            points.push((center.0 as i32, center.1 as i32));
            for step in 0..=steps {
                let angle = start + sweep * step as f64 / steps as f64;
                points.push((
                    (center.0 + radius * angle.cos()).round() as i32,
                    (center.1 + radius * angle.sin()).round() as i32,
                ));
            }
            area.draw(&Polygon::new(points, color.filled()))
                .map_err(render_err)?;

            if self.text {
                let mid = start + sweep / 2.0;
                let at = (
                    (center.0 + radius * 1.2 * mid.cos()).round() as i32,
                    (center.1 + radius * 1.2 * mid.sin()).round() as i32,
                );
                let style = (FONT_FAMILY, 14)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let text = format!("{} ({})", slice.label, slice.percent_label());
                area.draw(&Text::new(text, at, style)).map_err(render_err)?;
            }

            start = end;
        }

        Ok(())
    }
}
