//! Chart rendering: turning a chart specification into a raster image.
//!
//! Each call renders one standalone PNG into a freshly created unique
//! temporary file and hands the file handle back to the caller, who owns
//! its deletion (the document builder keeps the handles until the report is
//! saved). The drawing backend is scoped to the call and presented before
//! returning, so repeated rendering in a long-lived process does not
//! accumulate plotting state.
//!
//! Text on charts (axis labels, pie percentages) requires a registered
//! font face; when the system provides none, charts degrade to text-free
//! rendering instead of failing the report.

use crate::fonts;
use crate::payload::ChartSpec;
use crate::styling::ChartStyle;
use crate::ReportError;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use tempfile::NamedTempFile;

/// Wedge colors for pie charts, cycled when there are more values.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0x4e, 0x79, 0xa7),
    RGBColor(0xf2, 0x8e, 0x2b),
    RGBColor(0xe1, 0x57, 0x59),
    RGBColor(0x76, 0xb7, 0xb2),
    RGBColor(0x59, 0xa1, 0x4f),
    RGBColor(0xed, 0xc9, 0x48),
];

/// The chart types this engine can draw.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    fn parse(chart_type: &str) -> Result<Self, ReportError> {
        match chart_type {
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            "line" => Ok(ChartKind::Line),
            other => Err(ReportError::unsupported_chart_type(other)),
        }
    }
}

/// Parses a `#rrggbb` color string.
fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn draw_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::chart_error(format!("chart rendering failed: {}", err))
}

/// Renders chart specifications into temporary raster files.
pub struct ChartRenderer {
    defaults: ChartStyle,
}

impl ChartRenderer {
    pub fn new(defaults: ChartStyle) -> Self {
        Self { defaults }
    }

    /// Renders one chart to a new unique temporary PNG.
    ///
    /// The returned handle owns the file; dropping it deletes the raster.
    /// Fails with `UnsupportedChartType` for types outside bar/pie/line,
    /// and with a chart error for structurally invalid specs (length
    /// mismatch, no data points, non-positive pie total).
    pub fn render(&self, spec: &ChartSpec) -> Result<NamedTempFile, ReportError> {
        let kind = ChartKind::parse(&spec.chart_type)?;
        if spec.labels.len() != spec.values.len() {
            return Err(ReportError::chart_error(format!(
                "labels and values must have the same length ({} != {})",
                spec.labels.len(),
                spec.values.len()
            )));
        }
        if spec.values.is_empty() {
            return Err(ReportError::chart_error("chart has no data points"));
        }

        let file = tempfile::Builder::new()
            .prefix("report-chart-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ReportError::IoError {
                message: format!("could not create temporary chart file: {}", e),
                path: std::env::temp_dir().display().to_string(),
                suggestion: "Check that the system temporary directory is writable".to_string(),
            })?;

        let width = spec.width.unwrap_or(self.defaults.width).max(64);
        let height = spec.height.unwrap_or(self.defaults.height).max(64);
        let (r, g, b) = spec
            .color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or(self.defaults.color);
        let color = RGBColor(r, g, b);
        let with_text = fonts::ensure_chart_font();

        {
            let root = BitMapBackend::new(file.path(), (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;
            match kind {
                ChartKind::Bar => draw_bar(&root, spec, color, with_text)?,
                ChartKind::Pie => draw_pie(&root, spec, with_text)?,
                ChartKind::Line => draw_line(&root, spec, color, with_text)?,
            }
            root.present().map_err(draw_error)?;
        }

        Ok(file)
    }
}

/// Vertical bars, one per label, in a single fill color.
fn draw_bar(
    root: &DrawingArea<BitMapBackend, Shift>,
    spec: &ChartSpec,
    color: RGBColor,
    with_text: bool,
) -> Result<(), ReportError> {
    let n = spec.values.len() as u32;
    let max = spec.values.iter().cloned().fold(f64::MIN, f64::max);
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let y_min = spec.values.iter().cloned().fold(0.0f64, f64::min);

    let mut builder = ChartBuilder::on(root);
    builder.margin(12);
    if with_text {
        builder.x_label_area_size(36).y_label_area_size(48);
    }
    let mut chart = builder
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(draw_error)?;

    if with_text {
        let labels = spec.labels.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n as usize)
            .x_label_formatter(&|seg: &SegmentValue<u32>| match seg {
                SegmentValue::CenterOf(i) => {
                    labels.get(*i as usize).cloned().unwrap_or_default()
                }
                _ => String::new(),
            })
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(draw_error)?;
    }

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(8)
                .data(spec.values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )
        .map_err(draw_error)?;
    Ok(())
}

/// Wedges proportional to values with per-wedge percentage labels.
fn draw_pie(
    root: &DrawingArea<BitMapBackend, Shift>,
    spec: &ChartSpec,
    with_text: bool,
) -> Result<(), ReportError> {
    let total: f64 = spec.values.iter().sum();
    if total <= 0.0 {
        return Err(ReportError::chart_error(
            "pie chart requires a positive value total",
        ));
    }

    let (w, h) = root.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.35;
    let colors: Vec<RGBColor> = (0..spec.values.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    if with_text {
        let mut pie = Pie::new(&center, &radius, &spec.values, &colors, &spec.labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 16).into_font());
        pie.percentages(("sans-serif", 14).into_font());
        root.draw(&pie).map_err(draw_error)?;
    } else {
        // No usable font: draw the wedges as polygon fans, skip all text.
        let mut start = -std::f64::consts::FRAC_PI_2;
        for (i, value) in spec.values.iter().enumerate() {
            let sweep = value / total * std::f64::consts::TAU;
            let steps = ((sweep / 0.02).ceil() as usize).max(2);
            let mut points = vec![center];
            for step in 0..=steps {
                let angle = start + sweep * (step as f64 / steps as f64);
                points.push((
                    center.0 + (radius * angle.cos()).round() as i32,
                    center.1 + (radius * angle.sin()).round() as i32,
                ));
            }
            root.draw(&Polygon::new(points, colors[i].filled()))
                .map_err(draw_error)?;
            start += sweep;
        }
    }
    Ok(())
}

/// Values connected in label order with point markers.
fn draw_line(
    root: &DrawingArea<BitMapBackend, Shift>,
    spec: &ChartSpec,
    color: RGBColor,
    with_text: bool,
) -> Result<(), ReportError> {
    let n = spec.values.len();
    let x_max = (n.saturating_sub(1)).max(1) as f64;
    let min = spec.values.iter().cloned().fold(f64::MAX, f64::min);
    let max = spec.values.iter().cloned().fold(f64::MIN, f64::max);
    let y_min = min.min(0.0);
    let y_max = if max > y_min { max + (max - y_min) * 0.1 } else { y_min + 1.0 };

    let mut builder = ChartBuilder::on(root);
    builder.margin(12);
    if with_text {
        builder.x_label_area_size(36).y_label_area_size(48);
    }
    let mut chart = builder
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(draw_error)?;

    if with_text {
        let labels = spec.labels.clone();
        chart
            .configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                let idx = x.round();
                if (x - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(draw_error)?;
    }

    chart
        .draw_series(
            LineSeries::new(
                spec.values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                color.stroke_width(2),
            )
            .point_size(3),
        )
        .map_err(draw_error)?;
    Ok(())
}
