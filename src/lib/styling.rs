//! Style model for the generated report documents.
//!
//! The types in this module describe the visual properties of every block
//! the document builder can emit: page margins, the cover and section
//! headings, body text, the boxed summary, table rows, and chart defaults.
//! `ReportStyle::default()` provides the built-in look; `crate::config`
//! overlays values from a TOML configuration on top of it.

/// Page margins in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Horizontal text alignment for a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Visual properties of a single text block type.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicTextStyle {
    /// Font size in points.
    pub size: u8,
    pub bold: bool,
    /// RGB text color; `None` uses the document default (black).
    pub text_color: Option<(u8, u8, u8)>,
    pub alignment: Option<TextAlignment>,
    /// Vertical spacing before the block, in lines.
    pub before_spacing: f32,
    /// Vertical spacing after the block, in lines.
    pub after_spacing: f32,
}

impl BasicTextStyle {
    pub fn new(
        size: u8,
        bold: bool,
        text_color: Option<(u8, u8, u8)>,
        alignment: Option<TextAlignment>,
    ) -> Self {
        Self {
            size,
            bold,
            text_color,
            alignment,
            before_spacing: 0.0,
            after_spacing: 0.5,
        }
    }

    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.before_spacing = before;
        self.after_spacing = after;
        self
    }
}

/// Styling rules applied to rendered tables.
///
/// The header row is emphasized with the accent color, data rows alternate
/// between the plain and shaded text colors by row parity, and the value
/// cell of a row whose key equals `grand_total_marker` is rendered bold.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header: BasicTextStyle,
    pub cell: BasicTextStyle,
    /// Text color used on parity-shaded rows.
    pub shaded_color: (u8, u8, u8),
    /// Reserved key whose value cell is emphasized.
    pub grand_total_marker: String,
}

/// Default render size and color for charts without explicit overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Fill color for single-color chart types (bar, line).
    pub color: (u8, u8, u8),
}

/// The complete style configuration for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStyle {
    pub margins: Margins,
    pub cover_title: BasicTextStyle,
    pub section_title: BasicTextStyle,
    pub text: BasicTextStyle,
    /// Style of the boxed summary paragraph on the cover.
    pub summary: BasicTextStyle,
    pub table: TableStyle,
    pub chart: ChartStyle,
    /// Cover title used when the payload does not provide one.
    pub default_title: String,
    /// Relative location of the bundled logo asset; its absence is fine.
    pub logo_path: String,
}

/// Accent color shared by table headers and the default chart fill.
pub const ACCENT_COLOR: (u8, u8, u8) = (0x4e, 0x79, 0xa7);

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            margins: Margins {
                top: 18.0,
                right: 16.0,
                bottom: 18.0,
                left: 16.0,
            },
            cover_title: BasicTextStyle::new(24, true, None, Some(TextAlignment::Center))
                .with_spacing(2.0, 0.5),
            section_title: BasicTextStyle::new(14, true, Some(ACCENT_COLOR), None)
                .with_spacing(1.0, 0.3),
            text: BasicTextStyle::new(11, false, None, None).with_spacing(0.0, 0.5),
            summary: BasicTextStyle::new(11, false, Some((60, 60, 60)), None)
                .with_spacing(1.0, 0.5),
            table: TableStyle {
                header: BasicTextStyle::new(11, true, Some(ACCENT_COLOR), None),
                cell: BasicTextStyle::new(10, false, None, None),
                shaded_color: (80, 80, 80),
                grand_total_marker: "grand_total".to_string(),
            },
            chart: ChartStyle {
                width: 640,
                height: 420,
                color: ACCENT_COLOR,
            },
            default_title: "Data Assistant Report".to_string(),
            logo_path: "assets/logo.png".to_string(),
        }
    }
}
