//! Configuration module for styling the generated report documents.
//!
//! This module handles loading and parsing of styling configuration from TOML.
//! It lets users customize margins, the cover and section headings, table
//! emphasis rules, and default chart rendering without touching code.
//!
//! # Configuration Structure
//!
//! The configuration uses TOML format with sections for different parts of
//! the document:
//! - The `margin` section controls page margins (top, right, bottom, left)
//! - `cover` styles the cover title
//! - `section` styles section headings
//! - `text` defines the default body text appearance
//! - `summary` styles the boxed summary paragraph on the cover
//! - `table.header` and `table.cell` style table rows; the `table` section
//!   also accepts `grandtotalmarker` (the reserved key whose value cell is
//!   emphasized) and `shadedcolor` (text color of parity-shaded rows)
//! - `chart` sets the default raster size and fill color for charts
//! - Top-level `defaulttitle` and `logo` override the cover defaults
//!
//! # Configuration Example
//!
//! ```toml
//! [margin]
//! top = 18.0
//! right = 16.0
//! bottom = 18.0
//! left = 16.0
//!
//! [cover]
//! size = 26
//! bold = true
//! alignment = "center"
//!
//! [table]
//! grandtotalmarker = "grand_total"
//! shadedcolor = { r = 80, g = 80, b = 80 }
//!
//! [table.header]
//! size = 11
//! textcolor = { r = 78, g = 121, b = 167 }
//!
//! [chart]
//! width = 640
//! height = 420
//! color = { r = 78, g = 121, b = 167 }
//! ```
//!
//! Unreadable files and invalid TOML fall back to the default style rather
//! than failing report generation.

use crate::styling::{BasicTextStyle, ChartStyle, Margins, ReportStyle, TextAlignment};
use std::fs;
use std::path::Path;
use toml::Value;

/// Configuration source for styling configuration.
/// Determines where the TOML configuration should be loaded from.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Use default built-in styling configuration
    Default,
    /// Load configuration from a file path
    File(&'a str),
    /// Use embedded TOML configuration string (compile-time embedded)
    Embedded(&'a str),
}

/// Parses an RGB color from a TOML configuration value.
///
/// The value parameter provides an optional TOML value containing a color
/// object. The field parameter specifies which color field to parse from the
/// configuration. Returns the RGB color values as a tuple if parsing
/// succeeds, or None if the color value is missing or invalid.
fn parse_color(value: Option<&Value>, field: &str) -> Option<(u8, u8, u8)> {
    value.and_then(|c| {
        let color = c.get(field)?;
        let r = color.get("r")?.as_integer()? as u8;
        let g = color.get("g")?.as_integer()? as u8;
        let b = color.get("b")?.as_integer()? as u8;
        Some((r, g, b))
    })
}

/// Parses text alignment from TOML configuration.
fn parse_alignment(value: Option<&Value>) -> Option<TextAlignment> {
    value.and_then(|v| v.as_str()).map(|s| match s {
        "center" => TextAlignment::Center,
        "right" => TextAlignment::Right,
        _ => TextAlignment::Left,
    })
}

/// Parses a float property that may be written as either a TOML float or
/// integer.
fn parse_number(value: &Value, field: &str) -> Option<f32> {
    match value.get(field) {
        Some(v) => v
            .as_float()
            .or_else(|| v.as_integer().map(|i| i as f64))
            .map(|f| f as f32),
        None => None,
    }
}

/// Parses a complete text style configuration from TOML.
///
/// Processes size, spacing, text color, alignment and boldness. Missing
/// properties keep the value from the provided default style.
fn parse_style(value: Option<&Value>, default: BasicTextStyle) -> BasicTextStyle {
    let mut style = default;
    if let Some(style_config) = value {
        if let Some(size) = style_config.get("size").and_then(|v| v.as_integer()) {
            style.size = size as u8;
        }
        if let Some(spacing) = parse_number(style_config, "beforespacing") {
            style.before_spacing = spacing;
        }
        if let Some(spacing) = parse_number(style_config, "afterspacing") {
            style.after_spacing = spacing;
        }
        if let Some(color) = parse_color(Some(style_config), "textcolor") {
            style.text_color = Some(color);
        }
        if let Some(alignment) = parse_alignment(style_config.get("alignment")) {
            style.alignment = Some(alignment);
        }
        if let Some(bold) = style_config.get("bold").and_then(|v| v.as_bool()) {
            style.bold = bold;
        }
    }
    style
}

/// Parses chart defaults from the `[chart]` section.
fn parse_chart(value: Option<&Value>, default: ChartStyle) -> ChartStyle {
    let mut chart = default;
    if let Some(chart_config) = value {
        if let Some(width) = chart_config.get("width").and_then(|v| v.as_integer()) {
            if width > 0 {
                chart.width = width as u32;
            }
        }
        if let Some(height) = chart_config.get("height").and_then(|v| v.as_integer()) {
            if height > 0 {
                chart.height = height as u32;
            }
        }
        if let Some(color) = parse_color(Some(chart_config), "color") {
            chart.color = color;
        }
    }
    chart
}

/// Parses a TOML configuration string and returns a complete ReportStyle.
///
/// This function handles the core TOML parsing logic and can be used with
/// both embedded configuration strings and runtime-loaded files. Sections
/// that are absent keep their default values; a string that is not valid
/// TOML yields the default style.
///
/// # Example
/// ```rust
/// use report2pdf::config::parse_config_string;
///
/// let config = r#"
/// [cover]
/// size = 28
/// bold = true
///
/// [table]
/// grandtotalmarker = "total"
/// "#;
/// let style = parse_config_string(config);
/// assert_eq!(style.cover_title.size, 28);
/// assert_eq!(style.table.grand_total_marker, "total");
/// ```
pub fn parse_config_string(config_str: &str) -> ReportStyle {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(_) => return ReportStyle::default(),
    };

    let default_style = ReportStyle::default();
    let margins = if let Some(margins) = config.get("margin") {
        Margins {
            top: parse_number(margins, "top").unwrap_or(default_style.margins.top),
            right: parse_number(margins, "right").unwrap_or(default_style.margins.right),
            bottom: parse_number(margins, "bottom").unwrap_or(default_style.margins.bottom),
            left: parse_number(margins, "left").unwrap_or(default_style.margins.left),
        }
    } else {
        default_style.margins
    };

    let mut table = default_style.table.clone();
    table.header = parse_style(
        config.get("table").and_then(|t| t.get("header")),
        table.header,
    );
    table.cell = parse_style(config.get("table").and_then(|t| t.get("cell")), table.cell);
    if let Some(marker) = config
        .get("table")
        .and_then(|t| t.get("grandtotalmarker"))
        .and_then(|v| v.as_str())
    {
        table.grand_total_marker = marker.to_string();
    }
    if let Some(color) = parse_color(config.get("table"), "shadedcolor") {
        table.shaded_color = color;
    }

    ReportStyle {
        margins,
        cover_title: parse_style(config.get("cover"), default_style.cover_title),
        section_title: parse_style(config.get("section"), default_style.section_title),
        text: parse_style(config.get("text"), default_style.text),
        summary: parse_style(config.get("summary"), default_style.summary),
        table,
        chart: parse_chart(config.get("chart"), default_style.chart),
        default_title: config
            .get("defaulttitle")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(default_style.default_title),
        logo_path: config
            .get("logo")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(default_style.logo_path),
    }
}

/// Loads and parses the complete styling configuration based on the provided
/// source.
///
/// This function handles different configuration sources: default styles,
/// file-based configuration, or embedded TOML strings. Unreadable files fall
/// back to the default style.
///
/// # Examples
/// ```rust
/// use report2pdf::config::{load_config_from_source, ConfigSource};
///
/// // Use default configuration
/// let style = load_config_from_source(ConfigSource::Default);
/// assert_eq!(style.table.grand_total_marker, "grand_total");
///
/// // Load from file (falls back to defaults when missing)
/// let style = load_config_from_source(ConfigSource::File("report2pdfrc.toml"));
///
/// // Use embedded configuration
/// const EMBEDDED: &str = r#"
///     [section]
///     size = 16
/// "#;
/// let style = load_config_from_source(ConfigSource::Embedded(EMBEDDED));
/// assert_eq!(style.section_title.size, 16);
/// ```
pub fn load_config_from_source(source: ConfigSource) -> ReportStyle {
    match source {
        ConfigSource::Default => ReportStyle::default(),
        ConfigSource::File(path) => {
            let config_str = match fs::read_to_string(Path::new(path)) {
                Ok(s) => s,
                Err(_) => return ReportStyle::default(),
            };
            parse_config_string(&config_str)
        }
        ConfigSource::Embedded(content) => parse_config_string(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        let color_toml: Value = toml::from_str(
            r#"
            color = { r = 255, g = 128, b = 64 }
        "#,
        )
        .unwrap();
        assert_eq!(
            parse_color(Some(&color_toml), "color"),
            Some((255, 128, 64))
        );

        assert_eq!(parse_color(None, "color"), None);

        let invalid_color: Value = toml::from_str(
            r#"
            color = { r = 255, g = 128 }
        "#,
        )
        .unwrap();
        assert_eq!(parse_color(Some(&invalid_color), "color"), None);
    }

    #[test]
    fn test_parse_alignment() {
        let align_toml: Value = toml::from_str(r#"alignment = "center""#).unwrap();
        assert_eq!(
            parse_alignment(align_toml.get("alignment")),
            Some(TextAlignment::Center)
        );
        let align_toml: Value = toml::from_str(r#"alignment = "weird""#).unwrap();
        assert_eq!(
            parse_alignment(align_toml.get("alignment")),
            Some(TextAlignment::Left)
        );
        assert_eq!(parse_alignment(None), None);
    }

    #[test]
    fn test_parse_config_overrides() {
        let style = parse_config_string(
            r#"
            [margin]
            top = 30.0
            left = 12

            [cover]
            size = 30
            alignment = "center"

            [table]
            grandtotalmarker = "sum"
            shadedcolor = { r = 1, g = 2, b = 3 }

            [table.header]
            bold = false

            [chart]
            width = 800
            color = { r = 10, g = 20, b = 30 }
        "#,
        );
        assert_eq!(style.margins.top, 30.0);
        assert_eq!(style.margins.left, 12.0);
        // untouched sections keep defaults
        assert_eq!(style.margins.right, ReportStyle::default().margins.right);
        assert_eq!(style.cover_title.size, 30);
        assert_eq!(style.table.grand_total_marker, "sum");
        assert_eq!(style.table.shaded_color, (1, 2, 3));
        assert!(!style.table.header.bold);
        assert_eq!(style.chart.width, 800);
        assert_eq!(style.chart.height, ReportStyle::default().chart.height);
        assert_eq!(style.chart.color, (10, 20, 30));
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults() {
        let style = parse_config_string("this is not valid toml {{{");
        assert_eq!(style, ReportStyle::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let style = load_config_from_source(ConfigSource::File("does-not-exist.toml"));
        assert_eq!(style, ReportStyle::default());
    }
}
