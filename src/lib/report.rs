//! Report orchestration: the public entry point for report generation.
//!
//! A [`ReportGenerator`] owns its output root and style as instance
//! configuration, so multiple generators with different output directories
//! can coexist (useful for tests and for serving multiple sessions). Each
//! call classifies the payload once, drives the document builder for the
//! resulting shape, and returns the absolute path of the written PDF.
//!
//! Flat payloads become a cover, one "Data" table and — when enough of the
//! top-level values are numeric — one auto-generated bar chart. Structured
//! payloads drive the cover and sections explicitly.
//!
//! [`create_report_with_fallback`](ReportGenerator::create_report_with_fallback)
//! adds the integration contract used by the tool-serving layer: loose
//! payload shapes are coerced to a mapping first, and any failure is
//! retried exactly once as a minimal error-content report with charts
//! disabled.

use crate::payload::{classify, ChartSpec, ReportPayload, Section, StructuredReport};
use crate::pdf::PdfReportBuilder;
use crate::styling::ReportStyle;
use crate::ReportError;
use chrono::Local;
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Minimum number of numeric top-level fields before a flat payload gets an
/// auto-generated chart.
const AUTO_CHART_MIN_FIELDS: usize = 3;

/// How much of an unusable raw payload is echoed into the error report.
const RAW_INPUT_PREVIEW_LEN: usize = 200;

/// Generates PDF reports from JSON payloads.
pub struct ReportGenerator {
    style: ReportStyle,
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportStyle::default())
    }
}

impl ReportGenerator {
    pub fn new(style: ReportStyle) -> Self {
        Self {
            style,
            output_dir: PathBuf::from("reports"),
        }
    }

    /// Overrides the directory used for default (timestamped) output paths.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Creates a PDF report from the payload and returns its absolute path.
    ///
    /// Empty payloads fail with [`ReportError::EmptyPayload`]. When
    /// `out_path` is absent a timestamped file name with a random
    /// disambiguator is generated under the configured output directory,
    /// so two calls landing in the same second cannot collide. The output
    /// directory (or the parent of a caller-supplied path) is created on
    /// demand.
    pub fn create_report(
        &self,
        payload: &Value,
        out_path: Option<&Path>,
        include_chart: bool,
    ) -> Result<PathBuf, ReportError> {
        let classified = classify(payload)?;
        let out = self.resolve_output_path(out_path);
        debug!("creating report at {}", out.display());

        let mut builder = PdfReportBuilder::new(out, self.style.clone())?;
        match classified {
            ReportPayload::Structured(report) => self.build_structured(&mut builder, &report)?,
            ReportPayload::Flat(map) => self.build_flat(&mut builder, &map, include_chart)?,
        }
        builder.save()
    }

    /// Creates a report with the integration layer's recovery contract.
    ///
    /// The payload is first coerced to a mapping (arrays become indexed
    /// `item_N` fields, anything else an error-shaped mapping). When report
    /// creation fails for any reason, exactly one retry is attempted: a
    /// minimal report stating the failure message, with charts disabled.
    /// Only when that retry also fails does the error reach the caller.
    pub fn create_report_with_fallback(
        &self,
        payload: &Value,
        out_path: Option<&Path>,
        include_chart: bool,
    ) -> Result<PathBuf, ReportError> {
        let normalized = normalize_payload(payload);
        match self.create_report(&normalized, out_path, include_chart) {
            Ok(path) => Ok(path),
            Err(err) => {
                warn!("report creation failed ({}), retrying with an error report", err);
                let error_payload = json!({
                    "error": format!("Failed to create report: {}", err),
                });
                self.create_report(&error_payload, out_path, false)
            }
        }
    }

    fn resolve_output_path(&self, out_path: Option<&Path>) -> PathBuf {
        match out_path {
            Some(path) => path.to_path_buf(),
            None => {
                let timestamp = Local::now().format("%Y%m%d-%H%M%S");
                let tag: u16 = rand::random();
                self.output_dir
                    .join(format!("report-{}-{:04x}.pdf", timestamp, tag))
            }
        }
    }

    /// The bundled logo, only when it actually exists on disk.
    fn default_logo(&self) -> Option<PathBuf> {
        let path = PathBuf::from(&self.style.logo_path);
        path.is_file().then_some(path)
    }

    fn build_structured(
        &self,
        builder: &mut PdfReportBuilder,
        report: &StructuredReport,
    ) -> Result<(), ReportError> {
        let title = report
            .title
            .clone()
            .unwrap_or_else(|| self.style.default_title.clone());
        // An explicit logo path is passed through (the builder skips it
        // silently when missing); otherwise the bundled logo is used when
        // present.
        let logo = report
            .logo_path
            .clone()
            .map(PathBuf::from)
            .or_else(|| self.default_logo());

        builder.add_cover(&title, logo.as_deref(), report.summary.as_deref())?;
        for insight in &report.insights {
            builder.add_section(&Section::paragraph("", insight.clone()))?;
        }
        for section in &report.sections {
            builder.add_section(section)?;
        }
        Ok(())
    }

    fn build_flat(
        &self,
        builder: &mut PdfReportBuilder,
        map: &Map<String, Value>,
        include_chart: bool,
    ) -> Result<(), ReportError> {
        builder.add_cover(
            &self.style.default_title,
            self.default_logo().as_deref(),
            None,
        )?;
        builder.add_section(&Section::table("Data", Value::Object(map.clone())))?;

        if include_chart {
            if let Some(spec) = auto_chart_spec(map) {
                builder.add_section(&Section::chart("Overview", vec![spec]))?;
            }
        }
        Ok(())
    }
}

/// Builds the auto-chart for a flat payload, when it qualifies.
///
/// At least [`AUTO_CHART_MIN_FIELDS`] top-level values must be numeric
/// (integer or real; booleans do not count). Zero-valued fields are dropped
/// from the plotted set unless that would leave no bars at all.
fn auto_chart_spec(map: &Map<String, Value>) -> Option<ChartSpec> {
    let numeric: Vec<(String, f64)> = map
        .iter()
        .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
        .collect();
    if numeric.len() < AUTO_CHART_MIN_FIELDS {
        return None;
    }

    let nonzero: Vec<(String, f64)> = numeric
        .iter()
        .filter(|(_, v)| *v != 0.0)
        .cloned()
        .collect();
    let plotted = if nonzero.is_empty() { numeric } else { nonzero };

    let (labels, values): (Vec<String>, Vec<f64>) = plotted.into_iter().unzip();
    Some(ChartSpec::bar(labels, values))
}

/// Coerces a loose payload into the mapping shape the core accepts.
///
/// Arrays become `{"item_1": .., "item_2": ..}`; strings and other scalars
/// become an error-shaped mapping that still produces a valid report.
pub fn normalize_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(_) => payload.clone(),
        Value::Array(items) => {
            let mut map = Map::new();
            for (idx, item) in items.iter().enumerate() {
                map.insert(format!("item_{}", idx + 1), item.clone());
            }
            Value::Object(map)
        }
        Value::String(raw) => {
            let mut preview = raw.clone();
            if preview.len() > RAW_INPUT_PREVIEW_LEN {
                let mut end = RAW_INPUT_PREVIEW_LEN;
                while !preview.is_char_boundary(end) {
                    end -= 1;
                }
                preview.truncate(end);
                preview.push_str("...");
            }
            json!({"error": "Unsupported payload type", "raw_input": preview})
        }
        other => {
            let type_name = match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                _ => "unknown",
            };
            json!({"error": "Unsupported payload type", "received_type": type_name})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_of(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn auto_chart_requires_three_numeric_fields() {
        let map = map_of(json!({"customer": "ACME", "total": 1000}));
        assert!(auto_chart_spec(&map).is_none());

        let map = map_of(json!({"a": 1, "b": 2, "c": "three"}));
        assert!(auto_chart_spec(&map).is_none());

        let map = map_of(json!({"a": 1, "b": 2, "c": 3, "label": "x"}));
        let spec = auto_chart_spec(&map).unwrap();
        assert_eq!(spec.chart_type, "bar");
        assert_eq!(spec.labels, vec!["a", "b", "c"]);
        assert_eq!(spec.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn booleans_do_not_count_as_numeric() {
        let map = map_of(json!({"a": 1, "b": 2, "c": true}));
        assert!(auto_chart_spec(&map).is_none());
    }

    #[test]
    fn zero_valued_fields_are_dropped_when_bars_remain() {
        let map = map_of(json!({"a": 1, "b": 0, "c": 2, "d": 3}));
        let spec = auto_chart_spec(&map).unwrap();
        assert_eq!(spec.labels, vec!["a", "c", "d"]);
    }

    #[test]
    fn all_zero_fields_are_kept_rather_than_emptying_the_chart() {
        let map = map_of(json!({"a": 0, "b": 0, "c": 0}));
        let spec = auto_chart_spec(&map).unwrap();
        assert_eq!(spec.labels, vec!["a", "b", "c"]);
        assert_eq!(spec.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn normalize_keeps_objects_and_indexes_arrays() {
        let obj = json!({"a": 1});
        assert_eq!(normalize_payload(&obj), obj);

        let normalized = normalize_payload(&json!(["x", 2]));
        assert_eq!(normalized, json!({"item_1": "x", "item_2": 2}));
    }

    #[test]
    fn normalize_wraps_scalars_in_an_error_mapping() {
        let normalized = normalize_payload(&json!("Please make a PDF"));
        assert_eq!(normalized["error"], "Unsupported payload type");
        assert_eq!(normalized["raw_input"], "Please make a PDF");

        let long_input: String = "x".repeat(500);
        let normalized = normalize_payload(&json!(long_input));
        let preview = normalized["raw_input"].as_str().unwrap();
        assert!(preview.len() <= RAW_INPUT_PREVIEW_LEN + 3);
        assert!(preview.ends_with("..."));

        let normalized = normalize_payload(&json!(42));
        assert_eq!(normalized["received_type"], "number");
    }

    #[test]
    fn default_output_paths_carry_a_disambiguator() {
        let generator = ReportGenerator::default().with_output_dir("/tmp/reports");
        let paths: Vec<PathBuf> = (0..5).map(|_| generator.resolve_output_path(None)).collect();
        for path in &paths {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("report-"));
            assert!(name.ends_with(".pdf"));
        }
        // same-second calls must still differ thanks to the random tag
        let distinct: std::collections::HashSet<_> = paths.iter().collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn caller_supplied_paths_are_used_verbatim() {
        let generator = ReportGenerator::default();
        let path = generator.resolve_output_path(Some(Path::new("out/custom.pdf")));
        assert_eq!(path, PathBuf::from("out/custom.pdf"));
    }
}
