//! The report2pdf library turns JSON report payloads into professionally
//! styled PDF documents. It provides a complete pipeline for classifying a
//! payload, formatting tables, rendering charts to raster images, and
//! laying everything out into a paginated A4 document.
//!
//! Two payload shapes are supported. A *flat* payload is a plain key/value
//! mapping, rendered as a cover page plus one data table (and an
//! auto-generated bar chart when at least three values are numeric):
//! ```rust,no_run
//! use report2pdf::config::ConfigSource;
//! use serde_json::json;
//! use std::error::Error;
//!
//! fn example() -> Result<(), Box<dyn Error>> {
//!     let payload = json!({"customer": "ACME", "total": 1282.38, "grand_total": 1282.38});
//!     let path = report2pdf::create_report(&payload, None, true, ConfigSource::Default)?;
//!     println!("report written to {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! A *structured* payload explicitly provides a title, an optional summary
//! and an ordered list of sections (paragraphs, tables and charts):
//! ```rust,no_run
//! use report2pdf::config::ConfigSource;
//! use serde_json::json;
//! use std::error::Error;
//!
//! fn example_structured() -> Result<(), Box<dyn Error>> {
//!     let payload = json!({
//!         "title": "Sales Report",
//!         "summary": "Quick overview",
//!         "insights": ["Sales are up"],
//!         "sections": [
//!             {"title": "Numbers", "type": "table", "data": [{"a": 1, "b": 2}]},
//!             {"title": "Bar Chart", "type": "chart",
//!              "chart_spec": {"chart_type": "bar", "labels": ["A", "B"], "values": [1, 2]}},
//!         ],
//!     });
//!     let path = report2pdf::create_report(&payload, None, true, ConfigSource::Default)?;
//!     println!("report written to {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! Styling is configurable through a TOML file (`report2pdfrc.toml`); see
//! the [`config`] module for the available sections:
//! ```toml
//! [cover]
//! size = 26
//! alignment = "center"
//!
//! [table]
//! grandtotalmarker = "grand_total"
//! ```
//!
//! The conversion process follows a structured pipeline. The payload is
//! classified once at the boundary into a flat or structured shape. Tables
//! and charts are then formatted and rendered, and finally the document
//! builder lays the blocks out into pages and cleans up every intermediate
//! chart raster it created.
//!
//! ## Payload Processing Flow
//! ```text
//! +--------------+     +------------------+     +----------------+
//! |  Payload     |     |  Classified      |     |  PDF Blocks    |
//! |  {"a": 1}    |     |  Flat | Struct   |     |  - Cover page  |
//! |  {"sections" | --> |  sections ->     | --> |  - Tables with |
//! |   : [...]}   |     |  table/chart/    |     |    shading     |
//! |              |     |  paragraph       |     |  - Chart PNGs  |
//! +--------------+     +------------------+     +----------------+
//! ```

pub mod chart;
pub mod config;
pub mod fonts;
pub mod payload;
pub mod pdf;
pub mod report;
pub mod styling;
pub mod table;

use report::ReportGenerator;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Represents errors that can occur during report generation.
/// This covers payload validation, chart rendering, document layout and
/// filesystem failures.
#[derive(Debug)]
pub enum ReportError {
    /// The payload has no content to report; fatal, never retried by the
    /// core.
    EmptyPayload { message: String },
    /// A chart spec named a type outside bar/pie/line.
    UnsupportedChartType {
        chart_type: String,
        suggestion: String,
    },
    /// A mutator was called on a builder past `save()`.
    AlreadyFinalized { operation: String },
    /// A chart spec was structurally invalid or its rendering failed.
    ChartError {
        message: String,
        suggestion: Option<String>,
    },
    /// The PDF document could not be laid out or written.
    PdfError {
        message: String,
        path: Option<String>,
        suggestion: Option<String>,
    },
    /// No usable font could be loaded for the document.
    FontError { message: String, suggestion: String },
    /// A filesystem operation failed.
    IoError {
        message: String,
        path: String,
        suggestion: String,
    },
}

impl Error for ReportError {}
impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReportError::EmptyPayload { message } => {
                write!(f, "❌ Empty Payload: {}", message)?;
                write!(
                    f,
                    "\n💡 Suggestion: Provide at least one field, section or insight"
                )?;
                Ok(())
            }
            ReportError::UnsupportedChartType {
                chart_type,
                suggestion,
            } => {
                write!(f, "❌ Unsupported Chart Type: '{}'", chart_type)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
            ReportError::AlreadyFinalized { operation } => {
                write!(
                    f,
                    "❌ Builder Error: '{}' called after the document was saved",
                    operation
                )?;
                write!(
                    f,
                    "\n💡 Suggestion: Create a new builder for each report"
                )?;
                Ok(())
            }
            ReportError::ChartError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Chart Error: {}", message)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n💡 Suggestion: {}", hint)?;
                }
                Ok(())
            }
            ReportError::PdfError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ PDF Generation Error: {}", message)?;
                if let Some(p) = path {
                    write!(f, "\n📁 Path: {}", p)?;
                }
                if let Some(hint) = suggestion {
                    write!(f, "\n💡 Suggestion: {}", hint)?;
                }
                Ok(())
            }
            ReportError::FontError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Font Error: {}", message)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
            ReportError::IoError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ File Error: {}", message)?;
                write!(f, "\n📁 Path: {}", path)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
        }
    }
}

impl ReportError {
    /// Creates an empty-payload error with just a message.
    pub fn empty_payload(message: impl Into<String>) -> Self {
        ReportError::EmptyPayload {
            message: message.into(),
        }
    }

    /// Creates an unsupported-chart-type error naming the offending value.
    pub fn unsupported_chart_type(chart_type: impl Into<String>) -> Self {
        ReportError::UnsupportedChartType {
            chart_type: chart_type.into(),
            suggestion: "Use one of the supported chart types: bar, pie, line".to_string(),
        }
    }

    /// Creates an already-finalized error naming the rejected operation.
    pub fn already_finalized(operation: impl Into<String>) -> Self {
        ReportError::AlreadyFinalized {
            operation: operation.into(),
        }
    }

    /// Creates a simple chart error with just a message.
    pub fn chart_error(message: impl Into<String>) -> Self {
        ReportError::ChartError {
            message: message.into(),
            suggestion: Some(
                "Check that labels and values are parallel sequences of the expected types"
                    .to_string(),
            ),
        }
    }
}

/// Creates a PDF report from a JSON payload and returns its absolute path.
///
/// This is the high-level interface used by the tool-serving layer: it
/// builds a default-configured [`report::ReportGenerator`] with the styling
/// from `config` and generates a single report. `out_path` overrides the
/// default timestamped location under `reports/`; `include_chart` controls
/// the auto-generated chart for flat payloads.
///
/// # Errors
/// * [`ReportError::EmptyPayload`] when the payload has nothing to report
/// * [`ReportError::UnsupportedChartType`] for chart specs outside bar/pie/line
/// * font, layout and filesystem errors from the underlying stages
pub fn create_report(
    payload: &Value,
    out_path: Option<&Path>,
    include_chart: bool,
    config: config::ConfigSource,
) -> Result<PathBuf, ReportError> {
    let style = config::load_config_from_source(config);
    ReportGenerator::new(style).create_report(payload, out_path, include_chart)
}

/// Creates a PDF report with the integration layer's recovery contract.
///
/// Loose payload shapes are coerced to a mapping first (arrays become
/// indexed fields, scalars an error-shaped mapping), and any failure is
/// retried exactly once as a minimal error-content report with charts
/// disabled. Only when that retry also fails does the error propagate.
pub fn create_report_with_fallback(
    payload: &Value,
    out_path: Option<&Path>,
    include_chart: bool,
    config: config::ConfigSource,
) -> Result<PathBuf, ReportError> {
    let style = config::load_config_from_source(config);
    ReportGenerator::new(style).create_report_with_fallback(payload, out_path, include_chart)
}
