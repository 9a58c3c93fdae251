//! Payload classification for report requests.
//!
//! Incoming payloads are JSON objects in one of two shapes. A *flat* payload
//! is a plain key/value mapping that becomes a single table (with an
//! optional auto-generated chart); a *structured* payload explicitly
//! provides `title`, `summary`, `insights` and an ordered `sections` list.
//! The shape is decided exactly once, here, and expressed as a tagged
//! union — the rest of the pipeline never re-inspects the raw JSON to guess
//! what it was handed.
//!
//! Unrecognized section types are preserved as an explicit
//! [`SectionKind::Unsupported`] variant instead of an error, so the
//! document builder can degrade them to a visible placeholder while the
//! rest of the document still renders.

use crate::ReportError;
use serde_json::{Map, Value};

/// A classified report payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    /// A plain mapping, rendered as one table plus an optional auto chart.
    Flat(Map<String, Value>),
    /// A payload with an explicit cover and section list.
    Structured(StructuredReport),
}

/// The explicit multi-section payload shape.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredReport {
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Ordered list of short findings, each emitted as a titleless paragraph.
    pub insights: Vec<String>,
    /// Cover logo override from `cover.logo_path`.
    pub logo_path: Option<String>,
    pub sections: Vec<Section>,
}

/// One document block.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section heading; may be empty for titleless blocks.
    pub title: String,
    pub kind: SectionKind,
}

/// The type-specific content of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    Paragraph { text: String },
    Table { data: Value },
    /// One or more charts, rendered as separate images in order.
    Chart { specs: Vec<ChartSpec> },
    /// A `type` value this engine does not know; rendered as a placeholder.
    Unsupported { type_name: String },
}

impl Section {
    pub fn paragraph(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: SectionKind::Paragraph { text: text.into() },
        }
    }

    pub fn table(title: impl Into<String>, data: Value) -> Self {
        Self {
            title: title.into(),
            kind: SectionKind::Table { data },
        }
    }

    pub fn chart(title: impl Into<String>, specs: Vec<ChartSpec>) -> Self {
        Self {
            title: title.into(),
            kind: SectionKind::Chart { specs },
        }
    }
}

/// The minimal description needed to render one chart image.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Requested chart type (`bar`, `pie` or `line`); validated by the
    /// renderer so that unknown values surface as `UnsupportedChartType`.
    pub chart_type: String,
    /// Category labels, parallel to `values`.
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Optional `#rrggbb` override for single-color chart types.
    pub color: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ChartSpec {
    pub fn bar(labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            chart_type: "bar".to_string(),
            labels,
            values,
            color: None,
            width: None,
            height: None,
        }
    }
}

/// Renders a scalar JSON value the way it should appear as a label.
/// Numbers keep their JSON text (no forced decimal point), null is empty.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_chart_spec(value: &Value) -> Result<ChartSpec, ReportError> {
    let obj = value.as_object().ok_or_else(|| {
        ReportError::chart_error("chart_spec must be an object with chart_type, labels and values")
    })?;

    let chart_type = obj
        .get("chart_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let labels = match obj.get("labels").and_then(Value::as_array) {
        Some(items) => items.iter().map(scalar_text).collect(),
        None => Vec::new(),
    };

    let mut values = Vec::new();
    if let Some(items) = obj.get("values").and_then(Value::as_array) {
        for item in items {
            match item.as_f64() {
                Some(v) => values.push(v),
                None => {
                    return Err(ReportError::chart_error(format!(
                        "chart values must be numeric, got {}",
                        item
                    )))
                }
            }
        }
    }

    Ok(ChartSpec {
        chart_type,
        labels,
        values,
        color: obj.get("color").and_then(Value::as_str).map(str::to_string),
        width: obj.get("width").and_then(Value::as_u64).map(|v| v as u32),
        height: obj.get("height").and_then(Value::as_u64).map(|v| v as u32),
    })
}

fn parse_section(value: &Value) -> Result<Section, ReportError> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            // Non-object entries degrade like unknown section types.
            return Ok(Section {
                title: String::new(),
                kind: SectionKind::Unsupported {
                    type_name: "non-object section".to_string(),
                },
            });
        }
    };

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let kind = match type_name.as_str() {
        "paragraph" => SectionKind::Paragraph {
            text: obj
                .get("text")
                .map(scalar_text)
                .unwrap_or_default(),
        },
        "table" => SectionKind::Table {
            data: obj.get("data").cloned().unwrap_or(Value::Null),
        },
        "chart" => {
            let spec_value = obj.get("chart_spec").unwrap_or(&Value::Null);
            let specs = match spec_value {
                Value::Array(items) => items
                    .iter()
                    .map(parse_chart_spec)
                    .collect::<Result<Vec<_>, _>>()?,
                Value::Null => Vec::new(),
                single => vec![parse_chart_spec(single)?],
            };
            SectionKind::Chart { specs }
        }
        other => SectionKind::Unsupported {
            type_name: other.to_string(),
        },
    };

    Ok(Section { title, kind })
}

/// Classifies a raw JSON payload into the flat or structured shape.
///
/// A payload is structured iff it is an object containing a `sections` key;
/// any other object is flat. Empty payloads — an object with no keys, or a
/// structured payload with neither sections nor insights — are rejected
/// with [`ReportError::EmptyPayload`], as are non-object payloads (callers
/// that accept looser input normalize it first, see
/// [`crate::report::ReportGenerator::create_report_with_fallback`]).
pub fn classify(payload: &Value) -> Result<ReportPayload, ReportError> {
    let obj = payload.as_object().ok_or_else(|| {
        ReportError::empty_payload("payload must be a JSON object with at least one field")
    })?;

    if !obj.contains_key("sections") {
        if obj.is_empty() {
            return Err(ReportError::empty_payload("payload has no fields to report"));
        }
        return Ok(ReportPayload::Flat(obj.clone()));
    }

    let sections = match obj.get("sections") {
        Some(Value::Array(items)) => items
            .iter()
            .map(parse_section)
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let insights: Vec<String> = match obj.get("insights").and_then(Value::as_array) {
        Some(items) => items.iter().map(scalar_text).collect(),
        None => Vec::new(),
    };

    if sections.is_empty() && insights.is_empty() {
        return Err(ReportError::empty_payload(
            "structured payload has no sections and no insights",
        ));
    }

    Ok(ReportPayload::Structured(StructuredReport {
        title: obj.get("title").and_then(Value::as_str).map(str::to_string),
        summary: obj
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string),
        insights,
        logo_path: obj
            .get("cover")
            .and_then(|c| c.get("logo_path"))
            .and_then(Value::as_str)
            .map(str::to_string),
        sections,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_mapping_classifies_as_flat() {
        let payload = json!({"customer": "ACME", "total": 1000});
        match classify(&payload).unwrap() {
            ReportPayload::Flat(map) => {
                // insertion order is preserved
                let keys: Vec<_> = map.keys().collect();
                assert_eq!(keys, vec!["customer", "total"]);
            }
            other => panic!("expected flat payload, got {:?}", other),
        }
    }

    #[test]
    fn sections_key_classifies_as_structured() {
        let payload = json!({
            "title": "Report",
            "summary": "S",
            "cover": {"logo_path": "assets/logo.png"},
            "insights": ["ok"],
            "sections": [
                {"title": "Data", "type": "table", "data": {"a": 1}},
                {"title": "Intro", "type": "paragraph", "text": "Hello"},
            ],
        });
        match classify(&payload).unwrap() {
            ReportPayload::Structured(report) => {
                assert_eq!(report.title.as_deref(), Some("Report"));
                assert_eq!(report.logo_path.as_deref(), Some("assets/logo.png"));
                assert_eq!(report.insights, vec!["ok"]);
                assert_eq!(report.sections.len(), 2);
                assert!(matches!(
                    report.sections[1].kind,
                    SectionKind::Paragraph { .. }
                ));
            }
            other => panic!("expected structured payload, got {:?}", other),
        }
    }

    #[test]
    fn empty_payloads_are_rejected() {
        assert!(matches!(
            classify(&json!({})),
            Err(ReportError::EmptyPayload { .. })
        ));
        assert!(matches!(
            classify(&json!({"sections": []})),
            Err(ReportError::EmptyPayload { .. })
        ));
        assert!(matches!(
            classify(&json!("just a string")),
            Err(ReportError::EmptyPayload { .. })
        ));
    }

    #[test]
    fn insights_alone_keep_a_structured_payload_alive() {
        let payload = json!({"sections": [], "insights": ["finding one"]});
        assert!(matches!(
            classify(&payload),
            Ok(ReportPayload::Structured(_))
        ));
    }

    #[test]
    fn chart_spec_accepts_single_object_and_list() {
        let single = json!({
            "sections": [{
                "title": "Chart",
                "type": "chart",
                "chart_spec": {"chart_type": "bar", "labels": ["A"], "values": [1]},
            }],
        });
        let ReportPayload::Structured(report) = classify(&single).unwrap() else {
            panic!("expected structured payload");
        };
        let SectionKind::Chart { specs } = &report.sections[0].kind else {
            panic!("expected chart section");
        };
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].chart_type, "bar");

        let multi = json!({
            "sections": [{
                "title": "Multi",
                "type": "chart",
                "chart_spec": [
                    {"chart_type": "bar", "labels": ["A", "B"], "values": [1, 2], "color": "#ff0000"},
                    {"chart_type": "line", "labels": [1, 2], "values": [3, 4]},
                ],
            }],
        });
        let ReportPayload::Structured(report) = classify(&multi).unwrap() else {
            panic!("expected structured payload");
        };
        let SectionKind::Chart { specs } = &report.sections[0].kind else {
            panic!("expected chart section");
        };
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].color.as_deref(), Some("#ff0000"));
        // numeric labels are stringified
        assert_eq!(specs[1].labels, vec!["1", "2"]);
    }

    #[test]
    fn unknown_section_type_becomes_unsupported() {
        let payload = json!({
            "sections": [{"title": "X", "type": "hologram"}],
        });
        let ReportPayload::Structured(report) = classify(&payload).unwrap() else {
            panic!("expected structured payload");
        };
        assert_eq!(
            report.sections[0].kind,
            SectionKind::Unsupported {
                type_name: "hologram".to_string()
            }
        );
    }

    #[test]
    fn non_numeric_chart_values_are_an_error() {
        let payload = json!({
            "sections": [{
                "type": "chart",
                "chart_spec": {"chart_type": "bar", "labels": ["A"], "values": ["one"]},
            }],
        });
        assert!(matches!(
            classify(&payload),
            Err(ReportError::ChartError { .. })
        ));
    }
}
