//! Table formatting: turning arbitrary JSON data into a tabular layout.
//!
//! The formatter accepts the two data shapes table sections carry — a
//! key/value mapping or a list of records — and produces a [`TableModel`]:
//! rows of cells with the presentation metadata (header, parity shading,
//! emphasis) already attached. Heterogeneous and nested values are
//! flattened to display text here so the document builder only deals with
//! strings.
//!
//! Formatting is deterministic: mappings are walked in insertion order
//! (the JSON map preserves it), record-key unions are sorted, and the same
//! input always yields a structurally identical model.

use crate::payload::scalar_text;
use serde_json::Value;

/// One formatted table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    /// Emphasized (bold) rendering, used for grand-total value cells.
    pub bold: bool,
}

impl TableCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }
}

/// One formatted table row with its parity-shading flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Alternating-row shading, precomputed by row parity.
    pub shaded: bool,
}

/// The complete layout of one table: an optional header row plus data rows.
///
/// A model is never structurally empty; inputs without usable rows yield a
/// single `("No data", "")` placeholder row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub header: Option<Vec<String>>,
    pub rows: Vec<TableRow>,
}

impl TableModel {
    /// Number of columns in the widest row (headers included).
    pub fn column_count(&self) -> usize {
        let header_width = self.header.as_ref().map(Vec::len).unwrap_or(0);
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
            .max(header_width)
            .max(1)
    }
}

/// Renders one value for display inside a cell.
///
/// A non-empty list of mappings is joined into a single multi-line cell,
/// one `"k1: v1, k2: v2"` line per record. Any other nested value falls
/// back to its JSON text. Scalars (including booleans, zero and the empty
/// string) render as-is; null renders empty.
fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items)
            if !items.is_empty() && items.iter().all(Value::is_object) =>
        {
            items
                .iter()
                .map(|item| {
                    item.as_object()
                        .map(|obj| {
                            obj.iter()
                                .map(|(k, v)| format!("{}: {}", k, scalar_text(v)))
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::Object(_) | Value::Array(_) => value.to_string(),
        scalar => scalar_text(scalar),
    }
}

/// Builds a key/value row, emphasizing the value cell of the reserved
/// grand-total marker.
fn field_row(key: &str, value: &Value, marker: &str) -> Vec<TableCell> {
    vec![
        TableCell::plain(key),
        TableCell {
            text: render_value(value),
            bold: key == marker,
        },
    ]
}

/// Formats a list of records into a fixed-column table.
///
/// The header is the sorted union of all record keys; every record becomes
/// one row, with `""` for keys it does not carry. Items that are not
/// mappings occupy the first column of their row.
fn format_records(items: &[Value]) -> (Option<Vec<String>>, Vec<Vec<TableCell>>) {
    let mut columns: Vec<String> = items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys().cloned())
        .collect();
    columns.sort();
    columns.dedup();

    if columns.is_empty() {
        let rows = items
            .iter()
            .map(|item| vec![TableCell::plain(render_value(item))])
            .collect();
        return (None, rows);
    }

    let rows = items
        .iter()
        .map(|item| match item.as_object() {
            Some(obj) => columns
                .iter()
                .map(|col| {
                    TableCell::plain(obj.get(col).map(render_value).unwrap_or_default())
                })
                .collect(),
            None => {
                let mut cells = vec![TableCell::plain(render_value(item))];
                cells.resize(columns.len(), TableCell::plain(""));
                cells
            }
        })
        .collect();

    (Some(columns), rows)
}

/// Whether a mapping matches the special "one named list of structured
/// items" shape: a `title` key plus a `data` key holding a non-empty list
/// of mappings.
fn is_titled_record_list(obj: &serde_json::Map<String, Value>) -> bool {
    obj.contains_key("title")
        && obj
            .get("data")
            .and_then(Value::as_array)
            .map(|items| !items.is_empty() && items.iter().all(Value::is_object))
            .unwrap_or(false)
}

/// Formats arbitrary table data into a [`TableModel`].
///
/// `marker` is the reserved field name whose value cell is emphasized
/// (see `TableStyle::grand_total_marker`).
pub fn format_table(data: &Value, marker: &str) -> TableModel {
    let (header, raw_rows) = match data {
        Value::Object(obj) if is_titled_record_list(obj) => {
            // Deliberate special case: render the title as its own row,
            // flatten every record's key/value pairs into successive rows,
            // then append the remaining top-level fields.
            let mut rows: Vec<Vec<TableCell>> = Vec::new();
            if let Some(title) = obj.get("title") {
                rows.push(vec![
                    TableCell::plain(render_value(title)),
                    TableCell::plain(""),
                ]);
            }
            if let Some(items) = obj.get("data").and_then(Value::as_array) {
                for item in items {
                    if let Some(record) = item.as_object() {
                        for (k, v) in record {
                            rows.push(field_row(k, v, marker));
                        }
                    }
                }
            }
            for (k, v) in obj {
                if k != "title" && k != "data" {
                    rows.push(field_row(k, v, marker));
                }
            }
            (Some(vec!["Field".to_string(), "Value".to_string()]), rows)
        }
        Value::Object(obj) => {
            let rows = obj.iter().map(|(k, v)| field_row(k, v, marker)).collect();
            (Some(vec!["Field".to_string(), "Value".to_string()]), rows)
        }
        Value::Array(items) if !items.is_empty() => format_records(items),
        _ => (None, Vec::new()),
    };

    let mut rows: Vec<TableRow> = raw_rows
        .into_iter()
        .enumerate()
        .map(|(idx, cells)| TableRow {
            cells,
            shaded: idx % 2 == 1,
        })
        .collect();

    if rows.is_empty() {
        rows.push(TableRow {
            cells: vec![TableCell::plain("No data"), TableCell::plain("")],
            shaded: false,
        });
    }

    TableModel { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MARKER: &str = "grand_total";

    #[test]
    fn mapping_keeps_insertion_order() {
        let data = json!({"customer": "Test", "value": 123, "grand_total": 456});
        let model = format_table(&data, MARKER);
        assert_eq!(model.header, Some(vec!["Field".into(), "Value".into()]));
        let labels: Vec<_> = model.rows.iter().map(|r| r.cells[0].text.as_str()).collect();
        assert_eq!(labels, vec!["customer", "value", "grand_total"]);
        assert_eq!(model.rows[1].cells[1].text, "123");
    }

    #[test]
    fn grand_total_value_cell_is_bold() {
        let data = json!({"foo": "bar", "grand_total": 999});
        let model = format_table(&data, MARKER);
        assert!(!model.rows[0].cells[1].bold);
        assert!(model.rows[1].cells[1].bold);
        assert_eq!(model.rows[1].cells[1].text, "999");
    }

    #[test]
    fn rows_alternate_shading_by_parity() {
        let data = json!({"a": 1, "b": 2, "c": 3});
        let model = format_table(&data, MARKER);
        assert!(!model.rows[0].shaded);
        assert!(model.rows[1].shaded);
        assert!(!model.rows[2].shaded);
    }

    #[test]
    fn scalars_render_as_is_and_are_not_suppressed() {
        let data = json!({
            "string": "text value",
            "integer": 42,
            "float": 3.14159,
            "boolean": true,
            "none_value": null,
            "empty_string": "",
            "zero_value": 0,
        });
        let model = format_table(&data, MARKER);
        assert_eq!(model.rows.len(), 7);
        let value_of = |key: &str| {
            model
                .rows
                .iter()
                .find(|r| r.cells[0].text == key)
                .map(|r| r.cells[1].text.clone())
                .unwrap()
        };
        assert_eq!(value_of("integer"), "42");
        assert_eq!(value_of("boolean"), "true");
        assert_eq!(value_of("none_value"), "");
        assert_eq!(value_of("empty_string"), "");
        assert_eq!(value_of("zero_value"), "0");
    }

    #[test]
    fn list_of_records_value_joins_into_one_cell() {
        let data = json!({
            "items": [{"a": 1, "b": 2}, {"c": 3}],
        });
        let model = format_table(&data, MARKER);
        assert_eq!(model.rows[0].cells[1].text, "a: 1, b: 2\nc: 3");
    }

    #[test]
    fn other_nested_values_use_their_json_text() {
        let data = json!({"config": {"nested": true}, "mixed": [1, "two"]});
        let model = format_table(&data, MARKER);
        assert_eq!(model.rows[0].cells[1].text, r#"{"nested":true}"#);
        assert_eq!(model.rows[1].cells[1].text, r#"[1,"two"]"#);
    }

    #[test]
    fn titled_record_list_flattens_records_then_trailing_fields() {
        let data = json!({
            "title": "Items",
            "data": [{"a": 1}, {"b": 2}],
            "extra": "val",
        });
        let model = format_table(&data, MARKER);
        let labels: Vec<_> = model.rows.iter().map(|r| r.cells[0].text.as_str()).collect();
        assert_eq!(labels, vec!["Items", "a", "b", "extra"]);
        assert_eq!(model.rows[1].cells[1].text, "1");
        assert_eq!(model.rows[3].cells[1].text, "val");
    }

    #[test]
    fn record_list_builds_sorted_union_header() {
        let data = json!([{"year": 2024, "sales": 456.78}, {"month": "February"}]);
        let model = format_table(&data, MARKER);
        assert_eq!(
            model.header,
            Some(vec!["month".into(), "sales".into(), "year".into()])
        );
        assert_eq!(model.rows.len(), 2);
        // missing keys render as empty strings
        assert_eq!(model.rows[0].cells[0].text, "");
        assert_eq!(model.rows[1].cells[0].text, "February");
        assert_eq!(model.rows[1].cells[1].text, "");
    }

    #[test]
    fn empty_input_yields_placeholder_row() {
        let model = format_table(&Value::Null, MARKER);
        assert_eq!(model.rows.len(), 1);
        assert_eq!(model.rows[0].cells[0].text, "No data");
        assert_eq!(model.rows[0].cells[1].text, "");
    }

    #[test]
    fn formatting_is_idempotent() {
        let data = json!({"b": 1, "a": {"x": [1, 2]}, "grand_total": 3});
        let first = format_table(&data, MARKER);
        let second = format_table(&data, MARKER);
        assert_eq!(first, second);
    }
}
