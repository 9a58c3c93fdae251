//! PDF document building for report generation.
//!
//! This module assembles the accumulated report blocks — cover page,
//! paragraphs, tables and chart images — into a paginated A4 document and
//! writes it to disk. Block elements are rendered with the configured
//! styling: the cover title is centered with a generation timestamp, tables
//! get grid lines with an emphasized header row and alternating row
//! shading, and chart images are embedded centered at their rendered size.
//!
//! The builder is a per-report session object. It owns every temporary
//! chart raster it creates and guarantees their deletion on every exit
//! path: `save` drains the registry whether or not the write succeeds, and
//! an abandoned builder cleans up when it is dropped. Failures inside a
//! single section degrade to a visible placeholder where possible so the
//! rest of the document still renders.

use crate::chart::ChartRenderer;
use crate::fonts;
use crate::payload::{Section, SectionKind};
use crate::styling::{BasicTextStyle, ReportStyle, TextAlignment};
use crate::table::{format_table, TableModel};
use crate::ReportError;
use chrono::Local;
use genpdf::elements::{
    Break, FrameCellDecorator, Image, LinearLayout, PageBreak, Paragraph, TableLayout,
};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element, Margins, PaperSize, SimplePageDecorator};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Converts a configured text style into a genpdf style.
fn text_style(style: &BasicTextStyle) -> Style {
    let mut s = Style::new().with_font_size(style.size);
    if style.bold {
        s = s.bold();
    }
    if let Some((r, g, b)) = style.text_color {
        s = s.with_color(Color::Rgb(r, g, b));
    }
    s
}

fn alignment(style: &BasicTextStyle) -> Alignment {
    match style.alignment {
        Some(TextAlignment::Center) => Alignment::Center,
        Some(TextAlignment::Right) => Alignment::Right,
        _ => Alignment::Left,
    }
}

/// A styled paragraph block with the configured alignment.
fn styled_paragraph(text: &str, style: &BasicTextStyle) -> impl Element {
    Paragraph::new(text.to_string())
        .aligned(alignment(style))
        .styled(text_style(style))
}

/// A table cell element. Multi-line cell text (joined record lists) becomes
/// a vertical stack of paragraphs, since a paragraph is one logical line.
fn cell_element(text: &str, style: Style) -> LinearLayout {
    let mut layout = LinearLayout::vertical();
    if text.contains('\n') {
        for line in text.split('\n') {
            layout.push(Paragraph::new(line.to_string()).styled(style));
        }
    } else {
        layout.push(Paragraph::new(text.to_string()).styled(style));
    }
    layout
}

/// A stateful builder that accumulates document blocks and writes the final
/// PDF on [`save`](PdfReportBuilder::save).
///
/// The builder moves through `Building → Saved`; `save` is terminal and any
/// later call fails with [`ReportError::AlreadyFinalized`]. `add_cover` is
/// optional and expected first — calling it twice simply produces two cover
/// pages.
pub struct PdfReportBuilder {
    doc: Option<Document>,
    style: ReportStyle,
    out_path: PathBuf,
    charts: ChartRenderer,
    /// Chart rasters created for this document; drained on save, dropped
    /// (and thereby deleted) if the builder is abandoned.
    temp_images: Vec<NamedTempFile>,
}

impl PdfReportBuilder {
    /// Creates a builder writing to `out_path`, loading the system font and
    /// configuring the A4 page with the styled margins.
    pub fn new(out_path: impl Into<PathBuf>, style: ReportStyle) -> Result<Self, ReportError> {
        let font_family = fonts::load_report_font_family()?;
        let mut doc = Document::new(font_family);
        doc.set_title(style.default_title.clone());
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(style.text.size);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::trbl(
            f64::from(style.margins.top),
            f64::from(style.margins.right),
            f64::from(style.margins.bottom),
            f64::from(style.margins.left),
        ));
        doc.set_page_decorator(decorator);

        let charts = ChartRenderer::new(style.chart.clone());
        Ok(Self {
            doc: Some(doc),
            style,
            out_path: out_path.into(),
            charts,
            temp_images: Vec::new(),
        })
    }

    fn doc_mut(&mut self, operation: &str) -> Result<&mut Document, ReportError> {
        self.doc
            .as_mut()
            .ok_or_else(|| ReportError::already_finalized(operation))
    }

    /// Adds a cover page: optional logo, centered title, generation
    /// timestamp and an optional boxed summary, followed by a page break.
    ///
    /// A logo path that does not resolve to a file is skipped silently; a
    /// logo that exists but cannot be decoded is logged and skipped.
    pub fn add_cover(
        &mut self,
        title: &str,
        logo_path: Option<&Path>,
        summary: Option<&str>,
    ) -> Result<(), ReportError> {
        let style = self.style.clone();
        let doc = self.doc_mut("add_cover")?;

        if let Some(path) = logo_path {
            if path.is_file() {
                match Image::from_path(path) {
                    Ok(image) => {
                        doc.push(Break::new(1.0));
                        doc.push(image.with_alignment(Alignment::Center));
                    }
                    Err(err) => warn!("could not embed logo {}: {}", path.display(), err),
                }
            } else {
                debug!("cover logo {} not found, skipping", path.display());
            }
        }

        doc.push(Break::new(f64::from(style.cover_title.before_spacing)));
        doc.push(styled_paragraph(title, &style.cover_title));
        doc.push(Break::new(0.3));
        doc.push(
            Paragraph::new(format!(
                "Generated: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ))
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(9).with_color(Color::Rgb(120, 120, 120))),
        );

        if let Some(summary) = summary {
            doc.push(Break::new(f64::from(style.summary.before_spacing)));
            doc.push(
                Paragraph::new(summary.to_string())
                    .styled(text_style(&style.summary))
                    .padded(Margins::trbl(2.0, 2.0, 2.0, 2.0))
                    .framed(),
            );
        }

        doc.push(PageBreak::new());
        Ok(())
    }

    /// Adds one content section, dispatching on its kind.
    ///
    /// Chart sections render every spec as a separate embedded image, in
    /// order. Unsupported section types degrade to a visible placeholder
    /// block; chart failures propagate so the calling layer can substitute
    /// an error report.
    pub fn add_section(&mut self, section: &Section) -> Result<(), ReportError> {
        if self.doc.is_none() {
            return Err(ReportError::already_finalized("add_section"));
        }

        if !section.title.is_empty() {
            let title_style = self.style.section_title.clone();
            let doc = self.doc_mut("add_section")?;
            doc.push(Break::new(f64::from(title_style.before_spacing)));
            doc.push(styled_paragraph(&section.title, &title_style));
            doc.push(Break::new(f64::from(title_style.after_spacing)));
        }

        match &section.kind {
            SectionKind::Paragraph { text } => {
                let text_style_cfg = self.style.text.clone();
                let doc = self.doc_mut("add_section")?;
                doc.push(styled_paragraph(text, &text_style_cfg));
                doc.push(Break::new(f64::from(text_style_cfg.after_spacing)));
            }
            SectionKind::Table { data } => {
                let model = format_table(data, &self.style.table.grand_total_marker);
                self.push_table(&model)?;
            }
            SectionKind::Chart { specs } => {
                for spec in specs {
                    let raster = self.charts.render(spec)?;
                    self.push_chart_image(raster)?;
                }
            }
            SectionKind::Unsupported { type_name } => {
                warn!("unsupported section type '{}', emitting placeholder", type_name);
                let doc = self.doc_mut("add_section")?;
                doc.push(
                    Paragraph::new(format!("[Unsupported section type: {}]", type_name))
                        .styled(Style::new().italic().with_color(Color::Rgb(150, 60, 60)))
                        .padded(Margins::trbl(1.0, 1.0, 1.0, 1.0))
                        .framed(),
                );
                doc.push(Break::new(0.5));
            }
        }
        Ok(())
    }

    /// Lays a formatted table into the document with grid lines, an
    /// emphasized header row and parity-shaded data rows. A row that fails
    /// to lay out is skipped with a warning rather than aborting the
    /// document.
    fn push_table(&mut self, model: &TableModel) -> Result<(), ReportError> {
        let style = self.style.clone();
        let columns = model.column_count();
        let doc = self.doc_mut("add_section")?;

        let mut table = TableLayout::new(vec![1; columns]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

        if let Some(header) = &model.header {
            let mut row = table.row();
            for column in 0..columns {
                let text = header.get(column).map(String::as_str).unwrap_or("");
                row.push_element(cell_element(text, text_style(&style.table.header)));
            }
            if let Err(err) = row.push() {
                warn!("failed to lay out table header: {}", err);
                return Ok(());
            }
        }

        for row_model in &model.rows {
            let mut base = text_style(&style.table.cell);
            if row_model.shaded {
                let (r, g, b) = style.table.shaded_color;
                base = base.with_color(Color::Rgb(r, g, b));
            }
            let mut row = table.row();
            for column in 0..columns {
                match row_model.cells.get(column) {
                    Some(cell) => {
                        let cell_style = if cell.bold { base.bold() } else { base };
                        row.push_element(cell_element(&cell.text, cell_style));
                    }
                    None => row.push_element(cell_element("", base)),
                }
            }
            if let Err(err) = row.push() {
                warn!("failed to lay out table row: {}", err);
            }
        }

        doc.push(table);
        doc.push(Break::new(f64::from(style.table.cell.after_spacing)));
        Ok(())
    }

    /// Embeds a rendered chart raster and takes ownership of its deletion.
    fn push_chart_image(&mut self, raster: NamedTempFile) -> Result<(), ReportError> {
        let image = Image::from_path(raster.path()).map_err(|err| {
            ReportError::chart_error(format!("could not embed chart image: {}", err))
        })?;
        let doc = self.doc_mut("add_section")?;
        doc.push(image.with_alignment(Alignment::Center));
        doc.push(Break::new(0.5));
        self.temp_images.push(raster);
        Ok(())
    }

    /// Writes the document and returns the resolved absolute output path.
    ///
    /// Terminal: the builder transitions to its saved state and every later
    /// mutator (or second `save`) fails with `AlreadyFinalized`. The
    /// temporary chart rasters are deleted on this call's success and error
    /// paths alike.
    pub fn save(&mut self) -> Result<PathBuf, ReportError> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| ReportError::already_finalized("save"))?;
        let result = self.write_document(doc);
        // The rasters are embedded (or the write failed); either way they
        // are no longer needed.
        self.temp_images.clear();
        result
    }

    fn write_document(&self, doc: Document) -> Result<PathBuf, ReportError> {
        if let Some(parent) = self.out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| ReportError::IoError {
                    message: format!("could not create output directory: {}", err),
                    path: parent.display().to_string(),
                    suggestion: "Check the output location and its permissions".to_string(),
                })?;
            }
        }

        doc.render_to_file(&self.out_path)
            .map_err(|err| ReportError::PdfError {
                message: err.to_string(),
                path: Some(self.out_path.display().to_string()),
                suggestion: Some(
                    "Check that you have write permissions and available disk space".to_string(),
                ),
            })?;

        self.out_path.canonicalize().map_err(|err| ReportError::IoError {
            message: format!("could not resolve output path: {}", err),
            path: self.out_path.display().to_string(),
            suggestion: "The report file vanished after writing; check the filesystem".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::ChartSpec;
    use serde_json::json;

    /// Builds a test builder, or skips the test when the environment has no
    /// usable system font.
    fn test_builder(out_path: &Path) -> Option<PdfReportBuilder> {
        match PdfReportBuilder::new(out_path, ReportStyle::default()) {
            Ok(builder) => Some(builder),
            Err(ReportError::FontError { .. }) => {
                eprintln!("Skipping test: no usable system font");
                None
            }
            Err(other) => panic!("unexpected builder error: {}", other),
        }
    }

    #[test]
    fn build_save_produces_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("test.pdf")) else {
            return;
        };
        builder.add_cover("Report", None, None).unwrap();
        builder
            .add_section(&Section::table(
                "Data",
                json!({"foo": "bar", "grand_total": 999}),
            ))
            .unwrap();
        let path = builder.save().unwrap();
        assert!(path.is_absolute());
        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() > 1000);
    }

    #[test]
    fn mutators_after_save_fail_with_already_finalized() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("final.pdf")) else {
            return;
        };
        builder
            .add_section(&Section::paragraph("P", "Hi"))
            .unwrap();
        builder.save().unwrap();

        assert!(matches!(
            builder.add_cover("Again", None, None),
            Err(ReportError::AlreadyFinalized { .. })
        ));
        assert!(matches!(
            builder.add_section(&Section::paragraph("P", "Hi")),
            Err(ReportError::AlreadyFinalized { .. })
        ));
        assert!(matches!(
            builder.save(),
            Err(ReportError::AlreadyFinalized { .. })
        ));
    }

    #[test]
    fn chart_rasters_are_deleted_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("charts.pdf")) else {
            return;
        };
        builder.add_cover("Charts", None, None).unwrap();
        builder
            .add_section(&Section::chart(
                "Multi",
                vec![
                    ChartSpec::bar(vec!["A".into(), "B".into()], vec![1.0, 2.0]),
                    ChartSpec {
                        chart_type: "line".to_string(),
                        labels: vec!["1".into(), "2".into()],
                        values: vec![3.0, 4.0],
                        color: None,
                        width: None,
                        height: None,
                    },
                ],
            ))
            .unwrap();

        let raster_paths: Vec<PathBuf> = builder
            .temp_images
            .iter()
            .map(|f| f.path().to_path_buf())
            .collect();
        assert_eq!(raster_paths.len(), 2);
        for path in &raster_paths {
            assert!(path.exists());
        }

        let pdf_path = builder.save().unwrap();
        assert!(pdf_path.exists());
        for path in &raster_paths {
            assert!(!path.exists(), "raster {} must be deleted", path.display());
        }
    }

    #[test]
    fn chart_rasters_are_deleted_when_the_builder_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let raster_path;
        {
            let Some(mut builder) = test_builder(&dir.path().join("dropped.pdf")) else {
                return;
            };
            builder
                .add_section(&Section::chart(
                    "C",
                    vec![ChartSpec::bar(vec!["A".into()], vec![1.0])],
                ))
                .unwrap();
            raster_path = builder.temp_images[0].path().to_path_buf();
            assert!(raster_path.exists());
            // dropped without save
        }
        assert!(!raster_path.exists());
    }

    #[test]
    fn unsupported_section_type_degrades_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("unsupported.pdf")) else {
            return;
        };
        builder
            .add_section(&Section {
                title: "Odd".to_string(),
                kind: SectionKind::Unsupported {
                    type_name: "hologram".to_string(),
                },
            })
            .unwrap();
        let path = builder.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn double_cover_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("two-covers.pdf")) else {
            return;
        };
        builder.add_cover("One", None, Some("first")).unwrap();
        builder.add_cover("Two", None, None).unwrap();
        builder
            .add_section(&Section::paragraph("P", "body"))
            .unwrap();
        assert!(builder.save().unwrap().exists());
    }

    #[test]
    fn missing_logo_is_silently_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let Some(mut builder) = test_builder(&dir.path().join("logo.pdf")) else {
            return;
        };
        builder
            .add_cover(
                "Logo",
                Some(Path::new("does/not/exist.png")),
                None,
            )
            .unwrap();
        builder
            .add_section(&Section::paragraph("P", "body"))
            .unwrap();
        assert!(builder.save().unwrap().exists());
    }
}
