//! Font discovery and loading for document and chart text.
//!
//! The PDF backend needs a TrueType font family to measure and embed text,
//! and the chart backend needs a registered face to draw axis labels and
//! percentages. Both are resolved here from the fonts installed on the
//! system, discovered through a `fontdb` scan. A priority list of
//! Unicode-capable sans-serif families is tried first; when a family lacks
//! dedicated bold or italic faces, the regular face is reused so that styled
//! text still renders.
//!
//! Chart text is best-effort: when no usable face can be registered, chart
//! rendering proceeds without text rather than failing the report.

use crate::ReportError;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use genpdf::fonts::{FontData, FontFamily};
use log::{info, warn};
use once_cell::sync::Lazy;

/// Priority list of Unicode-capable fonts.
/// Linux distributions commonly ship one of the first three.
const SANS_CANDIDATES: [&str; 7] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
    "Roboto",
    "Segoe UI",
];

fn system_database() -> Database {
    let mut db = Database::new();
    db.load_system_fonts();
    db
}

/// Queries one face and returns its raw bytes.
///
/// Font collections (a face index other than zero) are skipped because the
/// PDF backend cannot read them directly.
fn query_face_bytes(db: &Database, family: Family, weight: Weight, style: Style) -> Option<Vec<u8>> {
    let id = db.query(&Query {
        families: &[family],
        weight,
        stretch: Stretch::Normal,
        style,
    })?;
    db.with_face_data(id, |data, face_index| {
        if face_index == 0 {
            Some(data.to_vec())
        } else {
            None
        }
    })?
}

/// Resolves the four faces of one family, reusing the regular face for any
/// missing variant.
fn load_family(db: &Database, family: Family) -> Option<FontFamily<FontData>> {
    let regular = query_face_bytes(db, family, Weight::NORMAL, Style::Normal)?;
    let bold =
        query_face_bytes(db, family, Weight::BOLD, Style::Normal).unwrap_or_else(|| regular.clone());
    let italic =
        query_face_bytes(db, family, Weight::NORMAL, Style::Italic).unwrap_or_else(|| regular.clone());
    let bold_italic = query_face_bytes(db, family, Weight::BOLD, Style::Italic)
        .unwrap_or_else(|| bold.clone());

    Some(FontFamily {
        regular: FontData::new(regular, None).ok()?,
        bold: FontData::new(bold, None).ok()?,
        italic: FontData::new(italic, None).ok()?,
        bold_italic: FontData::new(bold_italic, None).ok()?,
    })
}

/// Loads a Unicode-capable system font family for the PDF document.
///
/// Tries the candidate families in priority order, then falls back to the
/// generic sans-serif family the system resolves. Returns a `FontError`
/// when the system has no loadable TrueType face at all.
pub fn load_report_font_family() -> Result<FontFamily<FontData>, ReportError> {
    let db = system_database();
    let mut tried = Vec::new();

    for name in SANS_CANDIDATES {
        if let Some(family) = load_family(&db, Family::Name(name)) {
            info!("using system font '{}'", name);
            return Ok(family);
        }
        tried.push(name);
    }

    if let Some(family) = load_family(&db, Family::SansSerif) {
        info!("using generic sans-serif system font");
        return Ok(family);
    }

    Err(ReportError::FontError {
        message: format!("no usable system font found (tried: {})", tried.join(", ")),
        suggestion: "Install a TrueType sans-serif font such as DejaVu Sans or Liberation Sans"
            .to_string(),
    })
}

/// Whether a chart text face was registered with the plotting backend.
///
/// Registration happens once per process. The backend requires `'static`
/// font bytes, so the discovered face is intentionally leaked for the
/// process lifetime.
static CHART_FONT_READY: Lazy<bool> = Lazy::new(|| {
    let db = system_database();
    let bytes = SANS_CANDIDATES
        .iter()
        .copied()
        .find_map(|name| query_face_bytes(&db, Family::Name(name), Weight::NORMAL, Style::Normal))
        .or_else(|| query_face_bytes(&db, Family::SansSerif, Weight::NORMAL, Style::Normal));

    match bytes {
        Some(bytes) => {
            let leaked: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, leaked)
            {
                Ok(()) => true,
                Err(_) => {
                    warn!("chart font registration failed, charts will render without text");
                    false
                }
            }
        }
        None => {
            warn!("no system font found for charts, charts will render without text");
            false
        }
    }
});

/// Ensures the chart text face is registered and reports whether chart text
/// can be drawn.
pub fn ensure_chart_font() -> bool {
    *CHART_FONT_READY
}
