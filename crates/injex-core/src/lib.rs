pub mod assemble;
pub mod batch;
pub mod checkbox;
pub mod error;
pub mod extraction;
pub mod labels;
pub mod model;
pub mod parsing;
pub mod record;
pub mod section;
pub mod templates;
pub mod word;

use assemble::{build_record, PdfSource, WordSource};
use checkbox::{overlay, PageScan, PlacedBox};
use error::InjexError;
use extraction::{PageRasterizer, PdfTextExtractor};
use model::{ExtractionWarning, FormType, SchemaVersion};
use record::InjuryRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use templates::schema::TemplateDef;
use word::FormModel;

/// Where to write checkbox overlay images for a PDF.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    pub dir: PathBuf,
    /// File name prefix, usually the input's stem.
    pub stem: String,
}

/// Options for extracting a single document.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub schema: SchemaVersion,
    /// Overrides built-in template selection; its own schema then applies.
    pub template: Option<TemplateDef>,
    pub debug: Option<DebugOverlay>,
}

/// One document's record and what happened while building it.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub record: InjuryRecord,
    pub form_type: FormType,
    pub template: String,
    pub warnings: Vec<ExtractionWarning>,
    /// Detected checkboxes in document order (PDF input only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<PlacedBox>,
}

/// Supported input kinds, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputKind {
    Docx,
    Pdf,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<InputKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "docx" => Some(InputKind::Docx),
            "pdf" => Some(InputKind::Pdf),
            _ => None,
        }
    }
}

fn resolve_template(options: &ExtractOptions, form_type: FormType) -> Result<TemplateDef, InjexError> {
    match &options.template {
        Some(custom) => Ok(custom.clone()),
        None => templates::select_template(options.schema, form_type),
    }
}

/// Main API entry point for Word forms.
pub fn extract_docx(docx_bytes: &[u8], options: &ExtractOptions) -> Result<Extraction, InjexError> {
    let model = FormModel::from_docx(docx_bytes)?;
    let form_type = FormType::detect(&model.full_text());
    let template = resolve_template(options, form_type)?;
    tracing::debug!(%form_type, template = %template.name, "extracting docx");

    let (record, warnings) = build_record(
        &template,
        &WordSource::new(&model),
        template.form_type.unwrap_or(form_type),
    );

    Ok(Extraction {
        record,
        form_type,
        template: template.name,
        warnings,
        boxes: Vec::new(),
    })
}

/// Main API entry point for scanned PDF forms.
///
/// Text comes from the PDF's text layer; checkboxes from rendering every
/// page and detecting boxes optically. Templates without checkbox labels
/// skip rendering entirely.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    text_extractor: &dyn PdfTextExtractor,
    rasterizer: &dyn PageRasterizer,
    options: &ExtractOptions,
) -> Result<Extraction, InjexError> {
    let text = text_extractor.extract_text(pdf_bytes)?;
    let form_type = FormType::detect(&text);
    let template = resolve_template(options, form_type)?;
    tracing::debug!(%form_type, template = %template.name, "extracting pdf");

    let mut warnings = Vec::new();
    let scan = if template.labels.is_empty() {
        PageScan::default()
    } else {
        let config = &template.detector;
        let pages = rasterizer.rasterize(pdf_bytes, config.dpi)?;
        let scan = checkbox::scan_pages(&pages, config, &template.swaps, template.expected_boxes);
        if let Some(debug) = &options.debug {
            overlay::write_overlays(&debug.dir, &debug.stem, &pages, &scan.boxes)?;
        }
        scan
    };
    warnings.extend(scan.warning.clone());

    let source = PdfSource::new(&template, &scan.map, &text);
    let (record, section_warnings) =
        build_record(&template, &source, template.form_type.unwrap_or(form_type));
    warnings.extend(section_warnings);

    Ok(Extraction {
        record,
        form_type,
        template: template.name,
        warnings,
        boxes: scan.boxes,
    })
}

/// Read `path` and dispatch on its extension.
pub fn extract_file(
    path: &Path,
    text_extractor: &dyn PdfTextExtractor,
    rasterizer: &dyn PageRasterizer,
    options: &ExtractOptions,
) -> Result<Extraction, InjexError> {
    let kind = InputKind::from_path(path)
        .ok_or_else(|| InjexError::UnsupportedInput(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    match kind {
        InputKind::Docx => extract_docx(&bytes, options),
        InputKind::Pdf => extract_pdf(&bytes, text_extractor, rasterizer, options),
    }
}
