//! Directory batches: discovery, ordering, provenance and CSV export.

use crate::error::InjexError;
use crate::extraction::{PageRasterizer, PdfTextExtractor};
use crate::model::{ExtractionWarning, FieldValue, SchemaVersion};
use crate::record::{InjuryRecord, PROVENANCE_COLUMNS};
use crate::{extract_file, ExtractOptions, InputKind};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const UNKNOWN_TEAM: &str = "UNKNOWN";

/// Lists every `.docx` and `.pdf` below `root`, in batch order.
///
/// Word lock files (`~$name.docx`) are skipped.
pub fn discover_inputs(root: &Path) -> Result<Vec<PathBuf>, InjexError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || InputKind::from_path(path).is_none() {
            continue;
        }
        let lock_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("~$"));
        if !lock_file {
            files.push(path.to_path_buf());
        }
    }
    files.sort_by_cached_key(|p| order_key(p));
    Ok(files)
}

/// Numeric stems ascending, then other stems lexically; `.docx` before
/// `.pdf` within a stem.
fn order_key(path: &Path) -> (bool, u64, String, Option<InputKind>, PathBuf) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let number = stem.trim().parse::<u64>().ok();
    (
        number.is_none(),
        number.unwrap_or(0),
        stem,
        InputKind::from_path(path),
        path.to_path_buf(),
    )
}

/// `Male`/`Female` from a `men`/`women` directory on the path.
pub fn sex_from_path(relative: &Path) -> &'static str {
    for component in relative.components() {
        if let Component::Normal(name) = component {
            match name.to_string_lossy().to_lowercase().as_str() {
                "men" => return "Male",
                "women" => return "Female",
                _ => {}
            }
        }
    }
    ""
}

/// Team encoded as `"{team}, ..."` at the start of the file name.
pub fn team_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let (team, _) = name.split_once(',')?;
    let team = team.trim();
    (!team.is_empty()).then(|| team.to_string())
}

#[derive(Debug, Clone)]
pub struct BatchRow {
    /// Path relative to the batch root.
    pub filename: String,
    pub sex: String,
    pub record: InjuryRecord,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
    /// Files that failed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Extract every input below `root`. A failing document is logged and
/// skipped; only discovery errors end the batch.
pub fn run_batch(
    root: &Path,
    text_extractor: &dyn PdfTextExtractor,
    rasterizer: &dyn PageRasterizer,
    options: &ExtractOptions,
) -> Result<BatchReport, InjexError> {
    let files = discover_inputs(root)?;
    tracing::info!(files = files.len(), root = %root.display(), "starting batch");

    let mut report = BatchReport::default();
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        match extract_file(&path, text_extractor, rasterizer, options) {
            Ok(extraction) => {
                for warning in &extraction.warnings {
                    tracing::warn!(file = %relative.display(), "{warning}");
                }
                let mut record = extraction.record;
                let team = team_from_file_name(&relative)
                    .or_else(|| record.get("TEAM").as_text().map(str::to_string))
                    .unwrap_or_else(|| UNKNOWN_TEAM.to_string());
                record.set("TEAM", FieldValue::text(team));

                report.rows.push(BatchRow {
                    filename: relative.display().to_string(),
                    sex: sex_from_path(&relative).to_string(),
                    record,
                    warnings: extraction.warnings,
                });
            }
            Err(e) => {
                tracing::warn!(file = %relative.display(), "skipped: {e}");
                report.skipped.push((relative, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Write rows as CSV: provenance columns, then the schema's columns.
pub fn write_csv<W: Write>(
    writer: W,
    schema: SchemaVersion,
    rows: &[BatchRow],
) -> Result<(), InjexError> {
    let mut csv = csv::Writer::from_writer(writer);
    let columns = schema.columns();

    let header = PROVENANCE_COLUMNS.iter().chain(columns.iter()).copied();
    csv.write_record(header)?;

    for row in rows {
        let values = [row.filename.clone(), row.sex.clone()]
            .into_iter()
            .chain(columns.iter().map(|c| row.record.rendered(c)));
        csv.write_record(values)?;
    }
    csv.flush()?;
    Ok(())
}
