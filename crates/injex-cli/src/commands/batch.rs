use injex_core::batch::{run_batch, write_csv};
use injex_core::error::InjexError;
use injex_core::extraction::pdftoppm::PdftoppmRasterizer;
use injex_core::extraction::pdftotext::PdftotextExtractor;
use injex_core::model::SchemaVersion;
use injex_core::templates::load_template;
use injex_core::ExtractOptions;
use std::path::PathBuf;

pub fn run(
    dir: PathBuf,
    schema: SchemaVersion,
    template: Option<PathBuf>,
    output_file: Option<PathBuf>,
) -> Result<(), InjexError> {
    let template = template.as_deref().map(load_template).transpose()?;
    // Every row must share one column set.
    let schema = template.as_ref().map_or(schema, |t| t.schema);
    let options = ExtractOptions {
        schema,
        template,
        debug: None,
    };

    let report = run_batch(
        &dir,
        &PdftotextExtractor::new(),
        &PdftoppmRasterizer::new(),
        &options,
    )?;

    match &output_file {
        Some(path) => write_csv(std::fs::File::create(path)?, schema, &report.rows)?,
        None => write_csv(std::io::stdout().lock(), schema, &report.rows)?,
    }

    let warned = report.rows.iter().filter(|r| !r.warnings.is_empty()).count();
    eprintln!(
        "Extracted {} document(s), {} with warnings, {} skipped{}",
        report.rows.len(),
        warned,
        report.skipped.len(),
        output_file
            .as_ref()
            .map(|p| format!(", written to {}", p.display()))
            .unwrap_or_default()
    );
    for (path, reason) in &report.skipped {
        eprintln!("  skipped {}: {reason}", path.display());
    }

    Ok(())
}
