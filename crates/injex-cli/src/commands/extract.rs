use injex_core::error::InjexError;
use injex_core::extraction::pdftoppm::PdftoppmRasterizer;
use injex_core::extraction::pdftotext::PdftotextExtractor;
use injex_core::model::SchemaVersion;
use injex_core::templates::load_template;
use injex_core::{DebugOverlay, ExtractOptions};
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    schema: SchemaVersion,
    template: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
    debug_dir: Option<PathBuf>,
) -> Result<(), InjexError> {
    let template = template.as_deref().map(load_template).transpose()?;
    let debug = debug_dir.map(|dir| DebugOverlay {
        dir,
        stem: input_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into()),
    });
    let options = ExtractOptions {
        schema,
        template,
        debug,
    };

    let extraction = injex_core::extract_file(
        &input_file,
        &PdftotextExtractor::new(),
        &PdftoppmRasterizer::new(),
        &options,
    )?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            output::json::write(&path, &extraction)?;
            eprintln!(
                "Extracted {} ({}), written to {}",
                input_file.display(),
                extraction.template,
                path.display()
            );
            for w in &extraction.warnings {
                eprintln!("  warning: {w}");
            }
        }
        None => match output_format {
            "json" => output::json::print(&extraction)?,
            _ => output::table::print(&extraction),
        },
    }

    Ok(())
}
