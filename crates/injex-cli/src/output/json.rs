use injex_core::error::InjexError;
use injex_core::Extraction;
use std::path::Path;

pub fn print(extraction: &Extraction) -> Result<(), InjexError> {
    let json = serde_json::to_string_pretty(extraction)?;
    println!("{json}");
    Ok(())
}

pub fn write(path: &Path, extraction: &Extraction) -> Result<(), InjexError> {
    let json = serde_json::to_string_pretty(extraction)?;
    std::fs::write(path, json)?;
    Ok(())
}
