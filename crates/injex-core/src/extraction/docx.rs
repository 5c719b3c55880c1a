use crate::error::InjexError;
use std::io::{Cursor, Read};
use zip::result::ZipError;

/// Archive entry holding the document body of a .docx package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Read the main document part out of a .docx package held in memory.
///
/// The archive handle lives only for the duration of this call.
pub fn read_document_xml(docx_bytes: &[u8]) -> Result<String, InjexError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx_bytes))?;
    let mut entry = match archive.by_name(DOCUMENT_PART) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(InjexError::MissingPart(DOCUMENT_PART.into())),
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::with_capacity(entry.size() as usize);
    entry
        .read_to_string(&mut xml)
        .map_err(|e| InjexError::Archive(format!("{DOCUMENT_PART}: {e}")))?;
    tracing::debug!(bytes = xml.len(), "read {DOCUMENT_PART}");
    Ok(xml)
}
