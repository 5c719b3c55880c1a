use crate::error::InjexError;
use crate::extraction::PdfTextExtractor;
use std::io::Write;
use std::process::Command;

const TOOL: &str = "pdftotext";

/// Text-layer backend using pdftotext (from poppler-utils).
///
/// Uses `-layout` so that labels and typed answers on one printed line
/// stay on one text line, which the split rules depend on.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new(TOOL)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, InjexError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| InjexError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| InjexError::Extraction(e.to_string()))?;

        let output = Command::new(TOOL)
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InjexError::ToolNotFound { tool: TOOL }
                } else {
                    InjexError::Extraction(format!("{TOOL} failed: {e}"))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(InjexError::ToolFailed {
                tool: TOOL,
                code,
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&text);
        tracing::debug!(pages = pages.len(), "extracted PDF text");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        TOOL
    }
}

/// pdftotext separates pages with form feeds and ends the last one with
/// one too; the empty tail is not a page.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_drops_trailing_feed() {
        let pages = split_pages("Name: Jane\n\x0cSurgery\n\x0c");
        assert_eq!(pages, vec!["Name: Jane\n", "Surgery\n"]);
    }

    #[test]
    fn test_split_single_page_without_feed() {
        assert_eq!(split_pages("only page"), vec!["only page"]);
        assert_eq!(split_pages(""), vec![""]);
    }

    #[test]
    fn test_default_join() {
        struct Fixed;
        impl PdfTextExtractor for Fixed {
            fn extract_pages(&self, _: &[u8]) -> Result<Vec<String>, InjexError> {
                Ok(vec!["a".into(), "b".into()])
            }
            fn backend_name(&self) -> &str {
                "fixed"
            }
        }
        assert_eq!(Fixed.extract_text(b"").unwrap(), "a\nb");
    }
}
