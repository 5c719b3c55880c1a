use crate::error::InjexError;
use crate::extraction::PageRasterizer;
use image::RgbImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

const TOOL: &str = "pdftoppm";
const PREFIX: &str = "page";

/// Rasterization backend using pdftoppm (from poppler-utils).
///
/// Pages are rendered as PNG into a temporary directory and decoded with
/// `image`; the directory is removed when rendering completes.
pub struct PdftoppmRasterizer;

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        PdftoppmRasterizer
    }

    pub fn is_available() -> bool {
        Command::new(TOOL)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<RgbImage>, InjexError> {
        let dir = tempfile::tempdir().map_err(|e| InjexError::Extraction(e.to_string()))?;
        let input = dir.path().join("input.pdf");
        std::fs::File::create(&input)
            .and_then(|mut f| f.write_all(pdf_bytes))
            .map_err(|e| InjexError::Extraction(e.to_string()))?;

        let output = Command::new(TOOL)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(dir.path().join(PREFIX))
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

        let pages = rendered_pages(dir.path())?
            .into_iter()
            .map(|path| Ok(image::open(&path)?.to_rgb8()))
            .collect::<Result<Vec<_>, InjexError>>()?;
        tracing::debug!(pages = pages.len(), dpi, "rasterized PDF");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        TOOL
    }
}

/// Rendered page files in page order.
///
/// pdftoppm zero-pads the page number to the width of the page count
/// (`page-1.png` or `page-01.png`), so order by the parsed number.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, InjexError> {
    let mut pages: Vec<(usize, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<usize> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(PREFIX)?.strip_prefix('-')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("/tmp/x/page-01.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-12.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/input.pdf")), None);
        assert_eq!(page_number(Path::new("/tmp/x/page-a.png")), None);
    }

    #[test]
    fn test_rendered_pages_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "input.pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = rendered_pages(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }
}
