pub mod docx;
pub mod pdftoppm;
pub mod pdftotext;

use crate::error::InjexError;
use image::RgbImage;

/// Trait for PDF text-layer backends.
pub trait PdfTextExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, InjexError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;

    /// Whole document text, pages joined with `\n`.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, InjexError> {
        Ok(self.extract_pages(pdf_bytes)?.join("\n"))
    }
}

/// Trait for PDF rasterization backends.
pub trait PageRasterizer: Send + Sync {
    /// Render every page at `dpi`, in page order.
    fn rasterize(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<RgbImage>, InjexError>;

    fn backend_name(&self) -> &str;
}
