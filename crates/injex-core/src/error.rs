use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InjexError {
    #[error("not a valid .docx package: {0}")]
    Archive(String),

    #[error("document part '{0}' missing from package")]
    MissingPart(String),

    #[error("malformed document XML: {0}")]
    Xml(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    ToolNotFound { tool: &'static str },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("failed to decode page image: {0}")]
    Image(String),

    #[error("unrecognized date format: '{0}'")]
    DateFormat(String),

    #[error("failed to load template from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    #[error("invalid template: {0}")]
    TemplateInvalid(String),

    #[error("unsupported input '{0}'. Expected a .docx or .pdf file")]
    UnsupportedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<zip::result::ZipError> for InjexError {
    fn from(e: zip::result::ZipError) -> Self {
        InjexError::Archive(e.to_string())
    }
}

impl From<quick_xml::Error> for InjexError {
    fn from(e: quick_xml::Error) -> Self {
        InjexError::Xml(e.to_string())
    }
}

impl From<image::ImageError> for InjexError {
    fn from(e: image::ImageError) -> Self {
        InjexError::Image(e.to_string())
    }
}
