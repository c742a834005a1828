use std::path::PathBuf;

use crate::model::{LayoutId, Region};

#[derive(Debug, thiserror::Error)]
pub enum TasdeedError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid PDF document: {0}")]
    InvalidDocument(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("no template registered for layout '{0}'")]
    MissingTemplate(LayoutId),

    #[error("invalid region {0}")]
    InvalidRegion(Region),

    #[error("failed to extract field '{field}': {reason}")]
    FieldExtraction { field: String, reason: String },

    #[error("failed to process page {page}: {reason}")]
    PageProcessing { page: usize, reason: String },

    #[error("failed to load templates from {}: {}", .path.display(), .reason)]
    TemplateLoad { path: PathBuf, reason: String },

    #[error("invalid template set: {0}")]
    TemplateInvalid(String),

    #[error("invalid account list: {0}")]
    AccountList(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
}
