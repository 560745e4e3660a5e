use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page index {index} out of range (document has {page_count} pages)")]
    PageIndexError { index: u32, page_count: u32 },

    #[error("Invalid gap: {0}")]
    InvalidGapError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
