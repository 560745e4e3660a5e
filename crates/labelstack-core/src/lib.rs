//! Vertical label duplication for PDF pages
//!
//! This crate provides the one transformation behind the label-stacking
//! tools: given a document and a zero-based page index, produce a new
//! one-page document with the selected page placed twice, stacked
//! vertically with a configurable gap. Client-side PDF manipulation
//! using lopdf; no scaling, no rotation, no re-rendering.

pub mod command;
pub mod error;
pub mod inspect;
pub mod stack;

pub use command::{ProcessMetrics, ProcessResult, StackCommand};
pub use error::StackError;
pub use inspect::{inspect_document, quick_validate, DocumentSummary, PageSummary};
pub use stack::{stack_file, stack_page, StackOptions, POINTS_PER_INCH};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, StackError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| StackError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
