//! Document and page introspection
//!
//! Backs the upload flow of the wrappers: page count, version, encryption,
//! and per-page box sizes. The web UI reports MediaBox and CropBox
//! dimensions in inches before the user commits to a stacking run.

use crate::error::StackError;
use crate::stack::{inherited_box, inherited_page_attr, POINTS_PER_INCH};
use lopdf::Document;
use serde::Serialize;

/// Document-level information extracted during validation
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Per-page geometry, in page order
    pub pages: Vec<PageSummary>,
}

/// Geometry of a single page
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    /// Zero-based page index
    pub page_index: u32,
    /// MediaBox width in points
    pub width_pt: f64,
    /// MediaBox height in points
    pub height_pt: f64,
    /// MediaBox width in inches
    pub width_in: f64,
    /// MediaBox height in inches
    pub height_in: f64,
    /// CropBox width in points, when the page declares one
    pub crop_width_pt: Option<f64>,
    /// CropBox height in points, when the page declares one
    pub crop_height_pt: Option<f64>,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
}

/// Quick validation without full parsing (for large uploads)
pub fn quick_validate(bytes: &[u8]) -> Result<(), StackError> {
    if bytes.len() < 8 {
        return Err(StackError::ParseError(
            "file too small to be a valid PDF".into(),
        ));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(StackError::ParseError(
            "not a valid PDF file (missing %PDF- header)".into(),
        ));
    }

    // EOF marker should be near the end
    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(StackError::ParseError(
            "PDF appears truncated (missing %%EOF marker)".into(),
        ));
    }

    Ok(())
}

/// Parse a document and summarize its pages
pub fn inspect_document(bytes: &[u8]) -> Result<DocumentSummary, StackError> {
    let doc = Document::load_mem(bytes).map_err(|e| StackError::ParseError(e.to_string()))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(StackError::ParseError("document has no pages".into()));
    }

    let mut summaries = Vec::with_capacity(pages.len());
    for (page_number, page_id) in &pages {
        let page_dict = doc
            .get_dictionary(*page_id)
            .map_err(|e| StackError::ParseError(e.to_string()))?;

        // US Letter when the tree carries no MediaBox at all
        let media =
            inherited_box(&doc, page_dict, b"MediaBox").unwrap_or([0.0, 0.0, 612.0, 792.0]);
        let width_pt = (media[2] - media[0]).abs();
        let height_pt = (media[3] - media[1]).abs();

        let crop = inherited_box(&doc, page_dict, b"CropBox");

        let rotation = inherited_page_attr(&doc, page_dict, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|angle| normalize_rotation(angle as i32))
            .unwrap_or(0);

        summaries.push(PageSummary {
            page_index: page_number - 1,
            width_pt,
            height_pt,
            width_in: width_pt / POINTS_PER_INCH,
            height_in: height_pt / POINTS_PER_INCH,
            crop_width_pt: crop.map(|b| (b[2] - b[0]).abs()),
            crop_height_pt: crop.map(|b| (b[3] - b[1]).abs()),
            rotation,
        });
    }

    Ok(DocumentSummary {
        page_count: pages.len() as u32,
        version: doc.version.clone(),
        encrypted: doc.is_encrypted(),
        size_bytes: bytes.len(),
        pages: summaries,
    })
}

/// Normalize rotation to 0, 90, 180, or 270
fn normalize_rotation(angle: i32) -> i32 {
    let normalized = angle % 360;
    if normalized < 0 {
        normalized + 360
    } else {
        normalized
    }
}
