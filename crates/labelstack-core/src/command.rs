use crate::inspect::DocumentSummary;
use crate::stack::{StackOptions, POINTS_PER_INCH};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Wire commands for worker-style dispatch
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StackCommand {
    Stack {
        file: Vec<u8>,
        #[serde(default)]
        options: StackOptions,
    },
    Inspect {
        file: Vec<u8>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    /// Base64-encoded PDF data
    pub data: Option<String>,
    pub error: Option<String>,
    pub metrics: Option<ProcessMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    /// Page count of the source document
    pub page_count: u32,
    /// Composed page width in points
    pub output_width_pt: f64,
    /// Composed page height in points
    pub output_height_pt: f64,
}

impl StackCommand {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ProcessResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn completed(output: &[u8], metrics: Option<ProcessMetrics>) -> Self {
        Self {
            success: true,
            data: Some(STANDARD.encode(output)),
            error: None,
            metrics,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            metrics: None,
        }
    }
}

impl ProcessMetrics {
    /// Derive metrics for a completed stacking run
    ///
    /// The output dimensions follow the sizing box the run actually used:
    /// the CropBox when requested and present, the MediaBox otherwise.
    pub fn for_stack(
        input: &[u8],
        output: &[u8],
        summary: &DocumentSummary,
        options: &StackOptions,
    ) -> Option<Self> {
        let page = summary.pages.get(options.page_index as usize)?;
        let (width, height) = if options.use_cropbox {
            (
                page.crop_width_pt.unwrap_or(page.width_pt),
                page.crop_height_pt.unwrap_or(page.height_pt),
            )
        } else {
            (page.width_pt, page.height_pt)
        };

        Some(Self {
            input_size_bytes: input.len(),
            output_size_bytes: output.len(),
            page_count: summary.page_count,
            output_width_pt: width,
            output_height_pt: 2.0 * height + options.gap_inches * POINTS_PER_INCH,
        })
    }
}
