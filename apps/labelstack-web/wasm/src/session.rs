//! Stateful stacking session
//!
//! Holds the uploaded document and the composition settings in Rust,
//! minimizing JavaScript state management. One document per session;
//! loading another replaces it.

use labelstack_core::{
    inspect_document, stack_page, DocumentSummary, ProcessMetrics, StackOptions,
};
use wasm_bindgen::prelude::*;

/// Stateful stacking session that holds the document in Rust memory
#[wasm_bindgen]
pub struct StackSession {
    name: String,
    bytes: Vec<u8>,
    summary: Option<DocumentSummary>,
    options: StackOptions,
    last_metrics: Option<ProcessMetrics>,
}

#[wasm_bindgen]
impl StackSession {
    /// Create an empty session with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            bytes: Vec::new(),
            summary: None,
            options: StackOptions::default(),
            last_metrics: None,
        }
    }

    /// Internal method to load a document (testable without JsValue)
    fn load_document_internal(
        &mut self,
        name: &str,
        bytes: &[u8],
    ) -> Result<DocumentSummary, String> {
        let summary = inspect_document(bytes).map_err(|e| e.to_string())?;

        self.name = name.to_string();
        self.bytes = bytes.to_vec();
        self.summary = Some(summary.clone());
        // settings from a previous document no longer apply
        self.options.page_index = 0;
        self.last_metrics = None;

        Ok(summary)
    }

    /// Load (or replace) the session document
    /// Returns the document summary as a JS value on success
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let summary = self
            .load_document_internal(name, bytes)
            .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&summary)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Drop the loaded document and reset the settings
    #[wasm_bindgen(js_name = clearDocument)]
    pub fn clear_document(&mut self) {
        self.name.clear();
        self.bytes.clear();
        self.summary = None;
        self.options = StackOptions::default();
        self.last_metrics = None;
    }

    /// Page count of the loaded document (0 when empty)
    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.summary.as_ref().map(|s| s.page_count).unwrap_or(0)
    }

    fn set_page_index_internal(&mut self, index: u32) -> Result<(), String> {
        let page_count = self.page_count();
        if index >= page_count {
            return Err(format!(
                "Page index {} out of range (document has {} pages)",
                index, page_count
            ));
        }
        self.options.page_index = index;
        Ok(())
    }

    /// Select the page to duplicate (zero-based)
    #[wasm_bindgen(js_name = setPageIndex)]
    pub fn set_page_index(&mut self, index: u32) -> Result<(), JsValue> {
        self.set_page_index_internal(index)
            .map_err(|e| JsValue::from_str(&e))
    }

    fn set_gap_inches_internal(&mut self, gap_inches: f64) -> Result<(), String> {
        let candidate = StackOptions {
            gap_inches,
            ..self.options.clone()
        };
        candidate.validate().map_err(|e| e.to_string())?;
        self.options = candidate;
        Ok(())
    }

    /// Set the gap between the two copies, in inches
    #[wasm_bindgen(js_name = setGapInches)]
    pub fn set_gap_inches(&mut self, gap_inches: f64) -> Result<(), JsValue> {
        self.set_gap_inches_internal(gap_inches)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Size and place using the CropBox instead of the MediaBox
    #[wasm_bindgen(js_name = setUseCropbox)]
    pub fn set_use_cropbox(&mut self, use_cropbox: bool) {
        self.options.use_cropbox = use_cropbox;
    }

    /// Summary of the loaded document
    #[wasm_bindgen(js_name = getSummary)]
    pub fn get_summary(&self) -> Result<JsValue, JsValue> {
        let summary = self
            .summary
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No document loaded"))?;

        serde_wasm_bindgen::to_value(summary)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Geometry of a single page (for the selector readout)
    #[wasm_bindgen(js_name = getPageInfo)]
    pub fn get_page_info(&self, index: u32) -> Result<JsValue, JsValue> {
        let summary = self
            .summary
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No document loaded"))?;
        let page = summary
            .pages
            .get(index as usize)
            .ok_or_else(|| JsValue::from_str("Page index out of bounds"))?;

        serde_wasm_bindgen::to_value(page)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Check if the session is ready for execution
    #[wasm_bindgen(js_name = canExecute)]
    pub fn can_execute(&self) -> bool {
        self.summary.is_some()
    }

    fn execute_internal(&mut self) -> Result<Vec<u8>, String> {
        let summary = self
            .summary
            .as_ref()
            .ok_or_else(|| "No document loaded".to_string())?;

        let stacked =
            stack_page(&self.bytes, &self.options).map_err(|e| format!("Stack failed: {}", e))?;

        self.last_metrics = ProcessMetrics::for_stack(&self.bytes, &stacked, summary, &self.options);

        Ok(stacked)
    }

    /// Run the stacking operation and return the result as Uint8Array
    pub fn execute(&mut self) -> Result<js_sys::Uint8Array, JsValue> {
        let stacked = self.execute_internal().map_err(|e| JsValue::from_str(&e))?;

        let array = js_sys::Uint8Array::new_with_length(stacked.len() as u32);
        array.copy_from(&stacked);
        Ok(array)
    }

    /// Metrics of the most recent execution (sizes and output geometry)
    #[wasm_bindgen(js_name = lastMetrics)]
    pub fn last_metrics(&self) -> Result<JsValue, JsValue> {
        let metrics = self
            .last_metrics
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No execution yet"))?;

        serde_wasm_bindgen::to_value(metrics)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Download name for the composed file: `<stem>_stacked_gap_<G>in.pdf`
    #[wasm_bindgen(js_name = suggestedFileName)]
    pub fn suggested_file_name(&self) -> String {
        let stem = self.name.strip_suffix(".pdf").unwrap_or(&self.name);
        let stem = if stem.is_empty() { "output" } else { stem };
        format!("{}_stacked_gap_{:.2}in.pdf", stem, self.options.gap_inches)
    }
}

impl Default for StackSession {
    fn default() -> Self {
        Self::new()
    }
}
