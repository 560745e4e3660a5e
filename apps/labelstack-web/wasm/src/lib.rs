//! WASM bindings for the label stacking operation
//!
//! Provides a stateful, session-based API plus stateless one-shot helpers.
//! All state and validation live in Rust; JavaScript only handles DOM
//! events and file I/O.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { StackSession } from './pkg/labelstack_wasm.js';
//!
//! await init();
//!
//! const session = new StackSession();
//! const summary = session.loadDocument("label.pdf", bytes);
//! session.setPageIndex(0);
//! session.setGapInches(0.12);
//! const result = session.execute();
//! downloadBlob(result, session.suggestedFileName());
//! ```

pub mod session;

use labelstack_core::{inspect_document, stack_page, ProcessMetrics, ProcessResult, StackOptions};
use wasm_bindgen::prelude::*;

pub use session::StackSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for an uploaded file
/// Returns Ok(()) if valid, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    labelstack_core::quick_validate(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Inspect an uploaded PDF without creating a session
/// Backs the page selector and the size readout shown before stacking
#[wasm_bindgen]
pub fn inspect(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let summary = inspect_document(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Stack a page without creating a session
///
/// `options` is a plain object matching StackOptions; missing fields take
/// their defaults (page 0, 0.12in gap, MediaBox sizing). Throws on error.
#[wasm_bindgen]
pub fn stack(bytes: &[u8], options: JsValue) -> Result<js_sys::Uint8Array, JsValue> {
    let options = parse_options(options)?;
    let stacked = stack_page(bytes, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let array = js_sys::Uint8Array::new_with_length(stacked.len() as u32);
    array.copy_from(&stacked);
    Ok(array)
}

/// One-shot stack that reports errors inline instead of throwing
///
/// Returns a ProcessResult: base64-encoded data plus metrics on success,
/// the error message otherwise. Suits callers that render failures as
/// inline messages rather than exceptions.
#[wasm_bindgen(js_name = stackWithReport)]
pub fn stack_with_report(bytes: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    let options = parse_options(options)?;

    let result = match stack_page(bytes, &options) {
        Ok(stacked) => {
            let metrics = inspect_document(bytes)
                .ok()
                .and_then(|summary| ProcessMetrics::for_stack(bytes, &stacked, &summary, &options));
            ProcessResult::completed(&stacked, metrics)
        }
        Err(err) => ProcessResult::failed(err),
    };

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_options(options: JsValue) -> Result<StackOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(StackOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
