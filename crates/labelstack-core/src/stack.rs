//! Vertical page stacking
//!
//! Duplicates one page of a document onto a single taller page: the bottom
//! copy sits at y = 0, the top copy at y = H + gap. No scaling or rotation
//! is applied to either copy.

use crate::error::StackError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

/// PDF's native length unit: 72 points = 1 inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Name under which the duplicated page form is registered in the output
/// page's XObject resources.
const FORM_NAME: &str = "Lbl";

/// Page-tree attribute lookups stop after this many Parent hops.
const MAX_TREE_DEPTH: usize = 32;

/// Settings for a single stacking run
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StackOptions {
    /// Zero-based index of the page to duplicate
    pub page_index: u32,
    /// Vertical gap between the two copies, in inches
    pub gap_inches: f64,
    /// Size and place using the CropBox instead of the MediaBox.
    /// Falls back to the MediaBox when the page has no CropBox.
    pub use_cropbox: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            page_index: 0,
            gap_inches: 0.12,
            use_cropbox: false,
        }
    }
}

impl StackOptions {
    /// Gap converted to points
    pub fn gap_pt(&self) -> f64 {
        self.gap_inches * POINTS_PER_INCH
    }

    /// Reject gaps the composition cannot express
    pub fn validate(&self) -> Result<(), StackError> {
        if !self.gap_inches.is_finite() {
            return Err(StackError::InvalidGapError(format!(
                "{} is not a finite number",
                self.gap_inches
            )));
        }
        if self.gap_inches < 0.0 {
            return Err(StackError::InvalidGapError(format!(
                "{} is negative",
                self.gap_inches
            )));
        }
        Ok(())
    }
}

/// Duplicate one page vertically with a gap
///
/// The algorithm:
/// 1. Parse the input and validate the options eagerly
/// 2. Resolve the selected page and its sizing box (MediaBox or CropBox)
/// 3. Wrap the page content in a Form XObject, carrying the original
///    content stream and resources over verbatim
/// 4. Place the form twice on a fresh page of size (W, 2H + gap),
///    translated so the box's lower-left corner lands on the page origin
/// 5. Serialize the single-page result
pub fn stack_page(bytes: &[u8], options: &StackOptions) -> Result<Vec<u8>, StackError> {
    options.validate()?;

    let doc = Document::load_mem(bytes).map_err(|e| StackError::ParseError(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(StackError::ParseError("document is encrypted".into()));
    }

    let pages = doc.get_pages();
    let page_count = pages.len() as u32;
    if page_count == 0 {
        return Err(StackError::ParseError("document has no pages".into()));
    }

    // lopdf numbers pages from 1
    let page_id = options
        .page_index
        .checked_add(1)
        .and_then(|n| pages.get(&n).copied())
        .ok_or(StackError::PageIndexError {
            index: options.page_index,
            page_count,
        })?;

    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| StackError::ParseError(e.to_string()))?;
    let sizing_box = resolve_sizing_box(&doc, page_dict, options.use_cropbox)?;
    let (llx, lly, width, height) = box_dimensions(&sizing_box)?;

    let gap_pt = options.gap_pt();
    let out_width = width;
    let out_height = 2.0 * height + gap_pt;

    let mut output = Document::with_version("1.7");
    let pages_id = output.new_object_id();

    let form_id = page_to_form(&mut output, &doc, page_dict, &sizing_box)?;

    let content = placement_stream(llx, lly, height, gap_pt);
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set(FORM_NAME, Object::Reference(form_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    // The output page carries no Rotate entry; the source rotation attribute
    // is neither baked in nor propagated.
    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(out_width as f32),
                Object::Real(out_height as f32),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    let out_page_id = output.add_object(page);

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(1)),
        ("Kids", Object::Array(vec![Object::Reference(out_page_id)])),
    ]);
    output.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", Object::Reference(catalog_id));

    output.compress();

    let mut buffer = Vec::new();
    output
        .save_to(&mut buffer)
        .map_err(|e| StackError::OperationError(format!("Save failed: {}", e)))?;

    Ok(buffer)
}

/// File convenience wrapper around [`stack_page`]
///
/// Reads the input fully before composing; the output path is only written
/// once a complete result exists, so a failed run never leaves partial output.
pub fn stack_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StackOptions,
) -> Result<(), StackError> {
    let bytes = std::fs::read(input)?;
    let stacked = stack_page(&bytes, options)?;
    std::fs::write(output, stacked)?;
    Ok(())
}

/// Look up a page attribute, walking the Parent chain for inheritable keys
pub(crate) fn inherited_page_attr(
    doc: &Document,
    page_dict: &Dictionary,
    key: &[u8],
) -> Option<Object> {
    let mut dict = page_dict.clone();
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent_id).ok()?.clone();
    }
    None
}

/// Resolve an inheritable box attribute to [llx, lly, urx, ury]
pub(crate) fn inherited_box(
    doc: &Document,
    page_dict: &Dictionary,
    key: &[u8],
) -> Option<[f64; 4]> {
    let attr = inherited_page_attr(doc, page_dict, key)?;
    parse_box_array(attr.as_array().ok()?)
}

/// Parse a box array [x1, y1, x2, y2]
pub(crate) fn parse_box_array(array: &[Object]) -> Option<[f64; 4]> {
    if array.len() != 4 {
        return None;
    }
    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => return None,
        };
    }
    Some(result)
}

fn resolve_sizing_box(
    doc: &Document,
    page_dict: &Dictionary,
    use_cropbox: bool,
) -> Result<[f64; 4], StackError> {
    if use_cropbox {
        if let Some(cropbox) = inherited_box(doc, page_dict, b"CropBox") {
            return Ok(cropbox);
        }
    }
    inherited_box(doc, page_dict, b"MediaBox")
        .ok_or_else(|| StackError::OperationError("page has no usable MediaBox".into()))
}

/// Normalize a box to (llx, lly, width, height), corners in either order
fn box_dimensions(b: &[f64; 4]) -> Result<(f64, f64, f64, f64), StackError> {
    let llx = b[0].min(b[2]);
    let lly = b[1].min(b[3]);
    let width = (b[2] - b[0]).abs();
    let height = (b[3] - b[1]).abs();
    if width <= 0.0 || height <= 0.0 {
        return Err(StackError::OperationError(format!(
            "page box is degenerate ({} x {} pt)",
            width, height
        )));
    }
    Ok((llx, lly, width, height))
}

/// Two placements of the page form: bottom copy at y = 0, top copy above
/// it with the gap. Translation maps the sizing box's lower-left to the
/// placement origin.
fn placement_stream(llx: f64, lly: f64, height: f64, gap_pt: f64) -> String {
    let mut ops = String::new();
    for y_offset in [0.0, height + gap_pt] {
        ops.push_str(&format!(
            "q 1 0 0 1 {} {} cm /{} Do Q\n",
            fmt_pt(-llx),
            fmt_pt(y_offset - lly),
            FORM_NAME
        ));
    }
    ops
}

/// PDF operand formatting: fixed-point, never scientific notation
fn fmt_pt(value: f64) -> String {
    // -0.0 == 0.0, keeps "-0.0000" out of the stream
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.4}", value)
}

/// Wrap a source page in a Form XObject inside the output document
///
/// The BBox is the sizing box, so CropBox runs clip exactly like the
/// original viewer would. Content streams are carried over verbatim
/// (decompressed when needed); resources are deep-copied.
fn page_to_form(
    output: &mut Document,
    source: &Document,
    page_dict: &Dictionary,
    bbox: &[f64; 4],
) -> Result<ObjectId, StackError> {
    let content = page_content(source, page_dict)?;

    let mut form_dict = Dictionary::new();
    form_dict.set("Type", Object::Name(b"XObject".to_vec()));
    form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    form_dict.set("FormType", Object::Integer(1));
    form_dict.set(
        "BBox",
        Object::Array(bbox.iter().map(|v| Object::Real(*v as f32)).collect()),
    );

    let mut cache = HashMap::new();
    if let Some(resources) = inherited_page_attr(source, page_dict, b"Resources") {
        form_dict.set(
            "Resources",
            copy_object(output, source, &resources, &mut cache)?,
        );
    }

    Ok(output.add_object(Stream::new(form_dict, content)))
}

/// Collect a page's content stream bytes; a page without Contents is blank
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>, StackError> {
    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => stream_bytes(doc, *id),
        Object::Array(parts) => {
            let mut combined = Vec::new();
            for part in parts {
                if let Ok(id) = part.as_reference() {
                    combined.extend_from_slice(&stream_bytes(doc, id)?);
                    combined.push(b'\n');
                }
            }
            Ok(combined)
        }
        Object::Stream(stream) => Ok(decoded_content(stream)),
        _ => Ok(Vec::new()),
    }
}

fn stream_bytes(doc: &Document, id: ObjectId) -> Result<Vec<u8>, StackError> {
    let obj = doc
        .get_object(id)
        .map_err(|e| StackError::ParseError(e.to_string()))?;
    match obj.as_stream() {
        Ok(stream) => Ok(decoded_content(stream)),
        Err(_) => Ok(Vec::new()),
    }
}

fn decoded_content(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Deep copy an object from source to output, following references
///
/// The target id is reserved in the cache before recursing, so reference
/// cycles in resource dictionaries terminate.
fn copy_object(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object, StackError> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source
                .get_object(*id)
                .map_err(|e| StackError::ParseError(e.to_string()))?;
            let copied = copy_object(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(array) => {
            let mut new_array = Vec::with_capacity(array.len());
            for item in array {
                new_array.push(copy_object(output, source, item, cache)?);
            }
            Ok(Object::Array(new_array))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        other => Ok(other.clone()),
    }
}
