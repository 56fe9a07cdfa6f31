//! Embedded texture extraction from the binary chunk.

use serde::Deserialize;
use serde_json::Value;

use crate::{BinaryChunk, Error};

/// One embedded image, sliced out of the binary chunk.
///
/// `index` is the bufferView index the image resolves to. Records are
/// regenerated after load and after every repack; edits never touch them
/// directly.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    pub index: usize,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImageRecord {
    /// Byte size of the encoded image.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Read-only view over one `json.images` entry.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageDef {
    pub buffer_view: usize,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Read-only view over one `json.bufferViews` entry.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BufferViewSpan {
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
}

pub(crate) fn image_defs(json: &Value) -> Result<Vec<ImageDef>, Error> {
    match json.get("images") {
        None => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| Error::MalformedJson {
            message: format!("images table: {e}"),
        }),
    }
}

pub(crate) fn buffer_view_spans(json: &Value) -> Result<Vec<BufferViewSpan>, Error> {
    match json.get("bufferViews") {
        None => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| Error::MalformedJson {
            message: format!("bufferViews table: {e}"),
        }),
    }
}

pub(crate) fn slice_span(bin: &BinaryChunk, span: BufferViewSpan) -> Result<&[u8], Error> {
    let end = span
        .byte_offset
        .checked_add(span.byte_length)
        .ok_or(Error::Truncated {
            offset: span.byte_offset,
            needed: span.byte_length,
        })?;
    bin.data.get(span.byte_offset..end).ok_or(Error::Truncated {
        offset: span.byte_offset,
        needed: span.byte_length,
    })
}

/// Slices every `json.images` entry out of the binary chunk, in table order.
///
/// An absent or empty image table yields an empty vec, not an error.
pub fn extract_images(bin: &BinaryChunk, json: &Value) -> Result<Vec<ImageRecord>, Error> {
    let defs = image_defs(json)?;
    if defs.is_empty() {
        return Ok(Vec::new());
    }
    let views = buffer_view_spans(json)?;

    let mut images = Vec::with_capacity(defs.len());
    for def in defs {
        let span = *views
            .get(def.buffer_view)
            .ok_or(Error::BufferViewOutOfRange {
                index: def.buffer_view,
            })?;
        images.push(ImageRecord {
            index: def.buffer_view,
            name: def.name,
            mime_type: def.mime_type,
            data: slice_span(bin, span)?.to_vec(),
        });
    }
    Ok(images)
}
