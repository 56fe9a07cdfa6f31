//! Buffer-view repacking for texture replacement.
//!
//! Replacing an image changes one view's length, which shifts the byte
//! offset of every view after it. The repack renumbers all views as a
//! running sum over the (unchanged) index order and rebuilds the binary
//! payload by concatenation, so the chunk stays densely packed.

use serde_json::{Value, json};

use crate::image::{buffer_view_spans, image_defs, slice_span};
use crate::{BinaryChunk, Error};

/// Selects the image to replace. `index` into `json.images` wins when it
/// resolves; otherwise the first entry whose `name` matches is used.
#[derive(Clone, Debug, Default)]
pub struct ImageTarget {
    pub index: Option<usize>,
    pub name: Option<String>,
}

impl ImageTarget {
    pub fn by_index(index: usize) -> Self {
        Self {
            index: Some(index),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            index: None,
            name: Some(name.into()),
        }
    }
}

/// Replaces the targeted image's buffer-view payload with `new_bytes` and
/// returns the repacked binary payload. `json.bufferViews` offsets and
/// lengths are rewritten in place; everything else in the document is left
/// alone. On error the document is untouched.
pub(crate) fn replace_image(
    json: &mut Value,
    bin: &BinaryChunk,
    target: &ImageTarget,
    new_bytes: &[u8],
) -> Result<Vec<u8>, Error> {
    // Resolve the target before touching anything; a miss leaves the
    // document in its pre-call state.
    let defs = image_defs(json)?;
    let image = target
        .index
        .and_then(|i| defs.get(i))
        .or_else(|| {
            target
                .name
                .as_deref()
                .and_then(|n| defs.iter().find(|d| d.name.as_deref() == Some(n)))
        })
        .ok_or_else(|| Error::ImageNotFound {
            index: target.index,
            name: target.name.clone(),
        })?;
    let slot = image.buffer_view;

    let views = buffer_view_spans(json)?;
    if slot >= views.len() {
        return Err(Error::BufferViewOutOfRange { index: slot });
    }

    // Snapshot every view's bytes in index order, swapping in the new
    // payload at the target slot. Views are never reordered.
    let mut segments = Vec::with_capacity(views.len());
    for (i, span) in views.iter().enumerate() {
        if i == slot {
            segments.push(new_bytes.to_vec());
        } else {
            segments.push(slice_span(bin, *span)?.to_vec());
        }
    }

    // Running-sum renumbering and concatenation. An off-by-one here would
    // corrupt every view after the edited one, so offsets come straight
    // from the payload length as it grows.
    let buffer_views = json
        .get_mut("bufferViews")
        .and_then(Value::as_array_mut)
        .ok_or(Error::MalformedJson {
            message: "bufferViews table: expected an array".to_string(),
        })?;
    let mut packed = Vec::with_capacity(segments.iter().map(Vec::len).sum());
    for (view, bytes) in buffer_views.iter_mut().zip(&segments) {
        view["byteOffset"] = json!(packed.len());
        view["byteLength"] = json!(bytes.len());
        packed.extend_from_slice(bytes);
    }
    Ok(packed)
}
