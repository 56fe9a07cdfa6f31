//! Length resynchronization and container emission.

use byteorder::{ByteOrder, LittleEndian};
use serde_json::json;

use crate::chunk::{
    BinaryChunk, CHUNK_PREFIX_SIZE, CHUNK_TYPE_BIN, CHUNK_TYPE_JSON, HEADER_SIZE, Header, JsonChunk,
};

/// Re-derives every length field from the current scene graph and binary
/// payload: re-encodes `json` into the chunk bytes, mirrors the binary
/// length into `buffers[0].byteLength`, and recomputes the header total.
/// Idempotent.
pub(crate) fn rebuild(header: &mut Header, json_chunk: &mut JsonChunk, bin: &BinaryChunk) {
    if let Some(buffer) = json_chunk.json.pointer_mut("/buffers/0") {
        buffer["byteLength"] = json!(bin.len());
    }
    json_chunk.data = json_chunk.json.to_string().into_bytes();
    header.length =
        (HEADER_SIZE + CHUNK_PREFIX_SIZE + json_chunk.len() + CHUNK_PREFIX_SIZE + bin.len()) as u32;
}

/// Emits the container in its on-disk layout, little-endian throughout.
/// Meaningful only on a model whose lengths are in sync (parsing and every
/// mutating operation guarantee that).
pub(crate) fn export(header: &Header, json_chunk: &JsonChunk, bin: &BinaryChunk) -> Vec<u8> {
    let total = HEADER_SIZE + CHUNK_PREFIX_SIZE + json_chunk.len() + CHUNK_PREFIX_SIZE + bin.len();
    let mut out = vec![0u8; total];

    LittleEndian::write_u32(&mut out[0..4], header.magic);
    LittleEndian::write_u32(&mut out[4..8], header.version);
    LittleEndian::write_u32(&mut out[8..12], header.length);

    let mut offset = HEADER_SIZE;
    LittleEndian::write_u32(&mut out[offset..offset + 4], json_chunk.len() as u32);
    LittleEndian::write_u32(&mut out[offset + 4..offset + 8], CHUNK_TYPE_JSON);
    offset += CHUNK_PREFIX_SIZE;
    out[offset..offset + json_chunk.len()].copy_from_slice(&json_chunk.data);
    offset += json_chunk.len();

    LittleEndian::write_u32(&mut out[offset..offset + 4], bin.len() as u32);
    LittleEndian::write_u32(&mut out[offset + 4..offset + 8], CHUNK_TYPE_BIN);
    offset += CHUNK_PREFIX_SIZE;
    out[offset..offset + bin.len()].copy_from_slice(&bin.data);

    out
}
