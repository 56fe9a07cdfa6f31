//! GLB container layout: the 12-byte header and the two chunk records.
//!
//! The parsers are IO-free and pure: they operate on an in-memory byte slice
//! and never mutate it.

use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value;

use crate::Error;

/// ASCII `glTF`; identifies a binary glTF container.
pub const GLB_MAGIC: u32 = 0x4654_6C67;

/// ASCII `JSON`; tag of the scene-graph chunk.
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;

/// ASCII `BIN\0`; tag of the buffer chunk.
pub const CHUNK_TYPE_BIN: u32 = 0x004E_4942;

/// Byte size of the container header.
pub const HEADER_SIZE: usize = 12;

/// Byte size of the length+type prefix in front of every chunk payload.
pub const CHUNK_PREFIX_SIZE: usize = 8;

/// Container header. `length` covers the whole file and is re-derived on
/// every rebuild.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    pub magic: u32,
    pub version: u32,
    pub length: u32,
}

/// The scene-graph chunk. `data` is always the UTF-8 encoding of `json`;
/// after any edit the pair is resynchronized by the rebuild step, never by
/// editing `data` directly.
#[derive(Clone, Debug)]
pub struct JsonChunk {
    pub data: Vec<u8>,
    pub json: Value,
}

impl JsonChunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The buffer chunk. Internal layout is defined entirely by the scene
/// graph's `bufferViews` table.
#[derive(Clone, Debug, Default)]
pub struct BinaryChunk {
    pub data: Vec<u8>,
}

impl BinaryChunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, Error> {
    let end = offset
        .checked_add(4)
        .ok_or(Error::Truncated { offset, needed: 4 })?;
    if end > bytes.len() {
        return Err(Error::Truncated { offset, needed: 4 });
    }
    Ok(LittleEndian::read_u32(&bytes[offset..end]))
}

/// Reads the header at the start of the container and checks the magic.
pub fn parse_header(bytes: &[u8]) -> Result<Header, Error> {
    let magic = read_u32(bytes, 0)?;
    if magic != GLB_MAGIC {
        return Err(Error::InvalidMagic { found: magic });
    }
    let version = read_u32(bytes, 4)?;
    let length = read_u32(bytes, 8)?;
    Ok(Header {
        magic,
        version,
        length,
    })
}

/// Reads the chunk prefix at `offset`, checks the type tag, and returns a
/// zero-copy view over the payload.
pub fn parse_chunk(expected_type: u32, bytes: &[u8], offset: usize) -> Result<&[u8], Error> {
    let length = read_u32(bytes, offset)? as usize;
    let chunk_type = read_u32(bytes, offset + 4)?;
    if chunk_type != expected_type {
        return Err(Error::UnexpectedChunkType {
            expected: expected_type,
            found: chunk_type,
            offset: offset + 4,
        });
    }
    let start = offset + CHUNK_PREFIX_SIZE;
    let end = start.checked_add(length).ok_or(Error::Truncated {
        offset: start,
        needed: length,
    })?;
    if end > bytes.len() {
        return Err(Error::Truncated {
            offset: start,
            needed: length,
        });
    }
    Ok(&bytes[start..end])
}

/// Parses the JSON chunk at `offset` and decodes its payload as a scene
/// graph document.
pub fn parse_json_chunk(bytes: &[u8], offset: usize) -> Result<JsonChunk, Error> {
    let data = parse_chunk(CHUNK_TYPE_JSON, bytes, offset)?;
    let json: Value = serde_json::from_slice(data).map_err(|e| Error::MalformedJson {
        message: e.to_string(),
    })?;
    Ok(JsonChunk {
        data: data.to_vec(),
        json,
    })
}

/// Parses the binary chunk at `offset`.
pub fn parse_binary_chunk(bytes: &[u8], offset: usize) -> Result<BinaryChunk, Error> {
    let data = parse_chunk(CHUNK_TYPE_BIN, bytes, offset)?;
    Ok(BinaryChunk {
        data: data.to_vec(),
    })
}
