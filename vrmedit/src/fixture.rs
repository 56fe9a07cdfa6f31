//! In-memory container builders shared by the test modules.

use byteorder::{ByteOrder, LittleEndian};
use serde_json::{Value, json};

use crate::chunk::{CHUNK_TYPE_BIN, CHUNK_TYPE_JSON, GLB_MAGIC};

/// Assembles a well-formed container from arbitrary chunk payloads, with the
/// header total computed from the parts.
pub(crate) fn encode(magic: u32, version: u32, json_bytes: &[u8], bin: &[u8]) -> Vec<u8> {
    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut out = vec![0u8; total];
    LittleEndian::write_u32(&mut out[0..4], magic);
    LittleEndian::write_u32(&mut out[4..8], version);
    LittleEndian::write_u32(&mut out[8..12], total as u32);
    LittleEndian::write_u32(&mut out[12..16], json_bytes.len() as u32);
    LittleEndian::write_u32(&mut out[16..20], CHUNK_TYPE_JSON);
    out[20..20 + json_bytes.len()].copy_from_slice(json_bytes);
    let o = 20 + json_bytes.len();
    LittleEndian::write_u32(&mut out[o..o + 4], bin.len() as u32);
    LittleEndian::write_u32(&mut out[o + 4..o + 8], CHUNK_TYPE_BIN);
    out[o + 8..].copy_from_slice(bin);
    out
}

pub(crate) fn build_container(json: &Value, bin: &[u8]) -> Vec<u8> {
    encode(GLB_MAGIC, 2, json.to_string().as_bytes(), bin)
}

/// Scene graph with two buffer views: a 100-byte PNG in view 0 and 60 bytes
/// of mesh-ish data in view 1, plus both avatar extension shapes the tests
/// poke at.
pub(crate) fn sample_json() -> Value {
    json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": 160 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 100 },
            { "buffer": 0, "byteOffset": 100, "byteLength": 60 }
        ],
        "images": [
            { "bufferView": 0, "name": "face", "mimeType": "image/png" }
        ],
        "nodes": [
            { "name": "Amature" },
            { "name": "Head", "scale": [1.0, 1.0, 1.0] }
        ],
        "extensions": {
            "VRM": {
                "firstPerson": {
                    "firstPersonBoneOffset": { "x": 0.0, "y": 0.06, "z": 0.0 }
                },
                "secondaryAnimation": {
                    "boneGroups": [
                        { "comment": "hair", "stiffiness": 1.0, "bones": [1] }
                    ]
                }
            }
        }
    })
}

pub(crate) fn sample_bin() -> Vec<u8> {
    let mut bin = vec![0xAB_u8; 100];
    bin.extend(std::iter::repeat_n(0xCD_u8, 60));
    bin
}

pub(crate) fn sample_container() -> Vec<u8> {
    build_container(&sample_json(), &sample_bin())
}
