use byteorder::{ByteOrder, LittleEndian};
use serde_json::json;

use crate::fixture::{build_container, sample_container};
use crate::{CHUNK_TYPE_BIN, CHUNK_TYPE_JSON, GLB_MAGIC, VrmContainer};

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&bytes[offset..offset + 4])
}

#[test]
fn export_lays_out_header_and_chunks() {
    let c = VrmContainer::parse(&sample_container()).expect("parse");
    let out = c.to_bytes();

    assert_eq!(u32_at(&out, 0), GLB_MAGIC);
    assert_eq!(u32_at(&out, 4), 2);
    assert_eq!(u32_at(&out, 8) as usize, out.len());

    let json_len = u32_at(&out, 12) as usize;
    assert_eq!(u32_at(&out, 16), CHUNK_TYPE_JSON);
    assert_eq!(json_len, c.json_chunk().len());

    let bin_offset = 20 + json_len;
    let bin_len = u32_at(&out, bin_offset) as usize;
    assert_eq!(u32_at(&out, bin_offset + 4), CHUNK_TYPE_BIN);
    assert_eq!(bin_len, c.binary_chunk().len());
    assert_eq!(out.len(), 28 + json_len + bin_len);
    assert_eq!(&out[bin_offset + 8..], &c.binary_chunk().data[..]);
}

#[test]
fn exported_bytes_reparse_to_the_same_model() {
    let mut c = VrmContainer::parse(&sample_container()).expect("parse");
    c.set_first_person_offset(0.0, 0.09, -0.02);
    c.set_uniform_scale(1.5, 1.5, 1.5);

    let reparsed = VrmContainer::parse(&c.to_bytes()).expect("reparse");
    assert_eq!(reparsed.json(), c.json());
    assert_eq!(reparsed.binary_chunk().data, c.binary_chunk().data);
    assert_eq!(reparsed.header(), c.header());
    // Editing and exporting twice is stable.
    assert_eq!(reparsed.to_bytes(), c.to_bytes());
}

#[test]
fn rebuild_mirrors_the_binary_length_into_buffers() {
    // Start with a deliberately stale buffers[0].byteLength; the first
    // mutating call must resynchronize it.
    let json = json!({
        "asset": { "version": "2.0" },
        "buffers": [{ "byteLength": 9999 }],
        "nodes": [{ "name": "amature" }]
    });
    let mut c = VrmContainer::parse(&build_container(&json, &[5, 6, 7])).expect("parse");
    c.set_uniform_scale(2.0, 2.0, 2.0);
    assert_eq!(c.json()["buffers"][0]["byteLength"], json!(3));
    assert_eq!(
        c.header().length as usize,
        28 + c.json_chunk().len() + c.binary_chunk().len()
    );
}

#[test]
fn containers_without_buffers_still_rebuild() {
    let json = json!({ "asset": { "version": "2.0" } });
    let mut c = VrmContainer::parse(&build_container(&json, &[])).expect("parse");
    c.rebuild();
    assert_eq!(
        c.header().length as usize,
        28 + c.json_chunk().len()
    );
}
