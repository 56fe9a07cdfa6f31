//! The loaded-container session: one mutable model per open file.
//!
//! All scene-graph edits go through the setters here, and every setter
//! finishes with a rebuild, so the JSON chunk bytes, the buffer length
//! mirror, and the header total can never drift apart between calls.

use log::{debug, warn};
use serde_json::{Map, Value, json};

use crate::chunk::{self, BinaryChunk, CHUNK_PREFIX_SIZE, HEADER_SIZE, Header, JsonChunk};
use crate::image::{ImageRecord, extract_images};
use crate::repack::{self, ImageTarget};
use crate::write;
use crate::Error;

// Matches the shipped editor's literal token, not the usual "armature"
// spelling. Existing avatars are authored against this name.
const SKELETON_ROOT_TOKEN: &str = "amature";

/// Extension namespace the avatar metadata lives under, resolved once at
/// load. The legacy `VRM` table wins when both are present.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtensionNamespace {
    /// VRM 0.x: `extensions.VRM`.
    Legacy,
    /// VRM 1.0: `extensions.VRMC_vrm`.
    Successor,
}

impl ExtensionNamespace {
    /// Key under `json.extensions`.
    pub fn key(self) -> &'static str {
        match self {
            ExtensionNamespace::Legacy => "VRM",
            ExtensionNamespace::Successor => "VRMC_vrm",
        }
    }

    fn resolve(json: &Value) -> Option<Self> {
        let extensions = json.get("extensions")?;
        if extensions.get(ExtensionNamespace::Legacy.key()).is_some() {
            Some(ExtensionNamespace::Legacy)
        } else if extensions.get(ExtensionNamespace::Successor.key()).is_some() {
            warn!("no legacy VRM extension table, falling back to VRMC_vrm");
            Some(ExtensionNamespace::Successor)
        } else {
            None
        }
    }
}

/// A parsed container plus its derived image records.
///
/// Callers own the session; there is no shared global state, and edit
/// operations must not be invoked concurrently against the same session.
#[derive(Clone, Debug)]
pub struct VrmContainer {
    file_name: Option<String>,
    header: Header,
    json_chunk: JsonChunk,
    binary: BinaryChunk,
    namespace: Option<ExtensionNamespace>,
    images: Vec<ImageRecord>,
}

impl VrmContainer {
    /// Parses a container from raw bytes: header, JSON chunk, binary chunk,
    /// extension-namespace resolution, and image extraction. Any parse
    /// failure aborts the whole load; no partial model is produced.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let header = chunk::parse_header(bytes)?;
        let json_chunk = chunk::parse_json_chunk(bytes, HEADER_SIZE)?;
        let bin_offset = HEADER_SIZE + CHUNK_PREFIX_SIZE + json_chunk.len();
        let binary = chunk::parse_binary_chunk(bytes, bin_offset)?;

        let namespace = ExtensionNamespace::resolve(&json_chunk.json);
        let images = extract_images(&binary, &json_chunk.json)?;
        debug!(
            "parsed container: version {}, json chunk {} bytes, binary chunk {} bytes, {} image(s)",
            header.version,
            json_chunk.len(),
            binary.len(),
            images.len()
        );

        Ok(Self {
            file_name: None,
            header,
            json_chunk,
            binary,
            namespace,
            images,
        })
    }

    /// Source file name, carried for export naming. Not set by [`parse`];
    /// the host records it when it knows one.
    ///
    /// [`parse`]: VrmContainer::parse
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Container format version from the header.
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// The scene-graph document. Read-only; all mutation goes through the
    /// setters so chunk lengths stay in sync.
    pub fn json(&self) -> &Value {
        &self.json_chunk.json
    }

    pub fn json_chunk(&self) -> &JsonChunk {
        &self.json_chunk
    }

    pub fn binary_chunk(&self) -> &BinaryChunk {
        &self.binary
    }

    /// Namespace resolved at load, if the container carries either table.
    pub fn namespace(&self) -> Option<ExtensionNamespace> {
        self.namespace
    }

    /// Embedded images, in `json.images` order. Regenerated after every
    /// repack; an image-free container yields an empty slice.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Replaces one embedded image and repacks the binary chunk. The target
    /// resolves by `index` into `json.images` first, then by `name`; a miss
    /// fails with [`Error::ImageNotFound`] and leaves the model untouched.
    pub fn replace_image(&mut self, target: &ImageTarget, bytes: &[u8]) -> Result<(), Error> {
        let packed = repack::replace_image(&mut self.json_chunk.json, &self.binary, target, bytes)?;
        self.binary.data = packed;
        self.rebuild();
        self.images = extract_images(&self.binary, &self.json_chunk.json)?;
        Ok(())
    }

    /// First-person bone offset from the resolved extension namespace.
    pub fn first_person_offset(&self) -> Option<[f64; 3]> {
        let ns = self.namespace?;
        let offset = self
            .json_chunk
            .json
            .pointer(&format!(
                "/extensions/{}/firstPerson/firstPersonBoneOffset",
                ns.key()
            ))?;
        Some([
            offset.get("x")?.as_f64()?,
            offset.get("y")?.as_f64()?,
            offset.get("z")?.as_f64()?,
        ])
    }

    /// Writes the first-person bone offset under the resolved namespace.
    /// Silent no-op when the container has neither extension table.
    pub fn set_first_person_offset(&mut self, x: f64, y: f64, z: f64) {
        let Some(ns) = self.namespace else {
            warn!("container has no VRM extension table; first-person offset not written");
            return;
        };
        let pointer = format!("/extensions/{}", ns.key());
        if let Some(ext) = self.json_chunk.json.pointer_mut(&pointer) {
            if let Some(first_person) = ensure_object(ext, &["firstPerson"]) {
                first_person.insert(
                    "firstPersonBoneOffset".to_owned(),
                    json!({ "x": x, "y": y, "z": z }),
                );
            }
        }
        self.rebuild();
    }

    /// Spring-bone groups. These live under the legacy `VRM` table only;
    /// VRM 1.0 moved them to a separate extension this editor does not
    /// touch, so there is no successor fallback here.
    pub fn spring_bone_groups(&self) -> Option<&Value> {
        self.json_chunk
            .json
            .pointer("/extensions/VRM/secondaryAnimation/boneGroups")
    }

    /// Replaces the spring-bone groups under the legacy `VRM` table.
    /// Silent no-op when the container has no legacy table.
    pub fn set_spring_bone_groups(&mut self, groups: Value) {
        let Some(ext) = self.json_chunk.json.pointer_mut("/extensions/VRM") else {
            warn!("container has no legacy VRM extension table; spring-bone groups not written");
            return;
        };
        if let Some(secondary) = ensure_object(ext, &["secondaryAnimation"]) {
            secondary.insert("boneGroups".to_owned(), groups);
        }
        self.rebuild();
    }

    /// Sets the scale triple on every skeleton-root node, initializing a
    /// missing `scale` first. Silent no-op when no node name matches.
    pub fn set_uniform_scale(&mut self, sx: f64, sy: f64, sz: f64) {
        let mut matched = false;
        if let Some(nodes) = self
            .json_chunk
            .json
            .get_mut("nodes")
            .and_then(Value::as_array_mut)
        {
            for node in nodes {
                let is_root = node
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.to_lowercase() == SKELETON_ROOT_TOKEN);
                if !is_root {
                    continue;
                }
                if let Some(obj) = node.as_object_mut() {
                    // Some exports ship the root node without a scale array.
                    obj.entry("scale").or_insert_with(|| json!([1.0, 1.0, 1.0]));
                    obj["scale"] = json!([sx, sy, sz]);
                    matched = true;
                }
            }
        }
        if !matched {
            warn!("no node named '{SKELETON_ROOT_TOKEN}'; scale not written");
        }
        self.rebuild();
    }

    /// Resynchronizes all derived length fields from the current scene graph
    /// and binary payload. Idempotent; every setter calls this, so calling
    /// it again is never required between edits.
    pub fn rebuild(&mut self) {
        write::rebuild(&mut self.header, &mut self.json_chunk, &self.binary);
    }

    /// Serializes the container to its on-disk byte layout. An unedited
    /// container round-trips byte-identically.
    pub fn to_bytes(&self) -> Vec<u8> {
        write::export(&self.header, &self.json_chunk, &self.binary)
    }
}

/// Walks `path` through nested objects, creating empty objects for missing
/// keys, and returns the final object. `None` when a step lands on a
/// non-object value.
fn ensure_object<'a>(root: &'a mut Value, path: &[&str]) -> Option<&'a mut Map<String, Value>> {
    let mut cur = root;
    for key in path {
        let obj = cur.as_object_mut()?;
        cur = obj
            .entry(*key)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    cur.as_object_mut()
}
