use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a GLB container: header magic {found:#010x}")]
    InvalidMagic { found: u32 },

    #[error("unexpected chunk type {found:#010x} at offset {offset} (expected {expected:#010x})")]
    UnexpectedChunkType {
        expected: u32,
        found: u32,
        offset: usize,
    },

    #[error("container truncated: need {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("failed to parse JSON chunk: {message}")]
    MalformedJson { message: String },

    #[error("image references bufferView {index}, which does not exist")]
    BufferViewOutOfRange { index: usize },

    #[error("no image matches index {index:?} or name {name:?}")]
    ImageNotFound {
        index: Option<usize>,
        name: Option<String>,
    },
}
