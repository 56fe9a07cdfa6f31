//! Parser and rewriter for VRM avatar containers (binary glTF).
//!
//! The crate is IO-free: it loads a container from an in-memory byte buffer,
//! exposes the embedded textures and avatar metadata for editing, and
//! re-serializes a consistent container. UI, rendering, and file I/O belong
//! to host applications.

#![forbid(unsafe_code)]

mod chunk;
mod container;
mod error;
mod image;
mod repack;
mod write;

pub use chunk::*;
pub use container::*;
pub use error::*;
pub use image::*;
pub use repack::*;

#[cfg(test)]
pub(crate) mod fixture;




#[cfg(test)]
mod write_tests;
