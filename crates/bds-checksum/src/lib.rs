//! Deterministic content-hash manifests for BDS container trees.
//!
//! A manifest lists one line per file, `"<hex-hash>  <path>\n"` (two ASCII
//! spaces), with files visited in a stable `(kind, name)` order and paths
//! computed relative to the tree the walk started at. Running the generator
//! twice over an unchanged tree produces byte-identical output.
//!
//! The hash function is pluggable through [`ChecksumAlgorithm`]; the default
//! is a 128-bit truncation of BLAKE3.

pub mod hasher;
pub mod manifest;

pub use hasher::{Blake3_128, ChecksumAlgorithm};
pub use manifest::ManifestWriter;
