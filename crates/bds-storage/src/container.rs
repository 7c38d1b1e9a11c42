use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use bds_types::{BdsError, BdsResult, EnvironmentError};

use crate::node::Directory;
use crate::traits::Storage;

/// Container file magic bytes.
const MAGIC: &[u8; 4] = b"BDSC";
/// Container file format revision.
const FILE_FORMAT: u32 = 1;
/// zstd compression level for the tree payload.
const COMPRESSION_LEVEL: i32 = 3;
/// Fixed-size header: magic + format + CRC32 + payload length.
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
/// BLAKE3 trailer length.
const TRAILER_LEN: usize = 32;

/// Storage backend persisting the whole container as a single `.bdc` file.
///
/// On-disk layout:
/// ```text
/// [4 bytes: magic "BDSC"]
/// [4 bytes: file format revision (big-endian u32)]
/// [4 bytes: CRC32 of the compressed payload (big-endian u32)]
/// [8 bytes: compressed payload length (big-endian u64)]
/// [N bytes: zstd-compressed JSON tree]
/// [32 bytes: BLAKE3 of everything above]
/// ```
#[derive(Debug)]
pub struct ContainerStorage {
    path: PathBuf,
    name: String,
    mounted: bool,
}

impl ContainerStorage {
    /// Create a backend for the container file at `path`. The file is
    /// created on first save; mounting a missing file yields an empty root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            mounted: false,
        }
    }

    /// The container file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> BdsError {
        EnvironmentError::CorruptContainer {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
        .into()
    }

    fn io_error(&self, source: std::io::Error) -> BdsError {
        EnvironmentError::Io {
            path: self.path.display().to_string(),
            source,
        }
        .into()
    }

    fn decode(&self, bytes: &[u8]) -> BdsResult<Directory> {
        if bytes.len() < HEADER_LEN + TRAILER_LEN {
            return Err(self.corrupt("file shorter than framing"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(self.corrupt("bad magic"));
        }
        let format = u32::from_be_bytes(bytes[4..8].try_into().expect("sliced 4 bytes"));
        if format != FILE_FORMAT {
            return Err(self.corrupt(format!("unsupported file format revision {format}")));
        }

        let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
        let digest = blake3::hash(body);
        if digest.as_bytes() != trailer {
            return Err(self.corrupt("BLAKE3 trailer mismatch"));
        }

        let expected_crc = u32::from_be_bytes(bytes[8..12].try_into().expect("sliced 4 bytes"));
        let payload_len =
            u64::from_be_bytes(bytes[12..HEADER_LEN].try_into().expect("sliced 8 bytes")) as usize;
        let payload = &body[HEADER_LEN..];
        if payload.len() != payload_len {
            return Err(self.corrupt(format!(
                "payload length mismatch: header says {payload_len}, found {}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != expected_crc {
            return Err(self.corrupt("CRC32 mismatch"));
        }

        let json = zstd::decode_all(payload)
            .map_err(|e| self.corrupt(format!("decompression failed: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| self.corrupt(format!("tree deserialization failed: {e}")))
    }

    fn encode(&self, root: &Directory) -> BdsResult<Vec<u8>> {
        let json = serde_json::to_vec(root)
            .map_err(|e| self.corrupt(format!("tree serialization failed: {e}")))?;
        let payload = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| self.corrupt(format!("compression failed: {e}")))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FILE_FORMAT.to_be_bytes());
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        bytes.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        bytes.extend_from_slice(&payload);

        let digest = blake3::hash(&bytes);
        bytes.extend_from_slice(digest.as_bytes());
        Ok(bytes)
    }
}

impl Storage for ContainerStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&mut self) -> BdsResult<Directory> {
        let root = if self.path.exists() {
            let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;
            self.decode(&bytes)?
        } else {
            Directory::new()
        };
        self.mounted = true;
        debug!(container = %self.name, path = %self.path.display(), "mounted container backend");
        Ok(root)
    }

    fn save(&mut self, root: &Directory) -> BdsResult<()> {
        let bytes = self.encode(root)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, &bytes).map_err(|e| self.io_error(e))?;
        debug!(container = %self.name, bytes = bytes.len(), "saved container backend");
        Ok(())
    }

    fn unmount(&mut self) -> BdsResult<()> {
        if self.mounted {
            self.mounted = false;
            debug!(container = %self.name, "unmounted container backend");
        }
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_of_missing_file_yields_empty_root() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = ContainerStorage::new(base.path().join("fresh.bdc"));
        let root = storage.mount().unwrap();
        assert!(root.is_empty());
        storage.unmount().unwrap();
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = ContainerStorage::new(base.path().join("c1.bdc"));

        let mut root = storage.mount().unwrap();
        let metadata = root.make_directory("metadata").unwrap();
        metadata.add_key_value_pair("code", "CP001").unwrap();
        metadata
            .make_directory("sample")
            .unwrap()
            .add_key_value_pair("type_code", "CELL_PLATE")
            .unwrap();
        storage.save(&root).unwrap();
        storage.unmount().unwrap();

        let reloaded = storage.mount().unwrap();
        assert_eq!(reloaded, root);
    }

    #[test]
    fn bad_magic_is_a_corrupt_container() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("bad.bdc");
        std::fs::write(&path, vec![0u8; 64]).unwrap();
        let mut storage = ContainerStorage::new(path);
        let err = storage.mount().unwrap_err();
        assert!(err.is_environment());
    }

    #[test]
    fn flipped_payload_bit_is_detected() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("c2.bdc");
        let mut storage = ContainerStorage::new(path.clone());

        let mut root = storage.mount().unwrap();
        root.add_key_value_pair("key", "value").unwrap();
        storage.save(&root).unwrap();
        storage.unmount().unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let middle = HEADER_LEN + 2;
        bytes[middle] ^= 0x40;
        std::fs::write(&path, bytes).unwrap();

        let err = storage.mount().unwrap_err();
        assert!(err.is_environment());
    }

    #[test]
    fn truncated_file_is_a_corrupt_container() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("c3.bdc");
        std::fs::write(&path, b"BDSC").unwrap();
        let mut storage = ContainerStorage::new(path);
        assert!(storage.mount().unwrap_err().is_environment());
    }
}
