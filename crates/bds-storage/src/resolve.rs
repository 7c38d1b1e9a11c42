use std::path::Path;

use bds_types::{BdsResult, UserError};

use crate::container::ContainerStorage;
use crate::fs::FsStorage;
use crate::traits::Storage;

/// File extension of single-file containers.
pub const CONTAINER_EXTENSION: &str = "bdc";

/// Resolve a logical container name under `base` to a storage backend.
///
/// A plain subdirectory of that name is tried first, then
/// `<name>.bdc`; the first match wins. Neither existing fails with
/// [`UserError::ContainerNotFound`] before any backend resource is acquired.
pub fn resolve_storage(base: &Path, name: &str) -> BdsResult<Box<dyn Storage>> {
    let directory = base.join(name);
    if directory.is_dir() {
        return Ok(Box::new(FsStorage::new(directory)));
    }
    let container = base.join(format!("{name}.{CONTAINER_EXTENSION}"));
    if container.is_file() {
        return Ok(Box::new(ContainerStorage::new(container)));
    }
    Err(UserError::ContainerNotFound(name.to_string()).into())
}
