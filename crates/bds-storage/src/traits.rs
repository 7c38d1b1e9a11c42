use bds_types::BdsResult;

use crate::node::Directory;

/// A storage backend for one container.
///
/// All implementations must satisfy these invariants:
/// - `mount()` acquires backend resources and loads the root directory;
///   the caller owns the returned tree while the backend stays mounted.
/// - `save()` persists the given tree; it is only meaningful while mounted.
/// - `unmount()` releases backend resources; it is idempotent and safe to
///   call once per mount, including on error paths.
/// - Tree semantics are identical across backends; only the physical byte
///   packing may differ.
/// - All I/O errors are propagated as environment errors, never downgraded
///   to structural errors.
pub trait Storage {
    /// Logical name of the container this backend serves (for diagnostics).
    fn name(&self) -> &str;

    /// Acquire backend resources and load the root directory.
    ///
    /// Mounting a location that does not exist yet yields an empty root,
    /// so that newly created containers can be populated and saved.
    fn mount(&mut self) -> BdsResult<Directory>;

    /// Persist the tree to the backend.
    fn save(&mut self, root: &Directory) -> BdsResult<()>;

    /// Release backend resources. Idempotent.
    fn unmount(&mut self) -> BdsResult<()>;

    /// Returns `true` while the backend is mounted.
    fn is_mounted(&self) -> bool;
}

impl std::fmt::Debug for dyn Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("name", &self.name())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
