use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use bds_types::{BdsError, BdsResult, EnvironmentError};

use crate::node::{Directory, Node};
use crate::traits::Storage;

/// Storage backend persisting the container as a plain directory tree on
/// disk.
///
/// `mount()` reads the whole tree into memory (children sorted by name for a
/// stable order); `save()` writes the tree into a staging sibling directory
/// and swaps it in, so a failed save leaves the previously persisted tree
/// intact.
#[derive(Debug)]
pub struct FsStorage {
    path: PathBuf,
    name: String,
    mounted: bool,
}

impl FsStorage {
    /// Create a backend rooted at `path`. The directory is created on first
    /// mount if it does not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            mounted: false,
        }
    }

    /// The on-disk root of this backend.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A sibling of the container root, named `<root><suffix>`.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> BdsError {
    EnvironmentError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

fn load_directory(path: &Path) -> BdsResult<Directory> {
    let mut names = Vec::new();
    let read_dir = fs::read_dir(path).map_err(|e| io_error(path, e))?;
    for entry in read_dir {
        let entry = entry.map_err(|e| io_error(path, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    // read_dir order is OS-dependent; sort for a stable tree.
    names.sort();

    let mut directory = Directory::new();
    for name in names {
        let child_path = path.join(&name);
        let file_type = fs::symlink_metadata(&child_path)
            .map_err(|e| io_error(&child_path, e))?
            .file_type();
        if file_type.is_dir() {
            let child = load_directory(&child_path)?;
            directory.add_directory(&name, child)?;
        } else if file_type.is_file() {
            let content = fs::read(&child_path).map_err(|e| io_error(&child_path, e))?;
            directory.add_file(&name, content)?;
        }
        // Symlinks and special files are not part of the node model.
    }
    Ok(directory)
}

fn write_directory(path: &Path, directory: &Directory) -> BdsResult<()> {
    fs::create_dir_all(path).map_err(|e| io_error(path, e))?;
    for (name, node) in directory.iter() {
        let child_path = path.join(name);
        match node {
            Node::Directory(dir) => write_directory(&child_path, dir)?,
            Node::File(file) => {
                fs::write(&child_path, file.bytes()).map_err(|e| io_error(&child_path, e))?
            }
        }
    }
    Ok(())
}

fn remove_tree(path: &Path) -> BdsResult<()> {
    for entry in walkdir::WalkDir::new(path)
        .min_depth(1)
        .contents_first(true)
    {
        let entry = entry.map_err(|e| {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk failed"));
            io_error(path, source)
        })?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path()).map_err(|e| io_error(entry.path(), e))?;
        } else {
            fs::remove_file(entry.path()).map_err(|e| io_error(entry.path(), e))?;
        }
    }
    fs::remove_dir(path).map_err(|e| io_error(path, e))
}

impl Storage for FsStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&mut self) -> BdsResult<Directory> {
        fs::create_dir_all(&self.path).map_err(|e| io_error(&self.path, e))?;
        let root = load_directory(&self.path)?;
        self.mounted = true;
        debug!(container = %self.name, path = %self.path.display(), "mounted directory backend");
        Ok(root)
    }

    fn save(&mut self, root: &Directory) -> BdsResult<()> {
        let staging = self.sibling(".saving");
        let backup = self.sibling(".old");

        if staging.exists() {
            remove_tree(&staging)?;
        }
        if let Err(err) = write_directory(&staging, root) {
            // The previously persisted tree is untouched.
            if staging.exists() {
                let _ = remove_tree(&staging);
            }
            return Err(err);
        }

        if backup.exists() {
            remove_tree(&backup)?;
        }
        if self.path.exists() {
            fs::rename(&self.path, &backup).map_err(|e| io_error(&self.path, e))?;
        }
        fs::rename(&staging, &self.path).map_err(|e| io_error(&self.path, e))?;
        if backup.exists() {
            let _ = remove_tree(&backup);
        }
        debug!(container = %self.name, "saved directory backend");
        Ok(())
    }

    fn unmount(&mut self) -> BdsResult<()> {
        if self.mounted {
            self.mounted = false;
            debug!(container = %self.name, "unmounted directory backend");
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
    fn mount_of_missing_directory_yields_empty_root() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(base.path().join("fresh"));
        let root = storage.mount().unwrap();
        assert!(root.is_empty());
        assert!(storage.is_mounted());
        storage.unmount().unwrap();
        assert!(!storage.is_mounted());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(base.path().join("c1"));

        let mut root = storage.mount().unwrap();
        root.make_directory("metadata")
            .unwrap()
            .add_key_value_pair("code", "CP001")
            .unwrap();
        root.add_key_value_pair("top", "value").unwrap();
        storage.save(&root).unwrap();
        storage.unmount().unwrap();

        let reloaded = storage.mount().unwrap();
        assert_eq!(
            reloaded
                .directory("metadata")
                .unwrap()
                .string_value("code")
                .unwrap(),
            "CP001"
        );
        assert_eq!(reloaded.string_value("top").unwrap(), "value");
        storage.unmount().unwrap();
    }

    #[test]
    fn save_removes_stale_entries() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(base.path().join("c2"));

        let mut root = storage.mount().unwrap();
        root.add_key_value_pair("keep", "1").unwrap();
        root.add_key_value_pair("drop", "2").unwrap();
        storage.save(&root).unwrap();

        root.remove("drop");
        storage.save(&root).unwrap();
        storage.unmount().unwrap();

        let reloaded = storage.mount().unwrap();
        assert!(reloaded.contains("keep"));
        assert!(!reloaded.contains("drop"));
    }

    #[test]
    fn failed_save_keeps_previous_tree() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(base.path().join("c5"));

        let mut root = storage.mount().unwrap();
        root.add_key_value_pair("precious", "kept").unwrap();
        storage.save(&root).unwrap();

        // A single component longer than the OS limit makes the staged
        // write fail partway through.
        let oversized = "x".repeat(300);
        root.add_key_value_pair(&oversized, "lost").unwrap();
        assert!(storage.save(&root).is_err());
        storage.unmount().unwrap();

        let reloaded = storage.mount().unwrap();
        assert_eq!(reloaded.string_value("precious").unwrap(), "kept");
        assert!(!base.path().join("c5.saving").exists());
    }

    #[test]
    fn loaded_children_are_name_sorted() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("c3");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("zeta"), "1").unwrap();
        std::fs::write(path.join("alpha"), "2").unwrap();
        std::fs::create_dir(path.join("mid")).unwrap();

        let mut storage = FsStorage::new(path);
        let root = storage.mount().unwrap();
        let names: Vec<&str> = root.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn unmount_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let mut storage = FsStorage::new(base.path().join("c4"));
        storage.mount().unwrap();
        storage.unmount().unwrap();
        storage.unmount().unwrap();
    }
}
