use bds_storage::{Directory, File, Node};
use bds_types::BdsResult;

use crate::hasher::{Blake3_128, ChecksumAlgorithm};

/// Generates content-hash manifests over a container subtree.
///
/// The writer holds no state across calls except a reusable line buffer;
/// hash results are never retained.
pub struct ManifestWriter {
    algorithm: Box<dyn ChecksumAlgorithm>,
    line_buffer: String,
}

impl ManifestWriter {
    /// A writer using the default 128-bit BLAKE3 algorithm.
    pub fn new() -> Self {
        Self::with_algorithm(Box::new(Blake3_128))
    }

    /// A writer using a caller-supplied hash algorithm.
    pub fn with_algorithm(algorithm: Box<dyn ChecksumAlgorithm>) -> Self {
        Self {
            algorithm,
            line_buffer: String::new(),
        }
    }

    /// The active algorithm.
    pub fn algorithm(&self) -> &dyn ChecksumAlgorithm {
        self.algorithm.as_ref()
    }

    /// Append manifest lines for every file under `root` to `sink`.
    ///
    /// Children are visited depth-first in a stable `(kind, name)` order:
    /// directories before files, each group lexicographically by name.
    /// Paths are relative to `root`, not to the current recursion level.
    pub fn write_checksums(&mut self, root: &Directory, sink: &mut String) -> BdsResult<()> {
        self.walk(root, "", sink)
    }

    /// Append the manifest line for a single file at `path` to `sink`.
    pub fn write_file_checksum(
        &mut self,
        file: &File,
        path: &str,
        sink: &mut String,
    ) -> BdsResult<()> {
        let hash = self.algorithm.hash_hex(file.bytes());
        self.line_buffer.clear();
        self.line_buffer.push_str(&hash);
        self.line_buffer.push_str("  ");
        self.line_buffer.push_str(path);
        self.line_buffer.push('\n');
        sink.push_str(&self.line_buffer);
        Ok(())
    }

    fn walk(&mut self, directory: &Directory, prefix: &str, sink: &mut String) -> BdsResult<()> {
        let mut children: Vec<(&str, &Node)> = directory.iter().collect();
        children.sort_by_key(|(name, node)| (node.is_file(), *name));

        for (name, node) in children {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };
            match node {
                Node::Directory(dir) => self.walk(dir, &path, sink)?,
                Node::File(file) => self.write_file_checksum(file, &path, sink)?,
            }
        }
        Ok(())
    }
}

impl Default for ManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Directory {
        let mut root = Directory::new();
        root.add_key_value_pair("readme", "top level").unwrap();
        let images = root.make_directory("images").unwrap();
        images.add_key_value_pair("b.img", "bravo").unwrap();
        images.add_key_value_pair("a.img", "alpha").unwrap();
        let nested = root.make_directory("annotations").unwrap();
        nested.add_key_value_pair("note", "n1").unwrap();
        root
    }

    fn manifest_of(root: &Directory) -> String {
        let mut sink = String::new();
        ManifestWriter::new()
            .write_checksums(root, &mut sink)
            .unwrap();
        sink
    }

    #[test]
    fn output_is_deterministic() {
        let root = sample_tree();
        assert_eq!(manifest_of(&root), manifest_of(&root));
    }

    #[test]
    fn directories_sort_before_files_then_by_name() {
        let manifest = manifest_of(&sample_tree());
        let paths: Vec<&str> = manifest
            .lines()
            .map(|l| l.split("  ").nth(1).unwrap())
            .collect();
        assert_eq!(
            paths,
            vec!["annotations/note", "images/a.img", "images/b.img", "readme"]
        );
    }

    #[test]
    fn lines_use_two_space_separator_and_newline() {
        let manifest = manifest_of(&sample_tree());
        for line in manifest.lines() {
            let (hash, path) = line.split_once("  ").unwrap();
            assert_eq!(hash.len(), 32);
            assert!(!path.starts_with(' '));
        }
        assert!(manifest.ends_with('\n'));
    }

    #[test]
    fn renaming_a_file_changes_exactly_one_line() {
        let root = sample_tree();
        let mut renamed = root.clone();
        let images = renamed.directory_at_mut("images").unwrap();
        let node = images.remove("a.img").unwrap();
        if let Node::File(file) = node {
            images.add_file("a2.img", file.bytes().to_vec()).unwrap();
        }

        let before: Vec<String> = manifest_of(&root).lines().map(str::to_string).collect();
        let after: Vec<String> = manifest_of(&renamed).lines().map(str::to_string).collect();
        assert_eq!(before.len(), after.len());
        let differing = before.iter().filter(|l| !after.contains(l)).count();
        assert_eq!(differing, 1);
    }

    #[test]
    fn changing_content_changes_one_hash_and_no_paths() {
        let root = sample_tree();
        let mut changed = root.clone();
        changed
            .directory_at_mut("images")
            .unwrap()
            .add_key_value_pair("a.img", "alpha v2")
            .unwrap();

        let before = manifest_of(&root);
        let after = manifest_of(&changed);

        let paths = |m: &str| -> Vec<String> {
            m.lines()
                .map(|l| l.split("  ").nth(1).unwrap().to_string())
                .collect()
        };
        assert_eq!(paths(&before), paths(&after));

        let changed_lines = before
            .lines()
            .zip(after.lines())
            .filter(|(b, a)| b != a)
            .count();
        assert_eq!(changed_lines, 1);
    }

    #[test]
    fn empty_directory_produces_empty_manifest() {
        assert!(manifest_of(&Directory::new()).is_empty());
    }

    #[test]
    fn single_file_entry() {
        let file = File::new("payload");
        let mut sink = String::new();
        ManifestWriter::new()
            .write_file_checksum(&file, "data/original/payload.txt", &mut sink)
            .unwrap();
        assert!(sink.ends_with("  data/original/payload.txt\n"));
    }
}
