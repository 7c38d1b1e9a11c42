use serde::{Deserialize, Serialize};

use bds_types::{BdsResult, StructuralError};

/// A node in the container tree: either a directory or a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Directory(Directory),
    File(File),
}

impl Node {
    /// Returns `true` if this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Returns `true` if this node is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Borrow as a directory, if it is one.
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    /// Borrow as a file, if it is one.
    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::Directory(_) => None,
            Self::File(file) => Some(file),
        }
    }
}

/// A leaf node holding an immutable byte payload.
///
/// The payload is interpretable either as a single trimmed string or as a
/// newline-delimited list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    content: Vec<u8>,
}

impl File {
    /// Create a file from raw bytes (or anything convertible to them).
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// Interpret the payload as a single trimmed UTF-8 string.
    pub fn as_string(&self) -> BdsResult<String> {
        let text = std::str::from_utf8(&self.content)
            .map_err(|_| StructuralError::MalformedContent("file content is not valid UTF-8".into()))?;
        Ok(text.trim().to_string())
    }

    /// Interpret the payload as newline-delimited strings.
    ///
    /// An empty payload yields no lines; a trailing newline does not produce
    /// a trailing empty line.
    pub fn as_lines(&self) -> BdsResult<Vec<String>> {
        let text = std::str::from_utf8(&self.content)
            .map_err(|_| StructuralError::MalformedContent("file content is not valid UTF-8".into()))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// A named child slot inside a [`Directory`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub node: Node,
}

/// A directory node: an insertion-ordered mapping from unique child name to
/// child node.
///
/// Paths are `/`-separated regardless of host OS; `/` is the only recognized
/// separator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

/// A child name is a single path component: non-blank, no separator, and
/// not a filesystem dot entry. Rejecting these at insertion keeps both
/// backends semantically identical and keeps an on-disk save inside the
/// container root.
fn validate_name(name: &str) -> BdsResult<()> {
    let reason = if name.trim().is_empty() {
        "child name must not be blank"
    } else if name.contains('/') || name.contains('\\') {
        "child name must not contain a path separator"
    } else if name == "." || name == ".." {
        "child name must not be a dot entry"
    } else {
        return Ok(());
    };
    Err(StructuralError::InvalidValue {
        path: name.to_string(),
        reason: reason.to_string(),
    }
    .into())
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.node)
    }

    /// Look up a child mutably by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| &mut e.node)
    }

    /// Returns `true` if a child of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Create a child directory, or return the existing one.
    ///
    /// Idempotent: calling it twice with the same name yields the same
    /// logical subdirectory. Fails with [`StructuralError::NotADirectory`]
    /// if a file of that name already exists.
    pub fn make_directory(&mut self, name: &str) -> BdsResult<&mut Directory> {
        validate_name(name)?;
        if !self.contains(name) {
            self.entries.push(DirEntry {
                name: name.to_string(),
                node: Node::Directory(Directory::new()),
            });
        }
        match self.get_mut(name) {
            Some(Node::Directory(dir)) => Ok(dir),
            _ => Err(StructuralError::NotADirectory {
                path: name.to_string(),
            }
            .into()),
        }
    }

    /// Create or overwrite a file child holding `value`.
    ///
    /// Fails with [`StructuralError::NotAFile`] if a directory of that name
    /// exists.
    pub fn add_key_value_pair(&mut self, name: &str, value: &str) -> BdsResult<()> {
        self.add_file(name, value.as_bytes().to_vec())
    }

    /// Create or overwrite a file child with raw bytes.
    pub fn add_file(&mut self, name: &str, content: Vec<u8>) -> BdsResult<()> {
        validate_name(name)?;
        match self.get_mut(name) {
            Some(Node::Directory(_)) => Err(StructuralError::NotAFile {
                path: name.to_string(),
            }
            .into()),
            Some(Node::File(file)) => {
                *file = File::new(content);
                Ok(())
            }
            None => {
                self.entries.push(DirEntry {
                    name: name.to_string(),
                    node: Node::File(File::new(content)),
                });
                Ok(())
            }
        }
    }

    /// Insert a fully built child directory.
    ///
    /// Fails with [`StructuralError::NotADirectory`] if a file of that name
    /// exists; replaces an existing directory of that name.
    pub fn add_directory(&mut self, name: &str, directory: Directory) -> BdsResult<()> {
        validate_name(name)?;
        match self.get_mut(name) {
            Some(Node::File(_)) => Err(StructuralError::NotADirectory {
                path: name.to_string(),
            }
            .into()),
            Some(Node::Directory(slot)) => {
                *slot = directory;
                Ok(())
            }
            None => {
                self.entries.push(DirEntry {
                    name: name.to_string(),
                    node: Node::Directory(directory),
                });
                Ok(())
            }
        }
    }

    /// Remove a child, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index).node)
    }

    /// Iterate over `(name, node)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.node))
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The child directory of that name.
    ///
    /// Fails with `MissingNode` if absent and `NotADirectory` if the child
    /// is a file.
    pub fn directory(&self, name: &str) -> BdsResult<&Directory> {
        match self.get(name) {
            Some(Node::Directory(dir)) => Ok(dir),
            Some(Node::File(_)) => Err(StructuralError::NotADirectory {
                path: name.to_string(),
            }
            .into()),
            None => Err(StructuralError::MissingNode {
                path: name.to_string(),
            }
            .into()),
        }
    }

    /// The child file of that name.
    pub fn file(&self, name: &str) -> BdsResult<&File> {
        match self.get(name) {
            Some(Node::File(file)) => Ok(file),
            Some(Node::Directory(_)) => Err(StructuralError::NotAFile {
                path: name.to_string(),
            }
            .into()),
            None => Err(StructuralError::MissingNode {
                path: name.to_string(),
            }
            .into()),
        }
    }

    /// The trimmed string content of the child file of that name.
    pub fn string_value(&self, name: &str) -> BdsResult<String> {
        self.file(name)?.as_string()
    }

    /// Walk a `/`-separated path down to a directory.
    ///
    /// Error paths name the full traversed prefix, e.g. `metadata/sample`.
    pub fn directory_at(&self, path: &str) -> BdsResult<&Directory> {
        let mut current = self;
        let mut walked = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(part);
            current = match current.get(part) {
                Some(Node::Directory(dir)) => dir,
                Some(Node::File(_)) => {
                    return Err(StructuralError::NotADirectory { path: walked }.into())
                }
                None => return Err(StructuralError::MissingNode { path: walked }.into()),
            };
        }
        Ok(current)
    }

    /// Mutable variant of [`Directory::directory_at`].
    pub fn directory_at_mut(&mut self, path: &str) -> BdsResult<&mut Directory> {
        let mut current = self;
        let mut walked = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(part);
            current = match current.get_mut(part) {
                Some(Node::Directory(dir)) => dir,
                Some(Node::File(_)) => {
                    return Err(StructuralError::NotADirectory { path: walked }.into())
                }
                None => return Err(StructuralError::MissingNode { path: walked }.into()),
            };
        }
        Ok(current)
    }
}
