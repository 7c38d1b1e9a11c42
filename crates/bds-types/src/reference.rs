use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BdsResult, StructuralError};

/// How a standardized entry relates to its original counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// The standardized entry is byte-identical to the original.
    Identical,
    /// The standardized entry was derived by a transformation.
    Transformed,
}

impl ReferenceKind {
    /// One-letter token used in the mapping file.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Identical => "I",
            Self::Transformed => "T",
        }
    }

    /// Parse the one-letter mapping-file token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "I" => Some(Self::Identical),
            "T" => Some(Self::Transformed),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A recorded relationship between an entry under the standardized data tree
/// and the corresponding entry under the original data tree.
///
/// References are keyed by `path` (the standardized side).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    path: String,
    original_path: String,
    kind: ReferenceKind,
}

impl Reference {
    /// Create a reference. Both paths must be non-blank.
    pub fn new(
        path: impl Into<String>,
        original_path: impl Into<String>,
        kind: ReferenceKind,
    ) -> BdsResult<Self> {
        let path = path.into();
        let original_path = original_path.into();
        if path.trim().is_empty() {
            return Err(StructuralError::BlankField("reference path").into());
        }
        if original_path.trim().is_empty() {
            return Err(StructuralError::BlankField("reference original path").into());
        }
        // The mapping file is tab-separated with one line per reference.
        for value in [&path, &original_path] {
            if value.contains(['\t', '\n', '\r']) {
                return Err(StructuralError::InvalidValue {
                    path: value.clone(),
                    reason: "reference paths must not contain tab or newline characters"
                        .to_string(),
                }
                .into());
            }
        }
        Ok(Self {
            path,
            original_path,
            kind,
        })
    }

    /// Path of the standardized entry (the key).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the original entry.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Relationship kind.
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Render as one tab-separated mapping-file line:
    /// `path<TAB>I|T<TAB>original_path`.
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.path, self.kind.token(), self.original_path)
    }

    /// Parse a mapping-file line produced by [`Reference::to_line`].
    pub fn parse_line(line: &str) -> BdsResult<Self> {
        let mut fields = line.split('\t');
        let (path, token, original) = match (fields.next(), fields.next(), fields.next()) {
            (Some(p), Some(t), Some(o)) if fields.next().is_none() => (p, t, o),
            _ => {
                return Err(StructuralError::MalformedContent(format!(
                    "mapping line '{line}' is not 'path<TAB>kind<TAB>original_path'"
                ))
                .into())
            }
        };
        let kind = ReferenceKind::from_token(token).ok_or_else(|| {
            StructuralError::MalformedContent(format!("unknown reference kind token '{token}'"))
        })?;
        Self::new(path, original, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_roundtrip() {
        let reference =
            Reference::new("standard/a.txt", "original/raw_a.txt", ReferenceKind::Transformed)
                .unwrap();
        let parsed = Reference::parse_line(&reference.to_line()).unwrap();
        assert_eq!(reference, parsed);
    }

    #[test]
    fn identical_token() {
        let reference =
            Reference::new("standard/b", "original/b", ReferenceKind::Identical).unwrap();
        assert_eq!(reference.to_line(), "standard/b\tI\toriginal/b");
    }

    #[test]
    fn blank_path_is_rejected() {
        assert!(Reference::new("", "original/x", ReferenceKind::Identical).is_err());
        assert!(Reference::new("standard/x", " ", ReferenceKind::Identical).is_err());
    }

    #[test]
    fn paths_with_line_syntax_characters_are_rejected() {
        // A tab or newline would corrupt the tab-separated mapping line.
        assert!(Reference::new("a\tb", "original/x", ReferenceKind::Identical).is_err());
        assert!(Reference::new("standard/x", "raw\tb", ReferenceKind::Identical).is_err());
        assert!(Reference::new("a\nb", "original/x", ReferenceKind::Identical).is_err());
        assert!(Reference::new("standard/x", "raw\rb", ReferenceKind::Transformed).is_err());
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(Reference::parse_line("only-one-field").is_err());
        assert!(Reference::parse_line("a\tX\tb").is_err());
        assert!(Reference::parse_line("a\tI\tb\textra").is_err());
    }
}
