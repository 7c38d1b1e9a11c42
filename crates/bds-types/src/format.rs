use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BdsResult, StructuralError};
use crate::version::Version;

/// Identity of the payload encoding stored inside a container.
///
/// Distinct from the container's own structural [`Version`]: the format
/// describes what the `data/` trees mean, the structural version describes
/// how the container itself is laid out. Equality is structural over all
/// three fields.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Format {
    code: String,
    version: Version,
    variant: Option<String>,
}

impl Format {
    /// Format code used when no specific payload format applies.
    pub const UNKNOWN_CODE: &'static str = "UNKNOWN";

    /// Create a format. The code must not be blank.
    pub fn new(
        code: impl Into<String>,
        version: Version,
        variant: Option<String>,
    ) -> BdsResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(StructuralError::BlankField("format code").into());
        }
        Ok(Self {
            code,
            version,
            variant,
        })
    }

    /// The `UNKNOWN` format at version 1.0.
    pub fn unknown() -> Self {
        Self {
            code: Self::UNKNOWN_CODE.to_string(),
            version: Version::new(1, 0),
            variant: None,
        }
    }

    /// The format code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The format version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The optional free-text variant.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "Format({} {} [{}])", self.code, self.version, variant),
            None => write!(f, "Format({} {})", self.code, self.version),
        }
    }
}

/// Immutable table of well-known formats.
///
/// Built once at startup and passed by reference into the components that
/// need it. Looking up an unregistered `(code, version, variant)` is not an
/// error: such combinations remain usable as ad-hoc [`Format`] values, they
/// are just not canonical.
#[derive(Clone, Debug)]
pub struct FormatStore {
    formats: Vec<Format>,
}

impl FormatStore {
    /// Build a store from an explicit list of formats.
    pub fn new(formats: Vec<Format>) -> Self {
        Self { formats }
    }

    /// The store containing only the `UNKNOWN` format.
    pub fn with_defaults() -> Self {
        Self {
            formats: vec![Format::unknown()],
        }
    }

    /// Look up the canonical instance for an exact `(code, version, variant)`.
    pub fn lookup(&self, code: &str, version: Version, variant: Option<&str>) -> Option<&Format> {
        self.formats
            .iter()
            .find(|f| f.code() == code && f.version() == version && f.variant() == variant)
    }

    /// Return the registered instance matching `candidate`, or `candidate`
    /// itself as an ad-hoc value when nothing matches.
    pub fn canonical(&self, candidate: Format) -> Format {
        match self.lookup(candidate.code(), candidate.version(), candidate.variant()) {
            Some(registered) => registered.clone(),
            None => candidate,
        }
    }

    /// Number of registered formats.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Returns `true` if no formats are registered.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
