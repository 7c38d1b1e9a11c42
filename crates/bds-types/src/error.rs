use thiserror::Error;

use crate::version::Version;

/// Structural and content failures: the stored tree does not have the shape
/// or values the caller asked for.
///
/// Always local, non-retriable, and user-facing. Never produced for backend
/// I/O failures, which are [`EnvironmentError`]s.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// A directory was expected but a file of that name exists.
    #[error("'{path}' exists but is not a directory")]
    NotADirectory { path: String },

    /// A file was expected but a directory of that name exists.
    #[error("'{path}' exists but is not a file")]
    NotAFile { path: String },

    /// A required node is absent.
    #[error("missing required node '{path}'")]
    MissingNode { path: String },

    /// File content could not be decoded (e.g. not valid UTF-8).
    #[error("malformed content: {0}")]
    MalformedContent(String),

    /// A value stored in a file could not be parsed.
    #[error("invalid value in '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    /// A required constructor field was blank.
    #[error("field '{0}' must not be blank")]
    BlankField(&'static str),

    /// A parameter with the same name has already been added.
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Minor version 0 has no predecessor.
    #[error("version {0} has no previous minor version")]
    NoPreviousVersion(Version),

    /// No implementation is registered for the requested version, even
    /// after falling back through decreasing minors.
    #[error("no implementation registered for version {0}")]
    NoImplementationForVersion(Version),

    /// A resolved implementation could not be constructed.
    #[error("failed to construct implementation for version {version}: {reason}")]
    ConstructionFailure { version: Version, reason: String },

    /// The stored structural version is newer than what this handler
    /// understands.
    #[error("stored version {stored} is not backwards compatible with {supported}")]
    IncompatibleVersion { stored: Version, supported: Version },

    /// A lifecycle validation handler found a violated invariant.
    #[error("invalid data structure: {0}")]
    InvalidStructure(String),
}

/// Failures of the backing storage: I/O errors and corrupt container files.
///
/// Surfaced with the underlying cause attached and never downgraded to a
/// [`StructuralError`]. Retry policy, if any, belongs to the caller.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// An I/O operation on the backend failed.
    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The single-file container's framing or checksums did not verify.
    #[error("corrupt container '{path}': {reason}")]
    CorruptContainer { path: String, reason: String },
}

/// Failures caused by the caller naming something that does not exist,
/// surfaced before any backend resource is acquired.
#[derive(Debug, Error)]
pub enum UserError {
    /// No directory or container file matches the requested name.
    #[error("data container '{0}' not found")]
    ContainerNotFound(String),

    /// No payload interpreter is registered for the format code.
    #[error("unknown format code '{0}'")]
    UnknownFormat(String),
}

/// The single error surface of the BDS subsystem.
///
/// The three taxonomy classes convert losslessly via `From`; components never
/// downgrade one class into another. `NotOpenedOrCreated` is a programmer
/// error raised only by the guard wrapper.
#[derive(Debug, Error)]
pub enum BdsError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    User(#[from] UserError),

    /// An operation was invoked before `create()` or `open()`.
    #[error("operation '{operation}' requires an open or created data structure")]
    NotOpenedOrCreated { operation: &'static str },
}

/// Result alias used across the BDS crates.
pub type BdsResult<T> = Result<T, BdsError>;

impl BdsError {
    /// Returns `true` if this is a structural/content failure.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// Returns `true` if this is a backend I/O failure.
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::Environment(_))
    }

    /// Returns `true` if this is a lookup-by-name failure.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}
