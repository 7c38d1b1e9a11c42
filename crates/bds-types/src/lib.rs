//! Foundation types for BDS, the versioned hierarchical data container.
//!
//! This crate provides the value types and the error taxonomy used
//! throughout the BDS system. Every other BDS crate depends on `bds-types`.
//!
//! # Key Types
//!
//! - [`Version`] — Immutable major.minor structural version with
//!   backward-compatibility rules
//! - [`Format`] — Identity of the payload encoding stored inside a container
//! - [`FormatStore`] — Immutable table of well-known formats, built at startup
//! - [`FormatParameters`] — Ordered, duplicate-free table of named parameters
//! - [`Reference`] — Recorded relationship between a standardized entry and
//!   its original counterpart
//! - [`BdsError`] — The error taxonomy: structural, environment, and user
//!   failures, plus the guard's `NotOpenedOrCreated`

pub mod error;
pub mod format;
pub mod parameters;
pub mod reference;
pub mod version;

pub use error::{BdsError, BdsResult, EnvironmentError, StructuralError, UserError};
pub use format::{Format, FormatStore};
pub use parameters::{FormatParameter, FormatParameters, ParameterValue};
pub use reference::{Reference, ReferenceKind};
pub use version::Version;
