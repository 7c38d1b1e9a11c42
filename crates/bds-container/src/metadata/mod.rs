//! Metadata value objects stored under the container's `metadata/` tree.
//!
//! Each value object is constructed in memory with validated required
//! fields, attached to the container through a setter, persisted to a fixed
//! subdirectory (or file) with fixed key filenames, and reconstructed by a
//! symmetric `load_from`.

pub mod data_set;
pub mod experiment;
pub mod sample;

pub use data_set::DataSet;
pub use experiment::{ExperimentIdentifier, ExperimentRegistrator, RegistrationTimestamp};
pub use sample::Sample;

use bds_types::{BdsResult, StructuralError};

pub(crate) fn require_non_blank(value: &str, field: &'static str) -> BdsResult<()> {
    if value.trim().is_empty() {
        return Err(StructuralError::BlankField(field).into());
    }
    Ok(())
}
