use bds_storage::Directory;
use bds_types::{
    BdsResult, Format, FormatParameter, FormatParameters, Reference, Version,
};

use crate::metadata::{
    DataSet, ExperimentIdentifier, ExperimentRegistrator, RegistrationTimestamp, Sample,
};

/// How a data structure is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Mutating operations are allowed; `close()` persists.
    ReadWrite,
    /// The structure may only be inspected; `close()` skips persistence but
    /// still unmounts.
    ReadOnly,
}

/// A versioned data container handle.
///
/// The first four operations form the safelist: they may run on an unopened
/// handle. Every other operation requires the structure to be open or
/// created; the [`crate::GuardedDataStructure`] wrapper enforces this and
/// fails with `NotOpenedOrCreated` otherwise.
///
/// A handle is not safe for concurrent use; the owning application
/// serializes access and typically discards the handle after `close()`.
pub trait DataStructure {
    // --- safelisted ------------------------------------------------------

    /// The structural version this handle reads and writes.
    fn version(&self) -> Version;

    /// `true` iff the structure has been created or opened and not yet
    /// closed.
    fn is_open_or_created(&self) -> bool;

    /// Create a fresh structure in read-write mode, merging `parameters`
    /// into the format-parameter table and running the Creating phase.
    fn create(&mut self, parameters: Vec<FormatParameter>) -> BdsResult<()>;

    /// Open an existing structure: run the Opening phase, check the stored
    /// version for backward compatibility, and, when `validate`, run the
    /// fail-fast Validation phase.
    fn open(&mut self, mode: Mode, validate: bool) -> BdsResult<()>;

    // --- guarded ---------------------------------------------------------

    /// Close the structure: in read-write mode run the Closing phase,
    /// persist the version, and save; in any mode unmount and reset.
    fn close(&mut self) -> BdsResult<()>;

    fn format(&self) -> BdsResult<Format>;
    fn set_format(&mut self, format: Format) -> BdsResult<()>;

    fn format_parameters(&self) -> BdsResult<&FormatParameters>;
    fn add_format_parameter(&mut self, parameter: FormatParameter) -> BdsResult<()>;

    fn experiment_identifier(&self) -> BdsResult<ExperimentIdentifier>;
    fn set_experiment_identifier(&mut self, identifier: ExperimentIdentifier) -> BdsResult<()>;

    fn registration_timestamp(&self) -> BdsResult<RegistrationTimestamp>;
    fn set_registration_timestamp(&mut self, timestamp: RegistrationTimestamp) -> BdsResult<()>;

    fn registrator(&self) -> BdsResult<ExperimentRegistrator>;
    fn set_registrator(&mut self, registrator: ExperimentRegistrator) -> BdsResult<()>;

    fn sample(&self) -> BdsResult<Sample>;
    fn set_sample(&mut self, sample: Sample) -> BdsResult<()>;

    fn data_set(&self) -> BdsResult<DataSet>;
    fn set_data_set(&mut self, data_set: DataSet) -> BdsResult<()>;

    /// The standard-to-original references, in mapping-file order.
    fn references(&self) -> BdsResult<Vec<Reference>>;

    /// Record a reference; an existing entry with the same path is replaced.
    fn add_reference(&mut self, reference: Reference) -> BdsResult<()>;

    /// Mutable access to the `data/original` payload tree.
    fn original_data(&mut self) -> BdsResult<&mut Directory>;

    /// Mutable access to the `data/standard` payload tree.
    fn standard_data(&mut self) -> BdsResult<&mut Directory>;

    /// Mutable access to the format-specific `annotations` tree.
    fn annotations(&mut self) -> BdsResult<&mut Directory>;
}
