use bds_storage::Directory;
use bds_types::{
    BdsError, BdsResult, Format, FormatParameter, FormatParameters, Reference, Version,
};

use crate::metadata::{
    DataSet, ExperimentIdentifier, ExperimentRegistrator, RegistrationTimestamp, Sample,
};
use crate::structure::{DataStructure, Mode};

/// Wraps a [`DataStructure`] and rejects guarded operations while the inner
/// structure is neither open nor created.
///
/// Only `version`, `is_open_or_created`, `create`, and `open` pass through
/// unconditionally; everything else fails with `NotOpenedOrCreated` naming
/// the attempted operation. This is what [`crate::DataStructureFactory`]
/// hands out, so callers never see an unguarded handle.
pub struct GuardedDataStructure {
    inner: Box<dyn DataStructure>,
}

impl std::fmt::Debug for GuardedDataStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedDataStructure")
            .finish_non_exhaustive()
    }
}

impl GuardedDataStructure {
    pub fn new(inner: Box<dyn DataStructure>) -> Self {
        Self { inner }
    }

    fn check(&self, operation: &'static str) -> BdsResult<()> {
        if self.inner.is_open_or_created() {
            Ok(())
        } else {
            Err(BdsError::NotOpenedOrCreated { operation })
        }
    }
}

impl DataStructure for GuardedDataStructure {
    fn version(&self) -> Version {
        self.inner.version()
    }

    fn is_open_or_created(&self) -> bool {
        self.inner.is_open_or_created()
    }

    fn create(&mut self, parameters: Vec<FormatParameter>) -> BdsResult<()> {
        self.inner.create(parameters)
    }

    fn open(&mut self, mode: Mode, validate: bool) -> BdsResult<()> {
        self.inner.open(mode, validate)
    }

    fn close(&mut self) -> BdsResult<()> {
        self.check("close")?;
        self.inner.close()
    }

    fn format(&self) -> BdsResult<Format> {
        self.check("format")?;
        self.inner.format()
    }

    fn set_format(&mut self, format: Format) -> BdsResult<()> {
        self.check("set_format")?;
        self.inner.set_format(format)
    }

    fn format_parameters(&self) -> BdsResult<&FormatParameters> {
        self.check("format_parameters")?;
        self.inner.format_parameters()
    }

    fn add_format_parameter(&mut self, parameter: FormatParameter) -> BdsResult<()> {
        self.check("add_format_parameter")?;
        self.inner.add_format_parameter(parameter)
    }

    fn experiment_identifier(&self) -> BdsResult<ExperimentIdentifier> {
        self.check("experiment_identifier")?;
        self.inner.experiment_identifier()
    }

    fn set_experiment_identifier(&mut self, identifier: ExperimentIdentifier) -> BdsResult<()> {
        self.check("set_experiment_identifier")?;
        self.inner.set_experiment_identifier(identifier)
    }

    fn registration_timestamp(&self) -> BdsResult<RegistrationTimestamp> {
        self.check("registration_timestamp")?;
        self.inner.registration_timestamp()
    }

    fn set_registration_timestamp(&mut self, timestamp: RegistrationTimestamp) -> BdsResult<()> {
        self.check("set_registration_timestamp")?;
        self.inner.set_registration_timestamp(timestamp)
    }

    fn registrator(&self) -> BdsResult<ExperimentRegistrator> {
        self.check("registrator")?;
        self.inner.registrator()
    }

    fn set_registrator(&mut self, registrator: ExperimentRegistrator) -> BdsResult<()> {
        self.check("set_registrator")?;
        self.inner.set_registrator(registrator)
    }

    fn sample(&self) -> BdsResult<Sample> {
        self.check("sample")?;
        self.inner.sample()
    }

    fn set_sample(&mut self, sample: Sample) -> BdsResult<()> {
        self.check("set_sample")?;
        self.inner.set_sample(sample)
    }

    fn data_set(&self) -> BdsResult<DataSet> {
        self.check("data_set")?;
        self.inner.data_set()
    }

    fn set_data_set(&mut self, data_set: DataSet) -> BdsResult<()> {
        self.check("set_data_set")?;
        self.inner.set_data_set(data_set)
    }

    fn references(&self) -> BdsResult<Vec<Reference>> {
        self.check("references")?;
        self.inner.references()
    }

    fn add_reference(&mut self, reference: Reference) -> BdsResult<()> {
        self.check("add_reference")?;
        self.inner.add_reference(reference)
    }

    fn original_data(&mut self) -> BdsResult<&mut Directory> {
        self.check("original_data")?;
        self.inner.original_data()
    }

    fn standard_data(&mut self) -> BdsResult<&mut Directory> {
        self.check("standard_data")?;
        self.inner.standard_data()
    }

    fn annotations(&mut self) -> BdsResult<&mut Directory> {
        self.check("annotations")?;
        self.inner.annotations()
    }
}
