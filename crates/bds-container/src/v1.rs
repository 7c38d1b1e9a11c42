//! The version 1.x container structure.
//!
//! # Key Types
//!
//! - [`DataStructureV1`] — the 1.x implementation of [`DataStructure`],
//!   composed of a [`LifecycleEngine`] and a [`V1Behavior`] object.
//! - [`V1Behavior`] — the one seam where 1.0 and 1.1 differ (sample
//!   loading); [`BehaviorV10`] and [`BehaviorV11`] are the two built-ins.
//! - [`AnnotationsValidator`] — pluggable per-format check of the
//!   `annotations/` subtree, run during the Validation phase.

use std::sync::Arc;

use bds_checksum::ManifestWriter;
use bds_storage::{Directory, Storage};
use bds_types::{
    BdsResult, Format, FormatParameter, FormatParameters, FormatStore, Reference, StructuralError,
    Version,
};

use crate::engine::LifecycleEngine;
use crate::handler::LifecycleHandler;
use crate::layout;
use crate::metadata::{
    DataSet, ExperimentIdentifier, ExperimentRegistrator, RegistrationTimestamp, Sample,
};
use crate::persist::{self, DefaultFormatParameterFactory, FormatParameterFactory};
use crate::structure::{DataStructure, Mode};

/// Per-format check of the `annotations/` subtree.
pub trait AnnotationsValidator: Send + Sync {
    fn name(&self) -> &str;

    /// Fails with a structural error when the annotations violate the
    /// format's expectations.
    fn assert_valid(&self, annotations: &Directory) -> BdsResult<()>;
}

/// The behavioral difference between the 1.x minors. Deliberately narrow:
/// everything the minors share lives in [`DataStructureV1`] itself.
pub trait V1Behavior: Send + Sync {
    fn version(&self) -> Version;

    /// Load the sample record from the `metadata/` directory.
    fn load_sample(&self, metadata_dir: &Directory) -> BdsResult<Sample>;
}

/// Version 1.0: the original sample representation, no instance-level
/// fields.
pub struct BehaviorV10;

impl V1Behavior for BehaviorV10 {
    fn version(&self) -> Version {
        Version::new(1, 0)
    }

    fn load_sample(&self, metadata_dir: &Directory) -> BdsResult<Sample> {
        Sample::load_basic(metadata_dir)
    }
}

/// Version 1.1: reads the instance-level sample fields, falling back to the
/// 1.0 representation when they are absent.
pub struct BehaviorV11;

impl V1Behavior for BehaviorV11 {
    fn version(&self) -> Version {
        Version::new(1, 1)
    }

    fn load_sample(&self, metadata_dir: &Directory) -> BdsResult<Sample> {
        Sample::load_from(metadata_dir)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Creating phase: lay down the fixed directory skeleton and an empty
/// mapping file.
struct SkeletonHandler;

impl LifecycleHandler for SkeletonHandler {
    fn name(&self) -> &str {
        "skeleton"
    }

    fn perform_creating(&mut self, root: &mut Directory) -> BdsResult<()> {
        let metadata = root.make_directory(layout::METADATA_DIR)?;
        metadata.make_directory(layout::PARAMETERS_DIR)?;
        metadata.make_directory(layout::CHECKSUMS_DIR)?;
        if !metadata.contains(layout::MAPPING_FILE) {
            metadata.add_key_value_pair(layout::MAPPING_FILE, "")?;
        }
        let data = root.make_directory(layout::DATA_DIR)?;
        data.make_directory(layout::ORIGINAL_DIR)?;
        data.make_directory(layout::STANDARD_DIR)?;
        root.make_directory(layout::ANNOTATIONS_DIR)?;
        Ok(())
    }
}

/// Validation phase: the 1.x structural invariants, plus the attached
/// annotations validator when one is present.
struct ValidationHandlerV1 {
    annotations_validator: Option<Arc<dyn AnnotationsValidator>>,
}

impl LifecycleHandler for ValidationHandlerV1 {
    fn name(&self) -> &str {
        "v1-structure"
    }

    fn assert_valid(&self, root: &Directory) -> BdsResult<()> {
        if root.directory(layout::FORMAT_DIR).is_err() {
            return Err(invalid("format directory is missing"));
        }
        let metadata = root
            .directory(layout::METADATA_DIR)
            .map_err(|_| invalid("metadata directory is missing"))?;
        if metadata.directory(layout::EXPERIMENT_IDENTIFIER_DIR).is_err() {
            return Err(invalid("experiment identifier is missing"));
        }
        if metadata.file(layout::REGISTRATION_TIMESTAMP_FILE).is_err() {
            return Err(invalid("experiment registration timestamp is missing"));
        }
        if metadata.directory(layout::REGISTRATOR_DIR).is_err() {
            return Err(invalid("experiment registrator is missing"));
        }
        if metadata.directory(layout::SAMPLE_DIR).is_err() {
            return Err(invalid("sample is missing"));
        }
        if metadata.directory(layout::DATA_SET_DIR).is_err() {
            return Err(invalid("data set is missing"));
        }
        if let Some(validator) = &self.annotations_validator {
            let annotations = root
                .directory(layout::ANNOTATIONS_DIR)
                .map_err(|_| invalid("annotations directory is missing"))?;
            validator.assert_valid(annotations)?;
        }
        Ok(())
    }
}

fn invalid(description: &str) -> bds_types::BdsError {
    StructuralError::InvalidStructure(description.to_string()).into()
}

/// Closing phase: regenerate the checksum manifests for both payload trees
/// into `metadata/checksums/`.
struct ChecksumHandler {
    writer: ManifestWriter,
}

impl ChecksumHandler {
    fn new() -> Self {
        Self {
            writer: ManifestWriter::new(),
        }
    }
}

impl LifecycleHandler for ChecksumHandler {
    fn name(&self) -> &str {
        "checksums"
    }

    fn perform_closing(&mut self, root: &mut Directory) -> BdsResult<()> {
        for tree in [layout::ORIGINAL_DIR, layout::STANDARD_DIR] {
            let mut manifest = String::new();
            {
                let data = root.directory(layout::DATA_DIR)?;
                let subtree = data.directory(tree)?;
                self.writer.write_checksums(subtree, &mut manifest)?;
            }
            let checksums = root.directory_at_mut(&format!(
                "{}/{}",
                layout::METADATA_DIR,
                layout::CHECKSUMS_DIR
            ))?;
            checksums.add_key_value_pair(tree, &manifest)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// The structure
// ---------------------------------------------------------------------------

/// The version 1.x data structure.
///
/// Setters write into the mounted tree immediately; `close()` persists the
/// whole tree through the backend. The format-parameter table is mirrored
/// in memory so `format_parameters()` can hand out a reference.
pub struct DataStructureV1 {
    engine: LifecycleEngine,
    behavior: Box<dyn V1Behavior>,
    format_store: FormatStore,
    parameter_factory: Box<dyn FormatParameterFactory>,
    parameters: FormatParameters,
    annotations_validator: Option<Arc<dyn AnnotationsValidator>>,
}

impl DataStructureV1 {
    /// A version 1.0 structure over `storage`.
    pub fn v1_0(storage: Box<dyn Storage>) -> Self {
        Self::with_behavior(storage, Box::new(BehaviorV10))
    }

    /// A version 1.1 structure over `storage`.
    pub fn v1_1(storage: Box<dyn Storage>) -> Self {
        Self::with_behavior(storage, Box::new(BehaviorV11))
    }

    pub fn with_behavior(storage: Box<dyn Storage>, behavior: Box<dyn V1Behavior>) -> Self {
        let engine = LifecycleEngine::new(storage, behavior.version());
        Self {
            engine,
            behavior,
            format_store: FormatStore::with_defaults(),
            parameter_factory: Box::new(DefaultFormatParameterFactory),
            parameters: FormatParameters::new(),
            annotations_validator: None,
        }
    }

    /// Replace the format table used to canonicalize loaded formats.
    pub fn set_format_store(&mut self, store: FormatStore) {
        self.format_store = store;
    }

    /// Replace the factory used to derive parameters from raw nodes.
    pub fn set_parameter_factory(&mut self, factory: Box<dyn FormatParameterFactory>) {
        self.parameter_factory = factory;
    }

    /// Attach a per-format annotations validator; it runs during the
    /// Validation phase of the next `open`.
    pub fn set_annotations_validator(&mut self, validator: Arc<dyn AnnotationsValidator>) {
        self.annotations_validator = Some(validator);
    }

    fn install_handlers(&mut self) {
        self.engine.clear_handlers();
        self.engine.register_handler(Box::new(SkeletonHandler));
        self.engine.register_handler(Box::new(ValidationHandlerV1 {
            annotations_validator: self.annotations_validator.clone(),
        }));
        self.engine.register_handler(Box::new(ChecksumHandler::new()));
    }

    fn metadata(&self) -> BdsResult<&Directory> {
        self.engine.root()?.directory(layout::METADATA_DIR)
    }

    fn metadata_mut(&mut self) -> BdsResult<&mut Directory> {
        self.engine.root_mut()?.make_directory(layout::METADATA_DIR)
    }

    fn write_parameter_files(&mut self) -> BdsResult<()> {
        let parameters = self.parameters.clone();
        let dir = self.metadata_mut()?.make_directory(layout::PARAMETERS_DIR)?;
        persist::save_parameters(&parameters, dir)
    }
}

impl DataStructure for DataStructureV1 {
    fn version(&self) -> Version {
        self.engine.version()
    }

    fn is_open_or_created(&self) -> bool {
        self.engine.is_open_or_created()
    }

    fn create(&mut self, parameters: Vec<FormatParameter>) -> BdsResult<()> {
        // Duplicate parameter names abort before the backend is mounted.
        self.parameters.clear();
        for parameter in parameters {
            self.parameters.add(parameter)?;
        }
        self.install_handlers();
        self.engine.create()?;
        if let Err(err) = self.write_parameter_files() {
            self.engine.abort();
            return Err(err);
        }
        Ok(())
    }

    fn open(&mut self, mode: Mode, validate: bool) -> BdsResult<()> {
        self.install_handlers();
        self.engine.open(mode, validate)?;
        let loaded = match self
            .metadata()
            .and_then(|metadata| metadata.directory(layout::PARAMETERS_DIR))
        {
            Ok(dir) => persist::load_parameters(dir, self.parameter_factory.as_ref()),
            Err(_) => Ok(FormatParameters::new()),
        };
        match loaded {
            Ok(parameters) => {
                self.parameters = parameters;
                Ok(())
            }
            Err(err) => {
                self.engine.abort();
                Err(err)
            }
        }
    }

    fn close(&mut self) -> BdsResult<()> {
        self.engine.close()
    }

    fn format(&self) -> BdsResult<Format> {
        persist::load_format(self.engine.root()?, &self.format_store)
    }

    fn set_format(&mut self, format: Format) -> BdsResult<()> {
        persist::save_format(&format, self.engine.root_mut()?)
    }

    fn format_parameters(&self) -> BdsResult<&FormatParameters> {
        Ok(&self.parameters)
    }

    fn add_format_parameter(&mut self, parameter: FormatParameter) -> BdsResult<()> {
        self.parameters.add(parameter)?;
        self.write_parameter_files()
    }

    fn experiment_identifier(&self) -> BdsResult<ExperimentIdentifier> {
        ExperimentIdentifier::load_from(self.metadata()?)
    }

    fn set_experiment_identifier(&mut self, identifier: ExperimentIdentifier) -> BdsResult<()> {
        identifier.save_to(self.metadata_mut()?)
    }

    fn registration_timestamp(&self) -> BdsResult<RegistrationTimestamp> {
        RegistrationTimestamp::load_from(self.metadata()?)
    }

    fn set_registration_timestamp(&mut self, timestamp: RegistrationTimestamp) -> BdsResult<()> {
        timestamp.save_to(self.metadata_mut()?)
    }

    fn registrator(&self) -> BdsResult<ExperimentRegistrator> {
        ExperimentRegistrator::load_from(self.metadata()?)
    }

    fn set_registrator(&mut self, registrator: ExperimentRegistrator) -> BdsResult<()> {
        registrator.save_to(self.metadata_mut()?)
    }

    fn sample(&self) -> BdsResult<Sample> {
        self.behavior.load_sample(self.metadata()?)
    }

    fn set_sample(&mut self, sample: Sample) -> BdsResult<()> {
        sample.save_to(self.metadata_mut()?)
    }

    fn data_set(&self) -> BdsResult<DataSet> {
        DataSet::load_from(self.metadata()?)
    }

    fn set_data_set(&mut self, data_set: DataSet) -> BdsResult<()> {
        data_set.save_to(self.metadata_mut()?)
    }

    fn references(&self) -> BdsResult<Vec<Reference>> {
        persist::load_references(self.metadata()?)
    }

    fn add_reference(&mut self, reference: Reference) -> BdsResult<()> {
        let mut references = self.references()?;
        match references.iter_mut().find(|r| r.path() == reference.path()) {
            Some(existing) => *existing = reference,
            None => references.push(reference),
        }
        persist::save_references(&references, self.metadata_mut()?)
    }

    fn original_data(&mut self) -> BdsResult<&mut Directory> {
        self.engine
            .root_mut()?
            .make_directory(layout::DATA_DIR)?
            .make_directory(layout::ORIGINAL_DIR)
    }

    fn standard_data(&mut self) -> BdsResult<&mut Directory> {
        self.engine
            .root_mut()?
            .make_directory(layout::DATA_DIR)?
            .make_directory(layout::STANDARD_DIR)
    }

    fn annotations(&mut self) -> BdsResult<&mut Directory> {
        self.engine.root_mut()?.make_directory(layout::ANNOTATIONS_DIR)
    }
}
