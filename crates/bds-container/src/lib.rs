//! Lifecycle engine and metadata layer for BDS containers.
//!
//! A container is obtained through the [`DataStructureFactory`]: the caller
//! names a version, the factory resolves the most specific registered
//! implementation (falling back through decreasing minors), constructs it
//! over a [`bds_storage::Storage`] backend, and wraps it in the
//! [`GuardedDataStructure`] so that nothing but the small safelist can run
//! before `create()` or `open()`.
//!
//! The lifecycle itself is a chain of [`LifecycleHandler`]s run in
//! registration order for each phase (Creating, Opening, Closing,
//! Validation). Validation is fail-fast: the first violated invariant aborts
//! the pass. The Closing phase is not rolled back when a later handler
//! fails; the backend is unmounted on every exit path regardless.
//!
//! Metadata is exposed as immutable value objects (experiment identifier,
//! registrator, registration timestamp, sample, data set), each persisted to
//! a fixed subdirectory under `metadata/` and reconstructed by a symmetric
//! `load_from`.

pub mod engine;
pub mod factory;
pub mod guard;
pub mod handler;
pub mod interpreter;
pub mod layout;
pub mod metadata;
pub mod persist;
pub mod structure;
pub mod v1;

pub use engine::LifecycleEngine;
pub use factory::{DataStructureConstructor, DataStructureFactory, VersionedRegistry};
pub use guard::GuardedDataStructure;
pub use handler::LifecycleHandler;
pub use interpreter::{InterpreterRegistry, PayloadInterpreter};
pub use metadata::{
    DataSet, ExperimentIdentifier, ExperimentRegistrator, RegistrationTimestamp, Sample,
};
pub use persist::{DefaultFormatParameterFactory, FormatParameterFactory};
pub use structure::{DataStructure, Mode};
pub use v1::{AnnotationsValidator, BehaviorV10, BehaviorV11, DataStructureV1, V1Behavior};
