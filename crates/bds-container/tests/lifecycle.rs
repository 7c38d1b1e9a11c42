//! End-to-end lifecycle exercises through the factory and the guard.

use chrono::{FixedOffset, TimeZone};

use bds_container::{
    DataSet, DataStructure, DataStructureFactory, ExperimentIdentifier, ExperimentRegistrator,
    Mode, RegistrationTimestamp, Sample,
};
use bds_storage::{resolve_storage, ContainerStorage, FsStorage, Storage};
use bds_types::{
    BdsError, Format, FormatParameter, ParameterValue, Reference, ReferenceKind, StructuralError,
    Version,
};

fn registrator() -> ExperimentRegistrator {
    ExperimentRegistrator::new("Ada", "Lovelace", "ada@example.org").unwrap()
}

fn registration_time() -> RegistrationTimestamp {
    let when = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2009, 2, 9, 12, 20, 21)
        .unwrap();
    RegistrationTimestamp::new(when)
}

fn populate_metadata(ds: &mut dyn DataStructure) {
    ds.set_format(Format::new("UNKNOWN", Version::new(1, 0), None).unwrap())
        .unwrap();
    ds.set_experiment_identifier(ExperimentIdentifier::new("I1", "G1", "P1", "E1").unwrap())
        .unwrap();
    ds.set_sample(Sample::new("S1", "WELL", "A microscopy well").unwrap())
        .unwrap();
    ds.set_data_set(
        DataSet::new("DS1")
            .unwrap()
            .with_producer_code("SCANNER-7")
            .measured(true)
            .with_parent_codes(vec!["DS0".to_string()]),
    )
    .unwrap();
    ds.set_registrator(registrator()).unwrap();
    ds.set_registration_timestamp(registration_time()).unwrap();
}

#[test]
fn scenario_create_close_reopen_with_validation() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();

    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp1")));
    let mut ds = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    ds.create(vec![
        FormatParameter::new("plate_geometry", ParameterValue::text("384_WELLS")).unwrap(),
    ])
    .unwrap();
    populate_metadata(&mut ds);
    ds.close().unwrap();

    let storage = resolve_storage(base.path(), "exp1").unwrap();
    let mut reopened = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    reopened.open(Mode::ReadOnly, true).unwrap();

    assert_eq!(
        reopened.format().unwrap(),
        Format::new("UNKNOWN", Version::new(1, 0), None).unwrap()
    );
    assert_eq!(
        reopened.experiment_identifier().unwrap(),
        ExperimentIdentifier::new("I1", "G1", "P1", "E1").unwrap()
    );
    let sample = reopened.sample().unwrap();
    assert_eq!(sample.code(), "S1");
    assert_eq!(sample.type_code(), "WELL");
    let data_set = reopened.data_set().unwrap();
    assert_eq!(data_set.code(), "DS1");
    assert_eq!(data_set.producer_code(), Some("SCANNER-7"));
    assert!(data_set.is_measured());
    assert_eq!(data_set.parent_codes(), ["DS0".to_string()]);
    assert_eq!(reopened.registrator().unwrap(), registrator());
    assert_eq!(
        reopened.registration_timestamp().unwrap(),
        registration_time()
    );
    assert!(reopened.format_parameters().unwrap().contains("plate_geometry"));
    reopened.close().unwrap();
}

#[test]
fn scenario_newer_handler_opens_older_container() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();

    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp2")));
    let mut old = factory.create_instance(storage, Version::new(1, 0)).unwrap();
    old.create(Vec::new()).unwrap();
    populate_metadata(&mut old);
    old.close().unwrap();

    let storage = resolve_storage(base.path(), "exp2").unwrap();
    let mut newer = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    newer.open(Mode::ReadOnly, true).unwrap();
    assert_eq!(newer.version(), Version::new(1, 1));
    newer.close().unwrap();
}

#[test]
fn scenario_missing_sample_fails_validation_fast() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();

    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp3")));
    let mut ds = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    ds.create(Vec::new()).unwrap();
    // Everything except the sample, and no data set either; fail-fast must
    // report only the first missing node in layout order.
    ds.set_format(Format::unknown()).unwrap();
    ds.set_experiment_identifier(ExperimentIdentifier::new("I1", "G1", "P1", "E1").unwrap())
        .unwrap();
    ds.set_registrator(registrator()).unwrap();
    ds.set_registration_timestamp(registration_time()).unwrap();
    ds.close().unwrap();

    let storage = resolve_storage(base.path(), "exp3").unwrap();
    let mut reopened = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    let err = reopened.open(Mode::ReadOnly, true).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("sample is missing"), "{message}");
    assert!(!message.contains("data set"), "{message}");
    assert!(!reopened.is_open_or_created());
}

#[test]
fn scenario_references_roundtrip_through_mapping_file() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();

    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp4")));
    let mut ds = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    ds.create(Vec::new()).unwrap();
    populate_metadata(&mut ds);
    ds.add_reference(Reference::new("well_A1.txt", "well_A1.txt", ReferenceKind::Identical).unwrap())
        .unwrap();
    ds.add_reference(
        Reference::new("well_A2.txt", "raw/scan_A2.dat", ReferenceKind::Transformed).unwrap(),
    )
    .unwrap();
    ds.close().unwrap();

    let storage = resolve_storage(base.path(), "exp4").unwrap();
    let mut reopened = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    reopened.open(Mode::ReadOnly, true).unwrap();
    let references = reopened.references().unwrap();
    assert_eq!(references.len(), 2);
    assert_eq!(references[0].kind(), ReferenceKind::Identical);
    assert_eq!(references[1].kind(), ReferenceKind::Transformed);
    assert_eq!(references[1].original_path(), "raw/scan_A2.dat");
    reopened.close().unwrap();
}

#[test]
fn guard_rejects_everything_outside_the_safelist_before_open() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();
    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp5")));
    let mut ds = factory.create_instance(storage, Version::new(1, 1)).unwrap();

    // Safelisted operations run without a prior create/open.
    assert_eq!(ds.version(), Version::new(1, 1));
    assert!(!ds.is_open_or_created());

    // Guarded operations name the attempted operation.
    let err = ds.format().unwrap_err();
    assert!(matches!(
        err,
        BdsError::NotOpenedOrCreated { operation: "format" }
    ));
    assert!(matches!(
        ds.close().unwrap_err(),
        BdsError::NotOpenedOrCreated { operation: "close" }
    ));
    assert!(matches!(
        ds.set_sample(Sample::new("S1", "WELL", "w").unwrap()).unwrap_err(),
        BdsError::NotOpenedOrCreated { .. }
    ));
    assert!(matches!(
        ds.original_data().unwrap_err(),
        BdsError::NotOpenedOrCreated { .. }
    ));
}

#[test]
fn factory_resolves_and_rejects_versions() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();

    // (1,2) falls back to the (1,1) structure.
    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp6")));
    let ds = factory.create_instance(storage, Version::new(1, 2)).unwrap();
    assert_eq!(ds.version(), Version::new(1, 1));

    // (2,0) has no registered implementation at all.
    let storage: Box<dyn Storage> = Box::new(FsStorage::new(base.path().join("exp6")));
    let err = factory.create_instance(storage, Version::new(2, 0)).unwrap_err();
    assert!(matches!(
        err,
        BdsError::Structural(StructuralError::NoImplementationForVersion(v))
            if v == Version::new(2, 0)
    ));
}

#[test]
fn full_lifecycle_over_the_container_file_backend() {
    let base = tempfile::tempdir().unwrap();
    let factory = DataStructureFactory::with_defaults();
    let path = base.path().join("exp7.bdc");

    let storage: Box<dyn Storage> = Box::new(ContainerStorage::new(&path));
    let mut ds = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    ds.create(Vec::new()).unwrap();
    populate_metadata(&mut ds);
    ds.original_data()
        .unwrap()
        .add_key_value_pair("scan.dat", "payload")
        .unwrap();
    ds.close().unwrap();
    assert!(path.is_file());

    let storage = resolve_storage(base.path(), "exp7").unwrap();
    let mut reopened = factory.create_instance(storage, Version::new(1, 1)).unwrap();
    reopened.open(Mode::ReadOnly, true).unwrap();
    assert_eq!(reopened.sample().unwrap().code(), "S1");
    assert_eq!(
        reopened
            .original_data()
            .unwrap()
            .string_value("scan.dat")
            .unwrap(),
        "payload"
    );
    reopened.close().unwrap();
}

#[test]
fn missing_container_fails_before_any_mount() {
    let base = tempfile::tempdir().unwrap();
    let err = resolve_storage(base.path(), "absent").unwrap_err();
    assert!(err.is_user());
}
