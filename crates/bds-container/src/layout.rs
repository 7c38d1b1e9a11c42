//! Fixed names of the container directory layout.
//!
//! All names are exact and `/`-separated regardless of host OS.

pub const VERSION_DIR: &str = "version";
pub const MAJOR_FILE: &str = "major";
pub const MINOR_FILE: &str = "minor";

pub const FORMAT_DIR: &str = "format";
pub const FORMAT_CODE_FILE: &str = "format_code";
pub const FORMAT_VARIANT_FILE: &str = "format_variant";

pub const METADATA_DIR: &str = "metadata";
pub const EXPERIMENT_IDENTIFIER_DIR: &str = "experiment_identifier";
pub const INSTANCE_CODE_FILE: &str = "instance_code";
pub const GROUP_CODE_FILE: &str = "group_code";
pub const PROJECT_CODE_FILE: &str = "project_code";
pub const EXPERIMENT_CODE_FILE: &str = "experiment_code";

pub const REGISTRATION_TIMESTAMP_FILE: &str = "experiment_registration_timestamp";

pub const REGISTRATOR_DIR: &str = "experiment_registrator";
pub const FIRST_NAME_FILE: &str = "first_name";
pub const LAST_NAME_FILE: &str = "last_name";
pub const EMAIL_FILE: &str = "email";

pub const SAMPLE_DIR: &str = "sample";
pub const CODE_FILE: &str = "code";
pub const TYPE_CODE_FILE: &str = "type_code";
pub const TYPE_DESCRIPTION_FILE: &str = "type_description";
pub const INSTANCE_GLOBAL_CODE_FILE: &str = "instance_global_code";

pub const DATA_SET_DIR: &str = "data_set";
pub const PRODUCTION_TIMESTAMP_FILE: &str = "production_timestamp";
pub const PRODUCER_CODE_FILE: &str = "producer_code";
pub const OBSERVABLE_TYPE_FILE: &str = "observable_type";
pub const IS_MEASURED_FILE: &str = "is_measured";
pub const PARENT_CODES_FILE: &str = "parent_codes";

pub const PARAMETERS_DIR: &str = "parameters";
pub const CHECKSUMS_DIR: &str = "checksums";
pub const MAPPING_FILE: &str = "standard_original_mapping";

pub const DATA_DIR: &str = "data";
pub const ORIGINAL_DIR: &str = "original";
pub const STANDARD_DIR: &str = "standard";
pub const ANNOTATIONS_DIR: &str = "annotations";

/// Timestamp pattern: `yyyy-MM-dd HH:mm:ss Z`, e.g. `2009-02-09 12:20:21 +0100`.
pub const TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S %z";

pub const TRUE_TOKEN: &str = "TRUE";
pub const FALSE_TOKEN: &str = "FALSE";
