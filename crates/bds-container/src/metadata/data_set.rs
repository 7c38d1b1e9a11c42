use chrono::{DateTime, FixedOffset};

use bds_storage::Directory;
use bds_types::BdsResult;

use crate::layout;
use crate::metadata::require_non_blank;
use crate::persist;

/// Describes the data set carried in the container's payload trees.
///
/// Stored under `metadata/data_set/`. Only `code` is required; optional
/// scalars serialize as empty files, the parent-code list as one
/// comma-joined line (empty file for an empty list), and `is_measured` as
/// the literal `TRUE`/`FALSE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSet {
    code: String,
    production_timestamp: Option<DateTime<FixedOffset>>,
    producer_code: Option<String>,
    observable_type: Option<String>,
    is_measured: bool,
    parent_codes: Vec<String>,
}

impl DataSet {
    /// Create a data set; the code must be non-blank. Defaults: no
    /// production timestamp, no producer, no observable type, measured,
    /// no parents.
    pub fn new(code: impl Into<String>) -> BdsResult<Self> {
        let data_set = Self {
            code: code.into(),
            production_timestamp: None,
            producer_code: None,
            observable_type: None,
            is_measured: true,
            parent_codes: Vec::new(),
        };
        require_non_blank(&data_set.code, "data set code")?;
        Ok(data_set)
    }

    pub fn with_production_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.production_timestamp = Some(timestamp);
        self
    }

    pub fn with_producer_code(mut self, producer_code: impl Into<String>) -> Self {
        self.producer_code = Some(producer_code.into());
        self
    }

    pub fn with_observable_type(mut self, observable_type: impl Into<String>) -> Self {
        self.observable_type = Some(observable_type.into());
        self
    }

    pub fn measured(mut self, is_measured: bool) -> Self {
        self.is_measured = is_measured;
        self
    }

    pub fn with_parent_codes(mut self, parent_codes: Vec<String>) -> Self {
        self.parent_codes = parent_codes;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn production_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.production_timestamp
    }

    pub fn producer_code(&self) -> Option<&str> {
        self.producer_code.as_deref()
    }

    pub fn observable_type(&self) -> Option<&str> {
        self.observable_type.as_deref()
    }

    pub fn is_measured(&self) -> bool {
        self.is_measured
    }

    pub fn parent_codes(&self) -> &[String] {
        &self.parent_codes
    }

    /// Write this data set under `metadata_dir`.
    pub fn save_to(&self, metadata_dir: &mut Directory) -> BdsResult<()> {
        let dir = metadata_dir.make_directory(layout::DATA_SET_DIR)?;
        dir.add_key_value_pair(layout::CODE_FILE, &self.code)?;
        dir.add_key_value_pair(
            layout::PRODUCTION_TIMESTAMP_FILE,
            &persist::format_timestamp(self.production_timestamp),
        )?;
        dir.add_key_value_pair(
            layout::PRODUCER_CODE_FILE,
            self.producer_code.as_deref().unwrap_or(""),
        )?;
        dir.add_key_value_pair(
            layout::OBSERVABLE_TYPE_FILE,
            self.observable_type.as_deref().unwrap_or(""),
        )?;
        dir.add_key_value_pair(layout::IS_MEASURED_FILE, persist::bool_token(self.is_measured))?;
        dir.add_key_value_pair(
            layout::PARENT_CODES_FILE,
            &persist::join_list(&self.parent_codes),
        )?;
        Ok(())
    }

    /// Read the data set stored under `metadata_dir`.
    pub fn load_from(metadata_dir: &Directory) -> BdsResult<Self> {
        let dir = metadata_dir.directory(layout::DATA_SET_DIR)?;
        let mut data_set = Self::new(dir.string_value(layout::CODE_FILE)?)?;
        data_set.production_timestamp = persist::parse_timestamp(
            &dir.string_value(layout::PRODUCTION_TIMESTAMP_FILE)?,
            layout::PRODUCTION_TIMESTAMP_FILE,
        )?;
        data_set.producer_code = non_blank(dir.string_value(layout::PRODUCER_CODE_FILE)?);
        data_set.observable_type = non_blank(dir.string_value(layout::OBSERVABLE_TYPE_FILE)?);
        data_set.is_measured = persist::parse_bool(
            &dir.string_value(layout::IS_MEASURED_FILE)?,
            layout::IS_MEASURED_FILE,
        )?;
        data_set.parent_codes =
            persist::split_list(&dir.string_value(layout::PARENT_CODES_FILE)?);
        Ok(data_set)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
