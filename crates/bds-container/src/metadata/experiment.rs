use chrono::{DateTime, FixedOffset};

use bds_storage::Directory;
use bds_types::BdsResult;

use crate::layout;
use crate::metadata::require_non_blank;
use crate::persist;

/// Identifies the experiment a container belongs to.
///
/// Stored under `metadata/experiment_identifier/` with one file per field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentIdentifier {
    instance_code: String,
    group_code: String,
    project_code: String,
    experiment_code: String,
}

impl ExperimentIdentifier {
    /// Create an identifier; all fields are required and must be non-blank.
    pub fn new(
        instance_code: impl Into<String>,
        group_code: impl Into<String>,
        project_code: impl Into<String>,
        experiment_code: impl Into<String>,
    ) -> BdsResult<Self> {
        let identifier = Self {
            instance_code: instance_code.into(),
            group_code: group_code.into(),
            project_code: project_code.into(),
            experiment_code: experiment_code.into(),
        };
        require_non_blank(&identifier.instance_code, "instance code")?;
        require_non_blank(&identifier.group_code, "group code")?;
        require_non_blank(&identifier.project_code, "project code")?;
        require_non_blank(&identifier.experiment_code, "experiment code")?;
        Ok(identifier)
    }

    pub fn instance_code(&self) -> &str {
        &self.instance_code
    }

    pub fn group_code(&self) -> &str {
        &self.group_code
    }

    pub fn project_code(&self) -> &str {
        &self.project_code
    }

    pub fn experiment_code(&self) -> &str {
        &self.experiment_code
    }

    /// Write this identifier under `metadata_dir`.
    pub fn save_to(&self, metadata_dir: &mut Directory) -> BdsResult<()> {
        let dir = metadata_dir.make_directory(layout::EXPERIMENT_IDENTIFIER_DIR)?;
        dir.add_key_value_pair(layout::INSTANCE_CODE_FILE, &self.instance_code)?;
        dir.add_key_value_pair(layout::GROUP_CODE_FILE, &self.group_code)?;
        dir.add_key_value_pair(layout::PROJECT_CODE_FILE, &self.project_code)?;
        dir.add_key_value_pair(layout::EXPERIMENT_CODE_FILE, &self.experiment_code)?;
        Ok(())
    }

    /// Read the identifier stored under `metadata_dir`.
    pub fn load_from(metadata_dir: &Directory) -> BdsResult<Self> {
        let dir = metadata_dir.directory(layout::EXPERIMENT_IDENTIFIER_DIR)?;
        Self::new(
            dir.string_value(layout::INSTANCE_CODE_FILE)?,
            dir.string_value(layout::GROUP_CODE_FILE)?,
            dir.string_value(layout::PROJECT_CODE_FILE)?,
            dir.string_value(layout::EXPERIMENT_CODE_FILE)?,
        )
    }
}

/// The person who registered the experiment.
///
/// Stored under `metadata/experiment_registrator/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentRegistrator {
    first_name: String,
    last_name: String,
    email: String,
}

impl ExperimentRegistrator {
    /// Create a registrator; all fields are required and must be non-blank.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> BdsResult<Self> {
        let registrator = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        };
        require_non_blank(&registrator.first_name, "first name")?;
        require_non_blank(&registrator.last_name, "last name")?;
        require_non_blank(&registrator.email, "email")?;
        Ok(registrator)
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Write this registrator under `metadata_dir`.
    pub fn save_to(&self, metadata_dir: &mut Directory) -> BdsResult<()> {
        let dir = metadata_dir.make_directory(layout::REGISTRATOR_DIR)?;
        dir.add_key_value_pair(layout::FIRST_NAME_FILE, &self.first_name)?;
        dir.add_key_value_pair(layout::LAST_NAME_FILE, &self.last_name)?;
        dir.add_key_value_pair(layout::EMAIL_FILE, &self.email)?;
        Ok(())
    }

    /// Read the registrator stored under `metadata_dir`.
    pub fn load_from(metadata_dir: &Directory) -> BdsResult<Self> {
        let dir = metadata_dir.directory(layout::REGISTRATOR_DIR)?;
        Self::new(
            dir.string_value(layout::FIRST_NAME_FILE)?,
            dir.string_value(layout::LAST_NAME_FILE)?,
            dir.string_value(layout::EMAIL_FILE)?,
        )
    }
}

/// When the experiment was registered.
///
/// Stored as the single file `metadata/experiment_registration_timestamp`;
/// a missing or blank file loads as unknown, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationTimestamp {
    value: Option<DateTime<FixedOffset>>,
}

impl RegistrationTimestamp {
    /// A known registration time.
    pub fn new(value: DateTime<FixedOffset>) -> Self {
        Self { value: Some(value) }
    }

    /// An unknown registration time.
    pub fn unknown() -> Self {
        Self { value: None }
    }

    pub fn value(&self) -> Option<DateTime<FixedOffset>> {
        self.value
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }

    /// Write this timestamp under `metadata_dir`.
    pub fn save_to(&self, metadata_dir: &mut Directory) -> BdsResult<()> {
        metadata_dir.add_key_value_pair(
            layout::REGISTRATION_TIMESTAMP_FILE,
            &persist::format_timestamp(self.value),
        )
    }

    /// Read the timestamp stored under `metadata_dir`.
    pub fn load_from(metadata_dir: &Directory) -> BdsResult<Self> {
        let value = match metadata_dir.get(layout::REGISTRATION_TIMESTAMP_FILE) {
            Some(bds_storage::Node::File(file)) => {
                persist::parse_timestamp(&file.as_string()?, layout::REGISTRATION_TIMESTAMP_FILE)?
            }
            _ => None,
        };
        Ok(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn identifier_roundtrip() {
        let identifier = ExperimentIdentifier::new("I1", "G1", "P1", "E1").unwrap();
        let mut metadata = Directory::new();
        identifier.save_to(&mut metadata).unwrap();
        assert_eq!(ExperimentIdentifier::load_from(&metadata).unwrap(), identifier);
    }

    #[test]
    fn identifier_rejects_blank_fields() {
        assert!(ExperimentIdentifier::new("", "G1", "P1", "E1").is_err());
        assert!(ExperimentIdentifier::new("I1", "G1", "  ", "E1").is_err());
    }

    #[test]
    fn identifier_load_fails_when_absent() {
        let metadata = Directory::new();
        let err = ExperimentIdentifier::load_from(&metadata).unwrap_err();
        assert!(err.to_string().contains("experiment_identifier"));
    }

    #[test]
    fn registrator_roundtrip() {
        let registrator =
            ExperimentRegistrator::new("Ada", "Lovelace", "ada@example.org").unwrap();
        let mut metadata = Directory::new();
        registrator.save_to(&mut metadata).unwrap();
        assert_eq!(
            ExperimentRegistrator::load_from(&metadata).unwrap(),
            registrator
        );
    }

    #[test]
    fn timestamp_roundtrip() {
        let when = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2009, 2, 9, 12, 20, 21)
            .unwrap();
        let timestamp = RegistrationTimestamp::new(when);
        let mut metadata = Directory::new();
        timestamp.save_to(&mut metadata).unwrap();
        assert_eq!(RegistrationTimestamp::load_from(&metadata).unwrap(), timestamp);
    }

    #[test]
    fn missing_timestamp_loads_as_unknown() {
        let metadata = Directory::new();
        let loaded = RegistrationTimestamp::load_from(&metadata).unwrap();
        assert!(!loaded.is_known());
    }

    #[test]
    fn blank_timestamp_loads_as_unknown() {
        let mut metadata = Directory::new();
        RegistrationTimestamp::unknown().save_to(&mut metadata).unwrap();
        let loaded = RegistrationTimestamp::load_from(&metadata).unwrap();
        assert_eq!(loaded, RegistrationTimestamp::unknown());
    }
}
