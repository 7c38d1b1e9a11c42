use bds_storage::{Directory, Node};
use bds_types::BdsResult;

use crate::layout;
use crate::metadata::require_non_blank;

/// The sample the measurements were taken from.
///
/// Stored under `metadata/sample/`. `code`, `type_code`, and
/// `type_description` are required; the instance-level fields were added in
/// container version 1.1 and are optional at the type level, so a 1.1
/// handler can fall back to the 1.0 representation when they are absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    code: String,
    type_code: String,
    type_description: String,
    group_code: Option<String>,
    instance_code: Option<String>,
    instance_global_code: Option<String>,
}

impl Sample {
    /// Create a sample; the three base fields must be non-blank.
    pub fn new(
        code: impl Into<String>,
        type_code: impl Into<String>,
        type_description: impl Into<String>,
    ) -> BdsResult<Self> {
        let sample = Self {
            code: code.into(),
            type_code: type_code.into(),
            type_description: type_description.into(),
            group_code: None,
            instance_code: None,
            instance_global_code: None,
        };
        require_non_blank(&sample.code, "sample code")?;
        require_non_blank(&sample.type_code, "sample type code")?;
        require_non_blank(&sample.type_description, "sample type description")?;
        Ok(sample)
    }

    /// Attach the owning group code (1.1 field).
    pub fn with_group_code(mut self, group_code: impl Into<String>) -> Self {
        self.group_code = Some(group_code.into());
        self
    }

    /// Attach the owning instance code (1.1 field).
    pub fn with_instance_code(mut self, instance_code: impl Into<String>) -> Self {
        self.instance_code = Some(instance_code.into());
        self
    }

    /// Attach the global instance code (1.1 field).
    pub fn with_instance_global_code(mut self, instance_global_code: impl Into<String>) -> Self {
        self.instance_global_code = Some(instance_global_code.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn type_code(&self) -> &str {
        &self.type_code
    }

    pub fn type_description(&self) -> &str {
        &self.type_description
    }

    pub fn group_code(&self) -> Option<&str> {
        self.group_code.as_deref()
    }

    pub fn instance_code(&self) -> Option<&str> {
        self.instance_code.as_deref()
    }

    pub fn instance_global_code(&self) -> Option<&str> {
        self.instance_global_code.as_deref()
    }

    /// Write this sample under `metadata_dir`. Optional fields produce no
    /// file when absent.
    pub fn save_to(&self, metadata_dir: &mut Directory) -> BdsResult<()> {
        let dir = metadata_dir.make_directory(layout::SAMPLE_DIR)?;
        dir.add_key_value_pair(layout::CODE_FILE, &self.code)?;
        dir.add_key_value_pair(layout::TYPE_CODE_FILE, &self.type_code)?;
        dir.add_key_value_pair(layout::TYPE_DESCRIPTION_FILE, &self.type_description)?;
        for (name, value) in [
            (layout::GROUP_CODE_FILE, &self.group_code),
            (layout::INSTANCE_CODE_FILE, &self.instance_code),
            (layout::INSTANCE_GLOBAL_CODE_FILE, &self.instance_global_code),
        ] {
            match value {
                Some(value) => dir.add_key_value_pair(name, value)?,
                None => {
                    dir.remove(name);
                }
            }
        }
        Ok(())
    }

    /// Read only the 1.0 representation: the three required fields.
    pub fn load_basic(metadata_dir: &Directory) -> BdsResult<Self> {
        let dir = metadata_dir.directory(layout::SAMPLE_DIR)?;
        Self::new(
            dir.string_value(layout::CODE_FILE)?,
            dir.string_value(layout::TYPE_CODE_FILE)?,
            dir.string_value(layout::TYPE_DESCRIPTION_FILE)?,
        )
    }

    /// Read the full 1.1 representation, falling back to the 1.0 fields when
    /// the newer ones are absent.
    pub fn load_from(metadata_dir: &Directory) -> BdsResult<Self> {
        let mut sample = Self::load_basic(metadata_dir)?;
        let dir = metadata_dir.directory(layout::SAMPLE_DIR)?;
        sample.group_code = optional_value(dir, layout::GROUP_CODE_FILE)?;
        sample.instance_code = optional_value(dir, layout::INSTANCE_CODE_FILE)?;
        sample.instance_global_code = optional_value(dir, layout::INSTANCE_GLOBAL_CODE_FILE)?;
        Ok(sample)
    }
}

fn optional_value(dir: &Directory, name: &str) -> BdsResult<Option<String>> {
    match dir.get(name) {
        Some(Node::File(file)) => {
            let value = file.as_string()?;
            Ok(if value.is_empty() { None } else { Some(value) })
        }
        _ => Ok(None),
    }
}
