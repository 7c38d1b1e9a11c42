//! Codecs between value types and the node tree.
//!
//! Every `save_*` has a symmetric `load_*`; loading a tree written by the
//! matching save yields a field-for-field equal value.

use chrono::{DateTime, FixedOffset};

use bds_storage::{Directory, Node};
use bds_types::{
    BdsResult, Format, FormatParameter, FormatParameters, FormatStore, ParameterValue, Reference,
    StructuralError, Version,
};

use crate::layout;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Write `version/{major,minor}` under `dir`.
pub fn save_version(version: Version, dir: &mut Directory) -> BdsResult<()> {
    let version_dir = dir.make_directory(layout::VERSION_DIR)?;
    version_dir.add_key_value_pair(layout::MAJOR_FILE, &version.major().to_string())?;
    version_dir.add_key_value_pair(layout::MINOR_FILE, &version.minor().to_string())?;
    Ok(())
}

/// Read the version stored under `dir`'s `version/` subdirectory.
pub fn load_version(dir: &Directory) -> BdsResult<Version> {
    let version_dir = dir.directory(layout::VERSION_DIR)?;
    let major = parse_u32(&version_dir.string_value(layout::MAJOR_FILE)?, layout::MAJOR_FILE)?;
    let minor = parse_u32(&version_dir.string_value(layout::MINOR_FILE)?, layout::MINOR_FILE)?;
    if major == 0 {
        return Err(StructuralError::InvalidValue {
            path: layout::MAJOR_FILE.to_string(),
            reason: "major version starts at 1".to_string(),
        }
        .into());
    }
    Ok(Version::new(major, minor))
}

fn parse_u32(value: &str, path: &str) -> BdsResult<u32> {
    value.parse::<u32>().map_err(|e| {
        StructuralError::InvalidValue {
            path: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Write the `format/` subdirectory under the container root.
pub fn save_format(format: &Format, root: &mut Directory) -> BdsResult<()> {
    let format_dir = root.make_directory(layout::FORMAT_DIR)?;
    format_dir.add_key_value_pair(layout::FORMAT_CODE_FILE, format.code())?;
    match format.variant() {
        Some(variant) => format_dir.add_key_value_pair(layout::FORMAT_VARIANT_FILE, variant)?,
        None => {
            format_dir.remove(layout::FORMAT_VARIANT_FILE);
        }
    }
    save_version(format.version(), format_dir)
}

/// Read the `format/` subdirectory, returning the canonical registered
/// format when `(code, version, variant)` matches `store`, else an ad-hoc
/// value.
pub fn load_format(root: &Directory, store: &FormatStore) -> BdsResult<Format> {
    let format_dir = root.directory(layout::FORMAT_DIR)?;
    let code = format_dir.string_value(layout::FORMAT_CODE_FILE)?;
    let version = load_version(format_dir)?;
    let variant = match format_dir.get(layout::FORMAT_VARIANT_FILE) {
        Some(Node::File(file)) => Some(file.as_string()?),
        _ => None,
    };
    let candidate = Format::new(code, version, variant)?;
    Ok(store.canonical(candidate))
}

// ---------------------------------------------------------------------------
// Format parameters
// ---------------------------------------------------------------------------

/// Converts a raw node into a format parameter; pluggable per format.
pub trait FormatParameterFactory: Send + Sync {
    /// Derive a parameter from a named child node, or `None` to skip it.
    fn from_node(&self, name: &str, node: &Node) -> BdsResult<Option<FormatParameter>>;
}

/// Default factory: file name becomes the parameter name, trimmed file
/// content the scalar value; directories are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatParameterFactory;

impl FormatParameterFactory for DefaultFormatParameterFactory {
    fn from_node(&self, name: &str, node: &Node) -> BdsResult<Option<FormatParameter>> {
        match node {
            Node::File(file) => {
                let value = ParameterValue::Text(file.as_string()?);
                Ok(Some(FormatParameter::new(name, value)?))
            }
            Node::Directory(_) => Ok(None),
        }
    }
}

/// Write one file per parameter into `dir` (the `metadata/parameters`
/// directory). Scalar values become key/value files; list values become one
/// newline-delimited file.
pub fn save_parameters(parameters: &FormatParameters, dir: &mut Directory) -> BdsResult<()> {
    for parameter in parameters.iter() {
        match parameter.value() {
            ParameterValue::Text(text) => dir.add_key_value_pair(parameter.name(), text)?,
            ParameterValue::List(items) => {
                dir.add_key_value_pair(parameter.name(), &items.join("\n"))?
            }
        }
    }
    Ok(())
}

/// Re-derive the parameter table from `dir`'s children via `factory`,
/// skipping nodes the factory declines.
pub fn load_parameters(
    dir: &Directory,
    factory: &dyn FormatParameterFactory,
) -> BdsResult<FormatParameters> {
    let mut parameters = FormatParameters::new();
    for (name, node) in dir.iter() {
        if let Some(parameter) = factory.from_node(name, node)? {
            parameters.add(parameter)?;
        }
    }
    Ok(parameters)
}

// ---------------------------------------------------------------------------
// Scalar codecs
// ---------------------------------------------------------------------------

/// Serialize a boolean as the literal uppercase token `TRUE`/`FALSE`.
pub fn bool_token(value: bool) -> &'static str {
    if value {
        layout::TRUE_TOKEN
    } else {
        layout::FALSE_TOKEN
    }
}

/// Parse a `TRUE`/`FALSE` token.
pub fn parse_bool(value: &str, path: &str) -> BdsResult<bool> {
    match value {
        layout::TRUE_TOKEN => Ok(true),
        layout::FALSE_TOKEN => Ok(false),
        other => Err(StructuralError::InvalidValue {
            path: path.to_string(),
            reason: format!("expected TRUE or FALSE, found '{other}'"),
        }
        .into()),
    }
}

/// Serialize a list as a single comma-joined line; an empty list serializes
/// as an empty string.
pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

/// Parse a comma-joined line; an empty or blank line yields an empty list.
pub fn split_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(',').map(|item| item.trim().to_string()).collect()
}

/// Format an optional timestamp with the fixed pattern; `None` serializes as
/// an empty string.
pub fn format_timestamp(value: Option<DateTime<FixedOffset>>) -> String {
    match value {
        Some(timestamp) => timestamp.format(layout::TIMESTAMP_PATTERN).to_string(),
        None => String::new(),
    }
}

/// Parse a timestamp in the fixed pattern; a blank value loads as unknown
/// (`None`), not an error.
pub fn parse_timestamp(value: &str, path: &str) -> BdsResult<Option<DateTime<FixedOffset>>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_str(trimmed, layout::TIMESTAMP_PATTERN)
        .map(Some)
        .map_err(|e| {
            StructuralError::InvalidValue {
                path: path.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
}

// ---------------------------------------------------------------------------
// Reference mapping file
// ---------------------------------------------------------------------------

/// Write the standard-to-original mapping file under `metadata_dir`, one
/// tab-separated line per reference, in the given order.
pub fn save_references(references: &[Reference], metadata_dir: &mut Directory) -> BdsResult<()> {
    let mut content = String::new();
    for reference in references {
        content.push_str(&reference.to_line());
        content.push('\n');
    }
    metadata_dir.add_key_value_pair(layout::MAPPING_FILE, &content)
}

/// Read the mapping file under `metadata_dir`. A missing file yields an
/// empty set.
pub fn load_references(metadata_dir: &Directory) -> BdsResult<Vec<Reference>> {
    let file = match metadata_dir.get(layout::MAPPING_FILE) {
        Some(Node::File(file)) => file,
        _ => return Ok(Vec::new()),
    };
    file.as_lines()?
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Reference::parse_line(line))
        .collect()
}
