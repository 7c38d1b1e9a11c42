use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BdsResult, StructuralError};

/// The value carried by a [`FormatParameter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// A single scalar string, stored as one trimmed file.
    Text(String),
    /// A list of strings, stored as one newline-delimited file.
    List(Vec<String>),
}

impl ParameterValue {
    /// Convenience constructor for scalar text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// A single named, typed parameter attached to a format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatParameter {
    name: String,
    value: ParameterValue,
}

impl FormatParameter {
    /// Create a parameter. The name must not be blank.
    pub fn new(name: impl Into<String>, value: ParameterValue) -> BdsResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StructuralError::BlankField("parameter name").into());
        }
        Ok(Self { name, value })
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter value.
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }
}

/// An ordered table of format parameters.
///
/// Insertion order is preserved and names are unique; adding a second
/// parameter with an existing name fails with
/// [`StructuralError::DuplicateParameter`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatParameters {
    parameters: Vec<FormatParameter>,
}

impl FormatParameters {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, rejecting duplicate names.
    pub fn add(&mut self, parameter: FormatParameter) -> BdsResult<()> {
        if self.contains(parameter.name()) {
            return Err(StructuralError::DuplicateParameter(parameter.name().to_string()).into());
        }
        self.parameters.push(parameter);
        Ok(())
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&FormatParameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Returns `true` if a parameter of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatParameter> {
        self.parameters.iter()
    }

    /// Drop all parameters.
    pub fn clear(&mut self) {
        self.parameters.clear();
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: &str) -> FormatParameter {
        FormatParameter::new(name, ParameterValue::text(value)).unwrap()
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = FormatParameter::new("", ParameterValue::text("v")).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut params = FormatParameters::new();
        params.add(param("zeta", "1")).unwrap();
        params.add(param("alpha", "2")).unwrap();
        params.add(param("mid", "3")).unwrap();
        let names: Vec<&str> = params.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut params = FormatParameters::new();
        params.add(param("plate", "P1")).unwrap();
        let err = params.add(param("plate", "P2")).unwrap_err();
        assert!(matches!(
            err,
            crate::BdsError::Structural(StructuralError::DuplicateParameter(name)) if name == "plate"
        ));
        // The original value survives.
        assert_eq!(
            params.get("plate").unwrap().value(),
            &ParameterValue::text("P1")
        );
    }

    #[test]
    fn list_value_display_joins_with_commas() {
        let value = ParameterValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(value.to_string(), "a,b");
    }
}
