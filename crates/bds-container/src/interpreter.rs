use std::sync::Arc;

use bds_storage::Directory;
use bds_types::{BdsResult, Format, UserError, Version};

use crate::factory::VersionedRegistry;

/// Reads a payload tree written in one concrete format.
///
/// Interpreters are per format code and format version; the registry
/// resolves them with the same minor-fallback rule the container factory
/// uses for structure implementations.
pub trait PayloadInterpreter: Send + Sync {
    fn name(&self) -> &str;

    /// Checks that `standard_data` conforms to this format.
    fn assert_payload_valid(&self, standard_data: &Directory) -> BdsResult<()>;
}

impl std::fmt::Debug for dyn PayloadInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadInterpreter")
            .field("name", &self.name())
            .finish()
    }
}

/// Interpreters keyed by format code, then by format version with minor
/// fallback.
pub struct InterpreterRegistry {
    by_code: Vec<(String, VersionedRegistry<Arc<dyn PayloadInterpreter>>)>,
}

impl InterpreterRegistry {
    pub fn new() -> Self {
        Self {
            by_code: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        code: impl Into<String>,
        version: Version,
        interpreter: Arc<dyn PayloadInterpreter>,
    ) {
        let code = code.into();
        let registry = match self.by_code.iter_mut().find(|(c, _)| *c == code) {
            Some((_, registry)) => registry,
            None => {
                self.by_code.push((code, VersionedRegistry::new()));
                let last = self.by_code.len() - 1;
                &mut self.by_code[last].1
            }
        };
        registry.register(version, interpreter);
    }

    /// Resolve the interpreter for a payload format. An unregistered code
    /// is a user error; a registered code with no compatible version is a
    /// structural one.
    pub fn resolve(&self, format: &Format) -> BdsResult<Arc<dyn PayloadInterpreter>> {
        let registry = self
            .by_code
            .iter()
            .find(|(code, _)| code == format.code())
            .map(|(_, registry)| registry)
            .ok_or_else(|| UserError::UnknownFormat(format.code().to_string()))?;
        let (_, interpreter) = registry.resolve(format.version())?;
        Ok(Arc::clone(interpreter))
    }
}

impl Default for InterpreterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
