use bds_storage::Storage;
use bds_types::{BdsResult, StructuralError, Version};

use crate::guard::GuardedDataStructure;
use crate::structure::DataStructure;
use crate::v1::DataStructureV1;

/// Builds a boxed [`DataStructure`] from a storage backend. Registered per
/// version in a [`VersionedRegistry`]; the factory passes the backend as
/// the single construction argument.
pub type DataStructureConstructor =
    Box<dyn Fn(Box<dyn Storage>) -> BdsResult<Box<dyn DataStructure>> + Send + Sync>;

/// A version-keyed table with minor-version fallback resolution.
///
/// `resolve` tries the requested version exactly, then walks down through
/// decreasing minors of the same major. This is what makes any container
/// with a known major and a minor at or below the newest registered minor
/// loadable by the newest compatible entry.
pub struct VersionedRegistry<T> {
    entries: Vec<(Version, T)>,
}

impl<T> VersionedRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a value for an exact version, replacing any previous entry
    /// for that version.
    pub fn register(&mut self, version: Version, value: T) {
        if let Some(entry) = self.entries.iter_mut().find(|(v, _)| *v == version) {
            entry.1 = value;
        } else {
            self.entries.push((version, value));
        }
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, version: Version) -> Option<&T> {
        self.entries
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, value)| value)
    }

    /// Find the most specific entry for `requested`: exact match first,
    /// then decreasing minors. Fails with `NoImplementationForVersion`
    /// once minor 0 has been tried.
    pub fn resolve(&self, requested: Version) -> BdsResult<(Version, &T)> {
        let mut candidate = requested;
        loop {
            if let Some(value) = self.get(candidate) {
                return Ok((candidate, value));
            }
            candidate = match candidate.previous_minor() {
                Ok(previous) => previous,
                Err(_) => {
                    return Err(StructuralError::NoImplementationForVersion(requested).into())
                }
            };
        }
    }
}

impl<T> Default for VersionedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a version to a registered constructor, builds the structure,
/// and wraps it in the guard before handing it out.
pub struct DataStructureFactory {
    registry: VersionedRegistry<DataStructureConstructor>,
}

impl DataStructureFactory {
    /// An empty factory with no registered versions.
    pub fn new() -> Self {
        Self {
            registry: VersionedRegistry::new(),
        }
    }

    /// A factory with the built-in v1.0 and v1.1 structures registered.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register(
            Version::new(1, 0),
            Box::new(|storage| Ok(Box::new(DataStructureV1::v1_0(storage)) as Box<dyn DataStructure>)),
        );
        factory.register(
            Version::new(1, 1),
            Box::new(|storage| Ok(Box::new(DataStructureV1::v1_1(storage)) as Box<dyn DataStructure>)),
        );
        factory
    }

    pub fn register(&mut self, version: Version, constructor: DataStructureConstructor) {
        self.registry.register(version, constructor);
    }

    /// Resolve `version`, construct the structure over `storage`, and wrap
    /// it in a [`GuardedDataStructure`]. Construction failures surface as
    /// `ConstructionFailure` for the resolved version.
    pub fn create_instance(
        &self,
        storage: Box<dyn Storage>,
        version: Version,
    ) -> BdsResult<GuardedDataStructure> {
        let (resolved, constructor) = self.registry.resolve(version)?;
        let inner = constructor(storage).map_err(|err| StructuralError::ConstructionFailure {
            version: resolved,
            reason: err.to_string(),
        })?;
        Ok(GuardedDataStructure::new(inner))
    }
}

impl Default for DataStructureFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}
