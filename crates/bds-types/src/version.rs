use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// Immutable structural version of a data container.
///
/// `major` starts at 1; `minor` starts at 0. Compatibility is defined per
/// major line: a handler for `major.minor` can load any container stored
/// with the same major and a minor that is less than or equal to its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Create a version.
    ///
    /// # Panics
    ///
    /// Panics if `major` is 0; major versions start at 1. Untrusted input
    /// goes through the persisted-version loader, which reports a
    /// structural error instead.
    pub fn new(major: u32, minor: u32) -> Self {
        assert!(major > 0, "major version starts at 1");
        Self { major, minor }
    }

    /// The major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// The minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Returns `true` if a container stored with `stored` can be handled by
    /// this version: same major, and `stored.minor <= self.minor`.
    pub fn is_backwards_compatible_with(&self, stored: Version) -> bool {
        self.major == stored.major && stored.minor <= self.minor
    }

    /// The version with the same major and the next-lower minor.
    ///
    /// Fails with [`StructuralError::NoPreviousVersion`] at minor 0.
    pub fn previous_minor(&self) -> Result<Version, StructuralError> {
        if self.minor == 0 {
            return Err(StructuralError::NoPreviousVersion(*self));
        }
        Ok(Version::new(self.major, self.minor - 1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({}.{})", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn accessors() {
        let v = Version::new(2, 5);
        assert_eq!(v.major(), 2);
        assert_eq!(v.minor(), 5);
        assert_eq!(v.to_string(), "2.5");
    }

    #[test]
    #[should_panic(expected = "major version starts at 1")]
    fn zero_major_is_rejected_in_every_build() {
        let _ = Version::new(0, 1);
    }

    #[test]
    fn same_version_is_compatible() {
        let v = Version::new(1, 3);
        assert!(v.is_backwards_compatible_with(v));
    }

    #[test]
    fn newer_minor_handles_older_minor() {
        assert!(Version::new(1, 2).is_backwards_compatible_with(Version::new(1, 0)));
        assert!(!Version::new(1, 0).is_backwards_compatible_with(Version::new(1, 2)));
    }

    #[test]
    fn different_major_is_never_compatible() {
        assert!(!Version::new(2, 9).is_backwards_compatible_with(Version::new(1, 0)));
        assert!(!Version::new(1, 9).is_backwards_compatible_with(Version::new(2, 0)));
    }

    #[test]
    fn previous_minor_steps_down() {
        let v = Version::new(1, 2).previous_minor().unwrap();
        assert_eq!(v, Version::new(1, 1));
    }

    #[test]
    fn previous_minor_fails_at_zero() {
        let err = Version::new(1, 0).previous_minor().unwrap_err();
        assert!(matches!(err, StructuralError::NoPreviousVersion(_)));
    }

    proptest! {
        #[test]
        fn compatibility_follows_minor_ordering(
            major in 1u32..100,
            minor1 in 0u32..100,
            minor2 in 0u32..100,
        ) {
            let older = Version::new(major, minor1.min(minor2));
            let newer = Version::new(major, minor1.max(minor2));
            prop_assert!(newer.is_backwards_compatible_with(older));
        }

        #[test]
        fn majors_never_mix(
            major1 in 1u32..50,
            major2 in 51u32..100,
            minor1 in 0u32..100,
            minor2 in 0u32..100,
        ) {
            let a = Version::new(major1, minor1);
            let b = Version::new(major2, minor2);
            prop_assert!(!a.is_backwards_compatible_with(b));
            prop_assert!(!b.is_backwards_compatible_with(a));
        }
    }
}
