//! Stable cache keys derived from step state.
//!
//! External caches store a [`StateFingerprint`] next to each formatted file.
//! When a later run produces the same fingerprint for a step, the step's
//! configuration is unchanged and its previous output is still valid.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of step a fingerprint was taken from.
///
/// Part of the hashed input, so two different kinds of step whose states
/// happen to serialise identically never share a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// A [`StandardStep`](crate::StandardStep).
    Standard,
    /// A [`VolatileStep`](crate::VolatileStep).
    Volatile,
    /// A [`FilteredStep`](crate::FilteredStep).
    Filtered,
}

impl StepKind {
    /// Returns the tag mixed into fingerprints.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Volatile => "volatile",
            Self::Filtered => "filtered",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// SHA-256 over a step kind tag and the JSON serialisation of a state,
/// rendered as lowercase hex.
///
/// # Example
///
/// ```
/// use lustre_step::{StateFingerprint, StepKind};
///
/// let a = StateFingerprint::compute(StepKind::Standard, &("prettier", 3))?;
/// let b = StateFingerprint::compute(StepKind::Standard, &("prettier", 3))?;
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFingerprint(String);

impl StateFingerprint {
    /// Fingerprints `state` as seen by a step of the given kind.
    ///
    /// States must serialise deterministically. Prefer ordered collections
    /// such as `BTreeMap` over `HashMap` inside state types.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error if `state` cannot be encoded as JSON.
    pub fn compute<T: Serialize + ?Sized>(
        kind: StepKind,
        state: &T,
    ) -> Result<Self, serde_json::Error> {
        let encoded = serde_json::to_vec(state)?;
        let mut hasher = Sha256::new();
        hasher.update(kind.tag().as_bytes());
        hasher.update([0_u8]);
        hasher.update(&encoded);
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Returns the hex digest.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StateFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn kind_is_part_of_the_key() {
        let standard = StateFingerprint::compute(StepKind::Standard, &7_u32).expect("hash");
        let filtered = StateFingerprint::compute(StepKind::Filtered, &7_u32).expect("hash");
        assert_ne!(standard, filtered);
    }

    #[test]
    fn ordered_maps_hash_deterministically() {
        let mut forward = BTreeMap::new();
        forward.insert("indent", 4);
        forward.insert("width", 100);
        let mut backward = BTreeMap::new();
        backward.insert("width", 100);
        backward.insert("indent", 4);

        let left = StateFingerprint::compute(StepKind::Standard, &forward).expect("hash");
        let right = StateFingerprint::compute(StepKind::Standard, &backward).expect("hash");
        assert_eq!(left, right);
    }

    #[test]
    fn serialises_as_plain_hex_string() {
        let fingerprint = StateFingerprint::compute(StepKind::Volatile, "x").expect("hash");
        let json = serde_json::to_string(&fingerprint).expect("serialize");
        assert_eq!(json, format!("\"{fingerprint}\""));
        assert!(fingerprint.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
