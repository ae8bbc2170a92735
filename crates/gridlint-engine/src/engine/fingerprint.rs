//! Structural fingerprints of dependency vectors.
//!
//! A fingerprint is a DJB2-style hash of the vector's `[dx,dy]` form. It is a
//! display and clustering key only: distinct vectors may collide.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::deps::DependencyVector;

const SEED: u32 = 5381;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u32);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash a string from its last UTF-16 unit to its first:
/// `hash = hash * 33 ^ unit`, wrapping at 32 bits.
pub fn hash_str(s: &str) -> u32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    units
        .iter()
        .rev()
        .fold(SEED, |hash, &unit| hash.wrapping_mul(33) ^ unit as u32)
}

pub fn fingerprint(vector: &DependencyVector) -> Fingerprint {
    Fingerprint(hash_str(&vector.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_values() {
        assert_eq!(fingerprint(&DependencyVector::new(3, 2)), Fingerprint(230960430));
        assert_eq!(fingerprint(&DependencyVector::new(48, 42)), Fingerprint(2435400005));
        assert_eq!(fingerprint(&DependencyVector::ZERO), Fingerprint(230888591));
        assert_eq!(
            fingerprint(&DependencyVector::new(-334, 397)),
            Fingerprint(2769833483)
        );
    }

    #[test]
    fn test_empty_string_is_seed() {
        assert_eq!(hash_str(""), SEED);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(
            fingerprint(&DependencyVector::new(3, 2)),
            fingerprint(&DependencyVector::new(2, 3))
        );
    }
}
