//! Identity Hasher - stable 32-bit content fingerprints
//!
//! Fingerprints version the codec's vocabulary: the schema's fingerprint is
//! embedded in cookie names, so encodings issued against an older schema
//! land in a differently named cookie and are never mistaken for current
//! ones. The hash is FNV-1a in its 32-bit parameterization over the
//! structure's canonical JSON bytes.
//!
//! Reference: <http://www.isthe.com/chongo/tech/comp/fnv/index.html>

use serde::Serialize;

use crate::error::{Error, Result};

const FNV_OFFSET_32: u32 = 2_166_136_261;
const FNV_PRIME_32: u32 = 16_777_619;

/// Fold a byte slice through FNV-1a (32-bit): XOR each byte into the
/// accumulator, then wrapping-multiply by the FNV prime.
#[must_use]
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_32;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME_32);
        i += 1;
    }
    hash
}

/// Compute the 32-bit fingerprint of any serializable structure.
///
/// The structure is serialized to its canonical JSON string and the string's
/// bytes are folded through [`fnv1a_32`]. Deterministic and pure: identical
/// input yields an identical fingerprint across processes and platforms, and
/// any change to names, values, or their ordering changes the result.
///
/// # Errors
///
/// Returns [`Error::Fingerprint`] if the value cannot be serialized.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<u32> {
    let json = serde_json::to_string(value).map_err(|e| Error::Fingerprint(e.to_string()))?;
    Ok(fnv1a_32(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExperimentDef, Schema};

    #[test]
    fn test_fnv1a_reference_vectors() {
        // Published FNV-1a 32-bit test vectors.
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let schema = Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
            .build();
        assert_eq!(fingerprint(&schema).unwrap(), fingerprint(&schema).unwrap());
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let ab = Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
            .experiment("b", ExperimentDef::new().param("y", ["p", "q"]))
            .build();
        let ba = Schema::builder()
            .experiment("b", ExperimentDef::new().param("y", ["p", "q"]))
            .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
            .build();
        assert_ne!(fingerprint(&ab).unwrap(), fingerprint(&ba).unwrap());
    }

    #[test]
    fn test_fingerprint_tracks_value_reordering() {
        let xy = Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
            .build();
        let yx = Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["2", "1"]))
            .build();
        assert_ne!(fingerprint(&xy).unwrap(), fingerprint(&yx).unwrap());
    }

    #[test]
    fn test_fingerprint_matches_json_of_value() {
        // The fingerprint is defined over the canonical JSON text, so hashing
        // the serialized string directly must agree.
        let schema = Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["1"]))
            .build();
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(fingerprint(&schema).unwrap(), fnv1a_32(json.as_bytes()));
    }
}
