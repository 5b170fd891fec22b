//! 32-byte digest alias used for hashes, VRF indices, commitments, and STR
//! fields throughout the core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte cryptographic digest.
///
/// Used for tree node hashes, VRF indices, commitments, and STR hash fields.
/// `repr(transparent)` so it is bit-compatible with `[u8; 32]` at the FFI/wire
/// boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Digest32(#[serde(with = "serde_hex_array")] pub [u8; 32]);

impl Digest32 {
    /// All-zero digest, used as a placeholder before the real value is known.
    pub const ZERO: Digest32 = Digest32([0u8; 32]);

    /// Wrap raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Digest32> for [u8; 32] {
    fn from(d: Digest32) -> Self {
        d.0
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

mod serde_hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let d = Digest32::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&d).unwrap();
        let back: Digest32 = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn display_is_hex() {
        let d = Digest32::from_bytes([0xabu8; 32]);
        assert_eq!(format!("{d}"), "ab".repeat(32));
    }
}
