//! Per-epoch policies: the epoch deadline and the VRF public key, bound
//! into every STR's signature pre-image (spec.md §4.3).

use serde::{Deserialize, Serialize};

/// Identifier for the pre-signature format itself, included verbatim so a
/// future wire-incompatible revision of this crate produces a different
/// signature pre-image rather than silently misinterpreting old STRs.
pub const VERSION: &str = "coniks-str-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policies {
    pub epoch_deadline_secs: u64,
    pub vrf_public_key: [u8; 32],
}

impl Policies {
    #[must_use]
    pub fn new(epoch_deadline_secs: u64, vrf_public_key: [u8; 32]) -> Self {
        Self { epoch_deadline_secs, vrf_public_key }
    }

    /// `version_bytes ‖ hash_id_bytes ‖ u64_le(epoch_deadline) ‖ vrf_public_key`
    /// (spec.md §4.3). This is a one-way hash/signature pre-image, not a
    /// wire format meant to be parsed back — `version`/`hash_id` are fixed
    /// per build, so the lack of length delimiters between the two ASCII
    /// strings never becomes ambiguous in practice.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(VERSION.as_bytes());
        out.extend_from_slice(coniks_crypto::hash::HASH_ID.as_bytes());
        out.extend_from_slice(&self.epoch_deadline_secs.to_le_bytes());
        out.extend_from_slice(&self.vrf_public_key);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_is_sensitive_to_every_field() {
        let a = Policies::new(60, [1u8; 32]);
        let b = Policies::new(61, [1u8; 32]);
        let c = Policies::new(60, [2u8; 32]);
        assert_ne!(a.serialize(), b.serialize());
        assert_ne!(a.serialize(), c.serialize());
    }

    #[test]
    fn serialize_is_deterministic() {
        let p = Policies::new(60, [9u8; 32]);
        assert_eq!(p.serialize(), p.serialize());
    }
}
