//! Authentication paths: the proof object `Lookup` produces and `verify`
//! checks (spec §4.2).

use coniks_core::Digest32;
use coniks_crypto::vrf::VrfProof;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bits::{bit_at, prefix_bits, shares_prefix};
use crate::hashes;

/// What sits at the end of a descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LeafContent {
    /// Descent ended at an empty node: absence, no colliding prefix.
    Empty,
    /// Descent ended at a leaf whose index differs from the one looked up:
    /// absence by collision. Only the commitment is revealed, never the
    /// other name's value, so a lookup can't be used to read someone else's
    /// binding.
    Commitment(Digest32),
    /// Descent ended at the leaf actually being looked up: inclusion.
    Value {
        #[serde(with = "serde_bytes")]
        value: Vec<u8>,
        salt: [u8; 32],
    },
}

/// The leaf-level information bundled into an [`AuthenticationPath`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafEntry {
    pub level: u32,
    /// The stored index at this node. Unused (zeroed) for [`LeafContent::Empty`].
    pub index: [u8; 32],
    pub content: LeafContent,
}

/// Proof that a lookup for `lookup_index` against a particular tree root
/// resolves to `leaf` (spec §4.2 `AuthenticationPath`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationPath {
    pub tree_nonce: [u8; 32],
    /// Sibling hashes ordered from the leaf's immediate parent up to the root.
    pub pruned_siblings: Vec<Digest32>,
    pub lookup_index: [u8; 32],
    pub vrf_proof: VrfProof,
    pub leaf: LeafEntry,
}

/// Why [`verify`] rejected a path. Names match the consistency-check error
/// plane (spec §7), not the request-error plane.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("VRF proof does not attest to the claimed index")]
    BadVrfProof,
    #[error("leaf shape does not match the claimed inclusion/absence kind")]
    BadCommitment,
    #[error("leaf index is inconsistent with the lookup index")]
    BadLookupIndex,
    #[error("sibling hashes do not fold up to the expected root")]
    BadAuthPath,
    #[error("included value does not match the value being checked")]
    BindingsDiffer,
}

/// Verify an authentication path against `name`/`value` and an already
/// trust-anchored tree root hash (spec §4.2 `Verify`, five steps).
pub fn verify(
    path: &AuthenticationPath,
    name: &str,
    value: &[u8],
    vrf_public_key: &[u8; 32],
    expected_root_hash: &Digest32,
) -> Result<(), VerifyError> {
    // 1. The VRF proof attests that `lookup_index` is the output for `name`.
    coniks_crypto::vrf::verify(vrf_public_key, name.as_bytes(), &Digest32::from_bytes(path.lookup_index), &path.vrf_proof)
        .map_err(|_| VerifyError::BadVrfProof)?;

    let claims_inclusion = path.leaf.index == path.lookup_index;

    // 2. The leaf's shape must match what it claims to be.
    match (&path.leaf.content, claims_inclusion) {
        (LeafContent::Value { .. }, true) => {}
        (LeafContent::Commitment(_), false) => {}
        (LeafContent::Empty, _) => {}
        _ => return Err(VerifyError::BadCommitment),
    }

    // 3. Index consistency: an inclusion leaf must match exactly; a
    //    colliding leaf must share exactly its claimed prefix and then differ.
    match &path.leaf.content {
        LeafContent::Value { .. } => {
            if !claims_inclusion {
                return Err(VerifyError::BadLookupIndex);
            }
        }
        LeafContent::Commitment(_) => {
            if claims_inclusion || !shares_prefix(&path.leaf.index, &path.lookup_index, path.leaf.level) {
                return Err(VerifyError::BadLookupIndex);
            }
        }
        LeafContent::Empty => {}
    }

    // Recompute the leaf-level hash.
    let leaf_hash = match &path.leaf.content {
        LeafContent::Empty => {
            let prefix = prefix_bits(&path.lookup_index, path.leaf.level);
            hashes::empty_hash(&path.tree_nonce, &prefix, path.leaf.level)
        }
        LeafContent::Commitment(commitment) => {
            hashes::leaf_hash(&path.tree_nonce, &path.leaf.index, path.leaf.level, commitment)
        }
        LeafContent::Value { value: leaf_value, salt } => {
            let commitment = hashes::commitment(salt, name, leaf_value);
            hashes::leaf_hash(&path.tree_nonce, &path.leaf.index, path.leaf.level, &commitment)
        }
    };

    // 4. Fold the sibling hashes from the leaf up to the root.
    let mut acc = leaf_hash;
    let mut level = path.leaf.level;
    for sibling in &path.pruned_siblings {
        if level == 0 {
            return Err(VerifyError::BadAuthPath);
        }
        level -= 1;
        acc = if bit_at(&path.lookup_index, level as usize) {
            hashes::interior_hash(sibling, &acc)
        } else {
            hashes::interior_hash(&acc, sibling)
        };
    }
    if level != 0 || acc != *expected_root_hash {
        return Err(VerifyError::BadAuthPath);
    }

    // 5. For inclusion, the revealed value must match what the caller expects.
    if let LeafContent::Value { value: leaf_value, .. } = &path.leaf.content {
        if claims_inclusion && leaf_value.as_slice() != value {
            return Err(VerifyError::BindingsDiffer);
        }
    }

    Ok(())
}
