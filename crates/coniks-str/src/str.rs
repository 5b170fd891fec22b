//! Signed tree roots: construction, signature pre-image, and hash-chain
//! verification (spec.md §4.3).

use coniks_core::{Digest32, Epoch};
use coniks_crypto::SigningKeyPair;
use serde::{Deserialize, Serialize};

use crate::error::StrError;
use crate::policies::Policies;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTreeRoot {
    pub epoch: Epoch,
    pub previous_epoch: Epoch,
    pub tree_hash: Digest32,
    pub previous_str_hash: Digest32,
    pub policies: Policies,
    pub signature: [u8; 64],
}

impl SignedTreeRoot {
    /// Publish epoch 0: `previous_str_hash` is the directory's identity,
    /// 32 bytes sampled once at directory creation (spec.md §3, §4.3).
    #[must_use]
    pub fn genesis(tree_hash: Digest32, directory_identity: [u8; 32], policies: Policies, sign_key: &SigningKeyPair) -> Self {
        Self::build(Epoch::GENESIS, Epoch::GENESIS, tree_hash, Digest32::from_bytes(directory_identity), policies, sign_key)
    }

    /// Build the STR that follows `previous` (spec.md §4.4 `Update`, step 3).
    #[must_use]
    pub fn next(previous: &SignedTreeRoot, tree_hash: Digest32, policies: Policies, sign_key: &SigningKeyPair) -> Self {
        let previous_str_hash = coniks_crypto::digest(&[&previous.signature]);
        Self::build(previous.epoch.next(), previous.epoch, tree_hash, previous_str_hash, policies, sign_key)
    }

    fn build(
        epoch: Epoch,
        previous_epoch: Epoch,
        tree_hash: Digest32,
        previous_str_hash: Digest32,
        policies: Policies,
        sign_key: &SigningKeyPair,
    ) -> Self {
        let pre_sig = Self::pre_sig_bytes(epoch, previous_epoch, &tree_hash, &previous_str_hash, &policies);
        let signature = sign_key.sign(&pre_sig);
        Self { epoch, previous_epoch, tree_hash, previous_str_hash, policies, signature }
    }

    /// `u64_le(epoch) ‖ u64_le(prev_epoch) ‖ tree_hash ‖ previous_str_hash ‖ policies.serialize()`.
    #[must_use]
    pub fn pre_sig_bytes(
        epoch: Epoch,
        previous_epoch: Epoch,
        tree_hash: &Digest32,
        previous_str_hash: &Digest32,
        policies: &Policies,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&epoch.get().to_le_bytes());
        out.extend_from_slice(&previous_epoch.get().to_le_bytes());
        out.extend_from_slice(tree_hash.as_bytes());
        out.extend_from_slice(previous_str_hash.as_bytes());
        out.extend(policies.serialize());
        out
    }

    /// Verify the STR's own signature under `public_key`.
    pub fn verify_signature(&self, public_key: &[u8; 32]) -> Result<(), StrError> {
        let pre_sig = Self::pre_sig_bytes(self.epoch, self.previous_epoch, &self.tree_hash, &self.previous_str_hash, &self.policies);
        coniks_crypto::signature::verify(public_key, &pre_sig, &self.signature).map_err(|_| StrError::BadSignature)
    }

    /// `VerifyHashChain(prev, cur)` (spec.md §4.3).
    pub fn verify_hash_chain(prev: &SignedTreeRoot, cur: &SignedTreeRoot) -> Result<(), StrError> {
        if cur.previous_epoch != prev.epoch || cur.epoch != prev.epoch.next() {
            return Err(StrError::BadStr);
        }
        let expected = coniks_crypto::digest(&[&prev.signature]);
        if cur.previous_str_hash != expected {
            return Err(StrError::BadStr);
        }
        Ok(())
    }
}
