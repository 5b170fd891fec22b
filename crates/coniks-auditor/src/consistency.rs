//! `ConsistencyChecks`: the client/auditor-side state machine that validates
//! every `Directory` response and tracks outstanding temporary bindings
//! (spec.md §4.6).

use std::collections::HashMap;

use coniks_core::Digest32;
use coniks_directory::wire::{DirectoryProof, ErrorCode};
use coniks_str::{SignedTreeRoot, TemporaryBinding};
use coniks_tree::LeafContent;
use parking_lot::RwLock;

use crate::error::ConsistencyError;

/// Which request a [`ConsistencyChecks::handle_response`] call is validating.
/// Only `Register`/`KeyLookup` carry per-type consistency rules (spec.md
/// §4.6 step 3) — `KeyLookupInEpoch`/`Monitor`/`GetSTRHistory` responses are
/// validated through [`ConsistencyChecks::audit_directory`] plus a bare
/// `verify` per path, since they don't interact with outstanding TBs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Register,
    KeyLookup,
}

struct State {
    verified_str: SignedTreeRoot,
    outstanding_tbs: HashMap<String, TemporaryBinding>,
    cache: HashMap<String, Vec<u8>>,
}

/// Pins a server signing key and a trusted STR, then validates every
/// [`DirectoryProof`] fed to it via [`Self::handle_response`] (spec.md §4.6
/// state: "pinned `signKey`, `verifiedSTR`, `useTBs` flag, `name → TB` map,
/// `name → value` cache" — `useTBs` is always `true` here, per spec.md's own
/// resolution of that open question).
pub struct ConsistencyChecks {
    sign_public_key: [u8; 32],
    state: RwLock<State>,
}

impl ConsistencyChecks {
    /// Pin `genesis_str` out-of-band, as spec.md §4.6 requires ("the latest
    /// *verified* STR, pinned initially from out-of-band config").
    #[must_use]
    pub fn new(sign_public_key: [u8; 32], genesis_str: SignedTreeRoot) -> Self {
        Self {
            sign_public_key,
            state: RwLock::new(State { verified_str: genesis_str, outstanding_tbs: HashMap::new(), cache: HashMap::new() }),
        }
    }

    #[must_use]
    pub fn verified_str(&self) -> SignedTreeRoot {
        self.state.read().verified_str.clone()
    }

    #[must_use]
    pub fn cached_value(&self, name: &str) -> Option<Vec<u8>> {
        self.state.read().cache.get(name).cloned()
    }

    /// `CheckSTRAgainstVerified(str)` (spec.md §4.6). Never mutates the
    /// pinned STR — callers that want the spec's "always update the pinned
    /// STR" behavior do so explicitly (see [`Self::handle_response`] step 2).
    pub fn check_str_against_verified(&self, str: &SignedTreeRoot) -> Result<(), ConsistencyError> {
        let verified = self.state.read().verified_str.clone();
        if str.epoch == verified.epoch {
            if str != &verified {
                return Err(ConsistencyError::BadStr);
            }
            Ok(())
        } else if str.epoch == verified.epoch.next() {
            str.verify_signature(&self.sign_public_key)?;
            SignedTreeRoot::verify_hash_chain(&verified, str)?;
            Ok(())
        } else {
            Err(ConsistencyError::BadStr)
        }
    }

    /// `VerifySTRRange(prev, [str_1, …, str_k])` (spec.md §4.6).
    pub fn verify_str_range(&self, prev: &SignedTreeRoot, strs: &[SignedTreeRoot]) -> Result<(), ConsistencyError> {
        let mut previous = prev.clone();
        for cur in strs {
            cur.verify_signature(&self.sign_public_key)?;
            SignedTreeRoot::verify_hash_chain(&previous, cur)?;
            previous = cur.clone();
        }
        Ok(())
    }

    /// `AuditDirectory(strs)` (spec.md §4.6): `CheckSTRAgainstVerified(strs[0])`
    /// then `VerifySTRRange(strs[0], strs[1:])`. Pure — does not touch the
    /// pinned STR.
    pub fn audit_directory(&self, strs: &[SignedTreeRoot]) -> Result<(), ConsistencyError> {
        let (first, rest) = strs.split_first().ok_or(ConsistencyError::Malformed)?;
        self.check_str_against_verified(first)?;
        self.verify_str_range(first, rest)
    }

    /// `CheckEquivocation(auditor_response)` (spec.md §4.6): treat `strs` as
    /// an STR-only response, verify the range among themselves, then run
    /// `CheckSTRAgainstVerified` on the last one. A `BadStr` here is the
    /// equivocation signal: the auditor observed a different STR for an
    /// epoch we already pinned.
    pub fn check_equivocation(&self, strs: &[SignedTreeRoot]) -> Result<(), ConsistencyError> {
        let (first, rest) = strs.split_first().ok_or(ConsistencyError::Malformed)?;
        self.verify_str_range(first, rest)?;
        let last = strs.last().ok_or(ConsistencyError::Malformed)?;
        self.check_str_against_verified(last)
    }

    /// `HandleResponse(reqType, resp, name, expected_value)` (spec.md §4.6,
    /// six steps). `expected_value` is `None` when the caller has no prior
    /// claim about the binding (e.g. a first-ever lookup); in that case step
    /// 4's bindings-match check is skipped by treating the leaf's own
    /// revealed value as "expected".
    pub fn handle_response(
        &self,
        request_kind: RequestKind,
        error: ErrorCode,
        proof: &DirectoryProof,
        name: &str,
        expected_value: Option<&[u8]>,
    ) -> Result<(), ConsistencyError> {
        // 1. Shape validation: exactly one AP, at least one STR.
        if proof.ap.len() != 1 || proof.str.is_empty() {
            return Err(ConsistencyError::Malformed);
        }
        let ap = &proof.ap[0];
        let is_inclusion = matches!(ap.leaf.content, LeafContent::Value { .. }) && ap.leaf.index == ap.lookup_index;

        // 2. Audit the embedded STR(s); the pinned STR advances to the
        //    newest returned STR even if the audit itself fails.
        let audit_result = self.audit_directory(&proof.str);
        let latest_str = proof.str.last().expect("checked non-empty above").clone();
        self.state.write().verified_str = latest_str.clone();
        audit_result?;

        // 3. Per-type consistency between the error code and the proof kind.
        let shape_ok = match request_kind {
            RequestKind::Register => matches!(
                (error, is_inclusion),
                (ErrorCode::Success, false) | (ErrorCode::NameExisted, true) | (ErrorCode::NameExisted, false)
            ),
            RequestKind::KeyLookup => matches!(
                (error, is_inclusion),
                (ErrorCode::NameNotFound, false) | (ErrorCode::Success, true) | (ErrorCode::Success, false)
            ),
        };
        if !shape_ok {
            return Err(ConsistencyError::Malformed);
        }

        // 4. verifyAuthPath against the current STR's tree hash.
        let verify_value: Vec<u8> = match (&ap.leaf.content, expected_value) {
            (_, Some(v)) => v.to_vec(),
            (LeafContent::Value { value, .. }, None) => value.clone(),
            (_, None) => Vec::new(),
        };
        coniks_tree::verify(ap, name, &verify_value, &latest_str.policies.vrf_public_key, &latest_str.tree_hash)?;

        // 5. TB handling (`useTBs` is always on).
        let mut state = self.state.write();
        match (request_kind, is_inclusion) {
            (RequestKind::Register, false) => {
                let tb = proof.tb.as_ref().ok_or(ConsistencyError::BadPromise)?;
                tb.verify(&latest_str.signature, &self.sign_public_key)?;
                if tb.index != Digest32::from_bytes(ap.lookup_index) {
                    return Err(ConsistencyError::BadPromise);
                }
                if let Some(expected) = expected_value {
                    if tb.value != expected {
                        return Err(ConsistencyError::BadPromise);
                    }
                }
                state.outstanding_tbs.insert(name.to_string(), tb.clone());
            }
            (RequestKind::KeyLookup, true) => {
                if let Some(tb) = state.outstanding_tbs.remove(name) {
                    let leaf_value = match &ap.leaf.content {
                        LeafContent::Value { value, .. } => value.clone(),
                        _ => unreachable!("is_inclusion implies LeafContent::Value"),
                    };
                    if tb.index != Digest32::from_bytes(ap.lookup_index) || tb.value != leaf_value {
                        return Err(ConsistencyError::BrokenPromise);
                    }
                }
            }
            (RequestKind::KeyLookup, false) if error == ErrorCode::Success => {
                let tb = proof.tb.as_ref().ok_or(ConsistencyError::BadPromise)?;
                tb.verify(&latest_str.signature, &self.sign_public_key)?;
                state.outstanding_tbs.insert(name.to_string(), tb.clone());
            }
            _ => {}
        }

        // 6. Update the cached name → value mapping and the pinned STR (the
        //    latter already happened in step 2). A confirmed inclusion whose
        //    value disagrees with a previously cached value for the same
        //    name is a binding the cache never authorized — this design has
        //    no key-change flow, so that's reported rather than overwritten.
        if let LeafContent::Value { value, .. } = &ap.leaf.content {
            if is_inclusion {
                if let Some(old) = state.cache.get(name) {
                    if old != value {
                        return Err(ConsistencyError::BadMapping);
                    }
                }
                state.cache.insert(name.to_string(), value.clone());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coniks_crypto::{SigningKeyPair, VrfKeyPair};
    use coniks_directory::Directory;
    use coniks_pad::Pad;
    use coniks_str::Policies;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn new_directory(seed: u64) -> (Directory, SigningKeyPair) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let sign_key = SigningKeyPair::generate(&mut rng);
        let sign_key_for_caller = SigningKeyPair::from_seed(&sign_key.seed());
        let vrf_key = VrfKeyPair::generate(&mut rng);
        let policies = Policies::new(3600, vrf_key.public_key());
        let pad = Pad::new(policies, sign_key, vrf_key, 100, &mut rng);
        (Directory::new(pad), sign_key_for_caller)
    }

    #[test]
    fn register_then_lookup_round_trip_through_handle_response() {
        let (dir, sign_key) = new_directory(30);
        let genesis = dir.pad().get_str(coniks_core::Epoch::GENESIS).unwrap();
        let checks = ConsistencyChecks::new(sign_key.public_key(), genesis);

        let (err, proof) = dir.register("alice", b"k1".to_vec());
        checks.handle_response(RequestKind::Register, err, &proof, "alice", Some(b"k1")).unwrap();
        assert!(checks.cached_value("alice").is_none());

        dir.update();

        let (err, proof) = dir.key_lookup("alice");
        checks.handle_response(RequestKind::KeyLookup, err, &proof, "alice", Some(b"k1")).unwrap();
        assert_eq!(checks.cached_value("alice"), Some(b"k1".to_vec()));
    }

    /// A TB whose signature is tampered with fails the signature check
    /// before any value comparison happens.
    #[test]
    fn tampered_tb_fails_signature_check() {
        let (dir, sign_key) = new_directory(31);
        let genesis = dir.pad().get_str(coniks_core::Epoch::GENESIS).unwrap();
        let checks = ConsistencyChecks::new(sign_key.public_key(), genesis);

        let (err, mut proof) = dir.register("bob", b"k1".to_vec());
        if let Some(tb) = proof.tb.as_mut() {
            tb.value = b"different".to_vec();
        }
        let result = checks.handle_response(RequestKind::Register, err, &proof, "bob", Some(b"different"));
        assert_eq!(result, Err(ConsistencyError::BadSignature));
    }

    /// A server that promises one value via a TB and then snapshots a
    /// different one is caught at the next `KeyLookup` as a broken promise
    /// (spec.md §4.6 step 5), independent of `Directory`'s own dedup logic —
    /// built directly against `Pad` to simulate a misbehaving server.
    #[test]
    fn broken_promise_is_detected() {
        let mut rng = ChaCha20Rng::seed_from_u64(40);
        let sign_key = SigningKeyPair::generate(&mut rng);
        let sign_key_for_caller = SigningKeyPair::from_seed(&sign_key.seed());
        let vrf_key = VrfKeyPair::generate(&mut rng);
        let policies = Policies::new(3600, vrf_key.public_key());
        let pad = Pad::new(policies, sign_key, vrf_key, 100, &mut rng);

        let genesis = pad.get_str(coniks_core::Epoch::GENESIS).unwrap();
        let checks = ConsistencyChecks::new(sign_key_for_caller.public_key(), genesis);

        let (absence_ap, str_before) = pad.lookup("eve");
        let tb = pad.sign_temporary_binding(Digest32::from_bytes(absence_ap.lookup_index), b"k1".to_vec());
        let register_proof = DirectoryProof { ap: vec![absence_ap], str: vec![str_before], tb: Some(tb) };
        checks
            .handle_response(RequestKind::Register, ErrorCode::Success, &register_proof, "eve", Some(b"k1"))
            .unwrap();

        // The server actually commits "k2", not the "k1" it promised.
        pad.set("eve", b"k2".to_vec());
        let str_after = pad.update(None);
        let (inclusion_ap, _) = pad.lookup("eve");
        let lookup_proof = DirectoryProof { ap: vec![inclusion_ap], str: vec![str_after], tb: None };

        let result = checks.handle_response(RequestKind::KeyLookup, ErrorCode::Success, &lookup_proof, "eve", None);
        assert_eq!(result, Err(ConsistencyError::BrokenPromise));
    }

    /// Seed scenario S6 (spec.md §8) at the auditor layer: two STRs for the
    /// same epoch with different signatures are flagged as equivocation.
    #[test]
    fn s6_equivocating_str_is_detected() {
        let (dir, sign_key) = new_directory(32);
        let genesis = dir.pad().get_str(coniks_core::Epoch::GENESIS).unwrap();
        let checks = ConsistencyChecks::new(sign_key.public_key(), genesis.clone());

        dir.register("carol", b"k1".to_vec());
        let real_next = dir.update();
        checks.check_str_against_verified(&real_next).unwrap();

        // A second, equally well-signed epoch-1 STR branching from the same
        // genesis but committing to a different tree: the server equivocated.
        let forged = coniks_str::SignedTreeRoot::next(&genesis, Digest32::from_bytes([9u8; 32]), real_next.policies.clone(), &sign_key);

        let pinned = ConsistencyChecks::new(sign_key.public_key(), real_next);
        assert_eq!(pinned.check_equivocation(&[forged]), Err(ConsistencyError::BadStr));
    }

    #[test]
    fn malformed_shape_is_rejected() {
        let (dir, sign_key) = new_directory(33);
        let genesis = dir.pad().get_str(coniks_core::Epoch::GENESIS).unwrap();
        let checks = ConsistencyChecks::new(sign_key.public_key(), genesis);

        let (err, mut proof) = dir.register("dana", b"k1".to_vec());
        proof.ap.push(proof.ap[0].clone());
        assert_eq!(
            checks.handle_response(RequestKind::Register, err, &proof, "dana", Some(b"k1")),
            Err(ConsistencyError::Malformed)
        );
    }
}
