//! The persistent authenticated dictionary itself (spec.md §4.4).
//!
//! ## Lock usage
//!
//! A single `parking_lot::RwLock<PadState>` guards the live tree and the
//! snapshot ring. `Set` and `Update` take the writer lock (spec.md §5:
//! "Register and Update acquire the writer lock"). `Lookup`,
//! `LookupInEpoch`, and `GetSTR` are documented by spec.md as reader
//! operations, but `coniks_tree::PrefixTree::lookup` lazily memoizes
//! interior-node hashes as it walks, which needs `&mut PrefixTree` — so
//! this implementation takes the writer lock for those too. This is a
//! deliberate simplification (recorded in DESIGN.md): it preserves every
//! correctness property spec.md §5 requires (writes are serialized, reads
//! within an epoch see a consistent tree) at the cost of the throughput a
//! true multi-reader path would give concurrent lookups. The lock is never
//! held across an `.await`; every method here is synchronous.

use std::collections::{HashMap, VecDeque};

use coniks_core::{ConiksError, Digest32, Epoch, Result};
use coniks_crypto::{SigningKeyPair, VrfKeyPair};
use coniks_str::{Policies, SignedTreeRoot, TemporaryBinding};
use coniks_tree::{AuthenticationPath, PrefixTree};
use parking_lot::RwLock;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::snapshot::Snapshot;

struct PadState {
    tree: PrefixTree,
    current_epoch: Epoch,
    policies: Policies,
    latest_str: SignedTreeRoot,
    snapshots: HashMap<Epoch, Snapshot>,
    epoch_order: VecDeque<Epoch>,
    rng: ChaCha20Rng,
}

/// Owns the mutable tree and publishes the STR chain, bounded to `capacity`
/// live epochs (spec.md §4.4).
pub struct Pad {
    vrf_key: VrfKeyPair,
    sign_key: SigningKeyPair,
    capacity: usize,
    state: RwLock<PadState>,
}

impl Pad {
    /// `New(policies, signKey, vrfKey, capacity L)`: creates an empty tree
    /// and immediately publishes the epoch-0 STR.
    pub fn new<R: RngCore + CryptoRng>(
        policies: Policies,
        sign_key: SigningKeyPair,
        vrf_key: VrfKeyPair,
        capacity: usize,
        rng: &mut R,
    ) -> Self {
        let mut directory_identity = [0u8; 32];
        rng.fill_bytes(&mut directory_identity);
        let mut tree_nonce = [0u8; 32];
        rng.fill_bytes(&mut tree_nonce);
        let mut salt_seed = [0u8; 32];
        rng.fill_bytes(&mut salt_seed);

        let mut tree = PrefixTree::new(tree_nonce);
        let tree_hash = tree.recompute_hash();
        let genesis = SignedTreeRoot::genesis(tree_hash, directory_identity, policies.clone(), &sign_key);

        let mut snapshots = HashMap::new();
        snapshots.insert(Epoch::GENESIS, Snapshot { str: genesis.clone(), tree: tree.clone() });
        let mut epoch_order = VecDeque::new();
        epoch_order.push_back(Epoch::GENESIS);

        let state = PadState {
            tree,
            current_epoch: Epoch::GENESIS,
            policies,
            latest_str: genesis,
            snapshots,
            epoch_order,
            rng: ChaCha20Rng::from_seed(salt_seed),
        };

        Self { vrf_key, sign_key, capacity, state: RwLock::new(state) }
    }

    #[must_use]
    pub fn vrf_public_key(&self) -> [u8; 32] {
        self.vrf_key.public_key()
    }

    #[must_use]
    pub fn sign_public_key(&self) -> [u8; 32] {
        self.sign_key.public_key()
    }

    #[must_use]
    pub fn current_epoch(&self) -> Epoch {
        self.state.read().current_epoch
    }

    #[must_use]
    pub fn epoch_deadline_secs(&self) -> u64 {
        self.state.read().policies.epoch_deadline_secs
    }

    #[must_use]
    pub fn policies(&self) -> Policies {
        self.state.read().policies.clone()
    }

    /// `Set(name, value)`: delegates to the mutable tree, sampling a fresh
    /// per-leaf salt. Returns the VRF index the name was inserted at.
    pub fn set(&self, name: &str, value: Vec<u8>) -> Digest32 {
        let (index, _proof) = self.vrf_key.prove(name.as_bytes());
        let mut state = self.state.write();
        let mut salt = [0u8; 32];
        state.rng.fill_bytes(&mut salt);
        state.tree.set(name, value, *index.as_bytes(), salt);
        index
    }

    /// `Lookup(name)`: an authentication path from the current mutable
    /// tree, attached to the latest STR.
    pub fn lookup(&self, name: &str) -> (AuthenticationPath, SignedTreeRoot) {
        let (index, proof) = self.vrf_key.prove(name.as_bytes());
        let mut state = self.state.write();
        let path = state.tree.lookup(name, *index.as_bytes(), proof);
        (path, state.latest_str.clone())
    }

    /// `LookupInEpoch(name, e)`: look up against a frozen snapshot; *snapshot-not-found*
    /// if `e` was evicted or never existed.
    pub fn lookup_in_epoch(&self, name: &str, epoch: Epoch) -> Result<(AuthenticationPath, SignedTreeRoot)> {
        let (index, proof) = self.vrf_key.prove(name.as_bytes());
        let mut state = self.state.write();
        let snapshot = state
            .snapshots
            .get_mut(&epoch)
            .ok_or_else(|| ConiksError::not_found(format!("epoch {epoch} has been evicted or does not exist")))?;
        let path = snapshot.tree.lookup(name, *index.as_bytes(), proof);
        Ok((path, snapshot.str.clone()))
    }

    /// `GetSTR(e)`: the STR for `e`, or the latest STR if `e >= current_epoch`.
    /// *snapshot-not-found* if `e` is older than the evicted window.
    pub fn get_str(&self, epoch: Epoch) -> Result<SignedTreeRoot> {
        let state = self.state.read();
        if epoch >= state.current_epoch {
            return Ok(state.latest_str.clone());
        }
        state
            .snapshots
            .get(&epoch)
            .map(|s| s.str.clone())
            .ok_or_else(|| ConiksError::not_found(format!("epoch {epoch} has been evicted")))
    }

    /// The STR slice `[start, end]`, clamping `end` to the latest epoch
    /// (spec.md §4.5 `GetSTRHistory`).
    pub fn str_history(&self, start: Epoch, end: Epoch) -> Result<Vec<SignedTreeRoot>> {
        let state = self.state.read();
        if start > state.current_epoch || end < start {
            return Err(ConiksError::invalid("invalid STR history range"));
        }
        let end = end.min(state.current_epoch);
        let mut out = Vec::new();
        let mut e = start;
        loop {
            if e == state.current_epoch {
                out.push(state.latest_str.clone());
            } else {
                let snapshot = state
                    .snapshots
                    .get(&e)
                    .ok_or_else(|| ConiksError::not_found(format!("epoch {e} has been evicted")))?;
                out.push(snapshot.str.clone());
            }
            if e == end {
                break;
            }
            e = e.next();
        }
        Ok(out)
    }

    /// `Sign(prevSig, index, value)`: build a TB promising `index -> value`.
    #[must_use]
    pub fn sign_temporary_binding(&self, index: Digest32, value: Vec<u8>) -> TemporaryBinding {
        let previous_str_signature = self.state.read().latest_str.signature;
        TemporaryBinding::issue(&previous_str_signature, index, value, &self.sign_key)
    }

    /// `Update(new_policies?)`: recompute, clone, build the next STR, insert
    /// into the snapshot ring, and evict if at capacity.
    pub fn update(&self, new_policies: Option<Policies>) -> SignedTreeRoot {
        let mut state = self.state.write();

        let tree_hash = state.tree.recompute_hash();
        let frozen = state.tree.clone();
        let policies = new_policies.unwrap_or_else(|| state.policies.clone());
        let next_str = SignedTreeRoot::next(&state.latest_str, tree_hash, policies.clone(), &self.sign_key);
        let next_epoch = next_str.epoch;

        // Evict before inserting so the ring never holds more than
        // `capacity` entries even transiently (verified against spec.md §8
        // scenario S7).
        if state.snapshots.len() == self.capacity {
            let evict_count = self.capacity / 2;
            for _ in 0..evict_count {
                if let Some(evicted) = state.epoch_order.pop_front() {
                    state.snapshots.remove(&evicted);
                }
            }
        }

        state.snapshots.insert(next_epoch, Snapshot { str: next_str.clone(), tree: frozen });
        state.epoch_order.push_back(next_epoch);
        state.current_epoch = next_epoch;
        state.policies = policies;
        state.latest_str = next_str.clone();

        tracing::debug!(epoch = next_epoch.get(), "published new STR");
        next_str
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng as _;

    fn new_pad(capacity: usize) -> Pad {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let sign_key = SigningKeyPair::generate(&mut rng);
        let vrf_key = VrfKeyPair::generate(&mut rng);
        let policies = Policies::new(3600, vrf_key.public_key());
        Pad::new(policies, sign_key, vrf_key, capacity, &mut rng)
    }

    #[test]
    fn lookup_after_set_verifies_inclusion() {
        let pad = new_pad(100);
        pad.set("alice", b"k1".to_vec());
        let (path, str0) = pad.lookup("alice");
        coniks_tree::verify(&path, "alice", b"k1", &pad.vrf_public_key(), &str0.tree_hash).unwrap();
    }

    /// Seed scenario S7 (spec.md §8): capacity 4, after 5 updates the oldest
    /// 2 snapshots are evicted and the 3 most recent still resolve.
    #[test]
    fn s7_history_window_evicts_oldest_half() {
        let pad = new_pad(4);
        for i in 0..5 {
            pad.set(&format!("user{i}"), b"v".to_vec());
            pad.update(None);
        }
        // Epochs 0 and 1 were evicted by the time epoch 4 gets inserted.
        assert!(pad.lookup_in_epoch("user0", Epoch::new(0)).is_err());
        assert!(pad.lookup_in_epoch("user0", Epoch::new(1)).is_err());
        assert!(pad.get_str(Epoch::new(0)).is_err());

        for e in [3u64, 4, 5] {
            assert!(pad.get_str(Epoch::new(e)).is_ok());
        }
    }

    #[test]
    fn update_advances_epoch_and_chains_strs() {
        let pad = new_pad(100);
        let str0 = pad.get_str(Epoch::GENESIS).unwrap();
        let str1 = pad.update(None);
        SignedTreeRoot::verify_hash_chain(&str0, &str1).unwrap();
        assert_eq!(pad.current_epoch(), Epoch::new(1));
    }
}
