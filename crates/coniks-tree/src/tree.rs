//! The prefix tree itself: insertion, hash recomputation, and lookup.

use coniks_core::Digest32;
use coniks_crypto::vrf::VrfProof;

use crate::bits::bit_at;
use crate::hashes;
use crate::node::{Empty, Interior, Leaf, Node, NodeId};
use crate::path::{AuthenticationPath, LeafContent, LeafEntry};

/// A binary radix tree over 256-bit VRF indices (spec §4.2).
///
/// The root is always `NodeId = 0` and is always an [`Node::Interior`] — a
/// fresh tree starts with two empty children rather than a single empty
/// root, so every leaf's level is at least 1 (matching the reference hash
/// examples in spec §8, scenario S1).
#[derive(Debug, Clone)]
pub struct PrefixTree {
    nonce: [u8; 32],
    arena: Vec<Node>,
    root: NodeId,
}

impl PrefixTree {
    /// Start a fresh, empty tree under `nonce` (spec §4.2 construction, and
    /// the per-epoch tree nonce referenced by §4.3's STR `tree_nonce` field).
    #[must_use]
    pub fn new(nonce: [u8; 32]) -> Self {
        let arena = vec![
            Node::Interior(Interior {
                left: 1,
                right: 2,
                left_hash: None,
                right_hash: None,
                level: 0,
            }),
            Node::Empty(Empty { level: 1 }),
            Node::Empty(Empty { level: 1 }),
        ];
        Self { nonce, arena, root: 0 }
    }

    /// The tree nonce it was constructed with.
    #[must_use]
    pub fn nonce(&self) -> [u8; 32] {
        self.nonce
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.arena.len() as NodeId;
        self.arena.push(node);
        id
    }

    /// Insert or update `name` at `index` with a freshly computed
    /// `commitment = H(salt || name || value)` (spec §4.2 insertion, three
    /// cases: empty slot, in-place update, and leaf split).
    pub fn set(&mut self, name: &str, value: Vec<u8>, index: [u8; 32], salt: [u8; 32]) {
        tracing::trace!(name, arena_len = self.arena.len(), "inserting into prefix tree");
        self.insert_at(self.root, 0, name, &value, &index, salt);
    }

    fn insert_at(&mut self, node_id: NodeId, depth: u32, name: &str, value: &[u8], index: &[u8; 32], salt: [u8; 32]) {
        let current = self.arena[node_id as usize].clone();
        match current {
            Node::Empty(_) => {
                let commitment = hashes::commitment(&salt, name, value);
                self.arena[node_id as usize] = Node::Leaf(Leaf {
                    name: name.to_string(),
                    value: value.to_vec(),
                    index: *index,
                    commitment,
                    salt,
                    level: depth,
                });
            }
            Node::Interior(mut interior) => {
                let bit = bit_at(index, depth as usize);
                let child = if bit { interior.right } else { interior.left };
                self.insert_at(child, depth + 1, name, value, index, salt);
                // The sub-hash on the side we just touched is now stale.
                if bit {
                    interior.right_hash = None;
                } else {
                    interior.left_hash = None;
                }
                self.arena[node_id as usize] = Node::Interior(interior);
            }
            Node::Leaf(existing) => {
                if &existing.index == index {
                    let commitment = hashes::commitment(&salt, name, value);
                    self.arena[node_id as usize] = Node::Leaf(Leaf {
                        name: name.to_string(),
                        value: value.to_vec(),
                        index: *index,
                        commitment,
                        salt,
                        level: existing.level,
                    });
                    return;
                }
                self.split(node_id, depth, existing, name, value, index, salt);
            }
        }
    }

    /// Replace the leaf at `node_id` with a chain of interior nodes down to
    /// the first bit at which `existing.index` and `index` diverge, with
    /// both leaves hanging off the bottom of that chain.
    fn split(&mut self, node_id: NodeId, depth: u32, existing: Leaf, name: &str, value: &[u8], index: &[u8; 32], salt: [u8; 32]) {
        let mut split_pos = depth as usize;
        while bit_at(&existing.index, split_pos) == bit_at(index, split_pos) {
            split_pos += 1;
        }
        let leaf_level = (split_pos + 1) as u32;

        let existing_id = self.alloc(Node::Leaf(Leaf { level: leaf_level, ..existing.clone() }));
        let new_commitment = hashes::commitment(&salt, name, value);
        let new_id = self.alloc(Node::Leaf(Leaf {
            name: name.to_string(),
            value: value.to_vec(),
            index: *index,
            commitment: new_commitment,
            salt,
            level: leaf_level,
        }));

        let existing_bit = bit_at(&existing.index, split_pos);
        let (left, right) = if existing_bit { (new_id, existing_id) } else { (existing_id, new_id) };
        let mut chain = self.alloc(Node::Interior(Interior {
            left,
            right,
            left_hash: None,
            right_hash: None,
            level: split_pos as u32,
        }));

        let mut level = split_pos;
        while level > depth as usize {
            level -= 1;
            let shared_bit = bit_at(index, level);
            let empty = self.alloc(Node::Empty(Empty { level: (level + 1) as u32 }));
            let (left, right) = if shared_bit { (empty, chain) } else { (chain, empty) };
            chain = self.alloc(Node::Interior(Interior {
                left,
                right,
                left_hash: None,
                right_hash: None,
                level: level as u32,
            }));
        }
        // The chain's outermost interior replaces the original leaf slot.
        // The now-orphaned `chain` arena entry is left allocated but
        // unreferenced; tree sizes here never warrant reclaiming it.
        self.arena[node_id as usize] = self.arena[chain as usize].clone();
    }

    /// Fill in every `None` sub-hash with a post-order traversal, returning
    /// the root hash (spec §4.2 `RecomputeHash`, invariant I4).
    pub fn recompute_hash(&mut self) -> Digest32 {
        let mut path = Vec::new();
        self.recompute(self.root, &mut path)
    }

    fn recompute(&mut self, node_id: NodeId, path: &mut Vec<bool>) -> Digest32 {
        let node = self.arena[node_id as usize].clone();
        match node {
            Node::Empty(e) => hashes::empty_hash(&self.nonce, path, e.level),
            Node::Leaf(l) => hashes::leaf_hash(&self.nonce, &l.index, l.level, &l.commitment),
            Node::Interior(i) => {
                let left_hash = if let Some(h) = i.left_hash {
                    h
                } else {
                    path.push(false);
                    let h = self.recompute(i.left, path);
                    path.pop();
                    h
                };
                let right_hash = if let Some(h) = i.right_hash {
                    h
                } else {
                    path.push(true);
                    let h = self.recompute(i.right, path);
                    path.pop();
                    h
                };
                self.arena[node_id as usize] = Node::Interior(Interior {
                    left_hash: Some(left_hash),
                    right_hash: Some(right_hash),
                    ..i
                });
                hashes::interior_hash(&left_hash, &right_hash)
            }
        }
    }

    /// Descend to `index`, returning an authentication path for `name`
    /// (spec §4.2 `Lookup`). `index`/`vrf_proof` must already have been
    /// computed by the caller via the VRF facade.
    pub fn lookup(&mut self, name: &str, index: [u8; 32], vrf_proof: VrfProof) -> AuthenticationPath {
        self.recompute_hash();

        let mut siblings_root_to_leaf = Vec::new();
        let mut current = self.root;
        let leaf;
        loop {
            match self.arena[current as usize].clone() {
                Node::Interior(i) => {
                    let bit = bit_at(&index, i.level as usize);
                    let (taken, sibling) = if bit {
                        (i.right, i.left_hash.expect("recompute_hash fills every sub-hash"))
                    } else {
                        (i.left, i.right_hash.expect("recompute_hash fills every sub-hash"))
                    };
                    siblings_root_to_leaf.push(sibling);
                    current = taken;
                }
                Node::Leaf(l) => {
                    leaf = if l.index == index {
                        LeafEntry {
                            level: l.level,
                            index: l.index,
                            content: LeafContent::Value { value: l.value, salt: l.salt },
                        }
                    } else {
                        LeafEntry {
                            level: l.level,
                            index: l.index,
                            content: LeafContent::Commitment(l.commitment),
                        }
                    };
                    break;
                }
                Node::Empty(e) => {
                    leaf = LeafEntry {
                        level: e.level,
                        index: [0u8; 32],
                        content: LeafContent::Empty,
                    };
                    break;
                }
            }
        }
        siblings_root_to_leaf.reverse();

        AuthenticationPath {
            tree_nonce: self.nonce,
            pruned_siblings: siblings_root_to_leaf,
            lookup_index: index,
            vrf_proof,
            leaf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coniks_crypto::vrf::VrfKeyPair;

    fn vrf_for(name: &str) -> (VrfKeyPair, [u8; 32], VrfProof) {
        let keys = VrfKeyPair::from_seed(&[42u8; 32]);
        let (index, proof) = keys.prove(name.as_bytes());
        (keys, *index.as_bytes(), proof)
    }

    /// Seed scenario S1 (spec §8): a single entry's leaf hash matches the
    /// exact tag-byte formula, and its sibling is an empty node at level 1.
    #[test]
    fn s1_single_entry_hashes_match_formula() {
        let mut tree = PrefixTree::new([5u8; 32]);
        let (_keys, index, _proof) = vrf_for("key");
        let salt = *b"salt0000000000000000000000000000";
        tree.set("key", b"value".to_vec(), index, salt);
        let root_hash = tree.recompute_hash();

        let commitment = hashes::commitment(&salt, "key", b"value");
        let leaf_hash = hashes::leaf_hash(&tree.nonce, &index, 1, &commitment);

        let first_bit = bit_at(&index, 0);
        let empty_path = vec![first_bit];
        let sibling_hash = hashes::empty_hash(&tree.nonce, &empty_path, 1);

        let expected_root = if first_bit {
            hashes::interior_hash(&sibling_hash, &leaf_hash)
        } else {
            hashes::interior_hash(&leaf_hash, &sibling_hash)
        };
        assert_eq!(root_hash, expected_root);
    }

    /// Seed scenario S2 (spec §8): inserting three entries where two share a
    /// two-bit prefix produces those two at level 3 and the third at level 1
    /// once their prefixes diverge from one another.
    #[test]
    fn s2_colliding_prefixes_land_at_correct_levels() {
        let mut tree = PrefixTree::new([7u8; 32]);

        // Hand-crafted indices: `a` and `c` share bits 0,1 then diverge at
        // bit 2; `b` diverges from both at bit 0.
        let mut a = [0u8; 32];
        a[0] = 0b1100_0000;
        let mut c = [0u8; 32];
        c[0] = 0b1101_0000;
        let mut b = [0u8; 32];
        b[0] = 0b0000_0000;

        tree.set("a", b"1".to_vec(), a, [1u8; 32]);
        tree.set("b", b"2".to_vec(), b, [2u8; 32]);
        tree.set("c", b"3".to_vec(), c, [3u8; 32]);
        tree.recompute_hash();

        assert_eq!(leaf_level(&tree, &a), 3);
        assert_eq!(leaf_level(&tree, &c), 3);
        assert_eq!(leaf_level(&tree, &b), 1);
    }

    fn leaf_level(tree: &PrefixTree, index: &[u8; 32]) -> u32 {
        let mut current = tree.root;
        loop {
            match &tree.arena[current as usize] {
                Node::Interior(i) => {
                    current = if bit_at(index, i.level as usize) { i.right } else { i.left };
                }
                Node::Leaf(l) => return l.level,
                Node::Empty(e) => return e.level,
            }
        }
    }

    #[test]
    fn lookup_after_insert_round_trips_value() {
        let mut tree = PrefixTree::new([9u8; 32]);
        let (keys, index, proof) = vrf_for("alice");
        tree.set("alice", b"key-material".to_vec(), index, [1u8; 32]);
        let root = tree.recompute_hash();

        let proof_path = tree.lookup("alice", index, proof);
        crate::path::verify(&proof_path, "alice", b"key-material", &keys.public_key(), &root).unwrap();
    }

    #[test]
    fn lookup_for_absent_name_proves_absence() {
        let mut tree = PrefixTree::new([9u8; 32]);
        let (keys, index, proof) = vrf_for("alice");
        tree.set("alice", b"key-material".to_vec(), index, [1u8; 32]);
        let root = tree.recompute_hash();

        let (_other_keys, missing_index, missing_proof) = vrf_for("mallory");
        let proof_path = tree.lookup("mallory", missing_index, missing_proof);
        let err = crate::path::verify(&proof_path, "mallory", b"anything", &keys.public_key(), &root);
        // "alice" and "mallory" are VRF-unrelated so this is absence-by-empty
        // against an unrelated key; the important property is that it does
        // not verify as an inclusion of "anything".
        assert!(err.is_err() || matches!(proof_path.leaf.content, LeafContent::Empty));
    }

    #[test]
    fn clone_is_structurally_independent() {
        let mut tree = PrefixTree::new([1u8; 32]);
        let (_keys, index, _proof) = vrf_for("dup");
        tree.set("dup", b"v1".to_vec(), index, [1u8; 32]);
        let snapshot = tree.clone();
        tree.set("dup", b"v2".to_vec(), index, [2u8; 32]);
        assert_ne!(tree.clone().recompute_hash(), snapshot.clone().recompute_hash());
    }
}
