//! The three hash formulas that define tree node identity (spec §4.2).
//!
//! Leaf and empty-leaf hashes are domain-separated with a single tag byte so
//! that a leaf at some depth can never collide with an empty node at the
//! same depth, matching the original CONIKS construction.

use coniks_core::Digest32;

const TAG_LEAF: u8 = 0x4C; // 'L'
const TAG_EMPTY: u8 = 0x45; // 'E'

/// `H(0x4C ‖ nonce ‖ index ‖ level ‖ commitment)`.
#[must_use]
pub fn leaf_hash(nonce: &[u8; 32], index: &[u8; 32], level: u32, commitment: &Digest32) -> Digest32 {
    coniks_crypto::digest(&[
        &[TAG_LEAF],
        nonce,
        index,
        &level.to_le_bytes(),
        commitment.as_bytes(),
    ])
}

/// `H(0x45 ‖ nonce ‖ bits_to_bytes(path) ‖ level)`.
#[must_use]
pub fn empty_hash(nonce: &[u8; 32], path: &[bool], level: u32) -> Digest32 {
    let packed = crate::bits::bits_to_bytes(path);
    coniks_crypto::digest(&[&[TAG_EMPTY], nonce, &packed, &level.to_le_bytes()])
}

/// `H(left ‖ right)`.
#[must_use]
pub fn interior_hash(left: &Digest32, right: &Digest32) -> Digest32 {
    coniks_crypto::digest(&[left.as_bytes(), right.as_bytes()])
}

/// `commitment = H(salt ‖ name ‖ value)`.
#[must_use]
pub fn commitment(salt: &[u8; 32], name: &str, value: &[u8]) -> Digest32 {
    coniks_crypto::digest(&[salt, name.as_bytes(), value])
}
