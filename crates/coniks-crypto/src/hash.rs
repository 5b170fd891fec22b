//! Fixed-output 256-bit hash used throughout the prefix tree and STR chain.
//!
//! Per spec §4.1 the reference uses SHAKE128 truncated to 32 bytes; any
//! 256-bit fixed-output hash is acceptable provided the same choice is used
//! everywhere and serialized into the tree policies (see
//! `coniks-str::Policies::hash_id`).

use coniks_core::Digest32;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;

/// Identifier for the hash construction used by this build, serialized
/// verbatim into `Policies` so that a directory pins its hash choice per
/// epoch (spec §4.3).
pub const HASH_ID: &str = "shake128-32";

/// Hash the concatenation of `parts` down to a 32-byte digest.
///
/// Equivalent to `Digest(m1, m2, ...)` in spec §4.1: hashing
/// `m1 || m2 || ...` with no separators between parts. Callers that need
/// domain separation must include an explicit tag byte in `parts` (see the
/// `0x45`/`0x4C` tags in `coniks-tree`).
#[must_use]
pub fn digest(parts: &[&[u8]]) -> Digest32 {
    let mut hasher = Shake128::default();
    for part in parts {
        Update::update(&mut hasher, part);
    }
    let mut reader = hasher.finalize_xof();
    let mut out = [0u8; 32];
    reader.read(&mut out);
    Digest32::from_bytes(out)
}

/// Convenience wrapper for hashing a single byte string.
#[must_use]
pub fn digest1(m: &[u8]) -> Digest32 {
    digest(&[m])
}
