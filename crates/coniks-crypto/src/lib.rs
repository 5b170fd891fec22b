//! # CONIKS Crypto: Hash/Sign/VRF facade
//!
//! This crate is the only place in the workspace that imports raw
//! cryptographic primitives. Every other crate goes through the three
//! capability sets defined here:
//!
//! - [`hash`]: a fixed-output 256-bit digest over concatenated byte strings.
//! - [`signature`]: Ed25519 signing and verification.
//! - [`vrf`]: an Elligator-based verifiable random function over the
//!   Ristretto group, producing the pseudorandom per-name tree index.
//!
//! None of the three hold any tree, STR, or directory state — they are
//! stateless functions over keys and messages.

#![forbid(unsafe_code)]

mod error;
pub mod hash;
pub mod signature;
pub mod vrf;

pub use error::CryptoError;
pub use hash::digest;
pub use signature::{SigningKeyPair, ED25519_PUBLIC_KEY_LEN, ED25519_SIGNATURE_LEN};
pub use vrf::{VrfKeyPair, VrfProof, VRF_PROOF_LEN};

/// Result type for fallible crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
