//! # CONIKS Tree
//!
//! The Merkle prefix tree keyed by VRF indices: insertion, hash
//! recomputation, lookup with authentication paths, and path verification.
//!
//! This crate knows nothing about epochs, STRs, or the VRF secret key — it
//! takes precomputed `(index, proof)` pairs from `coniks-crypto` and deals
//! purely in tree structure.

#![forbid(unsafe_code)]

mod bits;
mod hashes;
mod node;
mod path;
mod tree;

pub use hashes::commitment;
pub use node::NodeId;
pub use path::{verify, AuthenticationPath, LeafContent, LeafEntry, VerifyError};
pub use tree::PrefixTree;
