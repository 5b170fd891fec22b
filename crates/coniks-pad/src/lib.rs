//! # CONIKS PAD
//!
//! The persistent authenticated dictionary: owns the mutable prefix tree,
//! publishes the STR chain, and keeps a bounded ring of frozen epoch
//! snapshots for history lookups (spec.md §4.4).

#![forbid(unsafe_code)]

mod pad;
mod snapshot;

pub use pad::Pad;
