//! # CONIKS STR
//!
//! Per-epoch policies and signed tree roots: everything spec.md §4.3
//! describes, plus the temporary-binding signature scheme it shares a
//! signing key with.

#![forbid(unsafe_code)]

mod error;
mod policies;
mod str;
mod tb;

pub use error::StrError;
pub use policies::Policies;
pub use str::SignedTreeRoot;
pub use tb::TemporaryBinding;
