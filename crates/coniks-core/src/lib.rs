//! # CONIKS Core - Foundation
//!
//! Shared types that every other CONIKS crate builds on: the unified error
//! type, the epoch counter, and the 32-byte digest alias used throughout the
//! prefix tree, the STR chain, and the wire protocol.
//!
//! This crate has zero dependencies on other CONIKS crates.

#![forbid(unsafe_code)]

mod digest;
mod epoch;
mod error;

pub use digest::Digest32;
pub use epoch::Epoch;
pub use error::{ConiksError, Result};
