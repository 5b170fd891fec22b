//! # CONIKS Auditor
//!
//! The client/auditor-side consistency-check state machine of spec.md §4.6:
//! validates every [`coniks_directory::wire::DirectoryProof`] a directory
//! returns, tracks outstanding temporary bindings, and detects server
//! equivocation.

#![forbid(unsafe_code)]

mod consistency;
mod error;

pub use consistency::{ConsistencyChecks, RequestKind};
pub use error::ConsistencyError;
