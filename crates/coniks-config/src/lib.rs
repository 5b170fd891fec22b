//! # CONIKS Config
//!
//! Layered configuration for a directory server: TOML file on disk, with
//! in-process defaults for everything the file omits.

#![forbid(unsafe_code)]

mod config;

pub use config::DirectoryConfig;
