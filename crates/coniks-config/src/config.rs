//! Directory configuration: the on-disk knobs that sit outside the
//! cryptographic core (bind address, epoch cadence, snapshot capacity, key
//! file locations).

use std::path::{Path, PathBuf};

use coniks_core::ConiksError;
use serde::{Deserialize, Serialize};

fn default_bind_address() -> String {
    "127.0.0.1:6121".to_string()
}

fn default_epoch_deadline_secs() -> u64 {
    3600
}

fn default_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A directory server's configuration, loaded from TOML (spec.md §6's "JSON
/// is the reference" covers the wire format, not the config file — TOML is
/// this workspace's on-disk format throughout, per `aura-core::config`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// `host:port` the server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Seconds between epoch advances (`Policies.epoch_deadline_secs`).
    #[serde(default = "default_epoch_deadline_secs")]
    pub epoch_deadline_secs: u64,
    /// Snapshot-ring capacity `L` (spec.md §3, §4.4).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Path to the Ed25519 signing key seed.
    pub sign_key_path: PathBuf,
    /// Path to the VRF key seed.
    pub vrf_key_path: PathBuf,
    /// `tracing-subscriber` env-filter directive, e.g. `"info"` or
    /// `"coniks_pad=debug,info"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            epoch_deadline_secs: default_epoch_deadline_secs(),
            capacity: default_capacity(),
            sign_key_path: PathBuf::from("sign.key"),
            vrf_key_path: PathBuf::from("vrf.key"),
            log_level: default_log_level(),
        }
    }
}

impl DirectoryConfig {
    /// Load from a TOML file. Grounded on `aura-core::config::loader`'s
    /// `load_from_file`: missing file and parse failures are both reported
    /// through [`ConiksError`] rather than panicking.
    pub fn load(path: &Path) -> Result<Self, ConiksError> {
        if !path.exists() {
            return Err(ConiksError::not_found(format!("configuration file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-read the same file. Named distinctly from [`Self::load`] so a
    /// SIGHUP handler's intent reads clearly at the call site; the
    /// mechanics are identical (spec.md §5's "hot-reload of policies is a
    /// write" — the handler calls this, then pushes the result through
    /// `Directory::set_policies`).
    pub fn reload(path: &Path) -> Result<Self, ConiksError> {
        tracing::info!(path = %path.display(), "reloading directory configuration");
        Self::load(path)
    }

    fn validate(&self) -> Result<(), ConiksError> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConiksError::invalid(format!("bind_address is not a valid socket address: {}", self.bind_address)));
        }
        if self.epoch_deadline_secs == 0 {
            return Err(ConiksError::invalid("epoch_deadline_secs must be nonzero"));
        }
        if self.capacity == 0 {
            return Err(ConiksError::invalid("capacity must be nonzero"));
        }
        Ok(())
    }
}
