//! Unified error type for the CONIKS core.
//!
//! This is the error plane internal components raise among themselves (PAD
//! failures, malformed policies, I/O). It is distinct from the request-facing
//! `ErrorCode` in `coniks-directory` and the `ConsistencyError` in
//! `coniks-auditor` — see spec §7 for why the core keeps three error planes.

use serde::{Deserialize, Serialize};

/// Unified error type for CONIKS core operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum ConiksError {
    /// Invalid input or configuration.
    #[error("invalid: {message}")]
    Invalid {
        /// Description of what was invalid.
        message: String,
    },

    /// Requested resource (epoch, snapshot, name) not found.
    #[error("not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// Cryptographic operation failed (signature, VRF, hash mismatch).
    #[error("crypto error: {message}")]
    Crypto {
        /// Description of the cryptographic failure.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Internal invariant violation — a bug, not a caller error.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl ConiksError {
    /// Construct an invalid-input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Construct a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Construct a crypto error.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Construct a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Construct an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard result type for CONIKS core operations.
pub type Result<T> = std::result::Result<T, ConiksError>;

impl From<serde_json::Error> for ConiksError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ConiksError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for ConiksError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<hex::FromHexError> for ConiksError {
    fn from(err: hex::FromHexError) -> Self {
        Self::serialization(format!("hex decoding error: {err}"))
    }
}
