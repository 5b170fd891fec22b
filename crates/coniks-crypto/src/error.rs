//! Crypto-facade error type.

/// Errors raised by the hash/sign/VRF facade.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CryptoError {
    /// A signature failed to verify.
    #[error("signature verification failed")]
    BadSignature,

    /// A VRF proof failed to verify.
    #[error("VRF proof verification failed")]
    BadVrfProof,

    /// Key material had the wrong length or was otherwise malformed.
    #[error("malformed key material: {message}")]
    MalformedKey {
        /// Description of what was malformed.
        message: String,
    },
}

impl CryptoError {
    /// Construct a malformed-key error.
    pub fn malformed_key(message: impl Into<String>) -> Self {
        Self::MalformedKey {
            message: message.into(),
        }
    }
}

impl From<CryptoError> for coniks_core::ConiksError {
    fn from(err: CryptoError) -> Self {
        coniks_core::ConiksError::crypto(err.to_string())
    }
}
