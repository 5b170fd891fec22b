//! Ed25519 signatures over arbitrary byte strings.
//!
//! Deterministic by construction (RFC 8032 Ed25519 signing is itself
//! deterministic), matching spec §4.1's preference for reproducible
//! signatures in tests.

use crate::{CryptoError, Result};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length in bytes of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_LEN: usize = 32;
/// Length in bytes of an Ed25519 signature.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// An Ed25519 keypair used for signing STRs and temporary bindings.
///
/// Zeroized on drop (`ed25519-dalek`'s `zeroize` feature), matching the
/// teacher's key-material hygiene in `aura-core::crypto::single_signer`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningKeyPair {
    signing_key: SigningKey,
}

impl SigningKeyPair {
    /// Generate a fresh keypair from a cryptographically secure RNG.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    /// Reconstruct a keypair from a 32-byte seed (e.g. loaded from a key file).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte seed for persistence.
    #[must_use]
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The public verifying key, serialized to 32 bytes.
    #[must_use]
    pub fn public_key(&self) -> [u8; ED25519_PUBLIC_KEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message, producing a 64-byte signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; ED25519_SIGNATURE_LEN] {
        self.signing_key.sign(message).to_bytes()
    }
}

/// Verify a signature against a message and a public key.
///
/// Returns `Ok(())` on success, `Err(CryptoError::BadSignature)` otherwise
/// (including malformed key/signature bytes — spec treats both as proof
/// failure, not a distinct error).
pub fn verify(
    public_key: &[u8; ED25519_PUBLIC_KEY_LEN],
    message: &[u8],
    signature: &[u8; ED25519_SIGNATURE_LEN],
) -> Result<()> {
    let vk = VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::BadSignature)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    vk.verify(message, &sig).map_err(|_| CryptoError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn test_rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let keys = SigningKeyPair::generate(&mut test_rng());
        let sig = keys.sign(b"hello epoch 0");
        assert!(verify(&keys.public_key(), b"hello epoch 0", &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails() {
        let keys = SigningKeyPair::generate(&mut test_rng());
        let sig = keys.sign(b"original");
        assert!(verify(&keys.public_key(), b"tampered", &sig).is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let keys = SigningKeyPair::generate(&mut test_rng());
        let other = SigningKeyPair::generate(&mut test_rng());
        let sig = keys.sign(b"message");
        assert!(verify(&other.public_key(), b"message", &sig).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let keys = SigningKeyPair::from_seed(&[9u8; 32]);
        assert_eq!(keys.sign(b"msg"), keys.sign(b"msg"));
    }
}
