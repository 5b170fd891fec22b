//! Temporary bindings: a server promise that a name→value registration
//! will appear in the next STR (spec.md §3, §4.4 `Sign`).

use coniks_core::Digest32;
use coniks_crypto::SigningKeyPair;
use serde::{Deserialize, Serialize};

use crate::error::StrError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryBinding {
    pub index: Digest32,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
    pub signature: [u8; 64],
}

impl TemporaryBinding {
    /// Sign `prevSig ‖ index ‖ value` (spec.md §4.4 `Sign`, §6's TB
    /// signature-input serialization contract).
    #[must_use]
    pub fn issue(previous_str_signature: &[u8; 64], index: Digest32, value: Vec<u8>, sign_key: &SigningKeyPair) -> Self {
        let message = Self::signed_message(previous_str_signature, &index, &value);
        let signature = sign_key.sign(&message);
        Self { index, value, signature }
    }

    fn signed_message(previous_str_signature: &[u8; 64], index: &Digest32, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + 32 + value.len());
        out.extend_from_slice(previous_str_signature);
        out.extend_from_slice(index.as_bytes());
        out.extend_from_slice(value);
        out
    }

    /// Verify the TB's signature against the STR signature it was issued
    /// over.
    pub fn verify(&self, previous_str_signature: &[u8; 64], public_key: &[u8; 32]) -> Result<(), StrError> {
        let message = Self::signed_message(previous_str_signature, &self.index, &self.value);
        coniks_crypto::signature::verify(public_key, &message, &self.signature).map_err(|_| StrError::BadSignature)
    }
}
