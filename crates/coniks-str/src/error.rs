use thiserror::Error;

/// Consistency-check errors produced while building or verifying an STR
/// chain (spec.md §7's consistency-check plane, the STR-related subset).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrError {
    #[error("STR signature does not verify under the pinned signing key")]
    BadSignature,
    #[error("STR fields are inconsistent with the claimed epoch or chain")]
    BadStr,
}
