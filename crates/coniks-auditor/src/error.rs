//! The consistency-check error plane (spec.md §7). Never sent on the wire;
//! surfaced only to the caller of `HandleResponse`/`AuditDirectory`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("response does not match the shape expected for its request type")]
    Malformed,
    #[error("signature does not verify under the pinned server key")]
    BadSignature,
    #[error("STR is inconsistent with the pinned verified STR or its hash chain")]
    BadStr,
    #[error("VRF proof does not attest to the claimed index")]
    BadVrfProof,
    #[error("leaf shape does not match its claimed inclusion/absence kind")]
    BadCommitment,
    #[error("leaf index is inconsistent with the lookup index")]
    BadLookupIndex,
    #[error("sibling hashes do not fold up to the expected root")]
    BadAuthPath,
    #[error("included value does not match the value being checked")]
    BindingsDiffer,
    #[error("temporary binding does not verify")]
    BadPromise,
    #[error("server included a different value than its temporary binding promised")]
    BrokenPromise,
    #[error("returned binding conflicts with a previously cached value for this name")]
    BadMapping,
}

impl From<coniks_tree::VerifyError> for ConsistencyError {
    fn from(err: coniks_tree::VerifyError) -> Self {
        use coniks_tree::VerifyError as E;
        match err {
            E::BadVrfProof => Self::BadVrfProof,
            E::BadCommitment => Self::BadCommitment,
            E::BadLookupIndex => Self::BadLookupIndex,
            E::BadAuthPath => Self::BadAuthPath,
            E::BindingsDiffer => Self::BindingsDiffer,
        }
    }
}

impl From<coniks_str::StrError> for ConsistencyError {
    fn from(err: coniks_str::StrError) -> Self {
        use coniks_str::StrError as E;
        match err {
            E::BadSignature => Self::BadSignature,
            E::BadStr => Self::BadStr,
        }
    }
}
