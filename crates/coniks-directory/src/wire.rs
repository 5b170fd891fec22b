//! Request/response wire types (spec.md §6). Transport-agnostic; the
//! reference representation is JSON over whatever `coniks-server` frames it
//! with.

use coniks_core::Epoch;
use coniks_str::{SignedTreeRoot, TemporaryBinding};
use coniks_tree::AuthenticationPath;
use serde::{Deserialize, Serialize};

/// The five request operations, as an integer-tagged enum instead of
/// spec.md's bare `{type: u8, payload}` pair — this rules out a payload
/// that doesn't match its declared type at the type level rather than at
/// request-parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Request {
    #[serde(rename = "register")]
    Register { name: String, value: Vec<u8> },
    #[serde(rename = "key_lookup")]
    KeyLookup { name: String },
    #[serde(rename = "key_lookup_in_epoch")]
    KeyLookupInEpoch { name: String, epoch: Epoch },
    #[serde(rename = "monitor")]
    Monitor { name: String, start: Epoch, end: Epoch },
    #[serde(rename = "audit")]
    Audit { start: Epoch, end: Epoch },
    #[serde(rename = "str")]
    Str { epoch: Epoch },
}

/// Request-facing error plane (spec.md §7). Never used for
/// consistency-check failures — those live in `coniks_tree::VerifyError`
/// and `coniks_auditor::ConsistencyError` and never cross the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Success,
    NameExisted,
    NameNotFound,
    ErrMalformedMessage,
    ErrDirectory,
    ErrAuditLog,
}

/// Response to request types 0–3 (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryProof {
    pub ap: Vec<AuthenticationPath>,
    pub str: Vec<SignedTreeRoot>,
    pub tb: Option<TemporaryBinding>,
}

/// Response to request types 4–5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrHistoryRange {
    pub str: Vec<SignedTreeRoot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DirectoryResponsePayload {
    Proof(DirectoryProof),
    History(StrHistoryRange),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub error: ErrorCode,
    pub directory_response: Option<DirectoryResponsePayload>,
}
