//! Frames one TCP connection as newline-delimited JSON requests/responses
//! (spec.md §6; SPEC_FULL.md §6 addendum picks this as the minimal
//! transport exercising the five request types).

use std::sync::Arc;

use coniks_directory::wire::{DirectoryResponsePayload, ErrorCode, Request, Response, StrHistoryRange};
use coniks_directory::Directory;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

pub async fn handle_connection(directory: Arc<Directory>, socket: TcpStream) {
    let peer = socket.peer_addr().map(|a| a.to_string()).unwrap_or_else(|_| "unknown".to_string());
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%peer, %error, "connection read error");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(&directory, request),
            Err(error) => {
                tracing::debug!(%peer, %error, "malformed request");
                Response { error: ErrorCode::ErrMalformedMessage, directory_response: None }
            }
        };

        let mut encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::error!(%peer, %error, "failed to encode response");
                break;
            }
        };
        encoded.push('\n');
        if write_half.write_all(encoded.as_bytes()).await.is_err() {
            break;
        }
    }
}

fn dispatch(directory: &Directory, request: Request) -> Response {
    match request {
        Request::Register { name, value } => {
            let (error, proof) = directory.register(&name, value);
            Response { error, directory_response: Some(DirectoryResponsePayload::Proof(proof)) }
        }
        Request::KeyLookup { name } => {
            let (error, proof) = directory.key_lookup(&name);
            Response { error, directory_response: Some(DirectoryResponsePayload::Proof(proof)) }
        }
        Request::KeyLookupInEpoch { name, epoch } => match directory.key_lookup_in_epoch(&name, epoch) {
            Ok((error, proof)) => Response { error, directory_response: Some(DirectoryResponsePayload::Proof(proof)) },
            Err(error) => Response { error, directory_response: None },
        },
        Request::Monitor { name, start, end } => match directory.monitor(&name, start, end) {
            Ok(proof) => Response { error: ErrorCode::Success, directory_response: Some(DirectoryResponsePayload::Proof(proof)) },
            Err(error) => Response { error, directory_response: None },
        },
        Request::Audit { start, end } => match directory.str_history(start, end) {
            Ok(str) => Response {
                error: ErrorCode::Success,
                directory_response: Some(DirectoryResponsePayload::History(StrHistoryRange { str })),
            },
            Err(error) => Response { error, directory_response: None },
        },
        Request::Str { epoch } => match directory.pad().get_str(epoch) {
            Ok(str) => Response {
                error: ErrorCode::Success,
                directory_response: Some(DirectoryResponsePayload::History(StrHistoryRange { str: vec![str] })),
            },
            Err(_) => Response { error: ErrorCode::ErrDirectory, directory_response: None },
        },
    }
}
