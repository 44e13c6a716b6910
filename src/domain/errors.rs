//! Error taxonomy for the ticket lifecycle.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Credential material could not be read.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read {kind} from {}: {source}", .path.display())]
    Unreadable {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The secure channel could not be configured from the supplied material.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid client key pair: {0}")]
    InvalidKeyPair(String),
    #[error("only PEM format is accepted for server CA: {0}")]
    InvalidTrustAnchor(String),
    #[error("invalid pinned server name {0:?}")]
    InvalidServerName(String),
}

/// The connection to the frontend could not be opened.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid frontend endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("failed to connect to matchmaking frontend: {0}")]
    Transport(String),
}

/// A ticket RPC failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("frontend returned status {status}{}", status_suffix(.message))]
    Status { status: u16, message: Option<String> },
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("connection already closed")]
    Closed,
}

fn status_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

/// Top-level error returned by the lifecycle operations.
#[derive(Debug, Error)]
pub enum MatchmakingError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    ChannelSetup(#[from] ChannelError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("failed to create ticket: {0}")]
    CreateTicket(#[source] RpcError),
    #[error("was not able to get ticket {ticket_id}: {source}")]
    PollTicket {
        ticket_id: String,
        #[source]
        source: RpcError,
    },
    #[error("no assignment for ticket {ticket_id} within {waited:?}")]
    DeadlineExceeded { ticket_id: String, waited: Duration },
    #[error("failed to delete ticket {ticket_id}: {source}")]
    DeleteTicket {
        ticket_id: String,
        #[source]
        source: RpcError,
    },
}

impl MatchmakingError {
    /// Configuration-side failures: the caller has to fix something before trying again.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            MatchmakingError::Credential(_)
                | MatchmakingError::ChannelSetup(_)
                | MatchmakingError::Connect(_)
                | MatchmakingError::CreateTicket(_)
        )
    }

    /// Failures after a ticket exists; the whole operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatchmakingError::PollTicket { .. } | MatchmakingError::DeadlineExceeded { .. }
        )
    }

    /// Ticket left outstanding on the frontend, if any.
    pub fn outstanding_ticket(&self) -> Option<&str> {
        match self {
            MatchmakingError::PollTicket { ticket_id, .. }
            | MatchmakingError::DeadlineExceeded { ticket_id, .. } => Some(ticket_id),
            _ => None,
        }
    }
}
