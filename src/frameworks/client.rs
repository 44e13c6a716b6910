use crate::domain::{AssignmentOutcome, MatchmakingError};
use crate::frameworks::config;
use crate::interface_adapters::clients::HttpFrontendConnector;
use crate::interface_adapters::credentials::FileCredentialSource;
use crate::use_cases::{DeleteTicketUseCase, GetServerAssignmentUseCase};

// Production wiring: PEM files from disk, HTTPS frontend, policy from the environment.

pub fn assignment_use_case() -> GetServerAssignmentUseCase<FileCredentialSource, HttpFrontendConnector> {
    GetServerAssignmentUseCase {
        credentials: config::credential_source(),
        connector: HttpFrontendConnector::new(config::rpc_timeout()),
        policy: config::poll_policy(),
        server_name: config::server_name(),
    }
}

pub fn delete_use_case() -> DeleteTicketUseCase<FileCredentialSource, HttpFrontendConnector> {
    DeleteTicketUseCase {
        credentials: config::credential_source(),
        connector: HttpFrontendConnector::new(config::rpc_timeout()),
        server_name: config::server_name(),
    }
}

/// Queue a player for `room`/`region` and wait for the session they should join.
pub async fn get_server_assignment(
    endpoint: &str,
    room: &str,
    region: &str,
) -> Result<AssignmentOutcome, MatchmakingError> {
    assignment_use_case().execute(endpoint, room, region).await
}

/// Withdraw an outstanding ticket.
pub async fn delete_ticket(endpoint: &str, ticket_id: &str) -> Result<(), MatchmakingError> {
    delete_use_case().execute(endpoint, ticket_id).await
}
