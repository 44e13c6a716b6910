use crate::domain::{CredentialSource, FrontendConnection, FrontendConnector, MatchmakingError};
use crate::use_cases::connection;

// Delete-ticket use case. Dials its own connection; shares nothing with submit/poll.
pub struct DeleteTicketUseCase<S, F> {
    pub credentials: S,
    pub connector: F,
    pub server_name: String,
}

impl<S, F> DeleteTicketUseCase<S, F>
where
    S: CredentialSource,
    F: FrontendConnector,
{
    #[tracing::instrument(name = "delete_ticket", skip_all, fields(endpoint = %endpoint, ticket_id = %ticket_id))]
    pub async fn execute(&self, endpoint: &str, ticket_id: &str) -> Result<(), MatchmakingError> {
        let connection =
            connection::open(&self.credentials, &self.connector, endpoint, &self.server_name)
                .await?;

        connection.delete_ticket(ticket_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to delete ticket.");
            MatchmakingError::DeleteTicket {
                ticket_id: ticket_id.to_string(),
                source: e,
            }
        })?;

        tracing::info!("ticket deleted.");
        Ok(())
    }
}
