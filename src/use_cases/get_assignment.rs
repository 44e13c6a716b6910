use uuid::Uuid;

use crate::domain::{
    AssignmentOutcome, CredentialSource, FrontendConnection, FrontendConnector, MatchRequest,
    MatchmakingError, Player, PollPolicy, RpcError,
};
use crate::use_cases::connection::{self, OpenConnection};

// Submit-and-poll use case with injected dependencies.
pub struct GetServerAssignmentUseCase<S, F> {
    pub credentials: S,
    pub connector: F,
    pub policy: PollPolicy,
    // Server identity pinned when a CA is configured.
    pub server_name: String,
}

// A created ticket still waiting for an assignment. Owns the connection it was created on.
pub struct PendingTicket<C: FrontendConnection> {
    ticket_id: String,
    player_id: String,
    connection: OpenConnection<C>,
}

impl<S, F> GetServerAssignmentUseCase<S, F>
where
    S: CredentialSource,
    F: FrontendConnector,
{
    // Create a ticket and wait until the frontend assigns it.
    pub async fn execute(
        &self,
        endpoint: &str,
        room: &str,
        region: &str,
    ) -> Result<AssignmentOutcome, MatchmakingError> {
        let pending = self.submit(endpoint, room, region).await?;
        pending.wait_for_assignment(&self.policy).await
    }

    // Connect and create the ticket. Every failure here is a setup failure.
    #[tracing::instrument(name = "submit_ticket", skip_all, fields(endpoint = %endpoint, room = %room, region = %region))]
    pub async fn submit(
        &self,
        endpoint: &str,
        room: &str,
        region: &str,
    ) -> Result<PendingTicket<F::Connection>, MatchmakingError> {
        tracing::info!("connecting to matchmaking frontend.");
        let connection =
            connection::open(&self.credentials, &self.connector, endpoint, &self.server_name)
                .await?;

        let player = Player {
            uid: Uuid::new_v4().to_string(),
            match_request: MatchRequest::session(room, region),
        };

        let ticket = connection
            .create_ticket(player.match_request.search_fields())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, player_id = %player.uid, "failed to create ticket.");
                MatchmakingError::CreateTicket(e)
            })?;

        if ticket.id.is_empty() {
            tracing::error!(player_id = %player.uid, "frontend returned a ticket without an id.");
            return Err(MatchmakingError::CreateTicket(RpcError::Decode(
                "ticket id missing from create response".to_string(),
            )));
        }

        tracing::info!(ticket_id = %ticket.id, player_id = %player.uid, "ticket created.");

        Ok(PendingTicket {
            ticket_id: ticket.id,
            player_id: player.uid,
            connection,
        })
    }
}

impl<C: FrontendConnection> PendingTicket<C> {
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    // Poll until assigned, a poll fails, or the policy deadline passes.
    // The connection is released on return, and also if this future is dropped.
    #[tracing::instrument(name = "await_assignment", skip_all, fields(ticket_id = %self.ticket_id))]
    pub async fn wait_for_assignment(
        self,
        policy: &PollPolicy,
    ) -> Result<AssignmentOutcome, MatchmakingError> {
        tracing::info!("waiting for ticket assignment.");

        let poll = poll_until_assigned(&*self.connection, &self.ticket_id, policy);
        let (connection, polls) = match policy.deadline {
            Some(deadline) => tokio::time::timeout(deadline, poll).await.unwrap_or_else(|_| {
                tracing::warn!(?deadline, "no assignment before deadline.");
                Err(MatchmakingError::DeadlineExceeded {
                    ticket_id: self.ticket_id.clone(),
                    waited: deadline,
                })
            })?,
            None => poll.await?,
        };

        tracing::info!(%connection, polls, "ticket assigned.");
        tracing::debug!("disconnecting from matchmaking frontend.");

        Ok(AssignmentOutcome {
            ticket_id: self.ticket_id,
            player_id: self.player_id,
            connection,
            polls,
        })
    }
}

async fn poll_until_assigned<C: FrontendConnection>(
    conn: &C,
    ticket_id: &str,
    policy: &PollPolicy,
) -> Result<(String, u32), MatchmakingError> {
    let mut polls: u32 = 0;

    loop {
        let ticket = conn.get_ticket(ticket_id).await.map_err(|e| {
            tracing::warn!(error = %e, polls, "ticket poll failed.");
            MatchmakingError::PollTicket {
                ticket_id: ticket_id.to_string(),
                source: e,
            }
        })?;
        polls = polls.saturating_add(1);

        if let Some(assignment) = ticket.resolved_assignment() {
            return Ok((assignment.connection.clone(), polls));
        }

        let delay = policy.delay_after(polls - 1);
        tracing::debug!(polls, ?delay, "ticket not assigned yet.");
        tokio::time::sleep(delay).await;
    }
}
