use std::ops::Deref;

use crate::domain::{CredentialSource, FrontendConnection, FrontendConnector, MatchmakingError};

// Owns an open frontend connection and closes it exactly once when dropped,
// whichever way the owning call exits (success, error, or cancellation).
pub struct OpenConnection<C: FrontendConnection> {
    conn: C,
}

impl<C: FrontendConnection> OpenConnection<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl<C: FrontendConnection> Deref for OpenConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.conn
    }
}

impl<C: FrontendConnection> Drop for OpenConnection<C> {
    fn drop(&mut self) {
        self.conn.close();
    }
}

// Load credentials, build the channel and dial. Each call gets its own credentials and connection.
pub(crate) async fn open<S, F>(
    credentials: &S,
    connector: &F,
    endpoint: &str,
    server_name: &str,
) -> Result<OpenConnection<F::Connection>, MatchmakingError>
where
    S: CredentialSource,
    F: FrontendConnector,
{
    let channel = {
        let bundle = credentials.load().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to load credentials.");
        })?;
        connector.build_channel(&bundle, server_name).inspect_err(|e| {
            tracing::error!(error = %e, "failed to build secure channel.");
        })?
    };

    let conn = connector.connect(endpoint, channel).await.inspect_err(|e| {
        tracing::error!(error = %e, "failed to connect to matchmaking frontend.");
    })?;

    Ok(OpenConnection::new(conn))
}
