use async_trait::async_trait;

use crate::domain::credentials::CredentialBundle;
use crate::domain::errors::{ChannelError, ConnectError, CredentialError, RpcError};
use crate::domain::ticket::{SearchFields, Ticket};

// Port for reading the client certificate, key and CA material.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn load(&self) -> Result<CredentialBundle, CredentialError>;
}

// One open connection to the matchmaking frontend.
// Use cases depend on this trait, not on the concrete HTTP client.
#[async_trait]
pub trait FrontendConnection: Send + Sync {
    async fn create_ticket(&self, search_fields: SearchFields) -> Result<Ticket, RpcError>;
    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, RpcError>;
    async fn delete_ticket(&self, ticket_id: &str) -> Result<(), RpcError>;

    // Release the underlying transport. Called exactly once by the owning guard.
    fn close(&mut self);
}

// Port for dialing the frontend. The channel is built from loaded credentials first,
// then consumed by exactly one connect call. Use cases never look inside it.
#[async_trait]
pub trait FrontendConnector: Send + Sync {
    type Channel: Send;
    type Connection: FrontendConnection;

    fn build_channel(
        &self,
        credentials: &CredentialBundle,
        server_name: &str,
    ) -> Result<Self::Channel, ChannelError>;

    async fn connect(
        &self,
        endpoint: &str,
        channel: Self::Channel,
    ) -> Result<Self::Connection, ConnectError>;
}
