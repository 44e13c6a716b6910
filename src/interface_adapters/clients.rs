use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::domain::{
    ChannelError, ConnectError, CredentialBundle, FrontendConnection, FrontendConnector, RpcError,
    SearchFields, Ticket,
};
use crate::interface_adapters::channel::{ChannelConfig, build_pinned_channel};
use crate::interface_adapters::protocol::{CreateTicketRequest, ErrorResponse, TicketPayload};

// The clients defined here talk to the matchmaking frontend's HTTP/JSON gateway over mutual TLS.
const TICKETS_PATH: [&str; 3] = ["v1", "frontendservice", "tickets"];

// Dials the frontend with a prepared channel. Dialing is lazy; transport failures surface on the first RPC.
#[derive(Debug, Clone)]
pub struct HttpFrontendConnector {
    pub rpc_timeout: Duration,
}

impl HttpFrontendConnector {
    pub fn new(rpc_timeout: Duration) -> Self {
        Self { rpc_timeout }
    }
}

// Accepts `host:port` or a full https URL.
pub fn frontend_base_url(endpoint: &str) -> Result<Url, ConnectError> {
    let invalid = |reason: &str| ConnectError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(invalid("endpoint is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).map_err(|err| invalid(&err.to_string()))?;

    if url.scheme() != "https" {
        return Err(invalid("only https endpoints are supported"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }

    Ok(url)
}

#[async_trait]
impl FrontendConnector for HttpFrontendConnector {
    type Channel = ChannelConfig;
    type Connection = HttpFrontendConnection;

    fn build_channel(
        &self,
        credentials: &CredentialBundle,
        server_name: &str,
    ) -> Result<ChannelConfig, ChannelError> {
        build_pinned_channel(credentials, server_name)
    }

    async fn connect(
        &self,
        endpoint: &str,
        channel: ChannelConfig,
    ) -> Result<HttpFrontendConnection, ConnectError> {
        let base_url = frontend_base_url(endpoint)?;

        let http = Client::builder()
            .use_preconfigured_tls(channel.into_tls_config())
            .timeout(self.rpc_timeout)
            .build()
            .map_err(|err| ConnectError::Transport(err.to_string()))?;

        tracing::info!(%base_url, "connected to matchmaking frontend.");
        Ok(HttpFrontendConnection::with_client(http, base_url))
    }
}

// Thin wrapper around reqwest for the three ticket RPCs.
pub struct HttpFrontendConnection {
    // None once closed.
    http: Option<Client>,
    base_url: Url,
}

impl HttpFrontendConnection {
    pub(crate) fn with_client(http: Client, base_url: Url) -> Self {
        Self {
            http: Some(http),
            base_url,
        }
    }

    fn client(&self) -> Result<&Client, RpcError> {
        self.http.as_ref().ok_or(RpcError::Closed)
    }

    fn tickets_url(&self, ticket_id: Option<&str>) -> Result<Url, RpcError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RpcError::Transport("frontend URL cannot carry a path".to_string()))?;
            segments.pop_if_empty().extend(TICKETS_PATH);
            if let Some(ticket_id) = ticket_id {
                segments.push(ticket_id);
            }
        }
        Ok(url)
    }
}

// reqwest's own message hides the cause (refused, timed out, certificate rejected).
fn transport(err: reqwest::Error) -> RpcError {
    RpcError::Transport(error_chain(&err))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some layers already repeat their cause in their own message.
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

// Keep upstream status/message so callers can tell a missing ticket from an outage.
async fn check_status(res: Response) -> Result<Response, RpcError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(ErrorResponse::into_message);
    Err(RpcError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, RpcError> {
    check_status(res)
        .await?
        .json::<T>()
        .await
        .map_err(|err| RpcError::Decode(err.to_string()))
}

#[async_trait]
impl FrontendConnection for HttpFrontendConnection {
    async fn create_ticket(&self, search_fields: SearchFields) -> Result<Ticket, RpcError> {
        let body = CreateTicketRequest {
            ticket: TicketPayload {
                search_fields: Some(search_fields.into()),
                ..TicketPayload::default()
            },
        };

        let res = self
            .client()?
            .post(self.tickets_url(None)?)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        decode::<TicketPayload>(res).await.map(Ticket::from)
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, RpcError> {
        let res = self
            .client()?
            .get(self.tickets_url(Some(ticket_id))?)
            .send()
            .await
            .map_err(transport)?;

        decode::<TicketPayload>(res).await.map(Ticket::from)
    }

    async fn delete_ticket(&self, ticket_id: &str) -> Result<(), RpcError> {
        let res = self
            .client()?
            .delete(self.tickets_url(Some(ticket_id))?)
            .send()
            .await
            .map_err(transport)?;

        // The gateway answers with an empty object; only the status matters.
        check_status(res).await.map(|_| ())
    }

    fn close(&mut self) {
        if self.http.take().is_some() {
            tracing::debug!(base_url = %self.base_url, "disconnected from matchmaking frontend.");
        }
    }
}
