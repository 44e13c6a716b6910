use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{
    Assignment, ChannelError, ConnectError, CredentialBundle, CredentialError, CredentialSource,
    FrontendConnection, FrontendConnector, RpcError, SearchFields, Ticket,
};
use crate::interface_adapters::channel::{ChannelConfig, build_pinned_channel};

pub(crate) const CLIENT_CERT: &[u8] = include_bytes!("../../tests/fixtures/public.cert");
pub(crate) const CLIENT_KEY: &[u8] = include_bytes!("../../tests/fixtures/private.key");
pub(crate) const CA_CERT: &[u8] = include_bytes!("../../tests/fixtures/publicCA.cert");

// In-memory credentials; `bundle: None` simulates an unreadable file.
#[derive(Clone)]
pub(crate) struct StaticCredentials {
    pub(crate) bundle: Option<CredentialBundle>,
}

impl StaticCredentials {
    pub(crate) fn valid() -> Self {
        Self {
            bundle: Some(CredentialBundle {
                client_cert: CLIENT_CERT.to_vec(),
                client_key: CLIENT_KEY.to_vec(),
                ca_cert: CA_CERT.to_vec(),
            }),
        }
    }

    pub(crate) fn with_ca(ca_cert: &[u8]) -> Self {
        let mut credentials = Self::valid();
        if let Some(bundle) = credentials.bundle.as_mut() {
            bundle.ca_cert = ca_cert.to_vec();
        }
        credentials
    }

    pub(crate) fn missing() -> Self {
        Self { bundle: None }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn load(&self) -> Result<CredentialBundle, CredentialError> {
        self.bundle.clone().ok_or_else(|| CredentialError::Unreadable {
            kind: "client certificate",
            path: "public.cert".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })
    }
}

// What the fake frontend answers to the n-th get_ticket call on a ticket.
#[derive(Clone, Debug)]
pub(crate) enum PollStep {
    Pending,
    Assigned(String),
    // Assignment string derived from the ticket id, so concurrent callers can be told apart.
    AssignedPerTicket,
    EmptyAssignment,
    Fail(RpcError),
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub connect: bool,
    pub create: bool,
    pub delete: bool,
}

#[derive(Default)]
struct FrontendState {
    next_ticket: u64,
    connects: u32,
    closes: u32,
    endpoints: Vec<String>,
    pinned_names: Vec<Option<String>>,
    created: Vec<(String, SearchFields)>,
    polls: HashMap<String, u32>,
    deleted: Vec<String>,
}

// Scripted stand-in for the matchmaking frontend. Every ticket replays the same poll script;
// the last step repeats once the script runs out.
#[derive(Clone)]
pub(crate) struct FakeFrontend {
    script: Arc<Vec<PollStep>>,
    failures: FailureFlags,
    state: Arc<Mutex<FrontendState>>,
}

impl FakeFrontend {
    pub(crate) fn new(script: Vec<PollStep>) -> Self {
        Self {
            script: Arc::new(script),
            failures: FailureFlags::default(),
            state: Arc::new(Mutex::new(FrontendState::default())),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn connector(&self) -> FakeConnector {
        FakeConnector {
            frontend: self.clone(),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FrontendState) -> T) -> T {
        let mut guard = self.state.lock().expect("frontend mutex poisoned");
        f(&mut guard)
    }

    pub(crate) fn connects(&self) -> u32 {
        self.with_state(|state| state.connects)
    }

    pub(crate) fn closes(&self) -> u32 {
        self.with_state(|state| state.closes)
    }

    pub(crate) fn endpoints(&self) -> Vec<String> {
        self.with_state(|state| state.endpoints.clone())
    }

    pub(crate) fn pinned_names(&self) -> Vec<Option<String>> {
        self.with_state(|state| state.pinned_names.clone())
    }

    pub(crate) fn created(&self) -> Vec<(String, SearchFields)> {
        self.with_state(|state| state.created.clone())
    }

    pub(crate) fn polls(&self, ticket_id: &str) -> u32 {
        self.with_state(|state| state.polls.get(ticket_id).copied().unwrap_or(0))
    }

    pub(crate) fn total_polls(&self) -> u32 {
        self.with_state(|state| state.polls.values().sum())
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.with_state(|state| state.deleted.clone())
    }
}

pub(crate) struct FakeConnector {
    frontend: FakeFrontend,
}

#[async_trait]
impl FrontendConnector for FakeConnector {
    // The real channel, so credential and pinning errors match production.
    type Channel = ChannelConfig;
    type Connection = FakeConnection;

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
    ) -> Result<FakeConnection, ConnectError> {
        self.frontend.with_state(|state| {
            state.connects += 1;
            state.endpoints.push(endpoint.to_string());
            state
                .pinned_names
                .push(channel.pinned_server_name().map(str::to_string));
        });

        if self.frontend.failures.connect {
            return Err(ConnectError::Transport("connection refused".to_string()));
        }

        Ok(FakeConnection {
            frontend: self.frontend.clone(),
            closed: false,
        })
    }
}

pub(crate) struct FakeConnection {
    frontend: FakeFrontend,
    closed: bool,
}

#[async_trait]
impl FrontendConnection for FakeConnection {
    async fn create_ticket(&self, search_fields: SearchFields) -> Result<Ticket, RpcError> {
        if self.frontend.failures.create {
            return Err(RpcError::Status {
                status: 503,
                message: Some("frontend unavailable".to_string()),
            });
        }

        let id = self.frontend.with_state(|state| {
            state.next_ticket += 1;
            let id = format!("ticket-{}", state.next_ticket);
            state.created.push((id.clone(), search_fields));
            id
        });

        Ok(Ticket {
            id,
            assignment: None,
        })
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, RpcError> {
        let attempt = self.frontend.with_state(|state| {
            let polls = state.polls.entry(ticket_id.to_string()).or_insert(0);
            *polls += 1;
            *polls as usize
        });

        let step = self
            .frontend
            .script
            .get(attempt - 1)
            .or_else(|| self.frontend.script.last())
            .cloned()
            .unwrap_or(PollStep::Pending);

        let assignment = match step {
            PollStep::Pending => None,
            PollStep::Assigned(connection) => Some(Assignment { connection }),
            PollStep::AssignedPerTicket => Some(Assignment {
                connection: format!("session-for-{ticket_id}"),
            }),
            PollStep::EmptyAssignment => Some(Assignment {
                connection: String::new(),
            }),
            PollStep::Fail(err) => return Err(err),
        };

        Ok(Ticket {
            id: ticket_id.to_string(),
            assignment,
        })
    }

    async fn delete_ticket(&self, ticket_id: &str) -> Result<(), RpcError> {
        if self.frontend.failures.delete {
            return Err(RpcError::Status {
                status: 404,
                message: Some("ticket not found".to_string()),
            });
        }

        self.frontend
            .with_state(|state| state.deleted.push(ticket_id.to_string()));
        Ok(())
    }

    fn close(&mut self) {
        assert!(!self.closed, "connection closed twice");
        self.closed = true;
        self.frontend.with_state(|state| state.closes += 1);
    }
}
