use std::{env, path::PathBuf, time::Duration};

use crate::domain::PollPolicy;
use crate::interface_adapters::channel::FRONTEND_SERVER_NAME;
use crate::interface_adapters::credentials::FileCredentialSource;

// Runtime configuration read from the environment (and `.env`, if loaded).

pub fn frontend_endpoint() -> String {
    env::var("OM_FRONTEND_ENDPOINT").unwrap_or_else(|_| "localhost:51504".to_string())
}

pub fn credential_source() -> FileCredentialSource {
    FileCredentialSource::new(
        path_var("OM_CLIENT_CERT", "public.cert"),
        path_var("OM_CLIENT_KEY", "private.key"),
        path_var("OM_CA_CERT", "publicCA.cert"),
    )
}

// Pinned frontend identity. Check against the deployment before changing the default.
pub fn server_name() -> String {
    env::var("OM_SERVER_NAME")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FRONTEND_SERVER_NAME.to_string())
}

pub fn rpc_timeout() -> Duration {
    Duration::from_millis(millis_var("OM_RPC_TIMEOUT_MS").unwrap_or(5_000))
}

pub fn poll_policy() -> PollPolicy {
    let defaults = PollPolicy::default();
    let initial_interval = millis_var("OM_POLL_INTERVAL_MS")
        .map(Duration::from_millis)
        .unwrap_or(defaults.initial_interval);
    // Never below the initial interval.
    let max_interval = millis_var("OM_POLL_MAX_INTERVAL_MS")
        .map(Duration::from_millis)
        .unwrap_or(defaults.max_interval)
        .max(initial_interval);
    // 0 disables the deadline.
    let deadline = millis_var("OM_ASSIGNMENT_DEADLINE_MS")
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis);

    PollPolicy {
        initial_interval,
        max_interval,
        deadline,
        ..defaults
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var_os(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn millis_var(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.trim().parse::<u64>().ok())
}
