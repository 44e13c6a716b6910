// Interface adapters: TLS channel, credential files and the frontend wire client.

pub mod channel;
pub mod clients;
pub mod credentials;
pub mod protocol;
