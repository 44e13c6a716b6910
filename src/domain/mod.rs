mod credentials;
mod errors;
mod polling;
mod ports;
mod ticket;

// Re-export the domain boundary types and ports.
pub use credentials::CredentialBundle;
pub use errors::{
    ChannelError, ConnectError, CredentialError, MatchmakingError, RpcError,
};
pub use polling::PollPolicy;
pub use ports::{CredentialSource, FrontendConnection, FrontendConnector};
pub use ticket::{
    Assignment, AssignmentOutcome, GAME_MODE_SESSION, MatchRequest, Player, REGION_ARG, ROOM_ARG,
    SearchFields, Ticket,
};
