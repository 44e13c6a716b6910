pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{AssignmentOutcome, MatchmakingError, PollPolicy};
pub use frameworks::client::{delete_ticket, get_server_assignment};
pub use interface_adapters::channel::{
    ChannelConfig, FRONTEND_SERVER_NAME, build_channel, build_pinned_channel,
};
