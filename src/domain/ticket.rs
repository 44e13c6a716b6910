use std::collections::HashMap;

// Tag attached to every ticket submitted by this client.
pub const GAME_MODE_SESSION: &str = "mode.session";

// Attribute keys the frontend matches on.
pub const ROOM_ARG: &str = "room";
pub const REGION_ARG: &str = "region";

// A player's matchmaking request before it becomes a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    pub tags: Vec<String>,
    pub string_args: HashMap<String, String>,
}

impl MatchRequest {
    // Build the session-mode request for a room/region pair. Values are passed through unchanged.
    pub fn session(room: impl Into<String>, region: impl Into<String>) -> Self {
        let mut string_args = HashMap::new();
        string_args.insert(ROOM_ARG.to_string(), room.into());
        string_args.insert(REGION_ARG.to_string(), region.into());

        Self {
            tags: vec![GAME_MODE_SESSION.to_string()],
            string_args,
        }
    }

    pub fn search_fields(&self) -> SearchFields {
        SearchFields {
            tags: self.tags.clone(),
            string_args: self.string_args.clone(),
        }
    }
}

// Fields the frontend uses to find compatible players.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFields {
    pub tags: Vec<String>,
    pub string_args: HashMap<String, String>,
}

// A player with a freshly generated identity and the request they are queueing with.
#[derive(Debug, Clone)]
pub struct Player {
    pub uid: String,
    pub match_request: MatchRequest,
}

// Resolved outcome of a ticket: where the player should connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub connection: String,
}

// Server-side view of a ticket. Only the frontend fills in the assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub assignment: Option<Assignment>,
}

impl Ticket {
    // An assignment with an empty connection string is treated as not yet assigned.
    pub fn resolved_assignment(&self) -> Option<&Assignment> {
        self.assignment
            .as_ref()
            .filter(|assignment| !assignment.connection.is_empty())
    }
}

// Returned to the caller once a ticket resolves. Carries the ticket id instead of stashing it globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub ticket_id: String,
    pub player_id: String,
    pub connection: String,
    pub polls: u32,
}
