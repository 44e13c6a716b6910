use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{Assignment, SearchFields, Ticket};

// Wire shapes for the frontend's HTTP/JSON gateway. Field names follow the proto definitions;
// camelCase aliases cover gateways that emit JSON names instead.

// Body of POST /v1/frontendservice/tickets.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub ticket: TicketPayload,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TicketPayload {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, alias = "searchFields", skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<SearchFieldsPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentPayload>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchFieldsPayload {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "stringArgs")]
    pub string_args: HashMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AssignmentPayload {
    #[serde(default)]
    pub connection: String,
}

// Error envelope returned by the gateway on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    // Older gateways duplicate the message here.
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|message| !message.is_empty())
            .or(self.error.filter(|error| !error.is_empty()))
    }
}

impl From<SearchFields> for SearchFieldsPayload {
    fn from(fields: SearchFields) -> Self {
        Self {
            tags: fields.tags,
            string_args: fields.string_args,
        }
    }
}

impl From<TicketPayload> for Ticket {
    fn from(payload: TicketPayload) -> Self {
        Ticket {
            id: payload.id,
            assignment: payload.assignment.map(|assignment| Assignment {
                connection: assignment.connection,
            }),
        }
    }
}
