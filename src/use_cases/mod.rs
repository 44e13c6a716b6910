// Use cases layer: the ticket lifecycle workflows.

pub mod connection;
pub mod delete_ticket;
pub mod get_assignment;
#[cfg(test)]
pub(crate) mod test_support;

pub use connection::OpenConnection;
pub use delete_ticket::DeleteTicketUseCase;
pub use get_assignment::{GetServerAssignmentUseCase, PendingTicket};
