//! Error types for the queue engine.
//!
//! Every command is all-or-nothing: a rejected command leaves the engine in
//! its prior state. There are no fatal error classes and nothing is retried
//! internally.

use thiserror::Error;

use super::types::{OrderStatus, Station, TicketStatus};

/// Errors returned by queue engine commands.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueueError {
    /// Ticket id is unknown.
    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: String },

    /// Order id does not exist on the ticket.
    #[error("Order {order_id} not found on ticket {ticket_id}")]
    OrderNotFound {
        ticket_id: String,
        order_id: String,
    },

    /// The requested ticket transition is not permitted from the current
    /// status.
    #[error("Cannot {action} ticket {ticket_id}: current status is {status}")]
    IllegalTransition {
        ticket_id: String,
        status: TicketStatus,
        action: &'static str,
    },

    /// The requested order transition is not permitted from the current
    /// status, or the order is not the one being serviced.
    #[error("Cannot move order {order_id} from {from} to {to}")]
    IllegalOrderTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Advancing was requested while orders are still outstanding.
    #[error("Ticket {ticket_id} has {remaining} unfinished order(s)")]
    UnfinishedOrders { ticket_id: String, remaining: usize },

    /// Advancing from Return-Consult needs an explicit destination.
    #[error("Ticket {ticket_id} is at Return-Consult: choose Pharmacy or Billing")]
    BranchRequired { ticket_id: String },

    /// The station is not part of this tenant's topology, or is not a valid
    /// destination for the requested move.
    #[error("Station {station} is not available")]
    StationUnavailable { station: Station },
}

impl QueueError {
    /// Coarse error class, mirrored by the HTTP layer's status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueueError::TicketNotFound { .. } | QueueError::OrderNotFound { .. } => {
                ErrorKind::NotFound
            }
            QueueError::IllegalTransition { .. } | QueueError::IllegalOrderTransition { .. } => {
                ErrorKind::IllegalTransition
            }
            QueueError::UnfinishedOrders { .. }
            | QueueError::BranchRequired { .. }
            | QueueError::StationUnavailable { .. } => ErrorKind::PreconditionFailed,
        }
    }
}

/// The three error classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    IllegalTransition,
    PreconditionFailed,
}
