use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Ticket lifecycle
    PatientCheckedIn {
        ticket_id: String,
        ticket_number: String,
        priority: String,
    },
    PatientCalled {
        ticket_id: String,
        station: String,
    },
    SessionStarted {
        ticket_id: String,
        station: String,
    },
    PatientTransferred {
        ticket_id: String,
        from_station: String,
        to_station: String,
    },
    VisitCompleted {
        ticket_id: String,
        station: String,
    },
    PatientNoShow {
        ticket_id: String,
        station: String,
    },
    PatientSkipped {
        ticket_id: String,
        station: String,
    },

    // Orders
    OrdersAttached {
        ticket_id: String,
        order_types: Vec<String>,
        mode: String,
    },
    OrderStarted {
        ticket_id: String,
        order_id: String,
        order_type: String,
    },
    OrderCompleted {
        ticket_id: String,
        order_id: String,
        order_type: String,
    },

    // Orchestration
    ModeChanged {
        from_mode: String,
        to_mode: String,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::PatientCheckedIn { .. } => "patient_checked_in",
            Self::PatientCalled { .. } => "patient_called",
            Self::SessionStarted { .. } => "session_started",
            Self::PatientTransferred { .. } => "patient_transferred",
            Self::VisitCompleted { .. } => "visit_completed",
            Self::PatientNoShow { .. } => "patient_no_show",
            Self::PatientSkipped { .. } => "patient_skipped",
            Self::OrdersAttached { .. } => "orders_attached",
            Self::OrderStarted { .. } => "order_started",
            Self::OrderCompleted { .. } => "order_completed",
            Self::ModeChanged { .. } => "mode_changed",
        }
    }

    /// Extract ticket_id if this event is ticket-related
    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            Self::PatientCheckedIn { ticket_id, .. }
            | Self::PatientCalled { ticket_id, .. }
            | Self::SessionStarted { ticket_id, .. }
            | Self::PatientTransferred { ticket_id, .. }
            | Self::VisitCompleted { ticket_id, .. }
            | Self::PatientNoShow { ticket_id, .. }
            | Self::PatientSkipped { ticket_id, .. }
            | Self::OrdersAttached { ticket_id, .. }
            | Self::OrderStarted { ticket_id, .. }
            | Self::OrderCompleted { ticket_id, .. } => Some(ticket_id),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub ticket_id: Option<String>,
    pub data: AuditEvent,
}
