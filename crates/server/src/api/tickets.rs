//! Ticket lifecycle API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use clinicflow_core::{AuditEvent, CheckInRequest, PriorityClass, QueueTicket, Station};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for checking in a patient
#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    /// Patient display name
    pub patient_name: String,
    /// Reason for the visit
    #[serde(default)]
    pub chief_complaint: String,
    /// Priority class, defaults to normal
    #[serde(default)]
    pub priority: PriorityClass,
}

/// Optional request body for advancing a ticket
#[derive(Debug, Deserialize)]
pub struct AdvanceBody {
    /// Destination for the Return-Consult branch (pharmacy or billing)
    pub to: Option<Station>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Check in a patient, creating a new ticket at the back of the check-in queue
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckInBody>,
) -> (StatusCode, Json<QueueTicket>) {
    let ticket = state.engine().check_in(CheckInRequest {
        patient_name: body.patient_name,
        chief_complaint: body.chief_complaint,
        priority: body.priority,
    });

    state.audit().try_emit(AuditEvent::PatientCheckedIn {
        ticket_id: ticket.id.clone(),
        ticket_number: ticket.ticket_number.clone(),
        priority: ticket.priority.as_str().to_string(),
    });

    (StatusCode::CREATED, Json(ticket))
}

/// List all tickets in check-in order
pub async fn list_tickets(State(state): State<Arc<AppState>>) -> Json<Vec<QueueTicket>> {
    Json(state.engine().list())
}

/// Get a single ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    Ok(Json(state.engine().get(&id)?))
}

/// Call the next patient waiting at a station
///
/// Responds 204 when nobody is waiting there.
pub async fn call_next(
    State(state): State<Arc<AppState>>,
    Path(station): Path<Station>,
) -> Result<Response, ApiError> {
    match state.engine().call_next(station)? {
        Some(ticket) => {
            state.audit().try_emit(AuditEvent::PatientCalled {
                ticket_id: ticket.id.clone(),
                station: station.label().to_string(),
            });
            Ok(Json(ticket).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Start the session for a called ticket
pub async fn start_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().start(&id)?;

    state.audit().try_emit(AuditEvent::SessionStarted {
        ticket_id: ticket.id.clone(),
        station: ticket.station.label().to_string(),
    });

    Ok(Json(ticket))
}

/// Advance an in-session ticket to the next station on its path
pub async fn advance_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<AdvanceBody>>,
) -> Result<Json<QueueTicket>, ApiError> {
    let to = body.and_then(|Json(b)| b.to);
    let from = state.engine().get(&id)?.station;
    let ticket = state.engine().advance(&id, to)?;

    if ticket.status.is_terminal() {
        state.audit().try_emit(AuditEvent::VisitCompleted {
            ticket_id: ticket.id.clone(),
            station: from.label().to_string(),
        });
    } else {
        state.audit().try_emit(AuditEvent::PatientTransferred {
            ticket_id: ticket.id.clone(),
            from_station: from.label().to_string(),
            to_station: ticket.station.label().to_string(),
        });
    }

    Ok(Json(ticket))
}

/// Complete an in-session ticket without routing it anywhere else
pub async fn complete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().complete(&id)?;

    state.audit().try_emit(AuditEvent::VisitCompleted {
        ticket_id: ticket.id.clone(),
        station: ticket.station.label().to_string(),
    });

    Ok(Json(ticket))
}

/// Mark a waiting ticket as a no-show
pub async fn no_show_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().no_show(&id)?;

    state.audit().try_emit(AuditEvent::PatientNoShow {
        ticket_id: ticket.id.clone(),
        station: ticket.station.label().to_string(),
    });

    Ok(Json(ticket))
}

/// Send a queued ticket to the back of its station's line
pub async fn skip_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().skip(&id)?;

    state.audit().try_emit(AuditEvent::PatientSkipped {
        ticket_id: ticket.id.clone(),
        station: ticket.station.label().to_string(),
    });

    Ok(Json(ticket))
}
