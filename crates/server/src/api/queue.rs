//! Queue projection, stats and mode API handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use clinicflow_core::{
    AuditEvent, OrderColumn, QueueStats, SectionView, ServiceMode, StationQueue,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for switching the orchestration mode
#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    pub mode: ServiceMode,
}

/// Response for mode endpoints
#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: ServiceMode,
}

/// Response after a mode switch
#[derive(Debug, Serialize)]
pub struct ModeChangeResponse {
    pub previous: ServiceMode,
    pub mode: ServiceMode,
}

// ============================================================================
// Handlers
// ============================================================================

/// One queue per topology station, in path order
pub async fn by_station(State(state): State<Arc<AppState>>) -> Json<Vec<StationQueue>> {
    Json(state.engine().list_by_station())
}

/// Tickets grouped into the three clinical sections
pub async fn by_section(State(state): State<Arc<AppState>>) -> Json<Vec<SectionView>> {
    Json(state.engine().list_by_section())
}

/// One column per order type, tickets repeated across columns
pub async fn by_order_column(State(state): State<Arc<AppState>>) -> Json<Vec<OrderColumn>> {
    Json(state.engine().list_by_order_column())
}

/// Aggregate queue statistics
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<QueueStats> {
    Json(state.engine().stats())
}

/// Current orchestration mode
pub async fn get_mode(State(state): State<Arc<AppState>>) -> Json<ModeResponse> {
    Json(ModeResponse {
        mode: state.engine().mode(),
    })
}

/// Switch the orchestration mode, returning the previous one
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetModeBody>,
) -> Json<ModeChangeResponse> {
    let previous = state.engine().set_mode(body.mode);

    if previous != body.mode {
        state.audit().try_emit(AuditEvent::ModeChanged {
            from_mode: previous.to_string(),
            to_mode: body.mode.to_string(),
        });
    }

    Json(ModeChangeResponse {
        previous,
        mode: body.mode,
    })
}
