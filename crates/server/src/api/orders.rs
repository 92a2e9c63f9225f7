//! Diagnostic order API handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use clinicflow_core::{AuditEvent, OrderType, QueueTicket};

use super::error::ApiError;
use crate::state::AppState;

/// Request body for attaching diagnostic orders to a ticket
#[derive(Debug, Deserialize)]
pub struct AttachOrdersBody {
    /// One order is created per entry, in the given sequence
    pub order_types: Vec<OrderType>,
}

/// Attach diagnostic orders to an in-session ticket
pub async fn attach_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AttachOrdersBody>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().attach_orders(&id, &body.order_types)?;

    state.audit().try_emit(AuditEvent::OrdersAttached {
        ticket_id: ticket.id.clone(),
        order_types: body
            .order_types
            .iter()
            .map(|t| t.label().to_string())
            .collect(),
        mode: state.engine().mode().to_string(),
    });

    Ok(Json(ticket))
}

/// Start servicing an order (queued -> in_progress)
pub async fn start_order(
    State(state): State<Arc<AppState>>,
    Path((id, order_id)): Path<(String, String)>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().start_order(&id, &order_id)?;

    if let Some(order) = ticket.find_order(&order_id) {
        state.audit().try_emit(AuditEvent::OrderStarted {
            ticket_id: ticket.id.clone(),
            order_id: order_id.clone(),
            order_type: order.order_type.label().to_string(),
        });
    }

    Ok(Json(ticket))
}

/// Complete an order (in_progress -> completed)
pub async fn complete_order(
    State(state): State<Arc<AppState>>,
    Path((id, order_id)): Path<(String, String)>,
) -> Result<Json<QueueTicket>, ApiError> {
    let ticket = state.engine().complete_order(&id, &order_id)?;

    if let Some(order) = ticket.find_order(&order_id) {
        state.audit().try_emit(AuditEvent::OrderCompleted {
            ticket_id: ticket.id.clone(),
            order_id: order_id.clone(),
            order_type: order.order_type.label().to_string(),
        });
    }

    Ok(Json(ticket))
}

/// Complete whichever order sits at the Linear cursor
pub async fn complete_current_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueTicket>, ApiError> {
    let cursor = state
        .engine()
        .get(&id)?
        .current_order()
        .map(|o| (o.id.clone(), o.order_type.label().to_string()));
    let ticket = state.engine().complete_current_order(&id)?;

    if let Some((order_id, order_type)) = cursor {
        state.audit().try_emit(AuditEvent::OrderCompleted {
            ticket_id: ticket.id.clone(),
            order_id,
            order_type,
        });
    }

    Ok(Json(ticket))
}
