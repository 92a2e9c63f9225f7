use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use clinicflow_core::{AuditError, AuditFilter, AuditRecord};

use crate::state::AppState;

/// Hard cap on audit page size.
const MAX_PAGE_SIZE: i64 = 1000;

/// Page size when the caller does not ask for one.
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Query parameters for the audit trail endpoint.
#[derive(Debug, Deserialize)]
pub struct AuditTrailParams {
    /// Restrict to one ticket's trail.
    pub ticket_id: Option<String>,
    /// Restrict to one event type (e.g. "patient_called").
    pub event: Option<String>,
    /// Records at or after this instant (ISO 8601).
    pub since: Option<DateTime<Utc>>,
    /// Records before this instant (ISO 8601).
    pub until: Option<DateTime<Utc>>,
    /// Page size (default 100, capped at 1000).
    pub limit: Option<i64>,
    /// Page start (default 0).
    pub offset: Option<i64>,
}

impl AuditTrailParams {
    /// The filter shared by the page query and the total count.
    fn base_filter(&self) -> AuditFilter {
        let mut filter = AuditFilter::new();
        if let Some(ref ticket_id) = self.ticket_id {
            filter = filter.with_ticket_id(ticket_id);
        }
        if let Some(ref event) = self.event {
            filter = filter.with_event_type(event);
        }
        if self.since.is_some() || self.until.is_some() {
            filter = filter.with_time_range(self.since, self.until);
        }
        filter
    }
}

/// One page of the audit trail.
#[derive(Debug, Serialize)]
pub struct AuditTrailPage {
    /// Matching records, newest first.
    pub records: Vec<AuditRecord>,
    /// Total matches ignoring pagination.
    pub total: i64,
    /// Page size used for this query.
    pub limit: i64,
    /// Page start used for this query.
    pub offset: i64,
}

/// Error body for a failed audit query.
#[derive(Debug, Serialize)]
pub struct AuditErrorResponse {
    pub error: String,
}

/// Query the audit trail.
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditTrailParams>,
) -> Result<Json<AuditTrailPage>, (StatusCode, Json<AuditErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let base_filter = params.base_filter();
    let page_filter = AuditFilter {
        limit,
        offset,
        ..base_filter.clone()
    };

    let records = state
        .audit_store()
        .query(&page_filter)
        .map_err(store_failure)?;
    // Total is counted on the unpaginated filter.
    let total = state
        .audit_store()
        .count(&base_filter)
        .map_err(store_failure)?;

    Ok(Json(AuditTrailPage {
        records,
        total,
        limit,
        offset,
    }))
}

fn store_failure(err: AuditError) -> (StatusCode, Json<AuditErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(AuditErrorResponse {
            error: format!("Audit store unavailable: {}", err),
        }),
    )
}
