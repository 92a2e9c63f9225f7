use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{audit, handlers, middleware::metrics_middleware, orders, queue, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Audit
        .route("/audit", get(audit::query_audit))
        // Tickets
        .route("/tickets", post(tickets::check_in))
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}/start", post(tickets::start_ticket))
        .route("/tickets/{id}/advance", post(tickets::advance_ticket))
        .route("/tickets/{id}/complete", post(tickets::complete_ticket))
        .route("/tickets/{id}/no-show", post(tickets::no_show_ticket))
        .route("/tickets/{id}/skip", post(tickets::skip_ticket))
        // Stations
        .route("/stations/{station}/call-next", post(tickets::call_next))
        // Diagnostic orders
        .route("/tickets/{id}/orders", post(orders::attach_orders))
        .route(
            "/tickets/{id}/orders/current/complete",
            post(orders::complete_current_order),
        )
        .route(
            "/tickets/{id}/orders/{order_id}/start",
            post(orders::start_order),
        )
        .route(
            "/tickets/{id}/orders/{order_id}/complete",
            post(orders::complete_order),
        )
        // Queue projections and stats
        .route("/queue/by-station", get(queue::by_station))
        .route("/queue/sections", get(queue::by_section))
        .route("/queue/order-columns", get(queue::by_order_column))
        .route("/queue/stats", get(queue::stats))
        // Orchestration mode
        .route("/mode", get(queue::get_mode))
        .route("/mode", put(queue::set_mode));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Prometheus scrape endpoint
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::collect_dynamic_metrics(&state);
    crate::metrics::encode_metrics()
}
