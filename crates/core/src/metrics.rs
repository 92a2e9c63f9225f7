//! Prometheus metrics for the queue engine.
//!
//! Counters are incremented inside the engine as commands succeed; the
//! server crate owns the registry and scrape endpoint.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ticket lifecycle
// =============================================================================

/// Check-ins total by priority class.
pub static CHECK_INS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clinicflow_check_ins_total", "Total patient check-ins"),
        &["priority"], // "normal", "senior", "pwd", "emergency"
    )
    .unwrap()
});

/// Call-next selections total by station.
pub static CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clinicflow_calls_total", "Total patients called"),
        &["station"],
    )
    .unwrap()
});

/// Wait time observed when a patient is called, in minutes.
pub static WAIT_AT_CALL_MINUTES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "clinicflow_wait_at_call_minutes",
            "Minutes waited from check-in until being called",
        )
        .buckets(vec![1.0, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0]),
    )
    .unwrap()
});

/// Visits completed total.
pub static VISITS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clinicflow_visits_completed_total", "Total visits completed").unwrap()
});

/// No-shows total.
pub static NO_SHOWS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clinicflow_no_shows_total",
        "Total patients marked as no-show",
    )
    .unwrap()
});

// =============================================================================
// Orders
// =============================================================================

/// Orders attached total by order type.
pub static ORDERS_ATTACHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clinicflow_orders_attached_total", "Total orders attached"),
        &["order_type"],
    )
    .unwrap()
});

/// Orders completed total by order type.
pub static ORDERS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clinicflow_orders_completed_total", "Total orders completed"),
        &["order_type"],
    )
    .unwrap()
});

// =============================================================================
// Orchestration
// =============================================================================

/// Mode switches total (Linear <-> Multi-Stream).
pub static MODE_SWITCHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clinicflow_mode_switches_total",
        "Total orchestration mode changes",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CHECK_INS.clone()),
        Box::new(CALLS.clone()),
        Box::new(WAIT_AT_CALL_MINUTES.clone()),
        Box::new(VISITS_COMPLETED.clone()),
        Box::new(NO_SHOWS.clone()),
        Box::new(ORDERS_ATTACHED.clone()),
        Box::new(ORDERS_COMPLETED.clone()),
        Box::new(MODE_SWITCHES.clone()),
    ]
}
