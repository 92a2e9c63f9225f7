//! HTTP server for the clinicflow queue engine.

pub mod api;
pub mod metrics;
pub mod state;
