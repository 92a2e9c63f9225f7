//! Queue-wide statistics, recomputed on demand from the live ticket set.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::QueueEngine;
use super::types::{QueueTicket, TicketStatus};

/// Snapshot of queue health at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStats {
    /// Non-terminal tickets currently in the clinic.
    pub active: usize,
    /// Mean wait among active tickets, in minutes. Zero when idle.
    pub avg_wait_minutes: f64,
    /// Longest wait among active tickets, in minutes.
    pub max_wait_minutes: i64,
    /// Tickets that reached Completed during the current operating day.
    pub completed_today: usize,
}

/// Compute stats over a ticket snapshot. Wait time is the wall-clock delta
/// from check-in, so the same snapshot yields different waits as `now`
/// advances.
pub fn compute(tickets: &[QueueTicket], now: DateTime<Utc>) -> QueueStats {
    let waits: Vec<i64> = tickets
        .iter()
        .filter(|t| t.is_active())
        .map(|t| t.wait_minutes(now))
        .collect();

    let active = waits.len();
    let avg_wait_minutes = if active == 0 {
        0.0
    } else {
        waits.iter().sum::<i64>() as f64 / active as f64
    };
    let max_wait_minutes = waits.iter().copied().max().unwrap_or(0);

    let today = now.date_naive();
    let completed_today = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Completed)
        .filter(|t| {
            t.completed_at
                .map(|at| at.date_naive() == today)
                .unwrap_or(false)
        })
        .count();

    QueueStats {
        active,
        avg_wait_minutes,
        max_wait_minutes,
        completed_today,
    }
}

impl QueueEngine {
    /// Stats over the current ticket set, evaluated at the current time.
    pub fn stats(&self) -> QueueStats {
        compute(&self.list(), Utc::now())
    }
}
