//! The queue engine: ticket registry, order tracker, and transition engine.
//!
//! All commands are synchronous and all-or-nothing. A single `RwLock` around
//! the engine state serializes writers, preserving the invariant that a
//! ticket is in exactly one status/station at a time; queries clone under
//! the read lock so derived views see a consistent snapshot.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics;

use super::error::QueueError;
use super::topology::Topology;
use super::types::{
    Order, OrderStatus, OrderType, PriorityClass, QueueTicket, ServiceMode, Station, TicketStatus,
};

/// Request to check in a patient.
#[derive(Debug, Clone)]
pub struct CheckInRequest {
    /// Patient display name. May be empty.
    pub patient_name: String,
    /// Chief complaint. May be empty.
    pub chief_complaint: String,
    /// Priority class for call-next selection.
    pub priority: PriorityClass,
}

struct EngineState {
    tickets: HashMap<String, QueueTicket>,
    /// Ticket ids in check-in order, for deterministic listings.
    arrivals: Vec<String>,
    mode: ServiceMode,
    next_ticket_number: u64,
    /// Monotonic generation stamped on skipped tickets.
    next_skip_seq: u64,
}

/// The patient queue orchestration engine.
pub struct QueueEngine {
    topology: Topology,
    state: RwLock<EngineState>,
}

impl QueueEngine {
    /// Create an engine with the given topology and initial mode.
    pub fn new(topology: Topology, mode: ServiceMode) -> Self {
        Self {
            topology,
            state: RwLock::new(EngineState {
                tickets: HashMap::new(),
                arrivals: Vec::new(),
                mode,
                next_ticket_number: 1,
                next_skip_seq: 1,
            }),
        }
    }

    /// The station topology this engine was built with.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Check in a patient: creates a ticket at the first station of the
    /// topology, status Queued, with a fresh sequential ticket number.
    pub fn check_in(&self, request: CheckInRequest) -> QueueTicket {
        let mut guard = self.write();
        let state = &mut *guard;
        let station = self.topology.first();

        let number = state.next_ticket_number;
        state.next_ticket_number += 1;

        let ticket = QueueTicket {
            id: Uuid::new_v4().to_string(),
            ticket_number: format!("{}-{:04}", station.code(), number),
            patient_name: request.patient_name,
            chief_complaint: request.chief_complaint,
            priority: request.priority,
            station,
            status: TicketStatus::Queued,
            arrived_at: Utc::now(),
            skip_seq: 0,
            orders: Vec::new(),
            current_order_index: 0,
            completed_at: None,
        };

        info!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            priority = ?ticket.priority,
            "Patient checked in"
        );
        metrics::CHECK_INS
            .with_label_values(&[ticket.priority.as_str()])
            .inc();

        state.arrivals.push(ticket.id.clone());
        state.tickets.insert(ticket.id.clone(), ticket.clone());
        ticket
    }

    /// Call the next patient at a station: among Queued tickets there, pick
    /// the highest priority rank, tie-broken by longest wait (earliest
    /// arrival); skipped tickets wait behind everyone within their rank.
    /// The selected ticket becomes Ready.
    ///
    /// Returns `Ok(None)` when nobody is waiting; that is a no-op, not an
    /// error.
    pub fn call_next(&self, station: Station) -> Result<Option<QueueTicket>, QueueError> {
        if !self.topology.contains(station) {
            return Err(QueueError::StationUnavailable { station });
        }

        let mut guard = self.write();
        let state = &mut *guard;
        let selected = state
            .tickets
            .values()
            .filter(|t| t.station == station && t.status == TicketStatus::Queued)
            .min_by_key(|t| (std::cmp::Reverse(t.priority.rank()), t.queue_key()))
            .map(|t| t.id.clone());

        let Some(id) = selected else {
            debug!(station = %station, "Call-next with empty queue");
            return Ok(None);
        };

        let now = Utc::now();
        let ticket = get_mut(&mut state.tickets, &id)?;
        ticket.status = TicketStatus::Ready;

        info!(ticket_id = %ticket.id, station = %station, "Patient called");
        metrics::CALLS.with_label_values(&[station.code()]).inc();
        metrics::WAIT_AT_CALL_MINUTES.observe(ticket.wait_minutes(now) as f64);

        Ok(Some(ticket.clone()))
    }

    /// Start the session for a Ready ticket.
    pub fn start(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let ticket = get_mut(&mut guard.tickets, ticket_id)?;

        if ticket.status != TicketStatus::Ready {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "start",
            });
        }
        ticket.status = TicketStatus::InSession;

        info!(ticket_id = %ticket.id, station = %ticket.station, "Session started");
        Ok(ticket.clone())
    }

    /// Advance an in-session ticket to its next station.
    ///
    /// - From Return-Consult, `to` selects the manual branch (Pharmacy or
    ///   Billing) and is mandatory; anywhere else `to` must be absent.
    /// - From Consult with attached orders, the ticket enters the order
    ///   phase instead of following the linear path.
    /// - At an order station with unfinished orders, advancing is rejected.
    /// - When the path ends, the ticket completes.
    pub fn advance(
        &self,
        ticket_id: &str,
        to: Option<Station>,
    ) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let mode = state.mode;
        let ticket = get_mut(&mut state.tickets, ticket_id)?;

        if ticket.status != TicketStatus::InSession {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "advance",
            });
        }

        if ticket.station.is_order_station() && ticket.has_open_orders() {
            let remaining = ticket
                .orders
                .iter()
                .filter(|o| o.status != OrderStatus::Completed)
                .count();
            return Err(QueueError::UnfinishedOrders {
                ticket_id: ticket.id.clone(),
                remaining,
            });
        }

        let from = ticket.station;

        if to.is_none() && from == Station::Consult && ticket.has_open_orders() {
            // Leave the linear path and enter the order phase.
            enter_order_phase(ticket, mode);
            info!(
                ticket_id = %ticket.id,
                station = %ticket.station,
                mode = %mode,
                "Ticket entered order phase"
            );
            return Ok(ticket.clone());
        }

        let next = if let Some(dest) = to {
            // Manual branch: only Return-Consult -> Pharmacy | Billing.
            if from != Station::ReturnConsult
                || !matches!(dest, Station::Pharmacy | Station::Billing)
            {
                return Err(QueueError::StationUnavailable { station: dest });
            }
            Some(dest)
        } else if from == Station::ReturnConsult {
            // Pharmacy-vs-Billing is an operator decision, never implied.
            return Err(QueueError::BranchRequired {
                ticket_id: ticket.id.clone(),
            });
        } else if from.is_order_station() {
            // All orders finished at an order station: converge.
            Some(Station::ReturnConsult)
        } else {
            self.topology.next_after(from)
        };

        match next {
            Some(Station::Done) | None => {
                ticket.station = Station::Done;
                ticket.status = TicketStatus::Completed;
                ticket.completed_at = Some(Utc::now());
                metrics::VISITS_COMPLETED.inc();
                info!(ticket_id = %ticket.id, from = %from, "Visit completed");
            }
            Some(station) => {
                ticket.station = station;
                ticket.status = TicketStatus::Queued;
                ticket.skip_seq = 0;
                info!(ticket_id = %ticket.id, from = %from, to = %station, "Patient transferred");
            }
        }
        Ok(ticket.clone())
    }

    /// Complete an in-session ticket at its current station.
    pub fn complete(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let ticket = get_mut(&mut guard.tickets, ticket_id)?;

        if ticket.status != TicketStatus::InSession {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "complete",
            });
        }
        ticket.status = TicketStatus::Completed;
        ticket.completed_at = Some(Utc::now());

        metrics::VISITS_COMPLETED.inc();
        info!(ticket_id = %ticket.id, station = %ticket.station, "Visit completed");
        Ok(ticket.clone())
    }

    /// Mark a waiting (Queued or Ready) ticket as a no-show.
    pub fn no_show(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let ticket = get_mut(&mut guard.tickets, ticket_id)?;

        if !matches!(ticket.status, TicketStatus::Queued | TicketStatus::Ready) {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "mark no-show",
            });
        }
        ticket.status = TicketStatus::NoShow;

        metrics::NO_SHOWS.inc();
        info!(ticket_id = %ticket.id, station = %ticket.station, "Patient marked no-show");
        Ok(ticket.clone())
    }

    /// Send a Queued ticket to the back of its station's queue. Status is
    /// unchanged; this is the only transition that reorders without a status
    /// change. Skipping an already-last ticket leaves the order unchanged.
    pub fn skip(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let ticket = get_mut(&mut state.tickets, ticket_id)?;

        if ticket.status != TicketStatus::Queued {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "skip",
            });
        }
        ticket.skip_seq = state.next_skip_seq;
        state.next_skip_seq += 1;

        info!(ticket_id = %ticket.id, station = %ticket.station, "Patient skipped to back");
        Ok(ticket.clone())
    }

    /// Attach one order per requested type to an in-session ticket at
    /// Consult or an order station. Appending is additive: existing orders
    /// are untouched.
    ///
    /// Initial order status depends on the mode: Pending in Linear (orders
    /// wait behind the cursor), Queued in Multi-Stream (every order is
    /// immediately serviceable).
    pub fn attach_orders(
        &self,
        ticket_id: &str,
        order_types: &[OrderType],
    ) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let mode = state.mode;
        let ticket = get_mut(&mut state.tickets, ticket_id)?;

        let at_ordering_station =
            ticket.station == Station::Consult || ticket.station.is_order_station();
        if ticket.status != TicketStatus::InSession || !at_ordering_station {
            return Err(QueueError::IllegalTransition {
                ticket_id: ticket.id.clone(),
                status: ticket.status,
                action: "attach orders to",
            });
        }

        // Validate every type before mutating anything.
        for order_type in order_types {
            if !self.topology.supports_order_type(*order_type) {
                return Err(QueueError::StationUnavailable {
                    station: order_type.target_station(),
                });
            }
        }

        let initial = match mode {
            ServiceMode::Linear => OrderStatus::Pending,
            ServiceMode::MultiStream => OrderStatus::Queued,
        };
        for order_type in order_types {
            ticket.orders.push(Order::new(*order_type, initial));
            metrics::ORDERS_ATTACHED
                .with_label_values(&[order_type.label()])
                .inc();
        }

        info!(
            ticket_id = %ticket.id,
            count = order_types.len(),
            mode = %mode,
            "Orders attached"
        );
        Ok(ticket.clone())
    }

    /// Start servicing an order (queued -> in_progress).
    ///
    /// In Linear mode only the order at the cursor may be started; in
    /// Multi-Stream every queued order can be started independently.
    pub fn start_order(
        &self,
        ticket_id: &str,
        order_id: &str,
    ) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let mode = state.mode;
        let ticket = get_mut(&mut state.tickets, ticket_id)?;

        let idx = find_order_idx(ticket, order_id)?;
        if mode == ServiceMode::Linear && idx != ticket.current_order_index {
            return Err(QueueError::IllegalOrderTransition {
                order_id: order_id.to_string(),
                from: ticket.orders[idx].status,
                to: OrderStatus::InProgress,
            });
        }
        set_order_status(ticket, idx, OrderStatus::InProgress)?;

        info!(ticket_id = %ticket.id, order_id = %order_id, "Order started");
        Ok(ticket.clone())
    }

    /// Complete an order (in_progress -> completed).
    ///
    /// In Linear mode this advances the cursor: the next order becomes
    /// queued and the ticket moves to its target station; past the last
    /// order the ticket converges onto Return-Consult. In Multi-Stream the
    /// ticket converges only once every order is completed.
    pub fn complete_order(
        &self,
        ticket_id: &str,
        order_id: &str,
    ) -> Result<QueueTicket, QueueError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let mode = state.mode;
        let ticket = get_mut(&mut state.tickets, ticket_id)?;

        let idx = find_order_idx(ticket, order_id)?;
        if mode == ServiceMode::Linear && idx != ticket.current_order_index {
            return Err(QueueError::IllegalOrderTransition {
                order_id: order_id.to_string(),
                from: ticket.orders[idx].status,
                to: OrderStatus::Completed,
            });
        }
        set_order_status(ticket, idx, OrderStatus::Completed)?;
        metrics::ORDERS_COMPLETED
            .with_label_values(&[ticket.orders[idx].order_type.label()])
            .inc();

        match mode {
            ServiceMode::Linear => {
                ticket.current_order_index += 1;
                match ticket.orders.get(ticket.current_order_index) {
                    Some(next) => {
                        let target = next.target_station();
                        let next_idx = ticket.current_order_index;
                        if ticket.orders[next_idx].status == OrderStatus::Pending {
                            ticket.orders[next_idx].status = OrderStatus::Queued;
                        }
                        ticket.station = target;
                        ticket.status = TicketStatus::Queued;
                        ticket.skip_seq = 0;
                    }
                    None => {
                        // Cursor passed the last order: converge.
                        ticket.station = Station::ReturnConsult;
                        ticket.status = TicketStatus::Queued;
                        ticket.skip_seq = 0;
                    }
                }
            }
            ServiceMode::MultiStream => {
                // Converge once the last outstanding order finishes. A
                // ticket still in session (orders finished before the
                // consult ended) converges later via advance.
                if !ticket.has_open_orders() && ticket.status != TicketStatus::InSession {
                    ticket.station = Station::ReturnConsult;
                    ticket.status = TicketStatus::Queued;
                    ticket.skip_seq = 0;
                }
            }
        }

        info!(
            ticket_id = %ticket.id,
            order_id = %order_id,
            station = %ticket.station,
            "Order completed"
        );
        Ok(ticket.clone())
    }

    /// Complete the order at the Linear cursor. Rejected in Multi-Stream
    /// mode, where no cursor exists.
    pub fn complete_current_order(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        let order_id = {
            let state = self.read();
            let ticket = state
                .tickets
                .get(ticket_id)
                .ok_or_else(|| QueueError::TicketNotFound {
                    ticket_id: ticket_id.to_string(),
                })?;
            if state.mode != ServiceMode::Linear {
                return Err(QueueError::IllegalTransition {
                    ticket_id: ticket.id.clone(),
                    status: ticket.status,
                    action: "complete current order for",
                });
            }
            ticket
                .current_order()
                .map(|o| o.id.clone())
                .ok_or_else(|| QueueError::OrderNotFound {
                    ticket_id: ticket_id.to_string(),
                    order_id: "current".to_string(),
                })?
        };
        self.complete_order(ticket_id, &order_id)
    }

    /// Switch the orchestration mode. Applied atomically between projection
    /// reads; existing order statuses are untouched.
    pub fn set_mode(&self, mode: ServiceMode) -> ServiceMode {
        let mut guard = self.write();
        let previous = guard.mode;
        guard.mode = mode;
        if previous != mode {
            metrics::MODE_SWITCHES.inc();
            info!(from = %previous, to = %mode, "Orchestration mode changed");
        }
        previous
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The current orchestration mode.
    pub fn mode(&self) -> ServiceMode {
        self.read().mode
    }

    /// Get a ticket snapshot by id.
    pub fn get(&self, ticket_id: &str) -> Result<QueueTicket, QueueError> {
        self.read()
            .tickets
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| QueueError::TicketNotFound {
                ticket_id: ticket_id.to_string(),
            })
    }

    /// Snapshot of all tickets in check-in order, terminal ones included.
    pub fn list(&self) -> Vec<QueueTicket> {
        let state = self.read();
        state
            .arrivals
            .iter()
            .filter_map(|id| state.tickets.get(id).cloned())
            .collect()
    }
}

/// Move a ticket from Consult into the order phase.
fn enter_order_phase(ticket: &mut QueueTicket, mode: ServiceMode) {
    let first_open = ticket
        .orders
        .iter()
        .position(|o| o.status != OrderStatus::Completed)
        .unwrap_or(0);
    ticket.current_order_index = first_open;
    if mode == ServiceMode::Linear && ticket.orders[first_open].status == OrderStatus::Pending {
        ticket.orders[first_open].status = OrderStatus::Queued;
    }
    ticket.station = ticket.orders[first_open].target_station();
    ticket.status = TicketStatus::Queued;
    ticket.skip_seq = 0;
}

fn get_mut<'a>(
    tickets: &'a mut HashMap<String, QueueTicket>,
    ticket_id: &str,
) -> Result<&'a mut QueueTicket, QueueError> {
    tickets
        .get_mut(ticket_id)
        .ok_or_else(|| QueueError::TicketNotFound {
            ticket_id: ticket_id.to_string(),
        })
}

fn find_order_idx(ticket: &QueueTicket, order_id: &str) -> Result<usize, QueueError> {
    ticket
        .orders
        .iter()
        .position(|o| o.id == order_id)
        .ok_or_else(|| QueueError::OrderNotFound {
            ticket_id: ticket.id.clone(),
            order_id: order_id.to_string(),
        })
}

fn set_order_status(
    ticket: &mut QueueTicket,
    idx: usize,
    to: OrderStatus,
) -> Result<(), QueueError> {
    let from = ticket.orders[idx].status;
    if !from.can_advance_to(to) {
        return Err(QueueError::IllegalOrderTransition {
            order_id: ticket.orders[idx].id.clone(),
            from,
            to,
        });
    }
    ticket.orders[idx].status = to;
    Ok(())
}
