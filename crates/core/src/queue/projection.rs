//! Read-only groupings derived from the ticket registry.
//!
//! Projections are pure functions of a ticket snapshot; the engine wrappers
//! clone under the read lock so every view is internally consistent. Linear
//! consumers read the per-station queues; Multi-Stream consumers read the
//! section buckets and order columns.

use serde::Serialize;

use super::engine::QueueEngine;
use super::section::classify;
use super::topology::Topology;
use super::types::{OrderStatus, OrderType, QueueTicket, Section, Station, TicketStatus};

/// One station's queue in the Linear view.
#[derive(Debug, Clone, Serialize)]
pub struct StationQueue {
    pub station: Station,
    pub tickets: Vec<QueueTicket>,
}

/// A sub-grouping inside a section bucket: per-station for the pre-consult
/// and post-orders sections, per-order-type for the orders section.
#[derive(Debug, Clone, Serialize)]
pub struct TicketGroup {
    pub label: String,
    pub tickets: Vec<QueueTicket>,
}

/// One section bucket of the Multi-Stream view.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub groups: Vec<TicketGroup>,
}

/// One order-type column of the Multi-Stream view. A ticket with
/// outstanding orders of several types appears in each of those columns.
#[derive(Debug, Clone, Serialize)]
pub struct OrderColumn {
    pub order_type: OrderType,
    pub tickets: Vec<QueueTicket>,
}

/// Linear view: every non-terminal station in path order, each with its
/// active tickets. Ready and in-session tickets come first (the "being
/// served" slot), then the queue in arrival order.
pub fn by_station(topology: &Topology, tickets: &[QueueTicket]) -> Vec<StationQueue> {
    topology
        .stations()
        .into_iter()
        .filter(|s| *s != Station::Done)
        .map(|station| {
            let mut at_station: Vec<QueueTicket> = tickets
                .iter()
                .filter(|t| t.is_active() && t.station == station)
                .cloned()
                .collect();
            at_station.sort_by_key(|t| (serving_slot(t.status), t.queue_key()));
            StationQueue {
                station,
                tickets: at_station,
            }
        })
        .collect()
}

/// Multi-Stream view: the three live section buckets. Completed and no-show
/// tickets fall into the Done section, which is not displayed and therefore
/// not emitted here.
pub fn by_section(tickets: &[QueueTicket]) -> Vec<SectionView> {
    vec![
        SectionView {
            section: Section::PreConsult,
            groups: station_groups(
                tickets,
                Section::PreConsult,
                &[Station::CheckIn, Station::Triage, Station::Consult],
            ),
        },
        SectionView {
            section: Section::Orders,
            groups: order_type_groups(tickets),
        },
        SectionView {
            section: Section::PostOrders,
            groups: station_groups(
                tickets,
                Section::PostOrders,
                &[Station::ReturnConsult, Station::Pharmacy, Station::Billing],
            ),
        },
    ]
}

/// Multi-Stream order columns: one per known order type, each listing the
/// tickets that still have an outstanding order of that type.
pub fn by_order_column(tickets: &[QueueTicket]) -> Vec<OrderColumn> {
    OrderType::ALL
        .iter()
        .map(|order_type| {
            let mut in_column: Vec<QueueTicket> = tickets
                .iter()
                .filter(|t| {
                    t.is_active()
                        && t.orders
                            .iter()
                            .any(|o| o.order_type == *order_type && o.status != OrderStatus::Completed)
                })
                .cloned()
                .collect();
            in_column.sort_by_key(|t| t.queue_key());
            OrderColumn {
                order_type: *order_type,
                tickets: in_column,
            }
        })
        .collect()
}

fn serving_slot(status: TicketStatus) -> u8 {
    match status {
        TicketStatus::InSession => 0,
        TicketStatus::Ready => 1,
        _ => 2,
    }
}

fn station_groups(
    tickets: &[QueueTicket],
    section: Section,
    stations: &[Station],
) -> Vec<TicketGroup> {
    stations
        .iter()
        .map(|station| {
            let mut group: Vec<QueueTicket> = tickets
                .iter()
                .filter(|t| classify(t) == section && t.station == *station)
                .cloned()
                .collect();
            group.sort_by_key(|t| (serving_slot(t.status), t.queue_key()));
            TicketGroup {
                label: station.label().to_string(),
                tickets: group,
            }
        })
        .collect()
}

fn order_type_groups(tickets: &[QueueTicket]) -> Vec<TicketGroup> {
    let in_orders: Vec<&QueueTicket> = tickets
        .iter()
        .filter(|t| classify(t) == Section::Orders)
        .collect();
    OrderType::ALL
        .iter()
        .map(|order_type| {
            let mut group: Vec<QueueTicket> = in_orders
                .iter()
                .filter(|t| {
                    t.orders
                        .iter()
                        .any(|o| o.order_type == *order_type && o.status != OrderStatus::Completed)
                })
                .map(|t| (*t).clone())
                .collect();
            group.sort_by_key(|t| t.queue_key());
            TicketGroup {
                label: order_type.label().to_string(),
                tickets: group,
            }
        })
        .collect()
}

impl QueueEngine {
    /// Linear view of the live queues, one entry per station in path order.
    pub fn list_by_station(&self) -> Vec<StationQueue> {
        by_station(self.topology(), &self.list())
    }

    /// Multi-Stream section buckets.
    pub fn list_by_section(&self) -> Vec<SectionView> {
        by_section(&self.list())
    }

    /// Multi-Stream order columns.
    pub fn list_by_order_column(&self) -> Vec<OrderColumn> {
        by_order_column(&self.list())
    }
}
