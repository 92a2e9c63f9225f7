//! Section classification.
//!
//! Pure function placing a ticket into one of the four Multi-Stream
//! macro-groupings. Rules are evaluated in priority order; the first match
//! wins. The function is total: every ticket classifies into a section.

use super::types::{OrderStatus, QueueTicket, Section, Station, TicketStatus};

/// Classify a ticket into its Multi-Stream section.
pub fn classify(ticket: &QueueTicket) -> Section {
    // 1. Terminal tickets, or tickets that reached the Done station.
    if ticket.status == TicketStatus::Completed
        || ticket.status == TicketStatus::NoShow
        || ticket.station == Station::Done
    {
        return Section::Done;
    }

    // 2. At Return-Consult, or past it with every order finished.
    let at_checkout = matches!(ticket.station, Station::Pharmacy | Station::Billing);
    if ticket.station == Station::ReturnConsult
        || (at_checkout && ticket.orders.iter().all(|o| o.status == OrderStatus::Completed))
    {
        return Section::PostOrders;
    }

    // 3. Orders still being worked through.
    if !ticket.orders.is_empty() && ticket.has_open_orders() {
        return Section::Orders;
    }

    // 4. All orders finished but the ticket has not converged yet.
    if ticket.all_orders_completed() {
        return Section::PostOrders;
    }

    // 5. No orders, still on the front half of the visit.
    if matches!(
        ticket.station,
        Station::CheckIn | Station::Triage | Station::Consult
    ) {
        return Section::PreConsult;
    }

    // 6. No orders at a checkout station.
    if at_checkout {
        return Section::PostOrders;
    }

    // 7. Fallback.
    Section::PreConsult
}
