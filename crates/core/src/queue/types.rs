//! Core queue data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Stations
// ============================================================================

/// A discrete stage of the clinical visit.
///
/// `Lab` and `Imaging` are "order stations": patients only occupy them via
/// diagnostic orders, never through the linear path. They are removed from
/// the topology entirely when diagnostic fulfillment is disabled for the
/// tenant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Station {
    CheckIn,
    Triage,
    Consult,
    ReturnConsult,
    Lab,
    Imaging,
    Pharmacy,
    Billing,
    Done,
}

impl Station {
    /// Returns true if this station is serviced through diagnostic orders.
    pub fn is_order_station(&self) -> bool {
        matches!(self, Station::Lab | Station::Imaging)
    }

    /// Short code used to qualify generated ticket numbers.
    pub fn code(&self) -> &'static str {
        match self {
            Station::CheckIn => "CI",
            Station::Triage => "TR",
            Station::Consult => "CO",
            Station::ReturnConsult => "RC",
            Station::Lab => "LB",
            Station::Imaging => "IM",
            Station::Pharmacy => "PH",
            Station::Billing => "BL",
            Station::Done => "DN",
        }
    }

    /// Human-readable station name for display layers.
    pub fn label(&self) -> &'static str {
        match self {
            Station::CheckIn => "Check-In",
            Station::Triage => "Triage",
            Station::Consult => "Consult",
            Station::ReturnConsult => "Return-Consult",
            Station::Lab => "Lab",
            Station::Imaging => "Imaging",
            Station::Pharmacy => "Pharmacy",
            Station::Billing => "Billing",
            Station::Done => "Done",
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Priority
// ============================================================================

/// Priority class of a patient, used only for call-next selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Normal,
    Senior,
    Pwd,
    Emergency,
}

impl PriorityClass {
    /// Selection rank: higher is called first. Senior and PWD are tied.
    pub fn rank(&self) -> u8 {
        match self {
            PriorityClass::Emergency => 2,
            PriorityClass::Senior | PriorityClass::Pwd => 1,
            PriorityClass::Normal => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityClass::Normal => "normal",
            PriorityClass::Senior => "senior",
            PriorityClass::Pwd => "pwd",
            PriorityClass::Emergency => "emergency",
        }
    }
}

impl Default for PriorityClass {
    fn default() -> Self {
        PriorityClass::Normal
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Status of a single diagnostic order.
///
/// The only legal chain is pending -> queued -> in_progress -> completed.
/// No skipping, no reverting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Queued,
    InProgress,
    Completed,
}

impl OrderStatus {
    /// Returns true if `next` is the immediate successor of this status.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Queued)
                | (OrderStatus::Queued, OrderStatus::InProgress)
                | (OrderStatus::InProgress, OrderStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Queued => "queued",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of diagnostic or procedural order a physician can attach.
///
/// The target station is a fixed property of the order type; an order never
/// changes station once created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    LabCbc,
    LabUrinalysis,
    LabBloodChem,
    XRay,
    Ultrasound,
}

impl OrderType {
    /// Every known order type, in display order.
    pub const ALL: [OrderType; 5] = [
        OrderType::LabCbc,
        OrderType::LabUrinalysis,
        OrderType::LabBloodChem,
        OrderType::XRay,
        OrderType::Ultrasound,
    ];

    /// The station where this order is fulfilled.
    pub fn target_station(&self) -> Station {
        match self {
            OrderType::LabCbc | OrderType::LabUrinalysis | OrderType::LabBloodChem => Station::Lab,
            OrderType::XRay | OrderType::Ultrasound => Station::Imaging,
        }
    }

    /// Display label, also used as the Multi-Stream column heading.
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::LabCbc => "Lab CBC",
            OrderType::LabUrinalysis => "Lab Urinalysis",
            OrderType::LabBloodChem => "Lab Blood Chemistry",
            OrderType::XRay => "X-Ray",
            OrderType::Ultrasound => "Ultrasound",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A diagnostic order attached to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique identifier (UUID).
    pub id: String,
    /// What was ordered. Determines the target station, immutably.
    pub order_type: OrderType,
    /// Current status.
    pub status: OrderStatus,
    /// When the order was attached.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with the given initial status.
    pub fn new(order_type: OrderType, status: OrderStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_type,
            status,
            created_at: Utc::now(),
        }
    }

    /// The station where this order is fulfilled.
    pub fn target_station(&self) -> Station {
        self.order_type.target_station()
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Status of a queue ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Queued,
    Ready,
    InSession,
    Completed,
    NoShow,
}

impl TicketStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Queued,
        TicketStatus::Ready,
        TicketStatus::InSession,
        TicketStatus::Completed,
        TicketStatus::NoShow,
    ];

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::NoShow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Queued => "queued",
            TicketStatus::Ready => "ready",
            TicketStatus::InSession => "in_session",
            TicketStatus::Completed => "completed",
            TicketStatus::NoShow => "no_show",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The queue record representing one patient's single visit instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueTicket {
    /// Unique identifier (UUID).
    pub id: String,
    /// Generated ticket number, monotonic and qualified by the check-in
    /// station code (e.g. "CI-0042").
    pub ticket_number: String,
    /// Patient display name. May be empty, never absent.
    pub patient_name: String,
    /// Chief complaint recorded at check-in. May be empty.
    pub chief_complaint: String,
    /// Priority class for call-next selection.
    pub priority: PriorityClass,
    /// Current station.
    pub station: Station,
    /// Current status.
    pub status: TicketStatus,
    /// Arrival timestamp, the source of wait time.
    pub arrived_at: DateTime<Utc>,
    /// Skip generation. Zero until the ticket is skipped, reset whenever it
    /// re-enters Queued at a station; a skip stamps a fresh generation that
    /// sorts the ticket behind every waiting ticket.
    pub skip_seq: u64,
    /// Orders attached during the visit, in attach order. Never removed.
    pub orders: Vec<Order>,
    /// Linear-mode cursor into `orders`: the order currently being serviced.
    /// Monotonically non-decreasing, never exceeds `orders.len()`.
    pub current_order_index: usize,
    /// Set when the ticket reaches Completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueTicket {
    /// Minutes the patient has been in the clinic, recomputed on every read.
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.arrived_at).num_minutes().max(0)
    }

    /// Queue ordering key within one priority rank: never-skipped tickets
    /// compare by longest wait (earliest arrival); skipped tickets sort
    /// behind everyone, in skip order. The ticket number settles
    /// same-instant arrivals.
    pub fn queue_key(&self) -> (u64, DateTime<Utc>, String) {
        (self.skip_seq, self.arrived_at, self.ticket_number.clone())
    }

    /// Returns true if the ticket is still in the active set.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Returns true if at least one order has not completed.
    pub fn has_open_orders(&self) -> bool {
        self.orders
            .iter()
            .any(|o| o.status != OrderStatus::Completed)
    }

    /// Returns true if the ticket has orders and every one is completed.
    pub fn all_orders_completed(&self) -> bool {
        !self.orders.is_empty() && !self.has_open_orders()
    }

    /// The order at the Linear cursor, if the cursor has not passed the end.
    pub fn current_order(&self) -> Option<&Order> {
        self.orders.get(self.current_order_index)
    }

    /// Find an order by id.
    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }
}

// ============================================================================
// Orchestration mode and sections
// ============================================================================

/// Orchestration policy for traversing stations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMode {
    /// One station/order at a time, strictly sequential.
    Linear,
    /// Outstanding orders serviced in parallel across order-type columns.
    MultiStream,
}

impl Default for ServiceMode {
    fn default() -> Self {
        ServiceMode::Linear
    }
}

impl std::fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceMode::Linear => write!(f, "linear"),
            ServiceMode::MultiStream => write!(f, "multi_stream"),
        }
    }
}

/// Multi-Stream macro-grouping, derived purely from ticket and order state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    PreConsult,
    Orders,
    PostOrders,
    Done,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PreConsult => "pre_consult",
            Section::Orders => "orders",
            Section::PostOrders => "post_orders",
            Section::Done => "done",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
