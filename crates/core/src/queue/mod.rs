//! Patient queue domain: tickets, orders, station topology, and the
//! transition engine, plus the derived projections served to display
//! layers.

mod engine;
mod error;
mod projection;
mod section;
mod stats;
mod topology;
mod types;

pub use engine::{CheckInRequest, QueueEngine};
pub use error::{ErrorKind, QueueError};
pub use projection::{OrderColumn, SectionView, StationQueue, TicketGroup};
pub use section::classify;
pub use stats::QueueStats;
pub use topology::Topology;
pub use types::{
    Order, OrderStatus, OrderType, PriorityClass, QueueTicket, Section, ServiceMode, Station,
    TicketStatus,
};
