pub mod audit;
pub mod config;
pub mod metrics;
pub mod queue;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditEventEnvelope, AuditFilter, AuditHandle,
    AuditRecord, AuditStore, AuditWriter, MemoryAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ClinicConfig, Config, ConfigError,
    SanitizedConfig, ServerConfig,
};
pub use queue::{
    classify, CheckInRequest, ErrorKind, Order, OrderColumn, OrderStatus, OrderType,
    PriorityClass, QueueEngine, QueueError, QueueStats, QueueTicket, Section, SectionView,
    ServiceMode, Station, StationQueue, TicketGroup, TicketStatus, Topology,
};
