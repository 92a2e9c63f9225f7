use std::sync::Arc;
use clinicflow_core::{AuditHandle, AuditStore, Config, QueueEngine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<QueueEngine>,
    audit_handle: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: Arc<QueueEngine>,
        audit_handle: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            config,
            engine,
            audit_handle,
            audit_store,
        }
    }

    pub fn engine(&self) -> &QueueEngine {
        &self.engine
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit_handle
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}
