use std::collections::VecDeque;
use std::sync::Mutex;

use super::{AuditError, AuditFilter, AuditRecord, AuditStore};

/// In-memory ring-buffer audit store.
///
/// Keeps the most recent `capacity` records; older records are evicted as
/// new ones arrive. Record ids keep incrementing across evictions, so an id
/// identifies an event for the lifetime of the process.
pub struct MemoryAuditStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

struct Inner {
    records: VecDeque<AuditRecord>,
    next_id: i64,
}

impl MemoryAuditStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: VecDeque::with_capacity(capacity),
                next_id: 1,
            }),
            capacity,
        }
    }

    fn matches(record: &AuditRecord, filter: &AuditFilter) -> bool {
        if let Some(ticket_id) = &filter.ticket_id {
            if record.ticket_id.as_deref() != Some(ticket_id.as_str()) {
                return false;
            }
        }
        if let Some(event_type) = &filter.event_type {
            if record.event_type != *event_type {
                return false;
            }
        }
        if let Some(from) = filter.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(to) = filter.to {
            if record.timestamp > to {
                return false;
            }
        }
        true
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;

        let mut stored = record.clone();
        stored.id = id;
        if inner.records.len() == self.capacity {
            inner.records.pop_front();
        }
        inner.records.push_back(stored);
        Ok(id)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let results = inner
            .records
            .iter()
            .rev()
            .filter(|r| Self::matches(r, filter))
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(results)
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .records
            .iter()
            .filter(|r| Self::matches(r, filter))
            .count() as i64)
    }
}
