//! Audit sink implementations

use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::domain::audit::{AuditEvent, AuditSink};
use crate::domain::DomainError;

/// In-memory audit sink for tests and local runs.
///
/// Events accumulate in order of delivery; `set_should_fail` simulates
/// an unreachable sink so callers can verify that mutations survive
/// delivery failures.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
    should_fail: RwLock<bool>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().expect("lock poisoned") = fail;
    }

    /// Snapshot of all delivered events, in delivery order
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError> {
        if *self.should_fail.read().expect("lock poisoned") {
            return Err(DomainError::telemetry("audit sink unreachable"));
        }

        self.events
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?
            .push(event);
        Ok(())
    }
}

/// Audit sink that writes structured log lines.
///
/// A fallback for deployments without a dedicated audit store.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), DomainError> {
        info!(
            actor = %event.actor,
            action = %event.action,
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            details = %event.details,
            "audit event"
        );
        Ok(())
    }
}
