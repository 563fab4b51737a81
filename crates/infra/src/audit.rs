//! Audit sink implementations.

use std::sync::{Arc, RwLock};

use tracing::info;

use campusledger_promotion::{AuditEntry, AuditSink};

/// Collects entries in memory for inspection (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) {
        self.entries.write().unwrap().push(entry);
    }
}

/// Forwards entries to the structured log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        info!(
            entry_type = entry.entry_type(),
            tenant_id = %entry.tenant_id,
            student_id = %entry.student_id,
            action = ?entry.action,
            occurred_at = %entry.occurred_at,
            "audit entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusledger_core::{AggregateId, TenantId};
    use campusledger_promotion::AuditAction;
    use campusledger_students::StudentId;
    use chrono::Utc;

    #[test]
    fn in_memory_sink_keeps_entries_in_order() {
        let sink = InMemoryAuditSink::new();
        let tenant = TenantId::new();
        let student = StudentId::new(AggregateId::new());

        sink.record(AuditEntry::new(
            tenant,
            student,
            AuditAction::Promoted {
                from: "Grade 1".into(),
                to: "Grade 2".into(),
            },
            Utc::now(),
        ));
        sink.record(AuditEntry::new(
            tenant,
            student,
            AuditAction::Demoted {
                from: "Grade 2".into(),
                to: "Grade 1".into(),
            },
            Utc::now(),
        ));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_type(), "promotion.student.promoted");
        assert_eq!(entries[1].entry_type(), "promotion.student.demoted");
    }
}
