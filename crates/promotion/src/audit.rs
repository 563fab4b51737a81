//! Structured audit entries emitted for every student mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campusledger_core::TenantId;
use campusledger_students::{CompletionCategory, StudentId};

/// What happened to the student, with before/after grade labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Promoted { from: String, to: String },
    Completed { from: String, category: CompletionCategory },
    Demoted { from: String, to: String },
}

/// One audit fact. Treated as immutable and append-only by sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub tenant_id: TenantId,
    pub student_id: StudentId,
    pub action: AuditAction,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        tenant_id: TenantId,
        student_id: StudentId,
        action: AuditAction,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            student_id,
            action,
            occurred_at,
        }
    }

    /// Stable entry name for sinks that index by type.
    pub fn entry_type(&self) -> &'static str {
        match self.action {
            AuditAction::Promoted { .. } => "promotion.student.promoted",
            AuditAction::Completed { .. } => "promotion.student.completed",
            AuditAction::Demoted { .. } => "promotion.student.demoted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusledger_core::AggregateId;

    #[test]
    fn entry_types_are_stable() {
        let entry = AuditEntry::new(
            TenantId::new(),
            StudentId::new(AggregateId::new()),
            AuditAction::Promoted {
                from: "Grade 3".into(),
                to: "Grade 4".into(),
            },
            Utc::now(),
        );
        assert_eq!(entry.entry_type(), "promotion.student.promoted");
    }
}
