//! Ports the promotion engine needs from the outside world.
//!
//! The engine owns no persistence; collaborators supply implementations of
//! these traits (in-memory versions live in `campusledger-infra`).

use chrono::NaiveDate;

use campusledger_core::TenantId;
use campusledger_fees::{AcademicCycle, FeeRecord, FeeRecordId};
use campusledger_students::{SchoolType, Student, StudentId};

use crate::audit::AuditEntry;
use crate::config::{ConfigId, PromotionRunConfig, RunStatus};

/// Store-level error shared by the ports.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("tenant isolation violation")]
    TenantIsolation,

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Compare-and-set on a run status lost the race (or the run was never
    /// in the required status to begin with).
    #[error("status conflict: expected {expected:?}, found {actual:?}")]
    StatusConflict {
        expected: RunStatus,
        actual: RunStatus,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Resolves a tenant to its school-type classification.
///
/// Must succeed before a run begins; an unresolvable tenant fails the whole
/// operation fast, before any student is touched.
pub trait TenantDirectory: Send + Sync {
    fn school_type(&self, tenant_id: TenantId) -> Result<Option<SchoolType>, StoreError>;
}

/// Read/write access to student records.
pub trait StudentStore: Send + Sync {
    /// All active students for a tenant.
    fn find_active(&self, tenant_id: TenantId) -> Result<Vec<Student>, StoreError>;

    fn get(&self, tenant_id: TenantId, id: StudentId) -> Result<Option<Student>, StoreError>;

    fn save(&self, student: &Student) -> Result<(), StoreError>;
}

/// The fee side of promotion: prior balances in, new records out.
pub trait FeeService: Send + Sync {
    /// Outstanding balance on the student's most recent fee record, if any.
    fn latest_outstanding(
        &self,
        tenant_id: TenantId,
        student_id: StudentId,
    ) -> Result<Option<u64>, StoreError>;

    /// Persist the fee record created for a freshly promoted student.
    fn create_promotion_record(&self, record: FeeRecord) -> Result<FeeRecordId, StoreError>;
}

/// Receives one structured entry per student mutation for traceability.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Persistence for promotion run configurations.
pub trait ConfigStore: Send + Sync {
    /// Insert a new config. Rejects a second config for the same
    /// (tenant, target cycle) pair.
    fn insert(&self, config: PromotionRunConfig) -> Result<ConfigId, StoreError>;

    fn get(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
    ) -> Result<Option<PromotionRunConfig>, StoreError>;

    fn update(&self, config: &PromotionRunConfig) -> Result<(), StoreError>;

    fn find_by_cycle(
        &self,
        tenant_id: TenantId,
        cycle: &AcademicCycle,
    ) -> Result<Option<PromotionRunConfig>, StoreError>;

    /// Configs across all tenants that are due on `date` (scheduled, active,
    /// trigger date reached).
    fn find_due(&self, date: NaiveDate) -> Result<Vec<PromotionRunConfig>, StoreError>;

    /// Atomically move a config from `from` to `to`.
    ///
    /// This is the engine's only defense against double execution: two
    /// concurrent triggers of the same scheduled config race here, and the
    /// loser gets [`StoreError::StatusConflict`].
    fn transition(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
        from: RunStatus,
        to: RunStatus,
    ) -> Result<PromotionRunConfig, StoreError>;
}
