//! `campusledger-promotion` — the year-end academic promotion engine.
//!
//! The engine advances every eligible student to their next grade (or marks
//! them as having completed their phase) in one logical pass:
//!
//! 1. a [`Snapshot`](snapshot::Snapshot) of eligible students grouped by their
//!    *current* grade is fully materialized before any mutation,
//! 2. a [`PromotionPlan`](plan::PromotionPlan) of intended mutations is
//!    computed from that snapshot alone, so a student promoted into a grade
//!    during the run can never be picked up again in the same run,
//! 3. the [`PromotionEngine`](engine::PromotionEngine) applies each planned
//!    action inside a per-student error boundary and accumulates a
//!    [`PromotionSummary`](summary::PromotionSummary).
//!
//! Around the engine sits the run lifecycle: a per-tenant
//! [`PromotionRunConfig`](config::PromotionRunConfig) whose status guard
//! (compare-and-set `Scheduled -> InProgress`) makes runs safely
//! re-triggerable, and automatic rollover to the next cycle's config after a
//! successful run.

pub mod audit;
pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod plan;
pub mod ports;
pub mod snapshot;
pub mod summary;

pub use audit::{AuditAction, AuditEntry};
pub use config::{ConfigId, CreatedBy, PromotionRunConfig, RunCounters, RunStatus};
pub use engine::{PromotionEngine, PromotionRequest};
pub use lifecycle::LifecycleManager;
pub use plan::{plan, PlannedAction, PlannedOutcome, PromotionPlan};
pub use ports::{AuditSink, ConfigStore, FeeService, StoreError, StudentStore, TenantDirectory};
pub use snapshot::Snapshot;
pub use summary::{CompletedStudent, GradeBreakdown, PromotionSummary, StudentError};
