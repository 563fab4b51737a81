//! Infrastructure layer: in-memory stores, audit sinks, and the scheduler host.

pub mod audit;
pub mod scheduler;
pub mod stores;


pub use audit::{InMemoryAuditSink, TracingAuditSink};
pub use scheduler::{
    PromotionScheduler, SchedulerConfig, SchedulerHandle, SchedulerStats, TickOutcome,
};
pub use stores::{
    InMemoryConfigStore, InMemoryFeeStore, InMemoryStudentStore, InMemoryTenantDirectory,
};
