//! In-memory implementations of the promotion ports, for tests and dev.

pub mod configs;
pub mod fees;
pub mod students;
pub mod tenants;

pub use configs::InMemoryConfigStore;
pub use fees::InMemoryFeeStore;
pub use students::InMemoryStudentStore;
pub use tenants::InMemoryTenantDirectory;
