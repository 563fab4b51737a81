//! `campusledger-observability` — logging/tracing setup for the process.

pub mod tracing;

pub use tracing::{init, init_pretty};
