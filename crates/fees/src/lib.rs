//! `campusledger-fees` — academic cycles, fee structures, and fee records.
//!
//! Amounts are `u64` in the smallest currency unit (cents); arithmetic is
//! checked and overflow surfaces as a domain invariant violation. The
//! carry-forward calculator here is a pure computation over supplied numbers —
//! it never consults grade-progression logic.

pub mod cycle;
pub mod record;
pub mod structure;

pub use cycle::AcademicCycle;
pub use record::{FeeRecord, FeeRecordId};
pub use structure::{Discount, FeeComponent, FeeStructure};
