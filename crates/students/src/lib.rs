//! `campusledger-students` — student records and grade progression.
//!
//! Grade levels are modeled as a tagged variant ([`GradeLevel`]) produced by a
//! parser at the system boundary; the progression rule table operates purely on
//! the variant, so free-text label parsing never reaches the promotion hot path.

pub mod grade;
pub mod progression;
pub mod student;

pub use grade::{CompletionCategory, GradeError, GradeLevel, SchoolType};
pub use progression::{next_level, Progression};
pub use student::{Student, StudentId};
