//! Result reporting for one promotion run.

use serde::{Deserialize, Serialize};

use campusledger_students::{CompletionCategory, StudentId};

/// Grade label used in breakdowns for students who finished their phase.
pub const COMPLETED_LABEL: &str = "COMPLETED";

/// Per-grade stats: where the group started, where it went, how it fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBreakdown {
    pub from_grade: String,
    /// Destination grade label, or [`COMPLETED_LABEL`].
    pub to_grade: String,
    pub students: u32,
    pub succeeded: u32,
    pub errors: u32,
}

/// A student who reached the top of their phase this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStudent {
    pub student_id: StudentId,
    pub reference: String,
    pub name: String,
    pub category: CompletionCategory,
}

/// One isolated per-student failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentError {
    pub student_id: StudentId,
    pub name: String,
    pub grade: String,
    pub message: String,
}

/// The audit-grade result of one promotion run.
///
/// Always fully populated, including on partial failure; callers must inspect
/// `error_count`/`errors` rather than rely on an overall success boolean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionSummary {
    pub total_students: u32,
    pub promoted_count: u32,
    pub completed_count: u32,
    pub excluded_count: u32,
    pub error_count: u32,
    /// Ids of students promoted (not completed) this run.
    pub promoted: Vec<StudentId>,
    pub breakdown: Vec<GradeBreakdown>,
    pub completed: Vec<CompletedStudent>,
    pub errors: Vec<StudentError>,
    pub message: String,
}

impl PromotionSummary {
    /// Compose the human-readable message from the final counters.
    pub fn finalize(&mut self) {
        self.message = format!(
            "Promotion run processed {} students: {} promoted, {} completed, {} excluded, {} errors",
            self.total_students,
            self.promoted_count,
            self.completed_count,
            self.excluded_count,
            self.error_count,
        );
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_reflects_final_counters() {
        let mut summary = PromotionSummary {
            total_students: 5,
            promoted_count: 2,
            completed_count: 2,
            excluded_count: 0,
            error_count: 1,
            ..Default::default()
        };
        summary.finalize();

        assert!(summary.message.contains("5 students"));
        assert!(summary.message.contains("2 promoted"));
        assert!(summary.message.contains("1 errors"));
        assert!(summary.has_errors());
    }
}
