//! Planning: turning a snapshot into a list of intended mutations.
//!
//! The plan is computed entirely from the snapshot, with no access to stores,
//! so a student freshly promoted into grade B while the plan is being applied
//! is structurally invisible to the planner. Unparseable grade labels become
//! per-student error entries here instead of aborting anything.

use campusledger_students::{
    next_level, CompletionCategory, GradeLevel, Progression, SchoolType, StudentId,
};

use crate::snapshot::Snapshot;
use crate::summary::{StudentError, COMPLETED_LABEL};

/// The mutation intended for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedOutcome {
    Promote(GradeLevel),
    Complete(CompletionCategory),
}

/// One intended mutation, carrying enough student context for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub student_id: StudentId,
    pub reference: String,
    pub name: String,
    pub from_grade: String,
    pub outcome: PlannedOutcome,
}

/// Intended mutations for one grade group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub from_grade: String,
    /// Destination label, [`COMPLETED_LABEL`], or "UNKNOWN" when the group's
    /// label itself does not parse.
    pub to_grade: String,
    pub actions: Vec<PlannedAction>,
    pub errors: Vec<StudentError>,
}

/// The full plan for a run, one group per snapshot grade.
#[derive(Debug, Clone, Default)]
pub struct PromotionPlan {
    pub groups: Vec<GroupPlan>,
}

impl PromotionPlan {
    pub fn action_count(&self) -> usize {
        self.groups.iter().map(|g| g.actions.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.groups.iter().map(|g| g.errors.len()).sum()
    }
}

/// Compute the intended mutation for every student in the snapshot.
pub fn plan(snapshot: &Snapshot, school_type: SchoolType) -> PromotionPlan {
    let mut groups = Vec::with_capacity(snapshot.groups().len());

    for (from_grade, students) in snapshot.groups() {
        // Group-level destination for the breakdown; individual students
        // still resolve their own label below.
        let to_grade = match GradeLevel::parse(from_grade)
            .and_then(|level| next_level(level, school_type))
        {
            Ok(Progression::Promoted(next)) => next.to_string(),
            Ok(Progression::Completed(_)) => COMPLETED_LABEL.to_string(),
            Err(_) => "UNKNOWN".to_string(),
        };

        let mut actions = Vec::with_capacity(students.len());
        let mut errors = Vec::new();

        for student in students {
            let label = student.grade_label().unwrap_or_default();
            let progression =
                GradeLevel::parse(label).and_then(|level| next_level(level, school_type));
            match progression {
                Ok(Progression::Promoted(next)) => actions.push(PlannedAction {
                    student_id: student.id_typed(),
                    reference: student.reference().to_string(),
                    name: student.name().to_string(),
                    from_grade: from_grade.clone(),
                    outcome: PlannedOutcome::Promote(next),
                }),
                Ok(Progression::Completed(category)) => actions.push(PlannedAction {
                    student_id: student.id_typed(),
                    reference: student.reference().to_string(),
                    name: student.name().to_string(),
                    from_grade: from_grade.clone(),
                    outcome: PlannedOutcome::Complete(category),
                }),
                Err(e) => errors.push(StudentError {
                    student_id: student.id_typed(),
                    name: student.name().to_string(),
                    grade: from_grade.clone(),
                    message: e.to_string(),
                }),
            }
        }

        groups.push(GroupPlan {
            from_grade: from_grade.clone(),
            to_grade,
            actions,
            errors,
        });
    }

    PromotionPlan { groups }
}
