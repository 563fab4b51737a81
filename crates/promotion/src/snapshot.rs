//! The promotion snapshot: eligible students grouped by current grade.
//!
//! The grouping is fixed at one point in time, before any mutation of the run
//! begins. Everything downstream (planning, applying) works off this snapshot,
//! which is what rules out processing a student twice in one run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use campusledger_students::{Student, StudentId};

/// Eligible students grouped by their current (trimmed) grade label.
#[derive(Debug, Clone)]
pub struct Snapshot {
    groups: BTreeMap<String, Vec<Student>>,
    skipped_no_grade: usize,
    skipped_excluded: usize,
}

impl Snapshot {
    /// Group `students` by current grade label.
    ///
    /// Selects only students that are active, not already carrying a
    /// completion status, and not in `excluded`. Students with a missing or
    /// blank grade label are skipped and logged, not counted as errors.
    pub fn build(students: Vec<Student>, excluded: &BTreeSet<StudentId>) -> Self {
        let mut groups: BTreeMap<String, Vec<Student>> = BTreeMap::new();
        let mut skipped_no_grade = 0;
        let mut skipped_excluded = 0;

        for student in students {
            if !student.is_active() || student.completion().is_some() {
                continue;
            }
            if excluded.contains(&student.id_typed()) {
                skipped_excluded += 1;
                continue;
            }
            let Some(label) = student
                .grade_label()
                .map(str::trim)
                .filter(|l| !l.is_empty())
            else {
                debug!(
                    student_id = %student.id_typed(),
                    reference = student.reference(),
                    "skipping student without a grade label"
                );
                skipped_no_grade += 1;
                continue;
            };
            groups.entry(label.to_string()).or_default().push(student);
        }

        Self {
            groups,
            skipped_no_grade,
            skipped_excluded,
        }
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<Student>> {
        &self.groups
    }

    /// Sum of all group sizes.
    pub fn total_students(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn skipped_no_grade(&self) -> usize {
        self.skipped_no_grade
    }

    pub fn skipped_excluded(&self) -> usize {
        self.skipped_excluded
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use campusledger_core::{AggregateId, TenantId};
    use campusledger_students::CompletionCategory;

    fn student(tenant: TenantId, reference: &str, grade: Option<&str>) -> Student {
        Student::new(
            StudentId::new(AggregateId::new()),
            tenant,
            reference,
            format!("Student {reference}"),
            grade.map(str::to_string),
            Utc::now(),
        )
    }

    #[test]
    fn groups_by_trimmed_grade_label() {
        let tenant = TenantId::new();
        let students = vec![
            student(tenant, "A1", Some("Grade 3")),
            student(tenant, "A2", Some(" Grade 3 ")),
            student(tenant, "B1", Some("Grade 7")),
        ];

        let snapshot = Snapshot::build(students, &BTreeSet::new());
        assert_eq!(snapshot.groups().len(), 2);
        assert_eq!(snapshot.groups()["Grade 3"].len(), 2);
        assert_eq!(snapshot.groups()["Grade 7"].len(), 1);
        assert_eq!(snapshot.total_students(), 3);
    }

    #[test]
    fn inactive_completed_and_excluded_students_are_left_out() {
        let tenant = TenantId::new();
        let active = student(tenant, "A1", Some("Grade 3"));
        let excluded = student(tenant, "A2", Some("Grade 3"));
        let mut completed = student(tenant, "A3", Some("Grade 7"));
        completed.complete(CompletionCategory::CompletedPrimary, Utc::now(), None);

        let excluded_ids = BTreeSet::from([excluded.id_typed()]);
        let snapshot = Snapshot::build(vec![active, excluded, completed], &excluded_ids);

        assert_eq!(snapshot.total_students(), 1);
        assert_eq!(snapshot.skipped_excluded(), 1);
    }

    #[test]
    fn blank_grades_are_skipped_not_errored() {
        let tenant = TenantId::new();
        let students = vec![
            student(tenant, "A1", None),
            student(tenant, "A2", Some("   ")),
            student(tenant, "A3", Some("Form 2")),
        ];

        let snapshot = Snapshot::build(students, &BTreeSet::new());
        assert_eq!(snapshot.total_students(), 1);
        assert_eq!(snapshot.skipped_no_grade(), 2);
    }
}
