use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campusledger_core::{AggregateId, Entity, TenantId};

use crate::grade::{CompletionCategory, GradeLevel};

/// Student identifier (tenant-scoped via `tenant_id` on the entity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub AggregateId);

impl StudentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StudentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A student enrolment record.
///
/// The grade label is kept as captured at the boundary (free text); parsing
/// into [`GradeLevel`] happens where progression is decided. Promotion and
/// completion write back the canonical label form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    tenant_id: TenantId,
    /// Admission/reference number, unique per tenant by convention.
    reference: String,
    name: String,
    grade_label: Option<String>,
    active: bool,
    completion: Option<CompletionCategory>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Student {
    pub fn new(
        id: StudentId,
        tenant_id: TenantId,
        reference: impl Into<String>,
        name: impl Into<String>,
        grade_label: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            reference: reference.into(),
            name: name.into(),
            grade_label,
            active: true,
            completion: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_typed(&self) -> StudentId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grade_label(&self) -> Option<&str> {
        self.grade_label.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn completion(&self) -> Option<CompletionCategory> {
        self.completion
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether this student is eligible for a promotion run: active, not yet
    /// completed, and carrying a non-blank grade label.
    pub fn is_promotable(&self) -> bool {
        self.active
            && self.completion.is_none()
            && self
                .grade_label
                .as_deref()
                .is_some_and(|g| !g.trim().is_empty())
    }

    /// Advance to `level`, overwriting the grade label with the canonical form
    /// and appending a timestamped note.
    pub fn promote_to(&mut self, level: GradeLevel, now: DateTime<Utc>, run_note: Option<&str>) {
        let from = self.grade_label.clone().unwrap_or_default();
        self.grade_label = Some(level.to_string());
        self.append_note(now, &format!("Promoted from {from} to {level}"), run_note);
        self.updated_at = now;
    }

    /// Mark the student as having finished their phase and deactivate them so
    /// they no longer appear in active-student queries.
    pub fn complete(
        &mut self,
        category: CompletionCategory,
        now: DateTime<Utc>,
        run_note: Option<&str>,
    ) {
        self.completion = Some(category);
        self.active = false;
        self.append_note(now, &format!("{category}"), run_note);
        self.updated_at = now;
    }

    /// Move the student back to `level` (administrative correction).
    pub fn demote_to(&mut self, level: GradeLevel, now: DateTime<Utc>, run_note: Option<&str>) {
        let from = self.grade_label.clone().unwrap_or_default();
        self.grade_label = Some(level.to_string());
        self.append_note(now, &format!("Demoted from {from} to {level}"), run_note);
        self.updated_at = now;
    }

    fn append_note(&mut self, now: DateTime<Utc>, text: &str, extra: Option<&str>) {
        let stamp = now.format("%Y-%m-%d %H:%M UTC");
        let line = match extra.filter(|e| !e.trim().is_empty()) {
            Some(extra) => format!("[{stamp}] {text} ({extra})"),
            None => format!("[{stamp}] {text}"),
        };
        self.notes = Some(match self.notes.take() {
            Some(existing) => format!("{existing}\n{line}"),
            None => line,
        });
    }
}

impl Entity for Student {
    type Id = StudentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_student(grade: Option<&str>) -> Student {
        Student::new(
            StudentId::new(AggregateId::new()),
            TenantId::new(),
            "ADM-001",
            "Tariro Moyo",
            grade.map(str::to_string),
            Utc::now(),
        )
    }

    #[test]
    fn new_students_are_active_and_promotable() {
        let s = test_student(Some("Grade 3"));
        assert!(s.is_active());
        assert!(s.is_promotable());
        assert_eq!(s.completion(), None);
    }

    #[test]
    fn blank_or_missing_grade_is_not_promotable() {
        assert!(!test_student(None).is_promotable());
        assert!(!test_student(Some("  ")).is_promotable());
    }

    #[test]
    fn promotion_rewrites_label_and_records_a_note() {
        let mut s = test_student(Some("Grade 3"));
        s.promote_to(GradeLevel::Primary(4), Utc::now(), Some("2027 run"));

        assert_eq!(s.grade_label(), Some("Grade 4"));
        let notes = s.notes().unwrap();
        assert!(notes.contains("Promoted from Grade 3 to Grade 4"));
        assert!(notes.contains("2027 run"));
    }

    #[test]
    fn completion_deactivates_the_student() {
        let mut s = test_student(Some("Grade 7"));
        s.complete(CompletionCategory::CompletedPrimary, Utc::now(), None);

        assert!(!s.is_active());
        assert!(!s.is_promotable());
        assert_eq!(s.completion(), Some(CompletionCategory::CompletedPrimary));
        assert!(s.notes().unwrap().contains("COMPLETED_PRIMARY"));
    }

    #[test]
    fn demotion_moves_the_label_back() {
        let mut s = test_student(Some("Form 3"));
        s.demote_to(GradeLevel::OLevel(2), Utc::now(), Some("entered in error"));

        assert_eq!(s.grade_label(), Some("Form 2"));
        assert!(s.notes().unwrap().contains("Demoted from Form 3 to Form 2"));
    }

    #[test]
    fn notes_accumulate_across_mutations() {
        let mut s = test_student(Some("Form 1"));
        s.promote_to(GradeLevel::OLevel(2), Utc::now(), None);
        s.promote_to(GradeLevel::OLevel(3), Utc::now(), None);

        let notes = s.notes().unwrap();
        assert_eq!(notes.lines().count(), 2);
    }
}
