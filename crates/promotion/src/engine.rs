//! The promotion orchestrator and per-student applier.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use campusledger_core::{AggregateId, TenantId};
use campusledger_fees::{AcademicCycle, FeeRecord, FeeRecordId, FeeStructure};
use campusledger_students::{CompletionCategory, GradeLevel, SchoolType, Student, StudentId};

use crate::audit::{AuditAction, AuditEntry};
use crate::config::PromotionRunConfig;
use crate::plan::{plan, PlannedAction, PlannedOutcome};
use crate::ports::{AuditSink, FeeService, StoreError, StudentStore};
use crate::snapshot::Snapshot;
use crate::summary::{CompletedStudent, GradeBreakdown, PromotionSummary, StudentError};

/// Everything one run needs, resolved before it starts.
#[derive(Debug, Clone)]
pub struct PromotionRequest {
    pub target_cycle: AcademicCycle,
    pub carry_forward: bool,
    pub excluded: BTreeSet<StudentId>,
    /// Free-text note appended to each mutated student.
    pub notes: Option<String>,
    /// Fee structures keyed by destination grade label.
    pub fee_structures: BTreeMap<String, FeeStructure>,
    pub default_fee_structure: Option<FeeStructure>,
}

impl PromotionRequest {
    pub fn from_config(config: &PromotionRunConfig) -> Self {
        Self {
            target_cycle: config.target_cycle,
            carry_forward: config.carry_forward,
            excluded: config.excluded.clone(),
            notes: config.notes.clone(),
            fee_structures: config.fee_structures.clone(),
            default_fee_structure: config.default_fee_structure.clone(),
        }
    }
}

enum Applied {
    Promoted,
    Completed(CompletionCategory),
}

/// Drives one promotion run: snapshot, plan, apply, summarize.
///
/// Only a failure while loading the snapshot is fatal; every per-student
/// failure is isolated at the applier boundary and reported in the summary.
pub struct PromotionEngine {
    students: Arc<dyn StudentStore>,
    fees: Arc<dyn FeeService>,
    audit: Arc<dyn AuditSink>,
}

impl PromotionEngine {
    pub fn new(
        students: Arc<dyn StudentStore>,
        fees: Arc<dyn FeeService>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            students,
            fees,
            audit,
        }
    }

    /// Run the whole pass for one tenant and return the summary.
    pub fn run(
        &self,
        tenant_id: TenantId,
        school_type: SchoolType,
        request: &PromotionRequest,
    ) -> Result<PromotionSummary, StoreError> {
        let students = self.students.find_active(tenant_id)?;
        let snapshot = Snapshot::build(students, &request.excluded);
        let run_plan = plan(&snapshot, school_type);

        info!(
            tenant_id = %tenant_id,
            target_cycle = %request.target_cycle,
            students = snapshot.total_students(),
            grades = run_plan.groups.len(),
            skipped_no_grade = snapshot.skipped_no_grade(),
            "starting promotion run"
        );

        let mut summary = PromotionSummary {
            total_students: snapshot.total_students() as u32,
            excluded_count: request.excluded.len() as u32,
            ..Default::default()
        };

        for group in &run_plan.groups {
            let mut succeeded: u32 = 0;
            let mut errors = group.errors.len() as u32;
            summary.errors.extend(group.errors.iter().cloned());

            for action in &group.actions {
                match self.apply(tenant_id, action, request) {
                    Ok(Applied::Promoted) => {
                        succeeded += 1;
                        summary.promoted_count += 1;
                        summary.promoted.push(action.student_id);
                    }
                    Ok(Applied::Completed(category)) => {
                        succeeded += 1;
                        summary.completed_count += 1;
                        summary.completed.push(CompletedStudent {
                            student_id: action.student_id,
                            reference: action.reference.clone(),
                            name: action.name.clone(),
                            category,
                        });
                    }
                    Err(message) => {
                        warn!(
                            tenant_id = %tenant_id,
                            student_id = %action.student_id,
                            grade = %action.from_grade,
                            error = %message,
                            "student promotion failed, continuing"
                        );
                        errors += 1;
                        summary.errors.push(StudentError {
                            student_id: action.student_id,
                            name: action.name.clone(),
                            grade: action.from_grade.clone(),
                            message,
                        });
                    }
                }
            }

            summary.error_count += errors;
            summary.breakdown.push(GradeBreakdown {
                from_grade: group.from_grade.clone(),
                to_grade: group.to_grade.clone(),
                students: (group.actions.len() + group.errors.len()) as u32,
                succeeded,
                errors,
            });
        }

        summary.finalize();
        info!(
            tenant_id = %tenant_id,
            promoted = summary.promoted_count,
            completed = summary.completed_count,
            errors = summary.error_count,
            "promotion run finished"
        );
        Ok(summary)
    }

    /// Apply one planned action. Any error here is per-student recoverable;
    /// the orchestrator records it and moves on.
    fn apply(
        &self,
        tenant_id: TenantId,
        action: &PlannedAction,
        request: &PromotionRequest,
    ) -> Result<Applied, String> {
        let now = Utc::now();
        let mut student = self
            .students
            .get(tenant_id, action.student_id)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "student no longer exists".to_string())?;

        match &action.outcome {
            PlannedOutcome::Complete(category) => {
                student.complete(*category, now, request.notes.as_deref());
                self.students.save(&student).map_err(|e| e.to_string())?;
                self.audit.record(AuditEntry::new(
                    tenant_id,
                    action.student_id,
                    AuditAction::Completed {
                        from: action.from_grade.clone(),
                        category: *category,
                    },
                    now,
                ));
                Ok(Applied::Completed(*category))
            }
            PlannedOutcome::Promote(level) => {
                student.promote_to(*level, now, request.notes.as_deref());
                self.students.save(&student).map_err(|e| e.to_string())?;
                self.audit.record(AuditEntry::new(
                    tenant_id,
                    action.student_id,
                    AuditAction::Promoted {
                        from: action.from_grade.clone(),
                        to: level.to_string(),
                    },
                    now,
                ));
                // The grade change stands even if the fee side fails; a
                // promoted-but-fee-record-missing state is recoverable.
                self.create_fee_record(tenant_id, &student, *level, request, now);
                Ok(Applied::Promoted)
            }
        }
    }

    /// Create the next-cycle fee record for a freshly promoted student.
    /// Every failure path here is a warn log, never a run error.
    fn create_fee_record(
        &self,
        tenant_id: TenantId,
        student: &Student,
        level: GradeLevel,
        request: &PromotionRequest,
        now: DateTime<Utc>,
    ) {
        let to_label = level.to_string();
        let Some(structure) = request
            .fee_structures
            .get(&to_label)
            .or(request.default_fee_structure.as_ref())
        else {
            warn!(
                tenant_id = %tenant_id,
                student_id = %student.id_typed(),
                grade = %to_label,
                "no fee structure for destination grade, skipping fee record"
            );
            return;
        };

        let previous_balance = if request.carry_forward {
            match self.fees.latest_outstanding(tenant_id, student.id_typed()) {
                Ok(balance) => balance.unwrap_or(0),
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        student_id = %student.id_typed(),
                        error = %e,
                        "could not read prior balance, carrying forward zero"
                    );
                    0
                }
            }
        } else {
            0
        };

        let record = match FeeRecord::for_promotion(
            FeeRecordId::new(AggregateId::new()),
            tenant_id,
            student.id_typed(),
            request.target_cycle,
            structure,
            previous_balance,
            now,
        ) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    tenant_id = %tenant_id,
                    student_id = %student.id_typed(),
                    grade = %to_label,
                    error = %e,
                    "invalid fee structure for promoted student"
                );
                return;
            }
        };

        if let Err(e) = self.fees.create_promotion_record(record) {
            warn!(
                tenant_id = %tenant_id,
                student_id = %student.id_typed(),
                grade = %to_label,
                error = %e,
                "fee record creation failed after promotion"
            );
        }
    }

    /// Administrative correction: move one student back to `level`.
    pub fn demote(
        &self,
        tenant_id: TenantId,
        student_id: StudentId,
        level: GradeLevel,
        note: Option<&str>,
    ) -> Result<Student, StoreError> {
        let now = Utc::now();
        let mut student = self
            .students
            .get(tenant_id, student_id)?
            .ok_or(StoreError::NotFound)?;

        let from = student.grade_label().unwrap_or_default().to_string();
        student.demote_to(level, now, note);
        self.students.save(&student)?;
        self.audit.record(AuditEntry::new(
            tenant_id,
            student_id,
            AuditAction::Demoted {
                from,
                to: level.to_string(),
            },
            now,
        ));
        Ok(student)
    }
}
