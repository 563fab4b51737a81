//! Promotion run configuration: one per tenant per cycle.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use campusledger_core::{AggregateId, DomainError, DomainResult, TenantId, UserId};
use campusledger_fees::{AcademicCycle, FeeStructure};
use campusledger_students::StudentId;

use crate::summary::PromotionSummary;

/// Run configuration identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(pub AggregateId);

impl ConfigId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Run status state machine.
///
/// ```text
/// Scheduled --(cancel)--> Cancelled              [terminal]
/// Scheduled --(trigger)--> InProgress
/// InProgress --(success)--> Completed            [terminal, triggers rollover]
/// InProgress --(error)--> Failed                 [terminal]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Scheduled,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Whether the `self -> to` edge exists in the state machine.
    pub fn can_transition_to(&self, to: RunStatus) -> bool {
        matches!(
            (self, to),
            (RunStatus::Scheduled, RunStatus::InProgress)
                | (RunStatus::Scheduled, RunStatus::Cancelled)
                | (RunStatus::InProgress, RunStatus::Completed)
                | (RunStatus::InProgress, RunStatus::Failed)
        )
    }
}

/// Who created a config row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedBy {
    User(UserId),
    SystemRollover,
}

/// Result counters copied from the run summary when a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub promoted: u32,
    pub completed: u32,
    pub errors: u32,
}

/// A scheduled (or finished) promotion run for one tenant and target cycle.
///
/// Invariant: at most one config per (tenant, target cycle) — enforced by the
/// config store on insert. Once `Completed` or `Failed` the row is terminal; a
/// new cycle gets a new row (normally via rollover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRunConfig {
    pub id: ConfigId,
    pub tenant_id: TenantId,
    /// Cycle the run promotes *into*.
    pub target_cycle: AcademicCycle,
    /// Cycle the rollover config will target after this run completes.
    pub next_cycle: AcademicCycle,
    /// End-of-cycle date on which the scheduler considers this run due.
    pub trigger_date: NaiveDate,
    pub carry_forward: bool,
    /// Fee structures keyed by destination grade label.
    pub fee_structures: BTreeMap<String, FeeStructure>,
    pub default_fee_structure: Option<FeeStructure>,
    /// Students excluded from this run (repeating a year, transfers, ...).
    pub excluded: BTreeSet<StudentId>,
    pub status: RunStatus,
    pub executed_at: Option<DateTime<Utc>>,
    pub counters: RunCounters,
    /// Failure message when `status == Failed`.
    pub error: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_by: CreatedBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromotionRunConfig {
    pub fn new(
        tenant_id: TenantId,
        target_cycle: AcademicCycle,
        trigger_date: NaiveDate,
        created_by: CreatedBy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ConfigId::new(AggregateId::new()),
            tenant_id,
            target_cycle,
            next_cycle: target_cycle.next(),
            trigger_date,
            carry_forward: false,
            fee_structures: BTreeMap::new(),
            default_fee_structure: None,
            excluded: BTreeSet::new(),
            status: RunStatus::Scheduled,
            executed_at: None,
            counters: RunCounters::default(),
            error: None,
            notes: None,
            active: true,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_carry_forward(mut self, carry_forward: bool) -> Self {
        self.carry_forward = carry_forward;
        self
    }

    pub fn with_fee_structures(mut self, structures: BTreeMap<String, FeeStructure>) -> Self {
        self.fee_structures = structures;
        self
    }

    pub fn with_default_fee_structure(mut self, structure: FeeStructure) -> Self {
        self.default_fee_structure = Some(structure);
        self
    }

    pub fn with_excluded(mut self, excluded: BTreeSet<StudentId>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn with_next_cycle(mut self, next_cycle: AcademicCycle) -> Self {
        self.next_cycle = next_cycle;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the scheduler should pick this config up on `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.active && self.status == RunStatus::Scheduled && self.trigger_date <= date
    }

    /// Follow one edge of the status state machine.
    ///
    /// Used by the config store's compare-and-set; everything else goes
    /// through the `mark_*` methods below after the CAS has succeeded.
    pub fn transition_to(&mut self, to: RunStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::conflict(format!(
                "cannot move promotion run from {:?} to {to:?}",
                self.status
            )));
        }
        if to == RunStatus::InProgress {
            self.executed_at = Some(now);
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Record a successful run: counters from the summary, terminal status.
    pub fn mark_completed(&mut self, summary: &PromotionSummary, now: DateTime<Utc>) {
        self.status = RunStatus::Completed;
        self.counters = RunCounters {
            promoted: summary.promoted_count,
            completed: summary.completed_count,
            errors: summary.error_count,
        };
        self.updated_at = now;
    }

    /// Record a failed run with the error message.
    pub fn mark_failed(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
    }

    pub fn append_note(&mut self, text: &str, now: DateTime<Utc>) {
        self.notes = Some(match self.notes.take() {
            Some(existing) => format!("{existing}\n{text}"),
            None => text.to_string(),
        });
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PromotionRunConfig {
        PromotionRunConfig::new(
            TenantId::new(),
            AcademicCycle::new(2027, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            CreatedBy::User(UserId::new()),
            Utc::now(),
        )
    }

    #[test]
    fn next_cycle_defaults_to_the_following_year() {
        let config = test_config();
        assert_eq!(config.next_cycle, AcademicCycle::new(2028, 1).unwrap());
    }

    #[test]
    fn scheduled_runs_become_due_on_the_trigger_date() {
        let config = test_config();
        assert!(!config.is_due(NaiveDate::from_ymd_opt(2026, 11, 30).unwrap()));
        assert!(config.is_due(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()));
        assert!(config.is_due(NaiveDate::from_ymd_opt(2026, 12, 2).unwrap()));
    }

    #[test]
    fn status_machine_edges() {
        let now = Utc::now();

        let mut run = test_config();
        run.transition_to(RunStatus::InProgress, now).unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.executed_at.is_some());
        run.transition_to(RunStatus::Completed, now).unwrap();
        assert!(run.status.is_terminal());

        let mut cancelled = test_config();
        cancelled.transition_to(RunStatus::Cancelled, now).unwrap();
        assert!(cancelled.status.is_terminal());
    }

    #[test]
    fn illegal_edges_are_conflicts() {
        let now = Utc::now();
        let mut run = test_config();

        // Straight to a terminal run state without executing.
        assert!(run.transition_to(RunStatus::Completed, now).is_err());

        run.transition_to(RunStatus::InProgress, now).unwrap();
        // In-progress runs cannot be cancelled.
        assert!(run.transition_to(RunStatus::Cancelled, now).is_err());

        run.transition_to(RunStatus::Failed, now).unwrap();
        // Terminal means terminal.
        for to in [
            RunStatus::Scheduled,
            RunStatus::InProgress,
            RunStatus::Completed,
            RunStatus::Cancelled,
        ] {
            assert!(run.transition_to(to, now).is_err(), "edge to {to:?}");
        }
    }

    #[test]
    fn completion_copies_summary_counters() {
        let now = Utc::now();
        let mut run = test_config();
        run.transition_to(RunStatus::InProgress, now).unwrap();

        let summary = PromotionSummary {
            promoted_count: 12,
            completed_count: 3,
            error_count: 1,
            ..Default::default()
        };
        run.mark_completed(&summary, now);

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.counters.promoted, 12);
        assert_eq!(run.counters.completed, 3);
        assert_eq!(run.counters.errors, 1);
    }
}
