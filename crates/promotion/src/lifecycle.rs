//! Promotion-run lifecycle: trigger, cancel, execute, rollover.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use campusledger_core::TenantId;

use crate::config::{ConfigId, CreatedBy, PromotionRunConfig, RunStatus};
use crate::engine::{PromotionEngine, PromotionRequest};
use crate::ports::{ConfigStore, StoreError, TenantDirectory};
use crate::summary::PromotionSummary;

/// Owns the per-tenant run configuration and drives executions.
///
/// Both the manual trigger path and the scheduler go through [`execute`],
/// which guarantees a config entering `InProgress` always resolves to
/// `Completed` or `Failed`.
///
/// [`execute`]: LifecycleManager::execute
pub struct LifecycleManager {
    configs: Arc<dyn ConfigStore>,
    directory: Arc<dyn TenantDirectory>,
    engine: PromotionEngine,
}

impl LifecycleManager {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        directory: Arc<dyn TenantDirectory>,
        engine: PromotionEngine,
    ) -> Self {
        Self {
            configs,
            directory,
            engine,
        }
    }

    /// Create the cycle's config, or update it while it is still `Scheduled`.
    ///
    /// A terminal config for the same cycle cannot be edited; a new cycle gets
    /// a new row.
    pub fn upsert_config(&self, config: PromotionRunConfig) -> Result<ConfigId, StoreError> {
        match self
            .configs
            .find_by_cycle(config.tenant_id, &config.target_cycle)?
        {
            None => self.configs.insert(config),
            Some(existing) if existing.status == RunStatus::Scheduled => {
                let updated = PromotionRunConfig {
                    id: existing.id,
                    status: existing.status,
                    executed_at: existing.executed_at,
                    counters: existing.counters,
                    created_by: existing.created_by,
                    created_at: existing.created_at,
                    ..config
                };
                self.configs.update(&updated)?;
                Ok(existing.id)
            }
            Some(existing) => Err(StoreError::StatusConflict {
                expected: RunStatus::Scheduled,
                actual: existing.status,
            }),
        }
    }

    /// Configs across all tenants due for execution on `date`.
    pub fn due_on(&self, date: NaiveDate) -> Result<Vec<PromotionRunConfig>, StoreError> {
        self.configs.find_due(date)
    }

    /// Cancel a still-scheduled run. Rejects anything past `Scheduled`.
    pub fn cancel(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
        reason: &str,
    ) -> Result<PromotionRunConfig, StoreError> {
        let mut config =
            self.configs
                .transition(tenant_id, id, RunStatus::Scheduled, RunStatus::Cancelled)?;
        config.append_note(&format!("Cancelled: {reason}"), Utc::now());
        self.configs.update(&config)?;
        info!(tenant_id = %tenant_id, config_id = %id, reason, "promotion run cancelled");
        Ok(config)
    }

    /// Manually trigger a scheduled run.
    pub fn trigger(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
    ) -> Result<PromotionSummary, StoreError> {
        let config = self
            .configs
            .get(tenant_id, id)?
            .ok_or(StoreError::NotFound)?;
        self.execute(config)
    }

    /// Execute one run for its config.
    ///
    /// Fails fast (config left `Scheduled`) if the tenant cannot be resolved.
    /// After the compare-and-set to `InProgress`, both engine outcomes write a
    /// terminal status: `Completed` with counters, or `Failed` with the error
    /// message. Rollover runs after `Completed` and its failure is logged only.
    pub fn execute(&self, config: PromotionRunConfig) -> Result<PromotionSummary, StoreError> {
        let tenant_id = config.tenant_id;
        let school_type = self.directory.school_type(tenant_id)?.ok_or_else(|| {
            StoreError::Storage(format!("no school type registered for tenant {tenant_id}"))
        })?;

        let mut config = self.configs.transition(
            tenant_id,
            config.id,
            RunStatus::Scheduled,
            RunStatus::InProgress,
        )?;
        info!(
            tenant_id = %tenant_id,
            config_id = %config.id,
            target_cycle = %config.target_cycle,
            "executing promotion run"
        );

        let request = PromotionRequest::from_config(&config);
        match self.engine.run(tenant_id, school_type, &request) {
            Ok(summary) => {
                config.mark_completed(&summary, Utc::now());
                self.configs.update(&config)?;
                if let Err(e) = self.rollover(&config) {
                    warn!(
                        tenant_id = %tenant_id,
                        config_id = %config.id,
                        error = %e,
                        "rollover after completed run failed"
                    );
                }
                Ok(summary)
            }
            Err(run_error) => {
                config.mark_failed(run_error.to_string(), Utc::now());
                if let Err(update_error) = self.configs.update(&config) {
                    // The failed status could not be persisted either; make
                    // sure at least the log shows both.
                    error!(
                        tenant_id = %tenant_id,
                        config_id = %config.id,
                        run_error = %run_error,
                        update_error = %update_error,
                        "failed run could not be marked failed"
                    );
                }
                Err(run_error)
            }
        }
    }

    /// Create the next cycle's config after a completed run.
    ///
    /// Idempotent: if a config for the completed run's `next_cycle` already
    /// exists, nothing is created.
    pub fn rollover(
        &self,
        completed: &PromotionRunConfig,
    ) -> Result<Option<ConfigId>, StoreError> {
        if self
            .configs
            .find_by_cycle(completed.tenant_id, &completed.next_cycle)?
            .is_some()
        {
            debug!(
                tenant_id = %completed.tenant_id,
                cycle = %completed.next_cycle,
                "rollover skipped, next cycle already configured"
            );
            return Ok(None);
        }

        let mut next = PromotionRunConfig::new(
            completed.tenant_id,
            completed.next_cycle,
            advance_one_year(completed.trigger_date),
            CreatedBy::SystemRollover,
            Utc::now(),
        )
        .with_carry_forward(completed.carry_forward)
        .with_fee_structures(completed.fee_structures.clone());
        if let Some(structure) = &completed.default_fee_structure {
            next = next.with_default_fee_structure(structure.clone());
        }

        let id = self.configs.insert(next)?;
        info!(
            tenant_id = %completed.tenant_id,
            config_id = %id,
            cycle = %completed.next_cycle,
            "rolled over to next cycle"
        );
        Ok(Some(id))
    }
}

/// One promotion period later. Feb 29 clamps to Feb 28.
fn advance_one_year(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() + 1)
        .or_else(|| NaiveDate::from_ymd_opt(date.year() + 1, 2, 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_a_year_keeps_the_day() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(
            advance_one_year(date),
            NaiveDate::from_ymd_opt(2027, 12, 1).unwrap()
        );
    }

    #[test]
    fn leap_day_clamps_to_feb_28() {
        let date = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        assert_eq!(
            advance_one_year(date),
            NaiveDate::from_ymd_opt(2029, 2, 28).unwrap()
        );
    }
}
