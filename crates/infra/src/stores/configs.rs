use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, Utc};

use campusledger_core::TenantId;
use campusledger_fees::AcademicCycle;
use campusledger_promotion::{ConfigId, ConfigStore, PromotionRunConfig, RunStatus, StoreError};

/// In-memory promotion config store.
///
/// `transition` performs the compare-and-set under a single write lock, which
/// is what makes concurrent triggers of the same scheduled config safe: the
/// status check and the status write are one critical section.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: RwLock<HashMap<ConfigId, PromotionRunConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn count(&self) -> usize {
        self.configs.read().unwrap().len()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn insert(&self, config: PromotionRunConfig) -> Result<ConfigId, StoreError> {
        let mut configs = self.configs.write().unwrap();
        if configs.contains_key(&config.id) {
            return Err(StoreError::AlreadyExists(config.id.to_string()));
        }
        let duplicate_cycle = configs
            .values()
            .any(|c| c.tenant_id == config.tenant_id && c.target_cycle == config.target_cycle);
        if duplicate_cycle {
            return Err(StoreError::AlreadyExists(format!(
                "promotion config for cycle {}",
                config.target_cycle
            )));
        }
        let id = config.id;
        configs.insert(id, config);
        Ok(id)
    }

    fn get(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
    ) -> Result<Option<PromotionRunConfig>, StoreError> {
        let configs = self.configs.read().unwrap();
        match configs.get(&id) {
            Some(c) if c.tenant_id == tenant_id => Ok(Some(c.clone())),
            Some(_) => Err(StoreError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn update(&self, config: &PromotionRunConfig) -> Result<(), StoreError> {
        let mut configs = self.configs.write().unwrap();
        match configs.get(&config.id) {
            Some(existing) if existing.tenant_id == config.tenant_id => {
                configs.insert(config.id, config.clone());
                Ok(())
            }
            Some(_) => Err(StoreError::TenantIsolation),
            None => Err(StoreError::NotFound),
        }
    }

    fn find_by_cycle(
        &self,
        tenant_id: TenantId,
        cycle: &AcademicCycle,
    ) -> Result<Option<PromotionRunConfig>, StoreError> {
        let configs = self.configs.read().unwrap();
        Ok(configs
            .values()
            .find(|c| c.tenant_id == tenant_id && c.target_cycle == *cycle)
            .cloned())
    }

    fn find_due(&self, date: NaiveDate) -> Result<Vec<PromotionRunConfig>, StoreError> {
        let configs = self.configs.read().unwrap();
        let mut due: Vec<_> = configs.values().filter(|c| c.is_due(date)).cloned().collect();
        due.sort_by_key(|c| c.created_at);
        Ok(due)
    }

    fn transition(
        &self,
        tenant_id: TenantId,
        id: ConfigId,
        from: RunStatus,
        to: RunStatus,
    ) -> Result<PromotionRunConfig, StoreError> {
        let mut configs = self.configs.write().unwrap();
        let config = configs.get_mut(&id).ok_or(StoreError::NotFound)?;
        if config.tenant_id != tenant_id {
            return Err(StoreError::TenantIsolation);
        }
        if config.status != from {
            return Err(StoreError::StatusConflict {
                expected: from,
                actual: config.status,
            });
        }
        config
            .transition_to(to, Utc::now())
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusledger_core::UserId;
    use campusledger_promotion::CreatedBy;

    fn test_config(tenant: TenantId, year: i32) -> PromotionRunConfig {
        PromotionRunConfig::new(
            tenant,
            AcademicCycle::new(year, 1).unwrap(),
            NaiveDate::from_ymd_opt(year - 1, 12, 1).unwrap(),
            CreatedBy::User(UserId::new()),
            Utc::now(),
        )
    }

    #[test]
    fn one_config_per_tenant_and_cycle() {
        let store = InMemoryConfigStore::new();
        let tenant = TenantId::new();

        store.insert(test_config(tenant, 2027)).unwrap();
        let err = store.insert(test_config(tenant, 2027)).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        // A different tenant may configure the same cycle.
        store.insert(test_config(TenantId::new(), 2027)).unwrap();
    }

    #[test]
    fn compare_and_set_rejects_the_second_trigger() {
        let store = InMemoryConfigStore::new();
        let tenant = TenantId::new();
        let config = test_config(tenant, 2027);
        let id = store.insert(config).unwrap();

        store
            .transition(tenant, id, RunStatus::Scheduled, RunStatus::InProgress)
            .unwrap();

        let err = store
            .transition(tenant, id, RunStatus::Scheduled, RunStatus::InProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusConflict {
                expected: RunStatus::Scheduled,
                actual: RunStatus::InProgress,
            }
        ));
    }

    #[test]
    fn find_due_skips_future_and_non_scheduled_configs() {
        let store = InMemoryConfigStore::new();
        let tenant = TenantId::new();

        let due = test_config(tenant, 2027);
        let due_id = store.insert(due).unwrap();
        let mut future = test_config(tenant, 2028);
        future.trigger_date = NaiveDate::from_ymd_opt(2027, 12, 1).unwrap();
        store.insert(future).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        let found = store.find_due(today).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due_id);

        store
            .transition(tenant, due_id, RunStatus::Scheduled, RunStatus::Cancelled)
            .unwrap();
        assert!(store.find_due(today).unwrap().is_empty());
    }
}
