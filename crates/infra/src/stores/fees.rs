use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use campusledger_core::TenantId;
use campusledger_fees::{FeeRecord, FeeRecordId};
use campusledger_promotion::{FeeService, StoreError};
use campusledger_students::StudentId;

/// In-memory fee record store.
#[derive(Debug, Default)]
pub struct InMemoryFeeStore {
    records: RwLock<HashMap<FeeRecordId, FeeRecord>>,
}

impl InMemoryFeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a record (tests/dev).
    pub fn insert(&self, record: FeeRecord) -> Result<FeeRecordId, StoreError> {
        let mut records = self.records.write().unwrap();
        let id = record.id_typed();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        records.insert(id, record);
        Ok(id)
    }

    /// All records for one student, oldest cycle first.
    pub fn records_for(&self, tenant_id: TenantId, student_id: StudentId) -> Vec<FeeRecord> {
        let records = self.records.read().unwrap();
        let mut result: Vec<_> = records
            .values()
            .filter(|r| r.tenant_id() == tenant_id && r.student_id() == student_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| (r.cycle(), r.created_at()));
        result
    }
}

impl FeeService for InMemoryFeeStore {
    fn latest_outstanding(
        &self,
        tenant_id: TenantId,
        student_id: StudentId,
    ) -> Result<Option<u64>, StoreError> {
        Ok(self
            .records_for(tenant_id, student_id)
            .last()
            .map(FeeRecord::outstanding))
    }

    fn create_promotion_record(&self, record: FeeRecord) -> Result<FeeRecordId, StoreError> {
        self.insert(record)
    }
}
