use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use campusledger_core::TenantId;
use campusledger_promotion::{StoreError, TenantDirectory};
use campusledger_students::SchoolType;

/// In-memory tenant -> school-type directory.
#[derive(Debug, Default)]
pub struct InMemoryTenantDirectory {
    tenants: RwLock<HashMap<TenantId, SchoolType>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn register(&self, tenant_id: TenantId, school_type: SchoolType) {
        self.tenants.write().unwrap().insert(tenant_id, school_type);
    }
}

impl TenantDirectory for InMemoryTenantDirectory {
    fn school_type(&self, tenant_id: TenantId) -> Result<Option<SchoolType>, StoreError> {
        Ok(self.tenants.read().unwrap().get(&tenant_id).copied())
    }
}
