use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use campusledger_core::TenantId;
use campusledger_promotion::{StoreError, StudentStore};
use campusledger_students::{Student, StudentId};

/// In-memory student store.
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: RwLock<HashMap<StudentId, Student>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a student (tests/dev).
    pub fn insert(&self, student: Student) -> Result<(), StoreError> {
        let mut students = self.students.write().unwrap();
        let id = student.id_typed();
        if students.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        students.insert(id, student);
        Ok(())
    }

    /// Current state of one student, tenant checks skipped (tests/dev).
    pub fn snapshot_of(&self, id: StudentId) -> Option<Student> {
        self.students.read().unwrap().get(&id).cloned()
    }
}

impl StudentStore for InMemoryStudentStore {
    fn find_active(&self, tenant_id: TenantId) -> Result<Vec<Student>, StoreError> {
        let students = self.students.read().unwrap();
        let mut result: Vec<_> = students
            .values()
            .filter(|s| s.tenant_id() == tenant_id && s.is_active())
            .cloned()
            .collect();
        // Deterministic iteration for stable summaries.
        result.sort_by(|a, b| a.reference().cmp(b.reference()));
        Ok(result)
    }

    fn get(&self, tenant_id: TenantId, id: StudentId) -> Result<Option<Student>, StoreError> {
        let students = self.students.read().unwrap();
        match students.get(&id) {
            Some(s) if s.tenant_id() == tenant_id => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn save(&self, student: &Student) -> Result<(), StoreError> {
        let mut students = self.students.write().unwrap();
        let id = student.id_typed();
        if !students.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        students.insert(id, student.clone());
        Ok(())
    }
}
