use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{AdminRepository, EmployeeRepository, StoreError};
use crate::models::admin::Admin;
use crate::models::employee::EmployeeRecord;

#[derive(Default)]
pub struct MemoryStore {
    employees: Mutex<BTreeMap<String, EmployeeRecord>>,
    admins: Mutex<BTreeMap<String, Admin>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self.employees.lock().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        Ok(self.employees.lock().await.values().cloned().collect())
    }

    async fn insert(&self, record: EmployeeRecord) -> Result<(), StoreError> {
        let mut employees = self.employees.lock().await;
        if employees.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        employees.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, record: EmployeeRecord) -> Result<(), StoreError> {
        let mut employees = self.employees.lock().await;
        match employees.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.employees.lock().await.remove(id).is_some())
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        Ok(self.admins.lock().await.get(&username.to_lowercase()).cloned())
    }

    async fn insert_admin(&self, admin: Admin) -> Result<(), StoreError> {
        let mut admins = self.admins.lock().await;
        let key = admin.username.to_lowercase();
        if admins.contains_key(&key) {
            return Err(StoreError::UsernameTaken(admin.username));
        }
        admins.insert(key, admin);
        Ok(())
    }

    async fn count_admins(&self) -> Result<i64, StoreError> {
        Ok(self.admins.lock().await.len() as i64)
    }
}
