use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::Mutex;

use super::{EmployeeRepository, StoreError};
use crate::models::employee::EmployeeRecord;

/// Employees persisted as one pretty-printed JSON object keyed by employee id.
///
/// The whole document is rewritten after every change while the lock is held,
/// so the file never lags behind the in-memory map.
pub struct JsonFileStore {
    path: PathBuf,
    employees: Mutex<BTreeMap<String, EmployeeRecord>>,
}

impl JsonFileStore {
    /// Loads `path`. A missing, empty or undecodable file starts an empty directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let employees = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => {
                info!("Data file '{}' is empty. Starting with empty data.", path.display());
                BTreeMap::new()
            }
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, EmployeeRecord>>(&bytes) {
                Ok(employees) => {
                    info!("Loaded {} employees from {}", employees.len(), path.display());
                    employees
                }
                Err(err) => {
                    warn!(
                        "Error decoding JSON from {}: {}. Starting with empty data.",
                        path.display(),
                        err
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("Data file '{}' not found. Starting with empty data.", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            employees: Mutex::new(employees),
        })
    }

    async fn save(&self, employees: &BTreeMap<String, EmployeeRecord>) -> Result<(), StoreError> {
        let document = serde_json::to_vec_pretty(employees)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, document).await?;
        info!("Saved {} employees to {}", employees.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for JsonFileStore {
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
        let id = record.id.clone();
        employees.insert(id.clone(), record);
        if let Err(err) = self.save(&employees).await {
            employees.remove(&id);
            return Err(err);
        }
        Ok(())
    }

    async fn update(&self, record: EmployeeRecord) -> Result<(), StoreError> {
        let mut employees = self.employees.lock().await;
        let previous = match employees.get_mut(&record.id) {
            Some(existing) => std::mem::replace(existing, record),
            None => return Err(StoreError::NotFound(record.id)),
        };
        if let Err(err) = self.save(&employees).await {
            employees.insert(previous.id.clone(), previous);
            return Err(err);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut employees = self.employees.lock().await;
        match employees.remove(id) {
            Some(removed) => {
                if let Err(err) = self.save(&employees).await {
                    employees.insert(removed.id.clone(), removed);
                    return Err(err);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
