mod json_file;
mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use thiserror::Error;

use crate::config::StorageBackend;
use crate::models::admin::Admin;
use crate::models::employee::EmployeeRecord;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee '{0}' already exists")]
    Duplicate(String),
    #[error("employee '{0}' not found")]
    NotFound(String),
    #[error("username '{0}' already exists")]
    UsernameTaken(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("data file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("data file encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Employee records keyed by their user-supplied id.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<EmployeeRecord>, StoreError>;

    /// All records ordered by id.
    async fn list(&self) -> Result<Vec<EmployeeRecord>, StoreError>;

    /// Atomic check-then-write; an existing id yields `StoreError::Duplicate`
    /// and leaves the stored record untouched.
    async fn insert(&self, record: EmployeeRecord) -> Result<(), StoreError>;

    /// Replaces the record with the same id, or `StoreError::NotFound`.
    async fn update(&self, record: EmployeeRecord) -> Result<(), StoreError>;

    /// Returns whether a record was removed. Missing ids are not an error.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError>;

    async fn insert_admin(&self, admin: Admin) -> Result<(), StoreError>;

    async fn count_admins(&self) -> Result<i64, StoreError>;
}

/// Builds the repositories for the configured backend. The JSON document only
/// holds employees, so admins live in memory next to it.
pub async fn open(
    backend: &StorageBackend,
) -> Result<(Arc<dyn EmployeeRepository>, Arc<dyn AdminRepository>), StoreError> {
    match backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            let store = Arc::new(MemoryStore::new());
            let employees: Arc<dyn EmployeeRepository> = store.clone();
            let admins: Arc<dyn AdminRepository> = store;
            Ok((employees, admins))
        }
        StorageBackend::JsonFile(path) => {
            info!("Using JSON data file {}", path.display());
            let employees: Arc<dyn EmployeeRepository> = Arc::new(JsonFileStore::open(path).await?);
            let admins: Arc<dyn AdminRepository> = Arc::new(MemoryStore::new());
            Ok((employees, admins))
        }
        StorageBackend::Postgres(database_url) => {
            let store = Arc::new(PgStore::connect(database_url).await?);
            let employees: Arc<dyn EmployeeRepository> = store.clone();
            let admins: Arc<dyn AdminRepository> = store;
            Ok((employees, admins))
        }
    }
}
