use async_trait::async_trait;
use log::info;
use sqlx::PgPool;

use super::{AdminRepository, EmployeeRepository, StoreError};
use crate::models::admin::Admin;
use crate::models::employee::EmployeeRecord;

const CREATE_ADMINS: &str = "CREATE TABLE IF NOT EXISTS admins (
    admin_id UUID PRIMARY KEY,
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
)";

const CREATE_ADMINS_USERNAME_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS admins_username_lower ON admins (LOWER(username))";

const CREATE_EMPLOYEES: &str = "CREATE TABLE IF NOT EXISTS employees (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    date_of_birth DATE NOT NULL,
    gender TEXT NOT NULL,
    blood_group TEXT NOT NULL,
    contact_person_name TEXT NOT NULL,
    relation TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    company_phone_number TEXT NOT NULL,
    qr_image_reference TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and creates the `admins` and `employees` tables when missing.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        for statement in [CREATE_ADMINS, CREATE_ADMINS_USERNAME_INDEX, CREATE_EMPLOYEES] {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!("Connected to PostgreSQL and ensured schema");
        Ok(Self { pool })
    }
}

#[async_trait]
impl EmployeeRepository for PgStore {
    async fn get(&self, id: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        let record = sqlx::query_as::<_, EmployeeRecord>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        let records = sqlx::query_as::<_, EmployeeRecord>("SELECT * FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn insert(&self, record: EmployeeRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO employees (id, name, date_of_birth, gender, blood_group, contact_person_name, relation, phone_number, company_phone_number, qr_image_reference, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.date_of_birth)
        .bind(&record.gender)
        .bind(&record.emergency.blood_group)
        .bind(&record.emergency.contact_person_name)
        .bind(&record.emergency.relation)
        .bind(&record.emergency.phone_number)
        .bind(&record.emergency.company_phone_number)
        .bind(&record.qr_image_reference)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(record.id));
        }
        Ok(())
    }

    async fn update(&self, record: EmployeeRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE employees SET name = $2, date_of_birth = $3, gender = $4, blood_group = $5, contact_person_name = $6, \
             relation = $7, phone_number = $8, company_phone_number = $9, qr_image_reference = $10, updated_at = $11 \
             WHERE id = $1",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.date_of_birth)
        .bind(&record.gender)
        .bind(&record.emergency.blood_group)
        .bind(&record.emergency.contact_person_name)
        .bind(&record.emergency.relation)
        .bind(&record.emergency.phone_number)
        .bind(&record.emergency.company_phone_number)
        .bind(&record.qr_image_reference)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminRepository for PgStore {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn insert_admin(&self, admin: Admin) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO admins (admin_id, username, password_hash, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT DO NOTHING",
        )
        .bind(admin.admin_id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UsernameTaken(admin.username));
        }
        Ok(())
    }

    async fn count_admins(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
