use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmergencyDetails {
    pub blood_group: String,
    pub contact_person_name: String,
    pub relation: String,
    pub phone_number: String,
    pub company_phone_number: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub emergency: EmergencyDetails,
    pub qr_image_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeeRecord {
    /// Full replace of every mutable attribute; id and creation time are kept.
    pub fn replace_details(
        &mut self,
        name: String,
        date_of_birth: NaiveDate,
        gender: String,
        emergency: EmergencyDetails,
    ) {
        self.name = name;
        self.date_of_birth = date_of_birth;
        self.gender = gender;
        self.emergency = emergency;
        self.updated_at = Utc::now();
    }
}

// The emergency subrecord is stored as flat columns on the employees table.
impl<'r> FromRow<'r, PgRow> for EmployeeRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EmployeeRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            gender: row.try_get("gender")?,
            emergency: EmergencyDetails {
                blood_group: row.try_get("blood_group")?,
                contact_person_name: row.try_get("contact_person_name")?,
                relation: row.try_get("relation")?,
                phone_number: row.try_get("phone_number")?,
                company_phone_number: row.try_get("company_phone_number")?,
            },
            qr_image_reference: row.try_get("qr_image_reference")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
