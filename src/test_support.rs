use std::sync::Arc;

use actix_web::web;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use url::Url;

use crate::db::{AdminRepository, EmployeeRepository, MemoryStore};
use crate::handlers;
use crate::models::employee::{EmergencyDetails, EmployeeRecord};
use crate::qr::composer::{QrComposer, QrSettings};
use crate::qr::sink::QrSink;
use crate::qr::QrService;
use crate::utils::jwt::JwtKeys;

pub const BASE_URL: &str = "http://localhost:8080";

pub fn sample_record(id: &str, name: &str) -> EmployeeRecord {
    let now = Utc::now();
    EmployeeRecord {
        id: id.to_string(),
        name: name.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        gender: "F".to_string(),
        emergency: EmergencyDetails {
            blood_group: "O+".to_string(),
            contact_person_name: "Bob".to_string(),
            relation: "Spouse".to_string(),
            phone_number: "555-1111".to_string(),
            company_phone_number: "555-2222".to_string(),
        },
        qr_image_reference: None,
        created_at: now,
        updated_at: now,
    }
}

/// The admin form submission for employee E1.
pub fn alice_form() -> Value {
    json!({
        "employee_id": "E1",
        "name": "Alice",
        "dob": "1990-01-01",
        "gender": "F",
        "blood_group": "O+",
        "contact_person_name": "Bob",
        "relation": "Spouse",
        "phone_number": "555-1111",
        "company_phone_number": "555-2222",
    })
}

/// In-memory store, inline QR sink and a signed admin token.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub qr: web::Data<QrService>,
    pub keys: web::Data<JwtKeys>,
}

impl TestContext {
    pub fn new() -> Self {
        let qr = QrService::new(
            Url::parse(BASE_URL).unwrap(),
            QrComposer::new(QrSettings::default(), None),
            QrSink::Inline,
        );
        Self {
            store: Arc::new(MemoryStore::new()),
            qr: web::Data::new(qr),
            keys: web::Data::new(JwtKeys::new("test-secret", 1)),
        }
    }

    pub fn auth_header(&self) -> (&'static str, String) {
        let token = self.keys.generate_token("test-admin").unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    pub async fn add_admin(&self, username: &str, password: &str) {
        handlers::auth::create_admin(&*self.store, username, password)
            .await
            .unwrap();
    }

    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
        move |cfg| {
            let employees: Arc<dyn EmployeeRepository> = self.store.clone();
            let admins: Arc<dyn AdminRepository> = self.store.clone();
            cfg.app_data(web::Data::from(employees))
                .app_data(web::Data::from(admins))
                .app_data(self.qr.clone())
                .app_data(self.keys.clone())
                .configure(handlers::routes);
        }
    }
}
