use actix_web::{web, Either, HttpRequest, HttpResponse};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::db::{EmployeeRepository, StoreError};
use crate::errors::AppError;
use crate::models::employee::{EmergencyDetails, EmployeeRecord};
use crate::qr::QrService;
use crate::utils::jwt::{self, JwtKeys};
use crate::utils::validation::{
    normalize_blood_group, parse_date_of_birth, validate_blood_group, validate_date_of_birth,
    validate_employee_id, validate_not_blank, validate_payload, validate_phone,
};

/// Admin form fields shared by create and edit.
#[derive(Deserialize, Validate)]
pub struct EmployeeDetails {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    name: String,
    #[validate(custom = "validate_date_of_birth")]
    dob: String,
    #[validate(length(min = 1, max = 32), custom = "validate_not_blank")]
    gender: String,
    #[validate(custom = "validate_blood_group")]
    blood_group: String,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    contact_person_name: String,
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    relation: String,
    #[validate(custom = "validate_phone")]
    phone_number: String,
    #[validate(custom = "validate_phone")]
    company_phone_number: String,
}

#[derive(Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(custom = "validate_employee_id")]
    employee_id: String,
    #[serde(flatten)]
    #[validate]
    details: EmployeeDetails,
}

struct ParsedDetails {
    name: String,
    date_of_birth: NaiveDate,
    gender: String,
    emergency: EmergencyDetails,
}

impl EmployeeDetails {
    fn parse(self) -> Result<ParsedDetails, AppError> {
        let date_of_birth = parse_date_of_birth(&self.dob)
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        let blood_group = normalize_blood_group(&self.blood_group)
            .ok_or_else(|| AppError::BadRequest("Invalid blood group".to_string()))?;

        Ok(ParsedDetails {
            name: self.name.trim().to_string(),
            date_of_birth,
            gender: self.gender.trim().to_string(),
            emergency: EmergencyDetails {
                blood_group: blood_group.to_string(),
                contact_person_name: self.contact_person_name.trim().to_string(),
                relation: self.relation.trim().to_string(),
                phone_number: self.phone_number.trim().to_string(),
                company_phone_number: self.company_phone_number.trim().to_string(),
            },
        })
    }
}

/// Admin forms may arrive as JSON or as a urlencoded HTML form post.
type FormBody<T> = Either<web::Json<T>, web::Form<T>>;

fn form_inner<T>(body: FormBody<T>) -> T {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

pub async fn create_employee(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    keys: web::Data<JwtKeys>,
    body: FormBody<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;
    let new_employee = form_inner(body);

    let employee_id = new_employee.employee_id.trim().to_string();
    if employee_id.is_empty() {
        return Err(AppError::BadRequest("Employee ID cannot be empty.".to_string()));
    }
    validate_payload(&new_employee)?;

    // Checked up front so a duplicate never reaches the image sink.
    if repo.get(&employee_id).await?.is_some() {
        return Err(StoreError::Duplicate(employee_id).into());
    }

    let details = new_employee.details.parse()?;
    let qr_image_reference = qr.publish(&employee_id).await?;

    let now = Utc::now();
    let record = EmployeeRecord {
        id: employee_id,
        name: details.name,
        date_of_birth: details.date_of_birth,
        gender: details.gender,
        emergency: details.emergency,
        qr_image_reference: Some(qr_image_reference),
        created_at: now,
        updated_at: now,
    };
    if let Err(err) = repo.insert(record.clone()).await {
        // A concurrent create of the same id owns the image now.
        if !matches!(err, StoreError::Duplicate(_)) {
            if let Err(discard_err) = qr.discard(&record.id).await {
                warn!("Could not remove QR code for {}: {}", record.id, discard_err);
            }
        }
        return Err(err.into());
    }
    info!("New employee added: {} ({})", record.name, record.id);

    Ok(HttpResponse::Created().json(json!({
        "message": format!("Employee '{}' added successfully! ID: {}", record.name, record.id),
        "encoded_url": qr.employee_url(&record.id).as_str(),
        "employee": record,
    })))
}

pub async fn get_employees(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    keys: web::Data<JwtKeys>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;
    let employees = repo.list().await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    keys: web::Data<JwtKeys>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;
    let employee_id = employee_id.into_inner();
    let employee = repo
        .get(&employee_id)
        .await?
        .ok_or(StoreError::NotFound(employee_id))?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Full replace of the employee's details; the QR code is always regenerated.
pub async fn update_employee(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    keys: web::Data<JwtKeys>,
    employee_id: web::Path<String>,
    body: FormBody<EmployeeDetails>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;
    let updates = form_inner(body);
    validate_payload(&updates)?;

    let employee_id = employee_id.into_inner();
    let mut employee = repo
        .get(&employee_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(employee_id.clone()))?;

    let details = updates.parse()?;
    employee.replace_details(details.name, details.date_of_birth, details.gender, details.emergency);
    employee.qr_image_reference = Some(qr.publish(&employee_id).await?);
    repo.update(employee.clone()).await?;
    info!("Employee {} updated", employee_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Employee '{}' updated successfully!", employee.name),
        "encoded_url": qr.employee_url(&employee_id).as_str(),
        "employee": employee,
    })))
}

pub async fn delete_employee(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    keys: web::Data<JwtKeys>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;
    let employee_id = employee_id.into_inner();

    let deleted = repo.delete(&employee_id).await?;
    if deleted {
        if let Err(err) = qr.discard(&employee_id).await {
            warn!("Could not remove QR code for {}: {}", employee_id, err);
        }
        info!("Employee {} deleted", employee_id);
    }

    let message = if deleted {
        "Employee deleted successfully"
    } else {
        "Employee not found, nothing to delete"
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "deleted": deleted,
    })))
}

/// Re-publishes every stored QR code, e.g. after BASE_URL or the logo changed.
pub async fn regenerate_qr_codes(
    req: HttpRequest,
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    keys: web::Data<JwtKeys>,
) -> Result<HttpResponse, AppError> {
    jwt::authorize(&req, &keys)?;

    let employees = repo.list().await?;
    let mut regenerated = 0usize;
    for mut employee in employees {
        employee.qr_image_reference = Some(qr.publish(&employee.id).await?);
        employee.updated_at = Utc::now();
        match repo.update(employee).await {
            Ok(()) => regenerated += 1,
            // Deleted while we were working.
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }
    info!("All {} QR codes regenerated", regenerated);

    Ok(HttpResponse::Ok().json(json!({ "regenerated": regenerated })))
}
