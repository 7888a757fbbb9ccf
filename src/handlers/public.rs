use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

use crate::db::EmployeeRepository;
use crate::errors::AppError;
use crate::qr::QrService;
use crate::views;

fn not_found_html(message: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(views::not_found_page(message))
}

fn missing_employee(employee_id: &str) -> HttpResponse {
    not_found_html(&format!("Employee details for ID '{}' not found.", employee_id))
}

/// Public page opened by scanning an employee's QR code.
pub async fn emergency_details(
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_id.into_inner();
    let Some(employee) = repo.get(&employee_id).await? else {
        return Ok(missing_employee(&employee_id));
    };

    // Inline and uploaded images can be linked directly; disk paths are served by us.
    let qr_src = match employee.qr_image_reference.as_deref() {
        Some(reference) if reference.starts_with("data:") || reference.starts_with("https://") => {
            reference.to_string()
        }
        _ => format!("{}/qr.png", qr.employee_url(&employee.id)),
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::employee_page(&employee, &qr_src)))
}

pub async fn employee_qr_png(
    repo: web::Data<dyn EmployeeRepository>,
    qr: web::Data<QrService>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_id.into_inner();
    if repo.get(&employee_id).await?.is_none() {
        return Ok(missing_employee(&employee_id));
    }

    let png = qr.render_png(&employee_id)?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

pub async fn not_found() -> HttpResponse {
    not_found_html("The page you are looking for does not exist.")
}
