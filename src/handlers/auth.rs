use actix_web::{web, HttpRequest, HttpResponse};
use argon2::{password_hash::PasswordHasher, password_hash::SaltString, Argon2, PasswordVerifier};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::AdminRepository;
use crate::errors::AppError;
use crate::models::admin::Admin;
use crate::utils::jwt::{self, JwtKeys};
use crate::utils::validation::validate_payload;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(length(min = 3, max = 32))]
    username: String,
    #[validate(length(min = 8, max = 64))]
    password: String,
    #[validate(custom = "validate_action")]
    action: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    username: String,
    token: String,
}

/// Actions are matched case-insensitively.
fn validate_action(action: &str) -> Result<(), validator::ValidationError> {
    match action.to_lowercase().as_str() {
        "create" | "login" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid action")),
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::InternalServerError("Hashing error".to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    argon2::PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub async fn create_admin(
    admins: &dyn AdminRepository,
    username: &str,
    password: &str,
) -> Result<Admin, AppError> {
    let admin = Admin {
        admin_id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        created_at: Utc::now(),
    };
    admins.insert_admin(admin.clone()).await?;
    info!("Created admin '{}'", admin.username);
    Ok(admin)
}

/// Creates the configured startup admin unless that username already exists.
pub async fn ensure_admin(
    admins: &dyn AdminRepository,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    if admins.find_admin(username).await?.is_some() {
        return Ok(false);
    }
    create_admin(admins, username, password).await?;
    Ok(true)
}

fn issue_token(keys: &JwtKeys, admin: &Admin) -> Result<String, AppError> {
    keys.generate_token(&admin.admin_id.to_string())
        .map_err(|_| AppError::InternalServerError("Token generation error".to_string()))
}

/// `login` exchanges credentials for a token. `create` registers an admin; it is
/// open only while no admin exists, after that it needs an admin token.
pub async fn auth_handler(
    req: HttpRequest,
    body: web::Json<AuthRequest>,
    admins: web::Data<dyn AdminRepository>,
    keys: web::Data<JwtKeys>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    match body.action.to_lowercase().as_str() {
        "create" => {
            validate_payload(&body)?;
            if admins.count_admins().await? > 0 {
                jwt::authorize(&req, &keys)?;
            }

            let admin = create_admin(&**admins, &body.username, &body.password).await?;
            let token = issue_token(&keys, &admin)?;

            Ok(HttpResponse::Created().json(AuthResponse {
                username: admin.username,
                token,
            }))
        }
        "login" => {
            let admin = admins
                .find_admin(&body.username)
                .await?
                .filter(|admin| verify_password(&body.password, &admin.password_hash))
                .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

            let token = issue_token(&keys, &admin)?;
            info!("Admin '{}' logged in", admin.username);

            Ok(HttpResponse::Ok().json(AuthResponse {
                username: admin.username,
                token,
            }))
        }
        _ => Err(AppError::BadRequest("Invalid action".to_string())),
    }
}
