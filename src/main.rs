mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod qr;
mod utils;
mod views;

#[cfg(test)]
mod test_support;

use std::io;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use crate::config::{AppConfig, SinkKind};
use crate::qr::composer::{load_logo, QrComposer};
use crate::qr::sink::{QrSink, S3Sink};
use crate::qr::QrService;
use crate::utils::jwt::JwtKeys;

fn startup_error<E>(err: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::Other, err)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(startup_error)?;

    let (employees, admins) = db::open(&config.storage).await.map_err(startup_error)?;

    if let Some((username, password)) = &config.bootstrap_admin {
        if handlers::auth::ensure_admin(&*admins, username, password)
            .await
            .map_err(startup_error)?
        {
            info!("Bootstrap admin '{}' created", username);
        }
    }

    let logo = match &config.logo_path {
        Some(path) => load_logo(path),
        None => {
            info!("LOGO_PATH not set, QR codes will be generated without a logo");
            None
        }
    };

    let sink = match &config.sink {
        SinkKind::Inline => QrSink::Inline,
        SinkKind::Disk(dir) => QrSink::Disk { dir: dir.clone() },
        SinkKind::S3 {
            bucket,
            region,
            key_prefix,
        } => QrSink::S3(S3Sink {
            client: utils::s3::create_s3_client(region).await,
            bucket: bucket.clone(),
            region: region.clone(),
            key_prefix: key_prefix.clone(),
        }),
    };

    let qr = web::Data::new(QrService::new(
        config.base_url.clone(),
        QrComposer::new(config.qr, logo),
        sink,
    ));
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_days));
    let employees = web::Data::from(employees);
    let admins = web::Data::from(admins);

    info!(
        "Starting server at {}, QR codes encode {}",
        config.bind_addr, config.base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(employees.clone())
            .app_data(admins.clone())
            .app_data(qr.clone())
            .app_data(keys.clone())
            .configure(handlers::routes)
            .default_service(web::route().to(handlers::public::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
