pub mod auth;
pub mod employee;
pub mod public;

use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/v1/auth").route(web::post().to(auth::auth_handler)))
        .service(
            web::resource("/v1/employee")
                .route(web::post().to(employee::create_employee))
                .route(web::get().to(employee::get_employees)),
        )
        .service(
            web::resource("/v1/employee/{employee_id}")
                .route(web::get().to(employee::get_employee))
                .route(web::put().to(employee::update_employee))
                .route(web::delete().to(employee::delete_employee)),
        )
        .service(
            web::resource("/v1/qr/regenerate").route(web::post().to(employee::regenerate_qr_codes)),
        )
        .service(
            web::resource("/employee/{employee_id}/qr.png")
                .route(web::get().to(public::employee_qr_png)),
        )
        .service(
            web::resource("/employee/{employee_id}").route(web::get().to(public::emergency_details)),
        )
        .service(
            web::resource("/emergency_details/{employee_id}")
                .route(web::get().to(public::emergency_details)),
        );
}
