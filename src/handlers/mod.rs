pub mod auth;
pub mod event;
pub mod participant;
pub mod user;

use actix_cors::Cors;
use actix_web::web;

use crate::{
    errors::{json_error_handler, path_error_handler, query_error_handler},
    service::auth::{jwt::JwtKeys, AuthMiddleware},
    PGPool,
};

/// Builds the CORS layer; `*` allows every origin.
pub fn cors(allowed_origin: &str) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    match allowed_origin {
        "*" => cors.allow_any_origin(),
        origin => cors.allowed_origin(origin),
    }
}

/// Registers shared state, extractor error handlers and every route.
/// Everything outside `/auth` sits behind the bearer-token middleware.
pub fn configure(cfg: &mut web::ServiceConfig, pool: web::Data<PGPool>, keys: web::Data<JwtKeys>) {
    cfg.app_data(pool)
        .app_data(keys.clone())
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(web::scope("/auth").configure(auth::init_routes))
        .service(
            web::scope("/events")
                .wrap(AuthMiddleware { keys: keys.clone() })
                .configure(event::init_routes),
        )
        .service(
            web::scope("/event-participants")
                .wrap(AuthMiddleware { keys: keys.clone() })
                .configure(participant::init_routes),
        )
        .service(
            web::scope("/user")
                .wrap(AuthMiddleware { keys })
                .configure(user::init_routes),
        );
}
