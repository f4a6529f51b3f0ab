use actix_web::{post, web, HttpResponse};

use crate::{
    dto::{LoginRequest, RegisterRequest},
    errors::ApiError,
    service::{self, auth::jwt::JwtKeys},
    PGPool,
};

#[post("/register")]
pub async fn register(
    dto: web::Json<RegisterRequest>,
    keys: web::Data<JwtKeys>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let response = service::user::create(dto.into_inner(), &keys, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/login")]
pub async fn login(
    dto: web::Json<LoginRequest>,
    keys: web::Data<JwtKeys>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let response = service::user::login(dto.into_inner(), &keys, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}
