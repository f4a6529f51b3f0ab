use actix_web::{get, web, HttpResponse};
use uuid::Uuid;

use crate::{dto::UserSearchQuery, errors::ApiError, service, PGPool};

#[get("/search")]
pub async fn search(query: web::Query<UserSearchQuery>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let users = service::user::search(&query, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
pub async fn get_by_id(id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let user = service::user::get_by_id(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(user))
}

// "/search" must be registered before "/{id}"
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(search).service(get_by_id);
}
