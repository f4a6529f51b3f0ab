use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dto::{MessageResponse, NewEventDto, UpdateEventDto},
    errors::ApiError,
    service::{self, auth::UserAuthData},
    PGPool,
};

#[post("")]
pub async fn create(
   user_auth_data: UserAuthData,
   new_event_dto: web::Json<NewEventDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   let event = service::event::create(&user_auth_data, new_event_dto.into_inner(), pool_state.get_ref()).await?;
   Ok(HttpResponse::Created().json(event))
}

#[get("")]
pub async fn get_all(pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let events = service::event::get_all(pool_state.get_ref()).await?;
   Ok(HttpResponse::Ok().json(events))
}

#[get("/user/{user_id}")]
pub async fn get_for_user(user_id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let events = service::event::get_for_user(user_id.into_inner(), pool_state.get_ref()).await?;
   Ok(HttpResponse::Ok().json(events))
}

#[get("/{id}")]
pub async fn get_by_id(id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   let event = service::event::get_by_id(id.into_inner(), pool_state.get_ref()).await?;
   Ok(HttpResponse::Ok().json(event))
}

#[put("/{id}")]
pub async fn update(
   id: web::Path<Uuid>,
   update_event_dto: web::Json<UpdateEventDto>,
   pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
   service::event::update(id.into_inner(), update_event_dto.into_inner(), pool_state.get_ref()).await?;
   Ok(HttpResponse::Ok().json(MessageResponse::new("Event updated successfully")))
}

#[delete("/{id}")]
pub async fn remove(id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
   service::event::delete(id.into_inner(), pool_state.get_ref()).await?;
   Ok(HttpResponse::Ok().json(MessageResponse::new("Event deleted successfully")))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
   cfg.service(create)
      .service(get_all)
      .service(get_for_user)
      .service(get_by_id)
      .service(update)
      .service(remove);
}
