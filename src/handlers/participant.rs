use actix_web::{delete, get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dto::{MessageResponse, NewParticipantDto, UpdateParticipantDto},
    errors::ApiError,
    service, PGPool,
};

#[post("")]
pub async fn create(dto: web::Json<NewParticipantDto>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let participant = service::participant::create(dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Created().json(participant))
}

#[get("/{event_id}")]
pub async fn get_by_event(event_id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let participants = service::participant::get_by_event(event_id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(participants))
}

#[patch("/{id}")]
pub async fn update(
    id: web::Path<Uuid>,
    dto: web::Json<UpdateParticipantDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let participant = service::participant::update(id.into_inner(), dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(participant))
}

#[delete("/{id}")]
pub async fn remove(id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    service::participant::delete(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Participant removed")))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(get_by_event)
        .service(update)
        .service(remove);
}
