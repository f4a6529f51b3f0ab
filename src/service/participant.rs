use log::info;
use uuid::Uuid;

use crate::{
    db,
    dto::{NewParticipantDto, UpdateParticipantDto},
    errors::{is_unique_violation, ApiError},
    models::{EventParticipant, ParticipantWithUser},
    PGPool,
};

const DUPLICATE: &str = "Participant already exists.";

pub async fn create(dto: NewParticipantDto, pool: &PGPool) -> Result<EventParticipant, ApiError> {
    if db::participant::find(dto.event_id, dto.user_id, pool).await?.is_some() {
        return Err(ApiError::bad_request(DUPLICATE));
    }
    let status = dto.status.unwrap_or_default();
    match db::participant::create(dto.event_id, dto.user_id, status, pool).await {
        Ok(participant) => {
            info!("user {} joined event {}", participant.user_id, participant.event_id);
            Ok(participant)
        }
        Err(err) if is_unique_violation(&err) => Err(ApiError::bad_request(DUPLICATE)),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_by_event(event_id: Uuid, pool: &PGPool) -> Result<Vec<ParticipantWithUser>, ApiError> {
    Ok(db::participant::get_by_event_with_users(event_id, pool).await?)
}

pub async fn update(id: Uuid, dto: UpdateParticipantDto, pool: &PGPool) -> Result<EventParticipant, ApiError> {
    db::participant::set_status(id, dto.status, pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Participant not found"))
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    match db::participant::delete(id, pool).await? {
        0 => Err(ApiError::not_found("Participant not found")),
        _ => {
            info!("participant {} removed", id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        errors::is_unique_violation,
        models::{Event, ParticipationStatus, User},
    };
    use chrono::{Duration, Utc};

    async fn seed(pool: &PGPool) -> (Uuid, Uuid) {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: "unused".to_string(),
            created_at: now,
            updated_at: now,
        };
        let user = db::user::create(&user, pool).await.unwrap();
        let event = Event {
            id: Uuid::new_v4(),
            title: "Compiler night".to_string(),
            description: None,
            start_datetime: now,
            end_datetime: now + Duration::hours(2),
            location: None,
            is_public: false,
            created_by: user.id,
            created_at: now,
            updated_at: now,
        };
        let event = db::event::create(&event, pool).await.unwrap();
        (event.id, user.id)
    }

    fn join(event_id: Uuid, user_id: Uuid) -> NewParticipantDto {
        NewParticipantDto { event_id, user_id, status: None }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn joining_twice_is_a_bad_request(pool: PGPool) {
        let (event_id, user_id) = seed(&pool).await;

        let first = create(join(event_id, user_id), &pool).await.unwrap();
        assert_eq!(first.status, ParticipationStatus::Maybe);

        let err = create(join(event_id, user_id), &pool).await.unwrap_err();
        assert_eq!(err, ApiError::bad_request("Participant already exists."));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn racing_insert_hits_the_unique_constraint(pool: PGPool) {
        let (event_id, user_id) = seed(&pool).await;
        db::participant::create(event_id, user_id, ParticipationStatus::Attending, &pool)
            .await
            .unwrap();

        // a second insert that skipped the lookup, as a concurrent request would
        let err = db::participant::create(event_id, user_id, ParticipationStatus::Maybe, &pool)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn missing_participant_is_not_found(pool: PGPool) {
        let dto = UpdateParticipantDto { status: ParticipationStatus::Declined };
        let err = update(Uuid::new_v4(), dto, &pool).await.unwrap_err();
        assert_eq!(err, ApiError::not_found("Participant not found"));

        let err = delete(Uuid::new_v4(), &pool).await.unwrap_err();
        assert_eq!(err, ApiError::not_found("Participant not found"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn listing_embeds_user_without_password_hash(pool: PGPool) {
        let (event_id, user_id) = seed(&pool).await;
        create(join(event_id, user_id), &pool).await.unwrap();

        let rows = get_by_event(event_id, &pool).await.unwrap();
        assert_eq!(rows.len(), 1);

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["user_id"], user_id.to_string());
        assert_eq!(json[0]["user"]["email"], "grace@example.com");
        assert!(json[0]["user"].get("password_hash").is_none());
        assert!(json[0]["user"].get("passwordHash").is_none());
    }
}
