use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use log::info;
use uuid::Uuid;

use crate::{
    db,
    dto::{EventCounts, EventListResponse, NewEventDto, ParticipantEntry, UpdateEventDto},
    errors::ApiError,
    models::{Event, EventDetails, EventParticipant, ParticipationStatus, User},
    PGPool,
};

use super::{auth::UserAuthData, reconcile};

fn event_not_found() -> ApiError {
    ApiError::not_found("Event not found")
}

pub async fn create(user_auth_data: &UserAuthData, dto: NewEventDto, pool: &PGPool) -> Result<EventDetails, ApiError> {
    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        title: dto.title,
        description: dto.description,
        start_datetime: dto.start_datetime,
        end_datetime: dto.end_datetime,
        location: dto.location,
        is_public: dto.is_public,
        created_by: dto.created_by.unwrap_or(user_auth_data.user_id),
        created_at: now,
        updated_at: now,
    };
    let entries: Vec<ParticipantEntry> = dto.participants.into_iter().map(Into::into).collect();

    let mut tx = pool.begin().await?;
    let event = db::event::create(&event, &mut *tx).await?;
    let additions: Vec<(Uuid, ParticipationStatus)> = reconcile::plan(&[], &entries)
        .add
        .into_iter()
        .map(|c| (c.user_id, c.status))
        .collect();
    db::participant::create_many(event.id, &additions, &mut *tx).await?;
    tx.commit().await?;

    info!("event {} created by {}", event.id, event.created_by);
    let mut details = load_details(vec![event], pool).await?;
    details.pop().ok_or_else(event_not_found)
}

pub async fn get_all(pool: &PGPool) -> Result<EventListResponse, ApiError> {
    let events = db::event::get_all(pool).await?;
    list_response(events, pool).await
}

pub async fn get_for_user(user_id: Uuid, pool: &PGPool) -> Result<EventListResponse, ApiError> {
    let events = db::event::get_for_user(user_id, pool).await?;
    list_response(events, pool).await
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<EventDetails, ApiError> {
    let event = db::event::get_by_id(id, pool).await?.ok_or_else(event_not_found)?;
    let mut details = load_details(vec![event], pool).await?;
    details.pop().ok_or_else(event_not_found)
}

/// Updates the event fields and, when a participant list is given,
/// reconciles the stored participants with it. Runs in one transaction.
pub async fn update(id: Uuid, dto: UpdateEventDto, pool: &PGPool) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    db::event::set_fields(id, &dto, &mut *tx)
        .await?
        .ok_or_else(event_not_found)?;
    if let Some(participants) = &dto.participants {
        reconcile::reconcile(&mut tx, id, participants).await?;
    }
    tx.commit().await?;
    info!("event {} updated", id);
    Ok(())
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    match db::event::delete(id, pool).await? {
        0 => Err(event_not_found()),
        _ => {
            info!("event {} deleted", id);
            Ok(())
        }
    }
}

async fn list_response(events: Vec<Event>, pool: &PGPool) -> Result<EventListResponse, ApiError> {
    let counts = count_events(&events, Utc::now());
    let events = load_details(events, pool).await?;
    Ok(EventListResponse { events, counts })
}

/// Embeds creators and participants, keeping the order of `events`.
async fn load_details(events: Vec<Event>, pool: &PGPool) -> Result<Vec<EventDetails>, ApiError> {
    if events.is_empty() {
        return Ok(Vec::new());
    }
    let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
    let mut creator_ids: Vec<Uuid> = events.iter().map(|e| e.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();

    let creators: HashMap<Uuid, User> = db::user::get_by_ids(&creator_ids, pool)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let mut participants: HashMap<Uuid, Vec<EventParticipant>> = HashMap::new();
    for p in db::participant::get_by_events(&event_ids, pool).await? {
        participants.entry(p.event_id).or_default().push(p);
    }

    events
        .into_iter()
        .map(|event| -> Result<EventDetails, ApiError> {
            let creator = creators
                .get(&event.created_by)
                .cloned()
                .ok_or_else(|| ApiError::internal(format!("creator of event {} is missing", event.id)))?;
            let participants = participants.remove(&event.id).unwrap_or_default();
            Ok(EventDetails { event, creator, participants })
        })
        .collect()
}

/// Counts events overall, starting in the month of `now`, and starting on the day of `now` (UTC).
pub fn count_events(events: &[Event], now: DateTime<Utc>) -> EventCounts {
    let today = now.date_naive();
    events.iter().fold(EventCounts::default(), |mut counts, event| {
        let start = event.start_datetime.date_naive();
        counts.total += 1;
        if start.year() == today.year() && start.month() == today.month() {
            counts.this_month += 1;
            if start == today {
                counts.today += 1;
            }
        }
        counts
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event_starting(start: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Meetup".to_string(),
            description: None,
            start_datetime: start,
            end_datetime: start + Duration::hours(1),
            location: Some("Lyon".to_string()),
            is_public: true,
            created_by: Uuid::new_v4(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn counts_total_month_and_day() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let events = vec![
            event_starting(Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()),
            event_starting(Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap()),
            event_starting(Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap()),
            event_starting(Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 0).unwrap()),
            event_starting(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()),
        ];

        let counts = count_events(&events, now);
        assert_eq!(
            counts,
            EventCounts {
                total: 5,
                this_month: 3,
                today: 2
            }
        );
    }

    #[test]
    fn counts_are_zero_without_events() {
        assert_eq!(count_events(&[], Utc::now()), EventCounts::default());
    }
}
