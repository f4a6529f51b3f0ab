use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{dto::UpdateEventDto, models::Event};

pub async fn create(event: &Event, conn: impl PgExecutor<'_>) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, title, description, start_datetime, end_datetime, location, is_public, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *",
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_datetime)
    .bind(event.end_datetime)
    .bind(&event.location)
    .bind(event.is_public)
    .bind(event.created_by)
    .fetch_one(conn)
    .await
}

// /events/id
pub async fn get_by_id(id: Uuid, conn: impl PgExecutor<'_>) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn get_all(conn: impl PgExecutor<'_>) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY start_datetime")
        .fetch_all(conn)
        .await
}

/// Events the user created or takes part in.
pub async fn get_for_user(user_id: Uuid, conn: impl PgExecutor<'_>) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events
        WHERE created_by = $1
            OR id IN (SELECT event_id FROM event_participants WHERE user_id = $1)
        ORDER BY start_datetime",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Absent fields keep their stored value; a nullable field given as `null` is cleared.
/// Returns `None` when no event has `id`.
pub async fn set_fields(
    id: Uuid,
    fields: &UpdateEventDto,
    conn: impl PgExecutor<'_>,
) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "UPDATE events SET
            title = COALESCE($2, title),
            description = CASE WHEN $8 THEN $3 ELSE description END,
            start_datetime = COALESCE($4, start_datetime),
            end_datetime = COALESCE($5, end_datetime),
            location = CASE WHEN $9 THEN $6 ELSE location END,
            is_public = COALESCE($7, is_public),
            updated_at = now()
        WHERE id = $1
        RETURNING *",
    )
    .bind(id)
    .bind(&fields.title)
    .bind(fields.description.as_ref().and_then(Option::as_deref))
    .bind(fields.start_datetime)
    .bind(fields.end_datetime)
    .bind(fields.location.as_ref().and_then(Option::as_deref))
    .bind(fields.is_public)
    .bind(fields.description.is_some())
    .bind(fields.location.is_some())
    .fetch_optional(conn)
    .await
}

pub async fn delete(id: Uuid, conn: impl PgExecutor<'_>) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
