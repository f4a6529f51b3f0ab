use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{EventParticipant, ParticipantWithUser, ParticipationStatus, User};

// Flat row for the participant/user join.
#[derive(Debug, sqlx::FromRow)]
struct ParticipantUserRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    status: ParticipationStatus,
    created_at: DateTime<Utc>,
    user_full_name: String,
    user_email: String,
    user_password_hash: String,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl From<ParticipantUserRow> for ParticipantWithUser {
    fn from(row: ParticipantUserRow) -> Self {
        ParticipantWithUser {
            participant: EventParticipant {
                id: row.id,
                event_id: row.event_id,
                user_id: row.user_id,
                status: row.status,
                created_at: row.created_at,
            },
            user: User {
                id: row.user_id,
                full_name: row.user_full_name,
                email: row.user_email,
                password_hash: row.user_password_hash,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
        }
    }
}

pub async fn get_by_event(event_id: Uuid, conn: impl PgExecutor<'_>) -> Result<Vec<EventParticipant>, sqlx::Error> {
    sqlx::query_as::<_, EventParticipant>(
        "SELECT * FROM event_participants WHERE event_id = $1 ORDER BY created_at, id",
    )
    .bind(event_id)
    .fetch_all(conn)
    .await
}

pub async fn get_by_events(
    event_ids: &[Uuid],
    conn: impl PgExecutor<'_>,
) -> Result<Vec<EventParticipant>, sqlx::Error> {
    sqlx::query_as::<_, EventParticipant>(
        "SELECT * FROM event_participants WHERE event_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(event_ids)
    .fetch_all(conn)
    .await
}

// /event-participants/{event_id}
pub async fn get_by_event_with_users(
    event_id: Uuid,
    conn: impl PgExecutor<'_>,
) -> Result<Vec<ParticipantWithUser>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ParticipantUserRow>(
        "SELECT p.id, p.event_id, p.user_id, p.status, p.created_at,
            u.full_name AS user_full_name,
            u.email AS user_email,
            u.password_hash AS user_password_hash,
            u.created_at AS user_created_at,
            u.updated_at AS user_updated_at
        FROM event_participants p
        JOIN users u ON u.id = p.user_id
        WHERE p.event_id = $1
        ORDER BY p.created_at, p.id",
    )
    .bind(event_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(ParticipantWithUser::from).collect())
}

pub async fn find(
    event_id: Uuid,
    user_id: Uuid,
    conn: impl PgExecutor<'_>,
) -> Result<Option<EventParticipant>, sqlx::Error> {
    sqlx::query_as::<_, EventParticipant>(
        "SELECT * FROM event_participants WHERE event_id = $1 AND user_id = $2",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn create(
    event_id: Uuid,
    user_id: Uuid,
    status: ParticipationStatus,
    conn: impl PgExecutor<'_>,
) -> Result<EventParticipant, sqlx::Error> {
    sqlx::query_as::<_, EventParticipant>(
        "INSERT INTO event_participants (id, event_id, user_id, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(user_id)
    .bind(status)
    .fetch_one(conn)
    .await
}

/// Bulk insert that skips pairs already present for the event.
pub async fn create_many(
    event_id: Uuid,
    entries: &[(Uuid, ParticipationStatus)],
    conn: impl PgExecutor<'_>,
) -> Result<u64, sqlx::Error> {
    if entries.is_empty() {
        return Ok(0);
    }
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO event_participants (id, event_id, user_id, status) ");
    query_builder.push_values(entries, |mut row, (user_id, status)| {
        row.push_bind(Uuid::new_v4())
            .push_bind(event_id)
            .push_bind(*user_id)
            .push_bind(*status);
    });
    query_builder.push(" ON CONFLICT (event_id, user_id) DO NOTHING");

    let res = query_builder.build().execute(conn).await?;
    Ok(res.rows_affected())
}

pub async fn set_status(
    id: Uuid,
    status: ParticipationStatus,
    conn: impl PgExecutor<'_>,
) -> Result<Option<EventParticipant>, sqlx::Error> {
    sqlx::query_as::<_, EventParticipant>(
        "UPDATE event_participants SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await
}

pub async fn set_status_for_user(
    event_id: Uuid,
    user_id: Uuid,
    status: ParticipationStatus,
    conn: impl PgExecutor<'_>,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE event_participants SET status = $3 WHERE event_id = $1 AND user_id = $2",
    )
    .bind(event_id)
    .bind(user_id)
    .bind(status)
    .execute(conn)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete(id: Uuid, conn: impl PgExecutor<'_>) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM event_participants WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
