//! Converges the stored participant rows of an event to a desired list.
//!
//! [`plan`] is the pure diff; [`reconcile`] fetches the current rows and
//! applies the plan in three phases (remove, add, update) on the caller's
//! connection, which is expected to be inside a transaction.

use std::collections::HashMap;

use log::debug;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db,
    dto::ParticipantEntry,
    models::{EventParticipant, ParticipationStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub user_id: Uuid,
    pub status: ParticipationStatus,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Row ids of participants missing from the desired list.
    pub remove: Vec<Uuid>,
    pub add: Vec<StatusChange>,
    pub update: Vec<StatusChange>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty() && self.update.is_empty()
    }
}

/// Diffs `current` against `desired`.
///
/// When a user appears several times in `desired`, the last explicit status
/// wins. New users without any explicit status are added as `MAYBE`; existing
/// users without one keep their stored status.
pub fn plan(current: &[EventParticipant], desired: &[ParticipantEntry]) -> ReconcilePlan {
    let stored: HashMap<Uuid, ParticipationStatus> =
        current.iter().map(|p| (p.user_id, p.status)).collect();

    let mut order: Vec<Uuid> = Vec::with_capacity(desired.len());
    let mut wanted: HashMap<Uuid, Option<ParticipationStatus>> = HashMap::with_capacity(desired.len());
    for entry in desired {
        match wanted.get_mut(&entry.user_id) {
            Some(slot) => {
                if entry.status.is_some() {
                    *slot = entry.status;
                }
            }
            None => {
                order.push(entry.user_id);
                wanted.insert(entry.user_id, entry.status);
            }
        }
    }

    let remove = current
        .iter()
        .filter(|p| !wanted.contains_key(&p.user_id))
        .map(|p| p.id)
        .collect();

    let mut add = Vec::new();
    let mut update = Vec::new();
    for user_id in order {
        let status = wanted[&user_id];
        match stored.get(&user_id) {
            None => add.push(StatusChange {
                user_id,
                status: status.unwrap_or_default(),
            }),
            Some(existing) => {
                if let Some(status) = status.filter(|s| s != existing) {
                    update.push(StatusChange { user_id, status });
                }
            }
        }
    }

    ReconcilePlan { remove, add, update }
}

/// Fetches the current rows for `event_id`, then removes, adds and updates
/// until they match `desired`. Stops at the first failing statement.
pub async fn reconcile(
    conn: &mut PgConnection,
    event_id: Uuid,
    desired: &[ParticipantEntry],
) -> Result<ReconcilePlan, sqlx::Error> {
    let current = db::participant::get_by_event(event_id, &mut *conn).await?;
    let plan = plan(&current, desired);
    debug!(
        "reconciling participants of {}: {} to remove, {} to add, {} to update",
        event_id,
        plan.remove.len(),
        plan.add.len(),
        plan.update.len()
    );

    for row_id in &plan.remove {
        db::participant::delete(*row_id, &mut *conn).await?;
    }

    let additions: Vec<(Uuid, ParticipationStatus)> =
        plan.add.iter().map(|c| (c.user_id, c.status)).collect();
    db::participant::create_many(event_id, &additions, &mut *conn).await?;

    for change in &plan.update {
        db::participant::set_status_for_user(event_id, change.user_id, change.status, &mut *conn).await?;
    }

    Ok(plan)
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{db, models::{Event, User}, PGPool};
    use crate::models::ParticipationStatus::{Attending, Declined, Maybe};
    use chrono::{Duration, Utc};

    async fn seed_user(pool: &PGPool, email: &str) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: email.to_string(),
            email: email.to_string(),
            password_hash: "x$y".to_string(),
            created_at: now,
            updated_at: now,
        };
        db::user::create(&user, pool).await.unwrap().id
    }

    async fn seed_event(pool: &PGPool, creator: Uuid) -> Uuid {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: "Board games".to_string(),
            description: None,
            start_datetime: now,
            end_datetime: now + Duration::hours(2),
            location: None,
            is_public: true,
            created_by: creator,
            created_at: now,
            updated_at: now,
        };
        db::event::create(&event, pool).await.unwrap().id
    }

    fn entry(user_id: Uuid, status: ParticipationStatus) -> ParticipantEntry {
        ParticipantEntry { user_id, status: Some(status) }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn reconciles_against_postgres(pool: PGPool) {
        let u1 = seed_user(&pool, "u1@example.com").await;
        let u2 = seed_user(&pool, "u2@example.com").await;
        let u3 = seed_user(&pool, "u3@example.com").await;
        let event_id = seed_event(&pool, u1).await;
        db::participant::create(event_id, u1, Attending, &pool).await.unwrap();
        let kept = db::participant::create(event_id, u2, Maybe, &pool).await.unwrap();

        let desired = vec![entry(u2, Declined), entry(u3, Attending)];
        let mut tx = pool.begin().await.unwrap();
        reconcile(&mut tx, event_id, &desired).await.unwrap();
        tx.commit().await.unwrap();

        let rows = db::participant::get_by_event(event_id, &pool).await.unwrap();
        assert_eq!(rows.len(), 2);
        let u2_row = rows.iter().find(|r| r.user_id == u2).unwrap();
        assert_eq!(u2_row.id, kept.id);
        assert_eq!(u2_row.status, Declined);
        assert!(rows.iter().any(|r| r.user_id == u3 && r.status == Attending));

        // second run is a no-op
        let mut tx = pool.begin().await.unwrap();
        let second = reconcile(&mut tx, event_id, &desired).await.unwrap();
        tx.commit().await.unwrap();
        assert!(second.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn unknown_user_rolls_back_removals(pool: PGPool) {
        let u1 = seed_user(&pool, "owner@example.com").await;
        let event_id = seed_event(&pool, u1).await;
        db::participant::create(event_id, u1, Attending, &pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let result = reconcile(&mut tx, event_id, &[entry(Uuid::new_v4(), Maybe)]).await;
        assert!(result.is_err());
        drop(tx);

        let rows = db::participant::get_by_event(event_id, &pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, u1);
    }
}
