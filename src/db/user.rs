use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::User;

pub async fn create(user: &User, conn: impl PgExecutor<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, full_name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *",
    )
    .bind(user.id)
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_one(conn)
    .await
}

pub async fn get_by_id(id: Uuid, conn: impl PgExecutor<'_>) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn get_by_ids(ids: &[Uuid], conn: impl PgExecutor<'_>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(conn)
        .await
}

pub async fn get_by_email(email: &str, conn: impl PgExecutor<'_>) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await
}

pub async fn exists_by_email(email: &str, conn: impl PgExecutor<'_>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(conn)
        .await
}

// /user/search?email=
pub async fn search_by_email(
    term: &str,
    limit: i64,
    conn: impl PgExecutor<'_>,
) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(term));
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE email ILIKE $1 ESCAPE '\\' ORDER BY email LIMIT $2",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Escapes LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ali"), "ali");
        assert_eq!(escape_like("a_b%c"), "a\\_b\\%c");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
