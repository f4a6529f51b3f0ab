use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::{
    db,
    dto::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, TokenResponse, UserSearchQuery},
    errors::{is_unique_violation, ApiError},
    models::User,
    PGPool,
};

use super::{auth::jwt::{self, JwtKeys}, crypto};

const SEARCH_LIMIT: i64 = 5;

pub async fn create(dto: RegisterRequest, keys: &JwtKeys, pool: &PGPool) -> Result<TokenResponse, ApiError> {
    let RegisterRequest { full_name, email, password } = dto;
    if db::user::exists_by_email(&email, pool).await? {
        return Err(ApiError::bad_request("Account already exists"));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        full_name,
        email,
        password_hash: crypto::hash_password(&password)?,
        created_at: now,
        updated_at: now,
    };
    let user = match db::user::create(&user, pool).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::bad_request("Account already exists"))
        }
        Err(err) => return Err(err.into()),
    };
    info!("registered user {}", user.id);

    let token = jwt::create(keys, user.id, &user.email)?;
    Ok(TokenResponse { token })
}

pub async fn login(dto: LoginRequest, keys: &JwtKeys, pool: &PGPool) -> Result<LoginResponse, ApiError> {
    let user = db::user::get_by_email(&dto.email, pool)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;
    if !crypto::verify_password(&dto.password, &user.password_hash)? {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let token = jwt::create(keys, user.id, &user.email)?;
    Ok(LoginResponse {
        token,
        user: LoginUser::from(&user),
    })
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<User, ApiError> {
    db::user::get_by_id(id, pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub fn search_term(query: &UserSearchQuery) -> Result<&str, ApiError> {
    query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))
}

pub async fn search(query: &UserSearchQuery, pool: &PGPool) -> Result<Vec<User>, ApiError> {
    let term = search_term(query)?;
    Ok(db::user::search_by_email(term, SEARCH_LIMIT, pool).await?)
}
