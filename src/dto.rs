use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::{EventDetails, ParticipationStatus, User};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<&User> for LoginUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.full_name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, iat: usize, exp: usize) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            iat,
            exp,
        }
    }
}

/// One entry of a desired participant list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParticipantEntry {
    pub user_id: Uuid,
    #[serde(default)]
    pub status: Option<ParticipationStatus>,
}

/// Event creation accepts either bare user ids or full entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParticipantInput {
    Id(Uuid),
    Entry(ParticipantEntry),
}

impl From<ParticipantInput> for ParticipantEntry {
    fn from(input: ParticipantInput) -> Self {
        match input {
            ParticipantInput::Id(user_id) => ParticipantEntry {
                user_id,
                status: None,
            },
            ParticipantInput::Entry(entry) => entry,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewEventDto {
    pub title: String,
    pub description: Option<String>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub participants: Vec<ParticipantInput>,
}

fn default_is_public() -> bool {
    true
}

// Tells an explicit `null` (Some(None)) apart from an absent field (None).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Absent fields are left alone; `description` and `location` are cleared by `null`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UpdateEventDto {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub participants: Option<Vec<ParticipantEntry>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewParticipantDto {
    pub event_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub status: Option<ParticipationStatus>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateParticipantDto {
    pub status: ParticipationStatus,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub total: usize,
    pub this_month: usize,
    pub today: usize,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventDetails>,
    pub counts: EventCounts,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_input_accepts_bare_ids_and_entries() {
        let raw = r#"[
            "8c0e6f4e-1b2a-4c3d-9e8f-0a1b2c3d4e5f",
            {"user_id": "1f2e3d4c-5b6a-4978-8695-a4b3c2d1e0f9", "status": "ATTENDING"}
        ]"#;
        let inputs: Vec<ParticipantInput> = serde_json::from_str(raw).unwrap();
        let entries: Vec<ParticipantEntry> = inputs.into_iter().map(Into::into).collect();

        assert_eq!(entries[0].status, None);
        assert_eq!(entries[1].status, Some(ParticipationStatus::Attending));
    }

    #[test]
    fn new_event_defaults() {
        let raw = r#"{
            "title": "Standup",
            "start_datetime": "2026-10-16T09:00:00Z",
            "end_datetime": "2026-10-16T09:15:00Z"
        }"#;
        let dto: NewEventDto = serde_json::from_str(raw).unwrap();

        assert!(dto.is_public);
        assert!(dto.participants.is_empty());
        assert!(dto.created_by.is_none());
    }

    #[test]
    fn register_request_uses_camel_case() {
        let raw = r#"{"fullName": "Ada Lovelace", "email": "ada@example.com", "password": "pw"}"#;
        let dto: RegisterRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(dto.full_name, "Ada Lovelace");
    }

    #[test]
    fn update_tells_null_from_absent() {
        let dto: UpdateEventDto = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(dto.description, Some(None));
        assert_eq!(dto.location, None);

        let dto: UpdateEventDto = serde_json::from_str(r#"{"location": "Lyon"}"#).unwrap();
        assert_eq!(dto.location, Some(Some("Lyon".to_string())));
        assert!(dto.participants.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = r#"{"status": "GOING"}"#;
        assert!(serde_json::from_str::<UpdateParticipantDto>(raw).is_err());
    }
}
