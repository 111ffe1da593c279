use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ============= Game Data Types =============

/// Map a freshly created character is placed on.
pub const DEFAULT_MAP_ID: &str = "starting_zone";

/// Largest stack a single inventory slot may hold.
pub const MAX_STACK_QUANTITY: i64 = 1_000_000;

/// A playable avatar owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Character {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub level: i64,
    pub experience: i64,
    pub map_id: String,
    pub position_x: f64,
    pub position_y: f64,
}

/// List projection of a character. Experience is only exposed on the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CharacterSummary {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub map_id: String,
    pub position_x: f64,
    pub position_y: f64,
}

impl From<Character> for CharacterSummary {
    fn from(c: Character) -> Self {
        Self {
            id: c.id,
            name: c.name,
            level: c.level,
            map_id: c.map_id,
            position_x: c.position_x,
            position_y: c.position_y,
        }
    }
}

/// Fields of a character that a client may change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CharacterPatch {
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub experience: Option<i64>,
    #[serde(default)]
    pub map_id: Option<String>,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
}

impl CharacterPatch {
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.experience.is_none()
            && self.map_id.is_none()
            && self.position_x.is_none()
            && self.position_y.is_none()
    }
}

/// Catalog entry for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub item_type: String,
}

/// Catalog entry for a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Quest {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub reward_xp: i64,
}

/// One stacked item held by a character, joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryEntry {
    pub item_id: i64,
    pub name: String,
    pub item_type: String,
    pub quantity: i64,
}

/// A character's progress on one quest, joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuestProgress {
    pub quest_id: i64,
    pub name: String,
    pub reward_xp: i64,
    pub status: QuestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::NotStarted => "not_started",
            QuestStatus::InProgress => "in_progress",
            QuestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "not_started" => Ok(QuestStatus::NotStarted),
            "in_progress" => Ok(QuestStatus::InProgress),
            "completed" => Ok(QuestStatus::Completed),
            other => Err(AppError::InvalidInput(format!(
                "Unknown quest status '{}'",
                other
            ))),
        }
    }
}

// ============= Authentication Types =============

/// Registration body. Fields are optional so that a missing one is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// RFC3339 formatted creation timestamp
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// JWT claims. No `exp`: tokens do not expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
}

// ============= Character API Types =============

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCharacterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterListResponse {
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AddInventoryRequest {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryResponse {
    pub inventory: Vec<InventoryEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct QuestStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuestProgressResponse {
    pub quests: Vec<QuestProgress>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemCatalogResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuestCatalogResponse {
    pub quests: Vec<Quest>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

// ============= Extractors =============

/// `axum::Json` whose rejection is reported through [`AppError`], so malformed
/// bodies get the same `{ "message": ... }` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message returned in place of any server-side failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "database failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, axum::Json(ErrorResponse { message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn quest_status_round_trips_through_its_column_value() {
        for status in [
            QuestStatus::NotStarted,
            QuestStatus::InProgress,
            QuestStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<QuestStatus>().unwrap(), status);
        }
        assert!("finished".parse::<QuestStatus>().is_err());
    }

    #[test]
    fn summary_drops_experience() {
        let character = Character {
            id: 7,
            user_id: 1,
            name: "Hero".to_string(),
            level: 3,
            experience: 250,
            map_id: DEFAULT_MAP_ID.to_string(),
            position_x: 1.5,
            position_y: -2.0,
        };

        let json = serde_json::to_value(CharacterSummary::from(character)).unwrap();
        assert!(json.get("experience").is_none());
        assert!(json.get("user_id").is_none());
        assert_eq!(json["level"], 3);
    }

    #[test]
    fn patch_ignores_unknown_fields() {
        let patch: CharacterPatch =
            serde_json::from_str(r#"{"level": 5, "name": "Renamed", "gold": 10}"#).unwrap();
        assert_eq!(patch.level, Some(5));
        assert!(patch.map_id.is_none());
        assert!(!patch.is_empty());
        assert!(CharacterPatch::default().is_empty());
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (AppError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
