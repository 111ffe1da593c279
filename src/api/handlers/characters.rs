use crate::{
    auth::middleware::AuthUser,
    game::characters::NOT_FOUND_MESSAGE,
    types::{
        AddInventoryRequest, ApiJson, AppError, Character, CharacterListResponse, CharacterPatch,
        CreateCharacterRequest, ErrorResponse, InventoryEntry, InventoryResponse, QuestProgress,
        QuestProgressResponse, QuestStatus, QuestStatusRequest, Result,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Path ids that are not integers cannot name any character, so they are
/// reported as not found rather than as a routing error.
fn parse_id(raw: &str, not_found: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}

/// Create a character for the caller
#[utoipa::path(
    post,
    path = "/api/characters",
    request_body = CreateCharacterRequest,
    responses(
        (status = 201, description = "Character created", body = Character),
        (status = 400, description = "Missing or invalid name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn create_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<Character>)> {
    let name = payload.name.unwrap_or_default();
    let character = state.characters.create(user.id, &name).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

/// List the caller's characters
#[utoipa::path(
    get,
    path = "/api/characters",
    responses(
        (status = 200, description = "Characters owned by the caller", body = CharacterListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn list_characters(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CharacterListResponse>> {
    let characters = state.characters.list(user.id).await?;
    Ok(Json(CharacterListResponse { characters }))
}

/// Get one of the caller's characters, including experience
#[utoipa::path(
    get,
    path = "/api/characters/{id}",
    params(("id" = i64, Path, description = "Character id")),
    responses(
        (status = 200, description = "Full character record", body = Character),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn get_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Character>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let character = state.characters.get(user.id, id).await?;
    Ok(Json(character))
}

/// Update level, experience, map or position of a character
#[utoipa::path(
    put,
    path = "/api/characters/{id}",
    params(("id" = i64, Path, description = "Character id")),
    request_body = CharacterPatch,
    responses(
        (status = 200, description = "Updated character", body = Character),
        (status = 400, description = "Invalid field value", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn update_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<CharacterPatch>,
) -> Result<Json<Character>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let character = state.characters.update(user.id, id, &patch).await?;
    Ok(Json(character))
}

/// List the items held by a character
#[utoipa::path(
    get,
    path = "/api/characters/{id}/inventory",
    params(("id" = i64, Path, description = "Character id")),
    responses(
        (status = 200, description = "Inventory slots", body = InventoryResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<InventoryResponse>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let inventory = state.characters.inventory(user.id, id).await?;
    Ok(Json(InventoryResponse { inventory }))
}

/// Add a catalog item to a character's inventory
#[utoipa::path(
    post,
    path = "/api/characters/{id}/inventory",
    params(("id" = i64, Path, description = "Character id")),
    request_body = AddInventoryRequest,
    responses(
        (status = 200, description = "Updated inventory slot", body = InventoryEntry),
        (status = 400, description = "Missing item or bad quantity", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown item, or character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn add_inventory_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<AddInventoryRequest>,
) -> Result<Json<InventoryEntry>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let item_id = payload
        .item_id
        .ok_or_else(|| AppError::InvalidInput("item_id is required".to_string()))?;
    let quantity = payload.quantity.unwrap_or(1);

    let entry = state
        .characters
        .add_item(user.id, id, item_id, quantity)
        .await?;
    Ok(Json(entry))
}

/// List a character's quest progress
#[utoipa::path(
    get,
    path = "/api/characters/{id}/quests",
    params(("id" = i64, Path, description = "Character id")),
    responses(
        (status = 200, description = "Quest progress", body = QuestProgressResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn get_quests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QuestProgressResponse>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let quests = state.characters.quests(user.id, id).await?;
    Ok(Json(QuestProgressResponse { quests }))
}

/// Set a character's status on a quest
#[utoipa::path(
    put,
    path = "/api/characters/{id}/quests/{quest_id}",
    params(
        ("id" = i64, Path, description = "Character id"),
        ("quest_id" = i64, Path, description = "Quest id")
    ),
    request_body = QuestStatusRequest,
    responses(
        (status = 200, description = "Updated quest progress", body = QuestProgress),
        (status = 400, description = "Missing or unknown status", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown quest, or character not found or access denied", body = ErrorResponse)
    ),
    tag = "characters",
    security(("token" = []))
)]
pub async fn set_quest_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, quest_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<QuestStatusRequest>,
) -> Result<Json<QuestProgress>> {
    let id = parse_id(&id, NOT_FOUND_MESSAGE)?;
    let quest_id = parse_id(&quest_id, "Quest not found")?;
    let status: QuestStatus = payload
        .status
        .ok_or_else(|| AppError::InvalidInput("status is required".to_string()))?
        .parse()?;

    let progress = state
        .characters
        .set_quest_status(user.id, id, quest_id, status)
        .await?;
    Ok(Json(progress))
}
