use crate::db::DatabaseClient;
use crate::types::{
    AppError, Character, CharacterPatch, CharacterSummary, InventoryEntry, QuestProgress,
    QuestStatus, Result, MAX_STACK_QUANTITY,
};
use std::sync::Arc;

/// Message for a character that does not exist *or* belongs to someone else.
pub const NOT_FOUND_MESSAGE: &str = "Character not found or access denied";

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_MAP_ID_LEN: usize = 50;

/// Character CRUD scoped to the owning user.
///
/// Every lookup filters on id and owner together, so callers cannot probe
/// for characters they do not own.
pub struct CharacterRepository {
    db: Arc<dyn DatabaseClient>,
}

impl CharacterRepository {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: i64, name: &str) -> Result<Character> {
        let name = validate_name(name)?;
        let character = self.db.create_character(owner_id, name).await?;

        tracing::info!(
            user_id = owner_id,
            character_id = character.id,
            name = %character.name,
            "character created"
        );
        Ok(character)
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<CharacterSummary>> {
        let characters = self.db.list_characters(owner_id).await?;
        Ok(characters.into_iter().map(CharacterSummary::from).collect())
    }

    /// Full record, including experience.
    pub async fn get(&self, owner_id: i64, character_id: i64) -> Result<Character> {
        self.db
            .get_character(owner_id, character_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Applies the fields present in `patch`; everything else is left alone.
    pub async fn update(
        &self,
        owner_id: i64,
        character_id: i64,
        patch: &CharacterPatch,
    ) -> Result<Character> {
        validate_patch(patch)?;

        let character = self
            .db
            .update_character(owner_id, character_id, patch)
            .await?
            .ok_or_else(not_found)?;

        tracing::debug!(user_id = owner_id, character_id, ?patch, "character updated");
        Ok(character)
    }

    pub async fn inventory(&self, owner_id: i64, character_id: i64) -> Result<Vec<InventoryEntry>> {
        let character = self.get(owner_id, character_id).await?;
        self.db.get_inventory(character.id).await
    }

    pub async fn add_item(
        &self,
        owner_id: i64,
        character_id: i64,
        item_id: i64,
        quantity: i64,
    ) -> Result<InventoryEntry> {
        if !(1..=MAX_STACK_QUANTITY).contains(&quantity) {
            return Err(AppError::InvalidInput(format!(
                "Quantity must be between 1 and {}",
                MAX_STACK_QUANTITY
            )));
        }

        let character = self.get(owner_id, character_id).await?;
        if self.db.get_item(item_id).await?.is_none() {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        let entry = self
            .db
            .add_inventory_item(character.id, item_id, quantity)
            .await?;
        tracing::debug!(character_id, item_id, quantity = entry.quantity, "inventory updated");
        Ok(entry)
    }

    pub async fn quests(&self, owner_id: i64, character_id: i64) -> Result<Vec<QuestProgress>> {
        let character = self.get(owner_id, character_id).await?;
        self.db.get_quest_progress(character.id).await
    }

    pub async fn set_quest_status(
        &self,
        owner_id: i64,
        character_id: i64,
        quest_id: i64,
        status: QuestStatus,
    ) -> Result<QuestProgress> {
        let character = self.get(owner_id, character_id).await?;
        if self.db.get_quest(quest_id).await?.is_none() {
            return Err(AppError::NotFound("Quest not found".to_string()));
        }

        let progress = self
            .db
            .set_quest_status(character.id, quest_id, status)
            .await?;
        tracing::debug!(character_id, quest_id, %status, "quest progress updated");
        Ok(progress)
    }
}

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

/// Returns the trimmed name.
fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "Character name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Character name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

fn validate_patch(patch: &CharacterPatch) -> Result<()> {
    if matches!(patch.level, Some(level) if level < 1) {
        return Err(AppError::InvalidInput("Level must be at least 1".to_string()));
    }
    if matches!(patch.experience, Some(xp) if xp < 0) {
        return Err(AppError::InvalidInput(
            "Experience cannot be negative".to_string(),
        ));
    }
    if let Some(map_id) = &patch.map_id {
        if map_id.trim().is_empty() || map_id.chars().count() > MAX_MAP_ID_LEN {
            return Err(AppError::InvalidInput(format!(
                "map_id must be 1 to {} characters",
                MAX_MAP_ID_LEN
            )));
        }
    }
    for position in [patch.position_x, patch.position_y].into_iter().flatten() {
        if !position.is_finite() {
            return Err(AppError::InvalidInput(
                "Positions must be finite numbers".to_string(),
            ));
        }
    }
    Ok(())
}
