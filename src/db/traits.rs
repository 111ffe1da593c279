//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over different
//! database backends (in-memory SQLite, file-based SQLite, remote Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudflower::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data/game.db".into() }.create_client().await?;
//! ```

use crate::types::{
    Character, CharacterPatch, InventoryEntry, Item, Quest, QuestProgress, QuestStatus, Result,
};
use crate::utils::toml_config::GameConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Pick a provider from the loaded configuration.
    ///
    /// Remote Turso wins when both of its env vars are set (and the feature is
    /// compiled in); otherwise `database.url` selects memory or a file.
    pub fn from_config(config: &GameConfig) -> Self {
        #[cfg(feature = "turso")]
        {
            let url = config
                .database
                .turso_url_env
                .as_deref()
                .and_then(|env| std::env::var(env).ok());
            let token = config
                .database
                .turso_token_env
                .as_deref()
                .and_then(|env| std::env::var(env).ok());
            if let (Some(url), Some(auth_token)) = (url, token) {
                if !url.is_empty() && !auth_token.is_empty() {
                    return DatabaseProvider::Turso { url, auth_token };
                }
            }
        }

        let url = config.database.url.trim();
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Short name for logs.
    pub fn describe(&self) -> String {
        match self {
            DatabaseProvider::Memory => "in-memory".to_string(),
            DatabaseProvider::SQLite { path } => format!("sqlite ({})", path),
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, .. } => format!("turso ({})", url),
        }
    }
}

/// User record from the database
pub use super::turso::User;

/// Abstract trait for database operations
///
/// This trait defines all database operations needed by the application.
/// Every method is a single request-scoped unit of work; concurrent writers
/// are serialized by the storage engine.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // ============== User Operations ==============

    /// Create a new user. Unique violations surface as `AppError::Conflict`.
    async fn create_user(&self, username: &str, email: &str, password_hash: &str)
        -> Result<User>;

    /// Get a user by username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user by ID
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Delete a user and, by cascade, everything the user owns
    async fn delete_user(&self, id: i64) -> Result<bool>;

    // ============== Character Operations ==============

    /// Create a character with default stats
    async fn create_character(&self, user_id: i64, name: &str) -> Result<Character>;

    /// All characters owned by a user, oldest first
    async fn list_characters(&self, user_id: i64) -> Result<Vec<Character>>;

    /// A character, only if owned by `user_id`
    async fn get_character(&self, user_id: i64, character_id: i64) -> Result<Option<Character>>;

    /// Apply a partial update, only if owned by `user_id`
    async fn update_character(
        &self,
        user_id: i64,
        character_id: i64,
        patch: &CharacterPatch,
    ) -> Result<Option<Character>>;

    // ============== Catalog Operations ==============

    /// Insert an item if its id is free
    async fn seed_item(&self, item: &Item) -> Result<bool>;

    /// Insert a quest if its id is free
    async fn seed_quest(&self, quest: &Quest) -> Result<bool>;

    /// The full item catalog
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// A single catalog item
    async fn get_item(&self, id: i64) -> Result<Option<Item>>;

    /// The full quest catalog
    async fn list_quests(&self) -> Result<Vec<Quest>>;

    /// A single catalog quest
    async fn get_quest(&self, id: i64) -> Result<Option<Quest>>;

    // ============== Inventory & Quest Progress ==============

    /// Add to a character's stack of an item
    async fn add_inventory_item(
        &self,
        character_id: i64,
        item_id: i64,
        quantity: i64,
    ) -> Result<InventoryEntry>;

    /// A character's inventory
    async fn get_inventory(&self, character_id: i64) -> Result<Vec<InventoryEntry>>;

    /// Record a character's status on a quest
    async fn set_quest_status(
        &self,
        character_id: i64,
        quest_id: i64,
        status: QuestStatus,
    ) -> Result<QuestProgress>;

    /// A character's progress on every quest it has touched
    async fn get_quest_progress(&self, character_id: i64) -> Result<Vec<QuestProgress>>;
}

// ============== Implement DatabaseClient for TursoClient ==============

#[async_trait]
impl DatabaseClient for super::turso::TursoClient {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        super::turso::TursoClient::create_user(self, username, email, password_hash).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        super::turso::TursoClient::get_user_by_username(self, username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        super::turso::TursoClient::get_user_by_email(self, email).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        super::turso::TursoClient::get_user_by_id(self, id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        super::turso::TursoClient::delete_user(self, id).await
    }

    async fn create_character(&self, user_id: i64, name: &str) -> Result<Character> {
        super::turso::TursoClient::create_character(self, user_id, name).await
    }

    async fn list_characters(&self, user_id: i64) -> Result<Vec<Character>> {
        super::turso::TursoClient::list_characters(self, user_id).await
    }

    async fn get_character(&self, user_id: i64, character_id: i64) -> Result<Option<Character>> {
        super::turso::TursoClient::get_character(self, user_id, character_id).await
    }

    async fn update_character(
        &self,
        user_id: i64,
        character_id: i64,
        patch: &CharacterPatch,
    ) -> Result<Option<Character>> {
        super::turso::TursoClient::update_character(self, user_id, character_id, patch).await
    }

    async fn seed_item(&self, item: &Item) -> Result<bool> {
        super::turso::TursoClient::seed_item(self, item).await
    }

    async fn seed_quest(&self, quest: &Quest) -> Result<bool> {
        super::turso::TursoClient::seed_quest(self, quest).await
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        super::turso::TursoClient::list_items(self).await
    }

    async fn get_item(&self, id: i64) -> Result<Option<Item>> {
        super::turso::TursoClient::get_item(self, id).await
    }

    async fn list_quests(&self) -> Result<Vec<Quest>> {
        super::turso::TursoClient::list_quests(self).await
    }

    async fn get_quest(&self, id: i64) -> Result<Option<Quest>> {
        super::turso::TursoClient::get_quest(self, id).await
    }

    async fn add_inventory_item(
        &self,
        character_id: i64,
        item_id: i64,
        quantity: i64,
    ) -> Result<InventoryEntry> {
        super::turso::TursoClient::add_inventory_item(self, character_id, item_id, quantity).await
    }

    async fn get_inventory(&self, character_id: i64) -> Result<Vec<InventoryEntry>> {
        super::turso::TursoClient::get_inventory(self, character_id).await
    }

    async fn set_quest_status(
        &self,
        character_id: i64,
        quest_id: i64,
        status: QuestStatus,
    ) -> Result<QuestProgress> {
        super::turso::TursoClient::set_quest_status(self, character_id, quest_id, status).await
    }

    async fn get_quest_progress(&self, character_id: i64) -> Result<Vec<QuestProgress>> {
        super::turso::TursoClient::get_quest_progress(self, character_id).await
    }
}
