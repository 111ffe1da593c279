use crate::types::{
    AppError, Character, CharacterPatch, InventoryEntry, Item, Quest, QuestProgress, QuestStatus,
    Result, DEFAULT_MAP_ID, MAX_STACK_QUANTITY,
};
use chrono::Utc;
use libsql::{Builder, Connection, Database, Row};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";
const CHARACTER_COLUMNS: &str =
    "id, user_id, name, level, experience, map_id, position_x, position_y";

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Maps a failed users insert to `Conflict` when a unique constraint tripped.
fn user_insert_err(e: libsql::Error) -> AppError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        if msg.contains("users.email") {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Conflict("Username already exists".to_string())
        }
    } else {
        AppError::Database(format!("Failed to create user: {}", msg))
    }
}

pub struct TursoClient {
    db: Database,
    /// In-memory databases live as long as their connection, so one is kept
    /// open and shared by every operation.
    memory_conn: Option<Connection>,
}

impl TursoClient {
    /// Opens an ephemeral in-memory database.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;
        Self::configure(&conn, false).await?;

        let client = Self {
            db,
            memory_conn: Some(conn),
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// Opens (or creates) a file-backed database. `":memory:"` is accepted as
    /// an alias for [`TursoClient::new_memory`].
    pub async fn new_local(path: &str) -> Result<Self> {
        if path == ":memory:" {
            return Self::new_memory().await;
        }

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        let client = Self {
            db,
            memory_conn: None,
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// Connects to a remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        let client = Self {
            db,
            memory_conn: None,
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        if let Some(conn) = &self.memory_conn {
            return Ok(conn.clone());
        }
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    /// Connection with per-connection settings applied.
    pub(crate) async fn operation_conn(&self) -> Result<Connection> {
        if let Some(conn) = &self.memory_conn {
            return Ok(conn.clone());
        }
        let conn = self.connection()?;
        Self::configure(&conn, true).await?;
        Ok(conn)
    }

    async fn configure(conn: &Connection, file_backed: bool) -> Result<()> {
        // SQLite leaves foreign keys (and therefore ON DELETE CASCADE) off by default.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        if file_backed {
            let mut rows = conn
                .query("PRAGMA busy_timeout = 5000", ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to set busy timeout: {}", e)))?;
            rows.next().await.map_err(db_err)?;
        }

        Ok(())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.operation_conn().await?;

        // Users table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Characters table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS characters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 1,
                experience INTEGER NOT NULL DEFAULT 0,
                map_id TEXT NOT NULL DEFAULT 'starting_zone',
                position_x REAL NOT NULL DEFAULT 0.0,
                position_y REAL NOT NULL DEFAULT 0.0,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create characters table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_characters_user_id ON characters(user_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create characters index: {}", e)))?;

        // Item catalog
        conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                item_type TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create items table: {}", e)))?;

        // Inventory slots: one stack per (character, item)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS inventory_slots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                character_id INTEGER NOT NULL,
                item_id INTEGER NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE,
                FOREIGN KEY (item_id) REFERENCES items(id),
                UNIQUE(character_id, item_id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create inventory_slots table: {}", e)))?;

        // Quest catalog
        conn.execute(
            "CREATE TABLE IF NOT EXISTS quests (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                reward_xp INTEGER NOT NULL DEFAULT 0
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create quests table: {}", e)))?;

        // Quest progress
        conn.execute(
            "CREATE TABLE IF NOT EXISTS character_quests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                character_id INTEGER NOT NULL,
                quest_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'not_started'
                    CHECK (status IN ('not_started', 'in_progress', 'completed')),
                FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE,
                FOREIGN KEY (quest_id) REFERENCES quests(id),
                UNIQUE(character_id, quest_id)
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create character_quests table: {}", e))
        })?;

        Ok(())
    }

    // User operations
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let conn = self.operation_conn().await?;
        let now = Utc::now().timestamp();

        let mut rows = conn
            .query(
                &format!(
                    "INSERT INTO users (username, email, password_hash, created_at)
                     VALUES (?, ?, ?, ?)
                     RETURNING {}",
                    USER_COLUMNS
                ),
                (username, email, password_hash, now),
            )
            .await
            .map_err(user_insert_err)?;

        let row = rows
            .next()
            .await
            .map_err(user_insert_err)?
            .ok_or_else(|| AppError::Database("Insert returned no user row".to_string()))?;

        User::from_row(&row)
    }

    async fn find_user(&self, column: &str, value: libsql::Value) -> Result<Option<User>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column),
                [value],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(User::from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user("username", username.into()).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user("email", email.into()).await
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_user("id", id.into()).await
    }

    /// Deletes an account. Characters, inventory slots and quest progress go
    /// with it through the schema's cascades.
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.operation_conn().await?;

        let affected = conn
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(affected > 0)
    }

    // Character operations
    pub async fn create_character(&self, user_id: i64, name: &str) -> Result<Character> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                &format!(
                    "INSERT INTO characters (user_id, name, map_id) VALUES (?, ?, ?)
                     RETURNING {}",
                    CHARACTER_COLUMNS
                ),
                (user_id, name, DEFAULT_MAP_ID),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create character: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("Insert returned no character row".to_string()))?;

        character_from_row(&row)
    }

    pub async fn list_characters(&self, user_id: i64) -> Result<Vec<Character>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM characters WHERE user_id = ? ORDER BY id ASC",
                    CHARACTER_COLUMNS
                ),
                [user_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query characters: {}", e)))?;

        let mut characters = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            characters.push(character_from_row(&row)?);
        }

        Ok(characters)
    }

    /// Looks a character up by id *and* owner in one query, so a missing
    /// character and someone else's character are indistinguishable.
    pub async fn get_character(&self, user_id: i64, character_id: i64) -> Result<Option<Character>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM characters WHERE id = ? AND user_id = ?",
                    CHARACTER_COLUMNS
                ),
                [character_id, user_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query character: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(character_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Applies the present fields of `patch` in a single statement. Returns
    /// `None` when no character with that id belongs to `user_id`.
    pub async fn update_character(
        &self,
        user_id: i64,
        character_id: i64,
        patch: &CharacterPatch,
    ) -> Result<Option<Character>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                &format!(
                    "UPDATE characters SET
                        level = COALESCE(?, level),
                        experience = COALESCE(?, experience),
                        map_id = COALESCE(?, map_id),
                        position_x = COALESCE(?, position_x),
                        position_y = COALESCE(?, position_y)
                     WHERE id = ? AND user_id = ?
                     RETURNING {}",
                    CHARACTER_COLUMNS
                ),
                (
                    patch.level,
                    patch.experience,
                    patch.map_id.as_deref(),
                    patch.position_x,
                    patch.position_y,
                    character_id,
                    user_id,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update character: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(character_from_row(&row)?)),
            None => Ok(None),
        }
    }

    // Catalog operations
    /// Inserts a catalog item unless its id already exists. Returns whether a row was added.
    pub async fn seed_item(&self, item: &Item) -> Result<bool> {
        let conn = self.operation_conn().await?;

        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO items (id, name, description, item_type) VALUES (?, ?, ?, ?)",
                (
                    item.id,
                    item.name.as_str(),
                    item.description.as_deref(),
                    item.item_type.as_str(),
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to seed item: {}", e)))?;

        Ok(affected > 0)
    }

    /// Inserts a catalog quest unless its id already exists. Returns whether a row was added.
    pub async fn seed_quest(&self, quest: &Quest) -> Result<bool> {
        let conn = self.operation_conn().await?;

        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO quests (id, name, description, reward_xp) VALUES (?, ?, ?, ?)",
                (
                    quest.id,
                    quest.name.as_str(),
                    quest.description.as_deref(),
                    quest.reward_xp,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to seed quest: {}", e)))?;

        Ok(affected > 0)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, description, item_type FROM items ORDER BY id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query items: {}", e)))?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            items.push(item_from_row(&row)?);
        }

        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, description, item_type FROM items WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query item: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(item_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_quests(&self) -> Result<Vec<Quest>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, description, reward_xp FROM quests ORDER BY id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query quests: {}", e)))?;

        let mut quests = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            quests.push(quest_from_row(&row)?);
        }

        Ok(quests)
    }

    pub async fn get_quest(&self, id: i64) -> Result<Option<Quest>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, description, reward_xp FROM quests WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query quest: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(quest_from_row(&row)?)),
            None => Ok(None),
        }
    }

    // Inventory operations
    /// Adds `quantity` of an item to a character's stack, creating the slot if needed.
    pub async fn add_inventory_item(
        &self,
        character_id: i64,
        item_id: i64,
        quantity: i64,
    ) -> Result<InventoryEntry> {
        let conn = self.operation_conn().await?;

        if !(1..=MAX_STACK_QUANTITY).contains(&quantity) {
            return Err(stack_limit_error());
        }

        // The guard keeps the sum in integer range; a skipped update changes no rows.
        let changed = conn
            .execute(
                "INSERT INTO inventory_slots (character_id, item_id, quantity) VALUES (?, ?, ?)
                 ON CONFLICT(character_id, item_id)
                 DO UPDATE SET quantity = quantity + excluded.quantity
                 WHERE inventory_slots.quantity <= ? - excluded.quantity",
                [character_id, item_id, quantity, MAX_STACK_QUANTITY],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to add inventory item: {}", e)))?;
        if changed == 0 {
            return Err(stack_limit_error());
        }

        let mut rows = conn
            .query(
                "SELECT s.item_id, i.name, i.item_type, s.quantity
                 FROM inventory_slots s JOIN items i ON i.id = s.item_id
                 WHERE s.character_id = ? AND s.item_id = ?",
                [character_id, item_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query inventory slot: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("Inventory slot missing after insert".to_string()))?;

        inventory_from_row(&row)
    }

    pub async fn get_inventory(&self, character_id: i64) -> Result<Vec<InventoryEntry>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT s.item_id, i.name, i.item_type, s.quantity
                 FROM inventory_slots s JOIN items i ON i.id = s.item_id
                 WHERE s.character_id = ?
                 ORDER BY s.item_id ASC",
                [character_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query inventory: {}", e)))?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            entries.push(inventory_from_row(&row)?);
        }

        Ok(entries)
    }

    // Quest progress operations
    pub async fn set_quest_status(
        &self,
        character_id: i64,
        quest_id: i64,
        status: QuestStatus,
    ) -> Result<QuestProgress> {
        let conn = self.operation_conn().await?;

        conn.execute(
            "INSERT INTO character_quests (character_id, quest_id, status) VALUES (?, ?, ?)
             ON CONFLICT(character_id, quest_id) DO UPDATE SET status = excluded.status",
            (character_id, quest_id, status.as_str()),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to set quest status: {}", e)))?;

        let mut rows = conn
            .query(
                "SELECT cq.quest_id, q.name, q.reward_xp, cq.status
                 FROM character_quests cq JOIN quests q ON q.id = cq.quest_id
                 WHERE cq.character_id = ? AND cq.quest_id = ?",
                [character_id, quest_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query quest progress: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("Quest progress missing after upsert".to_string()))?;

        progress_from_row(&row)
    }

    pub async fn get_quest_progress(&self, character_id: i64) -> Result<Vec<QuestProgress>> {
        let conn = self.operation_conn().await?;

        let mut rows = conn
            .query(
                "SELECT cq.quest_id, q.name, q.reward_xp, cq.status
                 FROM character_quests cq JOIN quests q ON q.id = cq.quest_id
                 WHERE cq.character_id = ?
                 ORDER BY cq.quest_id ASC",
                [character_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query quest progress: {}", e)))?;

        let mut progress = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            progress.push(progress_from_row(&row)?);
        }

        Ok(progress)
    }
}

fn character_from_row(row: &Row) -> Result<Character> {
    Ok(Character {
        id: row.get(0).map_err(db_err)?,
        user_id: row.get(1).map_err(db_err)?,
        name: row.get(2).map_err(db_err)?,
        level: row.get(3).map_err(db_err)?,
        experience: row.get(4).map_err(db_err)?,
        map_id: row.get(5).map_err(db_err)?,
        position_x: row.get(6).map_err(db_err)?,
        position_y: row.get(7).map_err(db_err)?,
    })
}

fn item_from_row(row: &Row) -> Result<Item> {
    Ok(Item {
        id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        description: row.get(2).map_err(db_err)?,
        item_type: row.get(3).map_err(db_err)?,
    })
}

fn quest_from_row(row: &Row) -> Result<Quest> {
    Ok(Quest {
        id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        description: row.get(2).map_err(db_err)?,
        reward_xp: row.get(3).map_err(db_err)?,
    })
}

fn stack_limit_error() -> AppError {
    AppError::InvalidInput(format!(
        "Stack cannot exceed {} of one item",
        MAX_STACK_QUANTITY
    ))
}

fn inventory_from_row(row: &Row) -> Result<InventoryEntry> {
    Ok(InventoryEntry {
        item_id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        item_type: row.get(2).map_err(db_err)?,
        quantity: row.get(3).map_err(db_err)?,
    })
}

fn progress_from_row(row: &Row) -> Result<QuestProgress> {
    let status: String = row.get(3).map_err(db_err)?;
    Ok(QuestProgress {
        quest_id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        reward_xp: row.get(2).map_err(db_err)?,
        status: status
            .parse()
            .map_err(|_| AppError::Database(format!("Unexpected quest status '{}'", status)))?,
    })
}

/// Account row. The password hash never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

impl User {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0).map_err(db_err)?,
            username: row.get(1).map_err(db_err)?,
            email: row.get(2).map_err(db_err)?,
            password_hash: row.get(3).map_err(db_err)?,
            created_at: row.get(4).map_err(db_err)?,
        })
    }

    /// Public view with an RFC3339 creation timestamp.
    pub fn profile(&self) -> crate::types::UserProfile {
        crate::types::UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: chrono::DateTime::from_timestamp(self.created_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}
