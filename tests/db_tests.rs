//! Database integration tests
//!
//! These tests verify the TursoClient functionality using in-memory SQLite,
//! plus one file-backed database in a temp directory.

use cloudflower::db::{DatabaseProvider, TursoClient};
use cloudflower::types::{AppError, CharacterPatch, Item, Quest, QuestStatus, DEFAULT_MAP_ID};
use cloudflower::utils::toml_config::GameConfig;
use tempfile::TempDir;

/// Test helper to create a TursoClient with in-memory database
async fn create_test_client() -> TursoClient {
    TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database")
}

/// Row count of a table, read straight from the connection
async fn count_rows(client: &TursoClient, table: &str) -> i64 {
    let conn = client.connection().expect("connection");
    let mut rows = conn
        .query(&format!("SELECT COUNT(*) FROM {}", table), ())
        .await
        .expect("count query");
    let row = rows.next().await.unwrap().expect("count row");
    row.get(0).unwrap()
}

fn sword() -> Item {
    Item {
        id: 1,
        name: "Rusty Sword".to_string(),
        description: Some("Better than bare hands.".to_string()),
        item_type: "weapon".to_string(),
    }
}

fn first_quest() -> Quest {
    Quest {
        id: 1,
        name: "First Steps".to_string(),
        description: None,
        reward_xp: 50,
    }
}

#[tokio::test]
async fn test_create_memory_client() {
    let client = create_test_client().await;
    assert!(client.connection().is_ok());
    assert_eq!(count_rows(&client, "users").await, 0);
}

#[tokio::test]
async fn test_local_client_persists_across_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested/game.db");
    let path = path.to_str().unwrap();

    {
        let client = TursoClient::new_local(path)
            .await
            .expect("Failed to create local database");
        client
            .create_user("alice", "alice@example.com", "hash")
            .await
            .unwrap();
    }

    let reopened = TursoClient::new_local(path)
        .await
        .expect("Failed to reopen local database");
    let user = reopened
        .get_user_by_username("alice")
        .await
        .unwrap()
        .expect("user survives reopen");
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn test_create_user() {
    let client = create_test_client().await;

    let user = client
        .create_user("alice", "alice@example.com", "hashed_password_here")
        .await
        .unwrap();

    assert!(user.id > 0);
    assert_eq!(user.username, "alice");
    assert_eq!(user.password_hash, "hashed_password_here");
    assert!(user.created_at > 0);

    let by_id = client.get_user_by_id(user.id).await.unwrap().unwrap();
    let by_email = client
        .get_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.username, "alice");
    assert_eq!(by_email.id, user.id);
    assert!(client.get_user_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_username_or_email_is_conflict() {
    let client = create_test_client().await;

    client
        .create_user("alice", "alice@example.com", "hash")
        .await
        .unwrap();

    let same_username = client
        .create_user("alice", "other@example.com", "hash")
        .await;
    let same_email = client
        .create_user("bob", "alice@example.com", "hash")
        .await;

    assert!(matches!(same_username, Err(AppError::Conflict(_))));
    assert!(matches!(same_email, Err(AppError::Conflict(_))));
    assert_eq!(count_rows(&client, "users").await, 1);
}

#[tokio::test]
async fn test_character_defaults_and_ownership() {
    let client = create_test_client().await;
    let alice = client.create_user("alice", "a@example.com", "h").await.unwrap();
    let bob = client.create_user("bob", "b@example.com", "h").await.unwrap();

    let hero = client.create_character(alice.id, "Hero").await.unwrap();
    assert_eq!(hero.user_id, alice.id);
    assert_eq!(hero.level, 1);
    assert_eq!(hero.experience, 0);
    assert_eq!(hero.map_id, DEFAULT_MAP_ID);
    assert_eq!((hero.position_x, hero.position_y), (0.0, 0.0));

    client.create_character(bob.id, "Villain").await.unwrap();

    let listed = client.list_characters(alice.id).await.unwrap();
    assert_eq!(listed, vec![hero.clone()]);

    assert_eq!(
        client.get_character(alice.id, hero.id).await.unwrap(),
        Some(hero.clone())
    );
    assert!(client.get_character(bob.id, hero.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_character_requires_existing_owner() {
    let client = create_test_client().await;

    let result = client.create_character(12345, "Orphan").await;
    assert!(result.is_err());
    assert_eq!(count_rows(&client, "characters").await, 0);
}

#[tokio::test]
async fn test_update_character_is_partial_and_scoped() {
    let client = create_test_client().await;
    let alice = client.create_user("alice", "a@example.com", "h").await.unwrap();
    let bob = client.create_user("bob", "b@example.com", "h").await.unwrap();
    let hero = client.create_character(alice.id, "Hero").await.unwrap();

    let patch = CharacterPatch {
        position_x: Some(4.5),
        ..Default::default()
    };
    let updated = client
        .update_character(alice.id, hero.id, &patch)
        .await
        .unwrap()
        .expect("owner can update");
    assert_eq!(updated.position_x, 4.5);
    assert_eq!(updated.position_y, hero.position_y);
    assert_eq!(updated.level, hero.level);

    let empty = client
        .update_character(alice.id, hero.id, &CharacterPatch::default())
        .await
        .unwrap();
    assert_eq!(empty, Some(updated.clone()));

    let stolen = client
        .update_character(
            bob.id,
            hero.id,
            &CharacterPatch {
                level: Some(50),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(stolen.is_none());
    assert_eq!(
        client.get_character(alice.id, hero.id).await.unwrap(),
        Some(updated)
    );
}

#[tokio::test]
async fn test_seed_never_modifies_existing_rows() {
    let client = create_test_client().await;

    assert!(client.seed_item(&sword()).await.unwrap());
    assert!(client.seed_quest(&first_quest()).await.unwrap());

    let renamed = Item {
        name: "Shiny Sword".to_string(),
        ..sword()
    };
    assert!(!client.seed_item(&renamed).await.unwrap());
    assert!(!client.seed_quest(&first_quest()).await.unwrap());

    assert_eq!(client.list_items().await.unwrap(), vec![sword()]);
    assert_eq!(client.get_quest(1).await.unwrap(), Some(first_quest()));
    assert!(client.get_item(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_inventory_and_quest_progress() {
    let client = create_test_client().await;
    client.seed_item(&sword()).await.unwrap();
    client.seed_quest(&first_quest()).await.unwrap();
    let alice = client.create_user("alice", "a@example.com", "h").await.unwrap();
    let hero = client.create_character(alice.id, "Hero").await.unwrap();

    client.add_inventory_item(hero.id, 1, 1).await.unwrap();
    let slot = client.add_inventory_item(hero.id, 1, 2).await.unwrap();
    assert_eq!(slot.quantity, 3);
    assert_eq!(slot.name, "Rusty Sword");
    assert_eq!(client.get_inventory(hero.id).await.unwrap(), vec![slot]);

    let progress = client
        .set_quest_status(hero.id, 1, QuestStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(progress.status, QuestStatus::InProgress);
    assert_eq!(progress.reward_xp, 50);

    client
        .set_quest_status(hero.id, 1, QuestStatus::Completed)
        .await
        .unwrap();
    let all = client.get_quest_progress(hero.id).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, QuestStatus::Completed);
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let client = create_test_client().await;
    client.seed_item(&sword()).await.unwrap();
    client.seed_quest(&first_quest()).await.unwrap();

    let alice = client.create_user("alice", "a@example.com", "h").await.unwrap();
    let bob = client.create_user("bob", "b@example.com", "h").await.unwrap();

    for owner in [alice.id, bob.id] {
        let character = client.create_character(owner, "Hero").await.unwrap();
        client.add_inventory_item(character.id, 1, 1).await.unwrap();
        client
            .set_quest_status(character.id, 1, QuestStatus::InProgress)
            .await
            .unwrap();
    }

    assert!(client.delete_user(alice.id).await.unwrap());
    assert!(!client.delete_user(alice.id).await.unwrap());

    assert!(client.get_user_by_id(alice.id).await.unwrap().is_none());
    assert!(client.list_characters(alice.id).await.unwrap().is_empty());
    assert_eq!(count_rows(&client, "characters").await, 1);
    assert_eq!(count_rows(&client, "inventory_slots").await, 1);
    assert_eq!(count_rows(&client, "character_quests").await, 1);

    // Catalogs are never touched by account deletion.
    assert_eq!(count_rows(&client, "items").await, 1);
    assert_eq!(count_rows(&client, "quests").await, 1);
}

#[tokio::test]
async fn test_provider_from_config() {
    let mut config = GameConfig::default();
    config.database.url = ":memory:".to_string();
    assert!(matches!(
        DatabaseProvider::from_config(&config),
        DatabaseProvider::Memory
    ));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.db");
    config.database.url = path.to_str().unwrap().to_string();

    let provider = DatabaseProvider::from_config(&config);
    assert!(matches!(provider, DatabaseProvider::SQLite { .. }));

    let client = provider.create_client().await.expect("file database opens");
    client
        .create_user("alice", "a@example.com", "h")
        .await
        .unwrap();
    assert!(path.exists());
}
