use crate::db::DatabaseClient;
use crate::types::Result;
use crate::utils::toml_config::CatalogConfig;

/// Inserts configured catalog entries whose ids are not taken yet.
///
/// Existing rows are left exactly as they are; catalogs only ever grow.
/// Returns the number of items and quests added.
pub async fn seed_catalog(db: &dyn DatabaseClient, catalog: &CatalogConfig) -> Result<(usize, usize)> {
    let mut items_added = 0;
    for item in &catalog.items {
        if db.seed_item(item).await? {
            items_added += 1;
        }
    }

    let mut quests_added = 0;
    for quest in &catalog.quests {
        if db.seed_quest(quest).await? {
            quests_added += 1;
        }
    }

    if items_added > 0 || quests_added > 0 {
        tracing::info!(items_added, quests_added, "seeded game catalog");
    }

    Ok((items_added, quests_added))
}
