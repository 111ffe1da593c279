//! Game data services: characters and the item/quest catalogs.

/// Catalog seeding from configuration.
pub mod catalog;
/// Owner-scoped character, inventory and quest progress operations.
pub mod characters;

pub use catalog::seed_catalog;
pub use characters::CharacterRepository;
