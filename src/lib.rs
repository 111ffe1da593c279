//! # Cloudflower - game backend server
//!
//! A small REST backend for a multiplayer game: account registration and
//! login with peppered Argon2 hashes and HS256 tokens, plus owner-scoped
//! character records with inventories and quest progress.
//!
//! ## Overview
//!
//! Cloudflower can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `game-server` binary
//! 2. **As a library** - Mount [`api::routes::build_app`] in your own service
//!
//! ### Embedding the router
//!
//! ```rust,ignore
//! use cloudflower::{AppState, AuthService, DatabaseProvider, GameConfig};
//! use std::sync::Arc;
//!
//! let config = GameConfig::load("game.toml")?;
//! let db = DatabaseProvider::from_config(&config).create_client().await?;
//! let auth = Arc::new(AuthService::new(config.jwt_secret()?, config.pepper()?));
//! let app = cloudflower::api::routes::build_app(AppState::new(config, db, auth));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-db` | Local SQLite database (default) |
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, tokens and the auth gate
//! - [`db`] - Relational storage (SQLite, Turso)
//! - [`game`] - Character repository and catalog seeding
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Password hashing, token issuance and the auth middleware.
pub mod auth;
/// Command-line interface for the server binary.
pub mod cli;
/// Database clients (SQLite/Turso via libsql).
pub mod db;
/// Characters, inventories, quest progress and catalogs.
pub mod game;
/// Core types (records, requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::credentials::CredentialStore;
pub use auth::jwt::AuthService;
pub use db::{DatabaseClient, DatabaseProvider, TursoClient};
pub use game::CharacterRepository;
pub use types::{AppError, Result};
pub use utils::toml_config::GameConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Validated server configuration
    pub config: Arc<GameConfig>,
    /// Database client
    pub db: Arc<dyn DatabaseClient>,
    /// Password hashing and token signing
    pub auth_service: Arc<AuthService>,
    /// Registration, login and token subject lookup
    pub credentials: Arc<CredentialStore>,
    /// Owner-scoped character operations
    pub characters: Arc<CharacterRepository>,
}

impl AppState {
    /// Wires the services on top of one database handle.
    pub fn new(
        config: GameConfig,
        db: Arc<dyn DatabaseClient>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        let credentials = Arc::new(CredentialStore::new(
            Arc::clone(&db),
            Arc::clone(&auth_service),
        ));
        let characters = Arc::new(CharacterRepository::new(Arc::clone(&db)));

        Self {
            config: Arc::new(config),
            db,
            auth_service,
            credentials,
            characters,
        }
    }
}
