//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/auth`)
//! - `POST /api/auth/register` - Register a new user (201)
//! - `POST /api/auth/login` - Exchange username and password for a token
//!
//! ## Catalog
//! - `GET /api/items` - Item catalog
//! - `GET /api/quests` - Quest catalog
//!
//! ## Characters (`/api/characters`, token required)
//! - `GET /api/characters` - List the caller's characters
//! - `POST /api/characters` - Create a character (201)
//! - `GET /api/characters/{id}` - Full character record
//! - `PUT /api/characters/{id}` - Update level, experience, map or position
//! - `GET /api/characters/{id}/inventory` - Inventory slots
//! - `POST /api/characters/{id}/inventory` - Add an item to the inventory
//! - `GET /api/characters/{id}/quests` - Quest progress
//! - `PUT /api/characters/{id}/quests/{quest_id}` - Set quest status
//!
//! ## Service
//! - `GET /health` - Health check
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Authentication
//!
//! Protected endpoints read the token from a custom header rather than
//! `Authorization`:
//! ```text
//! x-access-token: <token>
//! ```
//!
//! A character owned by someone else answers exactly like a missing one (404).
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
