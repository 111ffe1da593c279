//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (login, register).
pub mod auth;
/// Item and quest catalog handlers.
pub mod catalog;
/// Character, inventory and quest progress handlers.
pub mod characters;
