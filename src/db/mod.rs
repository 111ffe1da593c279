//! Relational storage for accounts, characters and the game catalogs.
//!
//! Backed by libsql: in-memory or file-based SQLite locally, or a remote
//! Turso database with the `turso` feature. The schema declares
//! `ON DELETE CASCADE` from users to characters and from characters to
//! inventory slots and quest progress; catalogs are only ever inserted into.

#![allow(missing_docs)]

// Relational database
pub mod traits;
pub mod turso;

// Re-exports
pub use traits::{DatabaseClient, DatabaseProvider, User};
pub use turso::TursoClient;
