/*!
 * Database module for persistent storage of translations.
 *
 * This module provides the SQLite-backed implementation of the
 * translation store contract.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
