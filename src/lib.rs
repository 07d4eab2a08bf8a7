/*!
 * # szlk-backend
 *
 * Backend of a translation dictionary: it stores translation entries,
 * searches them by source text and lets authorized users create, update
 * and delete them in batches.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `data_connection`: reconciliation of submitted batches against a store:
 *   - `data_connection::escape`: literal search patterns
 *   - `data_connection::classify`: create/update partitioning
 *   - `data_connection::settle`: exactly-once joining of independent operations
 *   - `data_connection::store`: the persistence contract
 * - `database`: SQLite implementation of the store
 * - `server`: HTTP routes (axum)
 * - `login`: credential validation
 * - `languages`: UI language catalog
 * - `language_utils`: ISO language code utilities
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod data_connection;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod languages;
pub mod login;
pub mod server;

// Re-export main types for easier usage
pub use app_config::Config;
pub use data_connection::models::{BatchInput, EntryPayload, TranslationEntry};
pub use data_connection::{BatchOutcome, DataConnection};
pub use database::Repository;
pub use errors::{AppError, AuthError, CatalogError, DataConnectionError, StoreError};
pub use language_utils::{canonical_code, language_codes_match};
