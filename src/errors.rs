/*!
 * Error types for the szlk backend.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by a translation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record is missing a field the store requires
    #[error("Invalid translation record: {0}")]
    Validation(String),

    /// The underlying database rejected or failed an operation
    #[error("Database error: {0}")]
    Database(String),

    /// The store has been closed and accepts no further operations
    #[error("Store is closed")]
    Closed,
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Database(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

/// Errors surfaced by the reconciliation layer
#[derive(Error, Debug)]
pub enum DataConnectionError {
    /// The request payload is neither an entry nor a list of entries
    #[error("Invalid translation payload: {0}")]
    InvalidInput(String),

    /// An entry that needs an identity has none
    #[error("Translation is missing an id")]
    MissingIdentity,

    /// The search term could not be compiled into a pattern
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from login validation
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credentials were supplied
    #[error("Missing credentials")]
    MissingCredentials,

    /// The credentials do not match a configured user
    #[error("Invalid credentials for user '{0}'")]
    InvalidCredentials(String),
}

/// Errors from the language catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested language has no catalog
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The catalog file could not be read or parsed
    #[error("Failed to load language catalog: {0}")]
    Load(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the reconciliation layer
    #[error("Data connection error: {0}")]
    DataConnection(#[from] DataConnectionError),

    /// Error from login validation
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Error from the language catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
