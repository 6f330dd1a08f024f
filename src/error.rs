//! Error types for Instastore.

use std::time::Duration;

/// Top-level error type for the storefront.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Responder error: {0}")]
    Responder(#[from] ResponderError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the external responder (the advisor webhook).
///
/// The conversation engine never propagates these; they are downgraded to a
/// notice shown next to the transcript.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Responder request failed: {0}")]
    RequestFailed(String),

    #[error("Responder returned status {status}")]
    BadStatus { status: u16 },

    #[error("Invalid response from responder: {0}")]
    InvalidResponse(String),

    #[error("Responder timed out after {0:?}")]
    Timeout(Duration),
}

/// Product catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product {id} not found")]
    NotFound { id: String },

    #[error("Invalid product: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Session holder errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for the storefront.
pub type Result<T> = std::result::Result<T, Error>;
