//! The `KeyValueStore` trait, the storefront's only persistence seam.
//!
//! The catalog, the session holder and the visitor identifier each keep one
//! JSON document under a well-known key.

use async_trait::async_trait;

use crate::error::StorageError;

/// Well-known keys.
pub mod keys {
    /// JSON array of products.
    pub const PRODUCTS: &str = "instastore_products";
    /// JSON map of login token to identity.
    pub const USER_SESSIONS: &str = "instastore_user";
    /// Anonymous visitor identifier.
    pub const VISITOR_ID: &str = "app_user_id";
}

/// Backend-agnostic string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
