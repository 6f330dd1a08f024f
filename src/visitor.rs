//! Anonymous visitor identifier, forwarded to the advisor webhook so it can
//! correlate conversations from the same storefront.

use uuid::Uuid;

use crate::error::StorageError;
use crate::store::{KeyValueStore, keys};

/// Return the stored visitor id, creating and storing a fresh UUID v4 on
/// first use.
pub async fn visitor_id(store: &dyn KeyValueStore) -> Result<String, StorageError> {
    if let Some(id) = store.get(keys::VISITOR_ID).await? {
        if !id.trim().is_empty() {
            return Ok(id);
        }
    }

    let id = Uuid::new_v4().to_string();
    store.set(keys::VISITOR_ID, &id).await?;
    tracing::debug!(visitor_id = %id, "Generated visitor id");
    Ok(id)
}
