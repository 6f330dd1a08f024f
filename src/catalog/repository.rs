//! Product repository over the key-value store.
//!
//! The whole catalog is one JSON array under `instastore_products`. Every
//! mutation writes the new array before the in-memory copy is replaced, so a
//! failed write leaves both sides unchanged.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::model::{Product, ProductDraft, ProductPatch, default_products, validate};
use crate::error::{CatalogError, StorageError};
use crate::store::{KeyValueStore, keys};

pub struct ProductCatalog {
    store: Arc<dyn KeyValueStore>,
    products: RwLock<Vec<Product>>,
}

impl ProductCatalog {
    /// Load the catalog, seeding the demo products into an empty store.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, CatalogError> {
        let products = match store.get(keys::PRODUCTS).await? {
            Some(raw) => serde_json::from_str::<Vec<Product>>(&raw).map_err(|e| {
                warn!(error = %e, "Stored products are not valid JSON");
                StorageError::Serialization(format!("{}: {e}", keys::PRODUCTS))
            })?,
            None => {
                let defaults = default_products();
                write_products(store.as_ref(), &defaults).await?;
                info!(count = defaults.len(), "Seeded default products");
                defaults
            }
        };

        Ok(Self {
            store,
            products: RwLock::new(products),
        })
    }

    pub async fn list(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Add a product. The id is the creation time in milliseconds, bumped
    /// past any id already taken.
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        validate(&draft.name, draft.price).map_err(CatalogError::Invalid)?;

        let mut products = self.products.write().await;
        let now = Utc::now();
        let mut millis = now.timestamp_millis();
        while products.iter().any(|p| p.id == millis.to_string()) {
            millis += 1;
        }

        let product = Product {
            id: millis.to_string(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image_url: draft.image_url,
            created_at: now,
        };

        let mut updated = products.clone();
        updated.push(product.clone());
        write_products(self.store.as_ref(), &updated).await?;
        *products = updated;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product, CatalogError> {
        let mut products = self.products.write().await;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        let mut product = products[index].clone();
        product.apply(patch);
        validate(&product.name, product.price).map_err(CatalogError::Invalid)?;

        let mut updated = products.clone();
        updated[index] = product.clone();
        write_products(self.store.as_ref(), &updated).await?;
        *products = updated;

        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;
        if !products.iter().any(|p| p.id == id) {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        let updated: Vec<Product> = products.iter().filter(|p| p.id != id).cloned().collect();
        write_products(self.store.as_ref(), &updated).await?;
        *products = updated;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

async fn write_products(store: &dyn KeyValueStore, products: &[Product]) -> Result<(), StorageError> {
    let json = serde_json::to_string(products)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.set(keys::PRODUCTS, &json).await
}
