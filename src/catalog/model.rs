//! Product data models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// Serialized camelCase with a numeric price, the shape the storefront front
/// end keeps under `instastore_products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a product. Identity and timestamp are
/// assigned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    /// Apply a patch in place.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
    }
}

/// Check the invariants every stored product holds.
pub fn validate(name: &str, price: Decimal) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if price <= Decimal::ZERO {
        return Err(format!("price must be positive, got {price}"));
    }
    Ok(())
}

/// Demo catalog written to an empty store.
pub fn default_products() -> Vec<Product> {
    let now = Utc::now();
    let product = |id: &str, name: &str, description: &str, price: Decimal, image: &str| Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        image_url: format!("https://images.unsplash.com/{image}"),
        created_at: now,
    };

    vec![
        product(
            "1",
            "Drone Professionnel",
            "Drone de qualité professionnelle avec caméra 4K et stabilisateur intégré. Autonomie de 30 minutes.",
            dec!(799.99),
            "photo-1488590528505-98d2b5aba04b",
        ),
        product(
            "2",
            "Ordinateur Portable Ultra-fin",
            "Ordinateur portable ultra-fin avec écran 15\", processeur i7 et 16GB RAM. Idéal pour les professionnels.",
            dec!(1299.99),
            "photo-1649972904349-6e44c42644a7",
        ),
        product(
            "3",
            "Canapé Moderne",
            "Canapé design moderne 3 places, tissu premium et confort exceptionnel pour votre salon.",
            dec!(899.99),
            "photo-1721322800607-8c38375eef04",
        ),
        product(
            "4",
            "Kit de Développement IoT",
            "Kit complet pour démarrer vos projets IoT avec microcontrôleur, capteurs et guides détaillés.",
            dec!(129.99),
            "photo-1518770660439-4636190af475",
        ),
        product(
            "5",
            "Appareil Photo Mirrorless",
            "Appareil photo mirrorless compact avec capteur plein format, idéal pour la photographie professionnelle.",
            dec!(1899.99),
            "photo-1582562124811-c09040d0a901",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serializes_camel_case_with_numeric_price() {
        let product = default_products().remove(0);
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["id"], "1");
        assert!(json["price"].is_number());
        assert!((json["price"].as_f64().unwrap() - 799.99).abs() < 1e-9);
        assert!(json["imageUrl"].as_str().unwrap().starts_with("https://"));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut product = default_products().remove(2);
        let patch: ProductPatch = serde_json::from_str(r#"{"price": 749.5}"#).unwrap();
        product.apply(patch);

        assert_eq!(product.price, dec!(749.5));
        assert_eq!(product.name, "Canapé Moderne");
    }

    #[test]
    fn draft_defaults_optional_text() {
        let draft: ProductDraft =
            serde_json::from_str(r#"{"name": "Lampe", "price": 39.9}"#).unwrap();
        assert_eq!(draft.name, "Lampe");
        assert!(draft.description.is_empty());
        assert!(draft.image_url.is_empty());
        assert_eq!(draft.price, dec!(39.9));
    }

    #[test]
    fn validate_rejects_bad_products() {
        assert!(validate("Lampe", dec!(10)).is_ok());
        assert!(validate("   ", dec!(10)).is_err());
        assert!(validate("Lampe", Decimal::ZERO).is_err());
        assert!(validate("Lampe", dec!(-3.5)).is_err());
    }

    #[test]
    fn defaults_have_unique_ids_and_positive_prices() {
        let products = default_products();
        assert_eq!(products.len(), 5);
        for (i, p) in products.iter().enumerate() {
            assert_eq!(p.id, (i + 1).to_string());
            assert!(validate(&p.name, p.price).is_ok());
        }
    }
}
