use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product extracted from a supplier feed, normalized for storage and
/// display in the storefront.
///
/// Serialized field names are camelCase because the surrounding application
/// persists and ships these records as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Feed-supplied identifier when the mapping provides one, otherwise a
    /// generated UUID. Upsert-by-id is only stable across imports when the
    /// feed's own id scheme is stable.
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Pre-sale comparison price, if the feed carries one.
    pub compare_at_price: Option<f64>,
    pub images: Vec<String>,
    /// Category display name; empty when the feed maps neither a category
    /// text nor a resolvable category-id reference.
    pub category: String,
    pub tags: Vec<String>,
    pub sku: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns `true` if at least one unit is available for purchase.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Returns `true` when a comparison price exists and exceeds the
    /// current price, i.e. the product should render as discounted.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare| compare > self.price)
    }

    /// Returns the persistence payload for this product: every field except
    /// the extract-time id and timestamps, which the store assigns
    /// canonically on create.
    #[must_use]
    pub fn data(&self) -> ProductData {
        ProductData {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            compare_at_price: self.compare_at_price,
            images: self.images.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            sku: self.sku.clone(),
            stock: self.stock,
        }
    }
}

/// The id-less, timestamp-less payload handed to the persistence
/// collaborator for both create and update calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub images: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub sku: String,
    pub stock: i64,
}
