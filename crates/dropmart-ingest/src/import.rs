//! Import orchestration: upsert-by-id persistence of extracted products.
//!
//! Persistence calls are awaited sequentially, one product at a time, and
//! each failure is caught and recorded without stopping the batch. Nothing
//! here locks: two concurrent imports of the same source race with
//! last-write-wins semantics, so callers wanting stronger guarantees must
//! serialize imports per source or upsert transactionally in the store.

use async_trait::async_trait;

use dropmart_core::{FieldMapping, Product, ProductData};

use crate::error::IngestError;
use crate::extract::{extract, Extraction};

/// Persistence collaborator for imported products.
///
/// Implementations live with the surrounding application; this crate only
/// issues the three calls below. `create_product` receives the feed-scoped
/// id separately from the payload — the payload itself carries no id or
/// timestamps, and the store decides whether to index the feed id or
/// assign a surrogate of its own. Upserts stay idempotent across runs
/// exactly when `find_product_by_id` can find what `create_product`
/// stored under the same id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Looks up a product by id; `Ok(None)` when unknown.
    async fn find_product_by_id(&self, id: &str) -> anyhow::Result<Option<Product>>;

    /// Creates a product under the given feed-scoped id, assigning
    /// canonical timestamps.
    async fn create_product(&self, id: &str, data: ProductData) -> anyhow::Result<Product>;

    /// Replaces an existing product's fields; `Ok(false)` when the id is
    /// unknown.
    async fn update_product(&self, id: &str, data: ProductData) -> anyhow::Result<bool>;
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Products successfully created or updated.
    pub saved: usize,
    /// One entry per failed product or skipped feed item.
    pub errors: Vec<String>,
}

impl ImportReport {
    /// An import succeeds when at least one product was saved.
    #[must_use]
    pub fn success(&self) -> bool {
        self.saved > 0
    }
}

/// Upserts every extracted product through the store, sequentially.
///
/// A store error for one product is recorded and does not stop the rest
/// of the batch.
pub async fn import_products<S: ProductStore + ?Sized>(
    store: &S,
    products: &[Product],
) -> ImportReport {
    let mut report = ImportReport::default();
    for product in products {
        match upsert(store, product).await {
            Ok(updated) => {
                tracing::debug!(id = %product.id, updated, "product saved");
                report.saved += 1;
            }
            Err(error) => {
                tracing::warn!(
                    id = %product.id,
                    error = %error,
                    "skipping product — store call failed"
                );
                report.errors.push(format!("product {}: {error}", product.id));
            }
        }
    }
    report
}

/// Extracts `xml` under `mapping` and imports the result in one call.
///
/// Extraction item errors are carried into the report ahead of any
/// persistence errors.
///
/// # Errors
///
/// Returns an [`IngestError`] for structural extraction failures; nothing
/// is imported in that case.
pub async fn import_feed<S: ProductStore + ?Sized>(
    xml: &str,
    mapping: &FieldMapping,
    store: &S,
) -> Result<ImportReport, IngestError> {
    let Extraction { products, errors } = extract(xml, mapping)?;
    let report = import_products(store, &products).await;

    let mut combined = errors;
    combined.extend(report.errors);
    Ok(ImportReport {
        saved: report.saved,
        errors: combined,
    })
}

/// Returns `true` when the product existed and was updated, `false` when
/// it was created.
async fn upsert<S: ProductStore + ?Sized>(store: &S, product: &Product) -> anyhow::Result<bool> {
    if store.find_product_by_id(&product.id).await?.is_some() {
        store.update_product(&product.id, product.data()).await?;
        Ok(true)
    } else {
        store.create_product(&product.id, product.data()).await?;
        Ok(false)
    }
}
