//! Deterministic product extraction under a confirmed mapping.
//!
//! Structural problems (malformed XML, unresolved root, zero product
//! elements) fail the whole call with an [`IngestError`]. Anything wrong
//! with an individual product element is collected into
//! [`Extraction::errors`] with its 1-based item index and the batch
//! continues — partial success is the normal outcome for real-world
//! feeds.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use dropmart_core::{FieldMapping, Product};

use crate::error::{IngestError, ItemError};
use crate::tree::{resolve_text, Document, Element};

/// Stock level forced when a product element carries `available="true"`.
const AVAILABLE_STOCK_DEFAULT: i64 = 10;

/// Result of applying a confirmed mapping to one feed document.
#[derive(Debug)]
pub struct Extraction {
    pub products: Vec<Product>,
    /// One entry per failed product element, labeled `item N: ...` with
    /// the element's 1-based position in the feed.
    pub errors: Vec<String>,
}

/// Parses `xml` and extracts every product element matched by `mapping`.
///
/// # Errors
///
/// Returns an [`IngestError`] only for structural failures; per-item
/// failures land in [`Extraction::errors`].
pub fn extract(xml: &str, mapping: &FieldMapping) -> Result<Extraction, IngestError> {
    let document = Document::parse(xml)?;
    extract_document(&document, mapping)
}

/// Extracts from an already-parsed document. See [`extract`].
///
/// # Errors
///
/// Returns an [`IngestError`] for unresolved roots or zero matched
/// product elements.
pub fn extract_document(
    document: &Document,
    mapping: &FieldMapping,
) -> Result<Extraction, IngestError> {
    let (container, elements) = collect_product_elements(document, mapping)?;
    let categories = category_dictionary(container);

    let mut products = Vec::new();
    let mut errors = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        match map_element_to_product(element, mapping, &categories) {
            Ok(product) => products.push(product),
            Err(error) => {
                tracing::warn!(
                    item = index + 1,
                    error = %error,
                    "skipping product element"
                );
                errors.push(format!("item {}: {error}", index + 1));
            }
        }
    }

    tracing::debug!(
        matched = elements.len(),
        extracted = products.len(),
        failed = errors.len(),
        "extraction finished"
    );
    Ok(Extraction { products, errors })
}

/// Resolves the mapping's container and collects its product elements.
///
/// Shared with the suggestion path so preview counts and extraction counts
/// agree.
///
/// # Errors
///
/// [`IngestError::UnresolvedRoot`] when the root path has no match,
/// [`IngestError::NoProducts`] when the container holds no product
/// elements.
pub(crate) fn collect_product_elements<'a>(
    document: &'a Document,
    mapping: &FieldMapping,
) -> Result<(&'a Element, Vec<&'a Element>), IngestError> {
    let mut container =
        document
            .resolve(&mapping.root_element)
            .ok_or_else(|| IngestError::UnresolvedRoot {
                path: mapping.root_element.clone(),
            })?;

    // The yml_catalog marketplace format nests products one level deeper
    // inside <shop>; descend so the mapping doesn't have to encode it.
    if container.name == "yml_catalog" {
        if let Some(shop) = container.first_descendant("shop") {
            container = shop;
        }
    }

    let elements = container.descendants_by_tag(&mapping.product_element);
    if elements.is_empty() {
        return Err(IngestError::NoProducts {
            tag: mapping.product_element.clone(),
            container: container.name.clone(),
        });
    }
    Ok((container, elements))
}

/// Builds the feed's category dictionary: every `<category>` under the
/// container that carries an `id` attribute, mapped id → display name.
fn category_dictionary(container: &Element) -> HashMap<String, String> {
    let mut categories = HashMap::new();
    for category in container.descendants_by_tag("category") {
        if let (Some(id), Some(name)) = (category.attribute("id"), category.text()) {
            categories.insert(id.to_owned(), name.to_owned());
        }
    }
    categories
}

fn map_element_to_product(
    element: &Element,
    mapping: &FieldMapping,
    categories: &HashMap<String, String>,
) -> Result<Product, ItemError> {
    let paths = &mapping.field_mappings;

    let id = paths
        .id
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .or_else(|| element.attribute("id").map(str::to_owned))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let name = resolve_text(element, &paths.name)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ItemError::MissingName {
            path: paths.name.clone(),
        })?;

    let raw_price =
        resolve_text(element, &paths.price).ok_or_else(|| ItemError::MissingPrice {
            path: paths.price.clone(),
        })?;
    let raw_price = match mapping.transform_for("price") {
        Some(transform) => transform.apply_scalar(&raw_price),
        None => raw_price,
    };
    let price = raw_price
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ItemError::InvalidPrice {
            raw: raw_price.clone(),
        })?;

    let description = paths
        .description
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .map(|text| match mapping.transform_for("description") {
            Some(transform) => transform.apply_scalar(&text),
            None => text,
        });

    let images = collect_images(element, paths.images.as_deref());

    let category = paths
        .category
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .or_else(|| {
            paths
                .category_id_to_name
                .as_deref()
                .and_then(|path| resolve_text(element, path))
                .and_then(|id| categories.get(&id).cloned())
        })
        .unwrap_or_default();

    let tags = match paths
        .tags
        .as_deref()
        .and_then(|path| resolve_text(element, path))
    {
        Some(raw) => mapping
            .transform_for("tags")
            .and_then(|transform| transform.split_list(&raw))
            .unwrap_or_else(|| vec![raw]),
        None => Vec::new(),
    };

    let sku = paths
        .sku
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .or_else(|| resolve_text(element, "vendorCode"))
        .unwrap_or_default();

    let parsed_stock = paths
        .stock
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(0);
    // An `available` attribute on the product element overrides any mapped
    // stock value: "true" forces AVAILABLE_STOCK_DEFAULT units, any other
    // value forces 0.
    let stock = match element.attribute("available") {
        Some("true") => AVAILABLE_STOCK_DEFAULT,
        Some(_) => 0,
        None => parsed_stock,
    };

    let compare_at_price = paths
        .compare_at_price
        .as_deref()
        .and_then(|path| resolve_text(element, path))
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite());

    let now = Utc::now();
    Ok(Product {
        id,
        name,
        description,
        price,
        compare_at_price,
        images,
        category,
        tags,
        sku,
        stock,
        created_at: now,
        updated_at: now,
    })
}

/// Image paths that name a bare tag may match several sibling elements;
/// all of their texts form the image list. Nested paths resolve to the
/// single first match.
fn collect_images(element: &Element, path: Option<&str>) -> Vec<String> {
    let Some(path) = path else {
        return Vec::new();
    };
    if !path.contains('/') {
        let matches = element.descendants_by_tag(path);
        if matches.len() > 1 {
            return matches
                .iter()
                .filter_map(|image| image.text().map(str::to_owned))
                .collect();
        }
    }
    resolve_text(element, path).map(|url| vec![url]).unwrap_or_default()
}
