//! Mapping suggestion from the best-scoring product candidate.
//!
//! The suggester never commits anything: its output is reviewed, corrected
//! where the heuristics guessed wrong, and only then persisted as the
//! confirmed [`FieldMapping`]. The schema it proposes is therefore always
//! structurally complete — `name` and `price` fall back to literal paths
//! when inference found nothing, so the reviewer has something concrete to
//! fix.

use std::collections::BTreeMap;

use dropmart_core::{FieldMapping, FieldPaths, MappingSuggestion, SampleRow};

use crate::detect::{find_candidates, FieldInfo, ProductCandidate, ProductField};
use crate::error::IngestError;
use crate::extract::collect_product_elements;
use crate::tree::{resolve_text, Document, Element};

/// Preview rows attached to a suggestion.
const MAX_SAMPLE_ROWS: usize = 5;

/// Parses a feed and proposes a mapping for it.
///
/// Returns `Ok(None)` when no product candidate was detected.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] (or its parse-stage siblings) when the
/// feed is not well-formed XML.
pub fn suggest_mapping(xml: &str) -> Result<Option<MappingSuggestion>, IngestError> {
    let document = Document::parse(xml)?;
    let candidates = find_candidates(&document);
    Ok(suggest(&document, &candidates))
}

/// Builds a [`MappingSuggestion`] from pre-computed candidates, or `None`
/// when there are none.
#[must_use]
pub fn suggest(document: &Document, candidates: &[ProductCandidate]) -> Option<MappingSuggestion> {
    let best = candidates.first()?;

    let root_element = match best.path.rsplit_once('/') {
        Some((prefix, _)) => prefix.to_owned(),
        None => document.root.name.clone(),
    };

    let pick = |field_type: ProductField| {
        pick_field(&best.fields, field_type).map(|field| field.name.clone())
    };
    let field_mappings = FieldPaths {
        name: pick(ProductField::Name).unwrap_or_else(|| "name".to_string()),
        price: pick(ProductField::Price).unwrap_or_else(|| "price".to_string()),
        id: None,
        description: pick(ProductField::Description),
        compare_at_price: None,
        images: pick(ProductField::Images),
        category: pick(ProductField::Category),
        category_id_to_name: pick(ProductField::CategoryIdToName),
        tags: None,
        sku: pick(ProductField::Sku),
        stock: pick(ProductField::Stock),
    };

    let schema = FieldMapping {
        root_element,
        product_element: best.element_name.clone(),
        field_mappings,
        transforms: BTreeMap::new(),
    };

    // Re-walk the document with the proposed schema so the preview count
    // and rows match what extraction would actually see.
    let (product_count, sample_data) = match collect_product_elements(document, &schema) {
        Ok((_, elements)) => {
            let rows = elements
                .iter()
                .take(MAX_SAMPLE_ROWS)
                .map(|element| sample_row(element, &schema))
                .collect();
            (elements.len(), rows)
        }
        Err(_) => (0, Vec::new()),
    };

    Some(MappingSuggestion {
        schema,
        confidence: best.score.min(100),
        product_count,
        sample_data,
    })
}

/// First field whose type matches, except that a field literally named
/// like the type's label (case-insensitive) wins over an earlier-seen
/// synonym — `<price>` beats a `<cost>` that happened to appear first.
fn pick_field(fields: &[FieldInfo], field_type: ProductField) -> Option<&FieldInfo> {
    let mut first_match = None;
    for field in fields {
        if field.field_type == Some(field_type) {
            if field.name.eq_ignore_ascii_case(field_type.label()) {
                return Some(field);
            }
            if first_match.is_none() {
                first_match = Some(field);
            }
        }
    }
    first_match
}

fn sample_row(element: &Element, schema: &FieldMapping) -> SampleRow {
    let paths = &schema.field_mappings;
    let mut row = SampleRow::new();
    let mut put = |label: &str, path: Option<&str>| {
        if let Some(path) = path {
            if let Some(value) = resolve_text(element, path) {
                row.insert(label.to_owned(), value);
            }
        }
    };
    put("name", Some(&paths.name));
    put("price", Some(&paths.price));
    put("description", paths.description.as_deref());
    put("images", paths.images.as_deref());
    put("category", paths.category.as_deref());
    put("categoryIdToName", paths.category_id_to_name.as_deref());
    put("sku", paths.sku.as_deref());
    put("stock", paths.stock.as_deref());
    row
}
