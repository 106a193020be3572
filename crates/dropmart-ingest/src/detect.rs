//! Product-candidate detection over an unknown-shaped feed tree.
//!
//! Two independent signals register candidates: a fixed vocabulary of
//! likely product tag names (a strong, language-agnostic prior that scores
//! maximal), and a frequency heuristic for feeds with unconventional names
//! (a repeated direct-child tag whose field profile looks product-like).
//! Candidates are transient; they exist only to seed a
//! [mapping suggestion](crate::suggest).

use crate::tree::{Document, Element};

/// Tag names that almost always denote one product instance. The Cyrillic
/// entry covers the common Russian/Ukrainian feed convention.
pub const PRODUCT_TAG_VOCABULARY: [&str; 6] =
    ["item", "product", "offer", "good", "article", "товар"];

/// Score assigned to vocabulary matches; a name match overrides the field
/// heuristic.
const VOCABULARY_SCORE: u32 = 100;

/// A vocabulary tag must occur more than this many times under an element
/// to register.
const VOCABULARY_MIN_COUNT: usize = 5;

/// A non-vocabulary tag must occur more than this many times among direct
/// children to be profiled.
const REPEATED_CHILD_MIN_COUNT: usize = 10;

/// Minimum heuristic score for a frequency-based candidate; `name` +
/// `price` alone (60) clear it comfortably, a single weak field does not.
const SCORE_THRESHOLD: u32 = 30;

/// Logical product fields a feed tag or attribute can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Price,
    Description,
    Images,
    Category,
    CategoryIdToName,
    Sku,
    Stock,
}

impl ProductField {
    /// Classifies a tag or attribute name via the fixed lowercase lookup
    /// table. Unknown names are simply not product-like.
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "title" | "name" | "product_name" => Some(ProductField::Name),
            "price" | "cost" => Some(ProductField::Price),
            "description" | "desc" | "text" => Some(ProductField::Description),
            "image" | "picture" | "img" | "photo" => Some(ProductField::Images),
            "category" => Some(ProductField::Category),
            "categoryid" | "category_id" => Some(ProductField::CategoryIdToName),
            "sku" | "code" | "vendorcode" | "barcode" | "ean" | "upc" => Some(ProductField::Sku),
            "stock" | "quantity" => Some(ProductField::Stock),
            _ => None,
        }
    }

    /// Scoring weight. The two mandatory product attributes dominate so
    /// that `name` + `price` alone outweigh any pile of cosmetic fields.
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            ProductField::Name | ProductField::Price => 30,
            ProductField::Description | ProductField::Images => 15,
            ProductField::Category | ProductField::Sku => 10,
            ProductField::CategoryIdToName | ProductField::Stock => 5,
        }
    }

    /// Field label as used in mapping keys and sample rows.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Price => "price",
            ProductField::Description => "description",
            ProductField::Images => "images",
            ProductField::Category => "category",
            ProductField::CategoryIdToName => "categoryIdToName",
            ProductField::Sku => "sku",
            ProductField::Stock => "stock",
        }
    }
}

/// Whether a profiled field came from an attribute or a child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Attribute,
    Element,
}

/// One attribute or direct child of a sampled product element.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub kind: FieldKind,
    pub field_type: Option<ProductField>,
    pub example: Option<String>,
}

/// A tree element hypothesized to represent one product instance.
#[derive(Debug, Clone)]
pub struct ProductCandidate {
    /// Slash path from the document root to the product element.
    pub path: String,
    pub element_name: String,
    /// Matched element count at registration time.
    pub count: usize,
    pub score: u32,
    pub fields: Vec<FieldInfo>,
}

/// Profiles a sample element: every attribute and every direct child,
/// classified by [`ProductField::classify`]. Repeated child tags appear
/// once per occurrence; scoring only counts distinct field types, and the
/// suggester takes the first match per type.
#[must_use]
pub fn extract_fields_info(element: &Element) -> Vec<FieldInfo> {
    let mut fields = Vec::new();
    for (name, value) in &element.attributes {
        fields.push(FieldInfo {
            name: name.clone(),
            kind: FieldKind::Attribute,
            field_type: ProductField::classify(name),
            example: if value.is_empty() {
                None
            } else {
                Some(value.clone())
            },
        });
    }
    for child in &element.children {
        fields.push(FieldInfo {
            name: child.name.clone(),
            kind: FieldKind::Element,
            field_type: ProductField::classify(&child.name),
            example: child.text().map(str::to_owned),
        });
    }
    fields
}

/// Sums fixed weights for each *distinct* product field type present.
#[must_use]
pub fn product_field_score(fields: &[FieldInfo]) -> u32 {
    let mut seen: Vec<ProductField> = Vec::new();
    for field in fields {
        if let Some(field_type) = field.field_type {
            if !seen.contains(&field_type) {
                seen.push(field_type);
            }
        }
    }
    seen.iter().map(|field_type| field_type.weight()).sum()
}

/// Scans the document for product candidates, sorted descending by score.
///
/// Ties keep discovery order (stable sort over the depth-first traversal),
/// which is deterministic for a given document.
#[must_use]
pub fn find_candidates(document: &Document) -> Vec<ProductCandidate> {
    let mut candidates = Vec::new();
    scan(&document.root, &document.root.name, &mut candidates);
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn scan(element: &Element, path: &str, candidates: &mut Vec<ProductCandidate>) {
    // Vocabulary prior: a known product tag recurring anywhere under this
    // element, not just among direct children.
    for tag in PRODUCT_TAG_VOCABULARY {
        let matches = element.descendants_by_tag(tag);
        if matches.len() > VOCABULARY_MIN_COUNT {
            candidates.push(ProductCandidate {
                path: format!("{path}/{tag}"),
                element_name: tag.to_owned(),
                count: matches.len(),
                score: VOCABULARY_SCORE,
                fields: extract_fields_info(matches[0]),
            });
        }
    }

    // Frequency heuristic: a heavily repeated direct-child tag whose first
    // occurrence exposes product-like fields.
    let mut seen: Vec<&str> = Vec::new();
    for child in &element.children {
        if !seen.contains(&child.name.as_str()) {
            seen.push(&child.name);
        }
    }
    for tag in seen {
        let mut matches = element.children_by_tag(tag);
        if let Some(first) = matches.next() {
            let count = 1 + matches.count();
            if count > REPEATED_CHILD_MIN_COUNT {
                let fields = extract_fields_info(first);
                let score = product_field_score(&fields);
                if score > SCORE_THRESHOLD {
                    candidates.push(ProductCandidate {
                        path: format!("{path}/{tag}"),
                        element_name: tag.to_owned(),
                        count,
                        score,
                        fields,
                    });
                }
            }
        }
    }

    // Recurse only into structurally unique children: repeated groups were
    // already counted above, so this bounds the walk to the document's
    // skeleton.
    for child in &element.children {
        if element.children_by_tag(&child.name).count() == 1 {
            let child_path = format!("{path}/{}", child.name);
            scan(child, &child_path, candidates);
        }
    }
}
