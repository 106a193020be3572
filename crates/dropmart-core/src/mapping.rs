//! The confirmed, user-editable feed schema: element paths per logical
//! product field plus optional per-field transforms.
//!
//! A [`FieldMapping`] is persisted by the surrounding application as an
//! opaque JSON blob next to the feed's URL and display name, so the
//! serialized shape (camelCase keys, tagged transform objects) is a wire
//! contract and must stay stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Schema translating feed element paths to normalized product fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Either a bare tag name or a `/`-separated path from the document
    /// root to the container of product elements.
    pub root_element: String,
    /// Tag name of each product-bearing element, searched in document
    /// order under the resolved container.
    pub product_element: String,
    pub field_mappings: FieldPaths,
    /// Keyed by field label (`"price"`, `"tags"`, ...). The label space is
    /// not restricted to mapped fields; unknown labels are simply never
    /// applied.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transforms: BTreeMap<String, Transform>,
}

impl FieldMapping {
    /// Returns the transform configured for a field label, if any.
    #[must_use]
    pub fn transform_for(&self, field: &str) -> Option<&Transform> {
        self.transforms.get(field)
    }
}

/// Per-field element paths, each relative to one product element.
///
/// `name` and `price` are mandatory: extraction fails an individual product
/// when either path resolves to empty text. Every other field is optional
/// and absent paths mean "use the default / skip".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPaths {
    pub name: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Path to a numeric category-id reference, resolved through the
    /// feed's own category dictionary at extraction time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<String>,
}

/// A small text-processing rule applied to one extracted field's raw value.
///
/// Only `regex` and `replace` act on scalar string fields; `split` fans a
/// delimited string into a list (used for tags) and `join` is its inverse
/// for callers assembling list fields. Applying a list-shaped transform to
/// a scalar leaves the value unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transform {
    Regex { pattern: String, replacement: String },
    Replace { pattern: String, replacement: String },
    Split { separator: String },
    Join { separator: String },
}

impl Transform {
    /// Applies this transform to a scalar string value.
    ///
    /// - `regex`: replaces every match of `pattern` with `replacement`. An
    ///   invalid pattern logs a warning and leaves the value unchanged.
    /// - `replace`: replaces the first occurrence of the literal `pattern`.
    /// - `split` / `join`: no-ops on scalars.
    #[must_use]
    pub fn apply_scalar(&self, value: &str) -> String {
        match self {
            Transform::Regex {
                pattern,
                replacement,
            } => match regex::Regex::new(pattern) {
                Ok(re) => re.replace_all(value, replacement.as_str()).into_owned(),
                Err(error) => {
                    tracing::warn!(
                        pattern = %pattern,
                        error = %error,
                        "invalid regex in transform; value left unchanged"
                    );
                    value.to_owned()
                }
            },
            Transform::Replace {
                pattern,
                replacement,
            } => value.replacen(pattern.as_str(), replacement, 1),
            Transform::Split { .. } | Transform::Join { .. } => value.to_owned(),
        }
    }

    /// Splits a raw scalar into a trimmed list when this is a `split`
    /// transform; returns `None` for every other kind.
    ///
    /// Empty pieces (from leading, trailing, or doubled separators) are
    /// dropped.
    #[must_use]
    pub fn split_list(&self, value: &str) -> Option<Vec<String>> {
        match self {
            Transform::Split { separator } => Some(
                value
                    .split(separator.as_str())
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_owned)
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// One preview row of a [`MappingSuggestion`]: field label → raw extracted
/// text for a single product element.
pub type SampleRow = BTreeMap<String, String>;

/// A proposed [`FieldMapping`] for an unknown feed, produced by the
/// suggestion path and confirmed or edited by a human before import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub schema: FieldMapping,
    /// Heuristic confidence, clamped to 0–100.
    pub confidence: u32,
    /// Number of product elements the proposed schema matches.
    pub product_count: usize,
    /// Up to five preview rows resolved through the proposed schema.
    pub sample_data: Vec<SampleRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mapping() -> FieldMapping {
        FieldMapping {
            root_element: "catalog/products".to_string(),
            product_element: "product".to_string(),
            field_mappings: FieldPaths {
                name: "title".to_string(),
                price: "cost".to_string(),
                id: None,
                description: Some("about".to_string()),
                compare_at_price: None,
                images: Some("picture".to_string()),
                category: None,
                category_id_to_name: Some("categoryId".to_string()),
                tags: Some("labels".to_string()),
                sku: None,
                stock: Some("qty".to_string()),
            },
            transforms: BTreeMap::from([(
                "price".to_string(),
                Transform::Regex {
                    pattern: "[^0-9.]".to_string(),
                    replacement: String::new(),
                },
            )]),
        }
    }

    // -----------------------------------------------------------------------
    // Transform::apply_scalar
    // -----------------------------------------------------------------------

    #[test]
    fn regex_transform_strips_currency_symbols() {
        let transform = Transform::Regex {
            pattern: "[^0-9.]".to_string(),
            replacement: String::new(),
        };
        assert_eq!(transform.apply_scalar("$19.99"), "19.99");
    }

    #[test]
    fn regex_transform_replaces_all_matches() {
        let transform = Transform::Regex {
            pattern: r"\s+".to_string(),
            replacement: " ".to_string(),
        };
        assert_eq!(transform.apply_scalar("a  b\t c"), "a b c");
    }

    #[test]
    fn regex_transform_invalid_pattern_leaves_value_unchanged() {
        let transform = Transform::Regex {
            pattern: "[unclosed".to_string(),
            replacement: String::new(),
        };
        assert_eq!(transform.apply_scalar("12.50"), "12.50");
    }

    #[test]
    fn replace_transform_replaces_first_occurrence_only() {
        let transform = Transform::Replace {
            pattern: ",".to_string(),
            replacement: ".".to_string(),
        };
        assert_eq!(transform.apply_scalar("1,234,56"), "1.234,56");
    }

    #[test]
    fn split_transform_is_noop_on_scalars() {
        let transform = Transform::Split {
            separator: ",".to_string(),
        };
        assert_eq!(transform.apply_scalar("12,99"), "12,99");
    }

    #[test]
    fn join_transform_is_noop_on_scalars() {
        let transform = Transform::Join {
            separator: ";".to_string(),
        };
        assert_eq!(transform.apply_scalar("a b"), "a b");
    }

    // -----------------------------------------------------------------------
    // Transform::split_list
    // -----------------------------------------------------------------------

    #[test]
    fn split_list_splits_and_trims() {
        let transform = Transform::Split {
            separator: ",".to_string(),
        };
        assert_eq!(
            transform.split_list("a, b ,c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn split_list_drops_empty_pieces() {
        let transform = Transform::Split {
            separator: ",".to_string(),
        };
        assert_eq!(
            transform.split_list("summer,,sale,"),
            Some(vec!["summer".to_string(), "sale".to_string()])
        );
    }

    #[test]
    fn split_list_none_for_non_split_transforms() {
        let transform = Transform::Regex {
            pattern: ".".to_string(),
            replacement: String::new(),
        };
        assert!(transform.split_list("a,b").is_none());
    }

    // -----------------------------------------------------------------------
    // FieldMapping
    // -----------------------------------------------------------------------

    #[test]
    fn transform_for_returns_configured_transform() {
        let mapping = make_mapping();
        assert!(matches!(
            mapping.transform_for("price"),
            Some(Transform::Regex { .. })
        ));
    }

    #[test]
    fn transform_for_unknown_label_returns_none() {
        let mapping = make_mapping();
        assert!(mapping.transform_for("sku").is_none());
    }

    #[test]
    fn serde_shape_matches_persisted_contract() {
        let mapping = make_mapping();
        let json = serde_json::to_value(&mapping).expect("serialization failed");
        assert_eq!(json["rootElement"], "catalog/products");
        assert_eq!(json["productElement"], "product");
        assert_eq!(json["fieldMappings"]["name"], "title");
        assert_eq!(json["fieldMappings"]["categoryIdToName"], "categoryId");
        assert_eq!(json["transforms"]["price"]["type"], "regex");
        // Unmapped optional paths are omitted, not serialized as null.
        assert!(json["fieldMappings"].get("sku").is_none());
    }

    #[test]
    fn serde_roundtrip_mapping() {
        let mapping = make_mapping();
        let json = serde_json::to_string(&mapping).expect("serialization failed");
        let decoded: FieldMapping = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.root_element, mapping.root_element);
        assert_eq!(decoded.field_mappings.stock.as_deref(), Some("qty"));
        assert_eq!(decoded.transforms.len(), 1);
    }

    #[test]
    fn mapping_without_transforms_deserializes() {
        let json = r#"{
            "rootElement": "shop",
            "productElement": "offer",
            "fieldMappings": { "name": "title", "price": "price" }
        }"#;
        let decoded: FieldMapping = serde_json::from_str(json).expect("deserialization failed");
        assert!(decoded.transforms.is_empty());
        assert!(decoded.field_mappings.images.is_none());
    }
}
