pub mod detect;
pub mod error;
pub mod extract;
pub mod import;
pub mod structure;
pub mod suggest;
pub mod tree;

pub use detect::{
    extract_fields_info, find_candidates, product_field_score, FieldInfo, FieldKind,
    ProductCandidate, ProductField,
};
pub use error::{IngestError, ItemError};
pub use extract::{extract, extract_document, Extraction};
pub use import::{import_feed, import_products, ImportReport, ProductStore};
pub use structure::{analyze, StructureNode, DEFAULT_MAX_DEPTH};
pub use suggest::{suggest, suggest_mapping};
pub use tree::{resolve_element, resolve_text, Document, Element};
