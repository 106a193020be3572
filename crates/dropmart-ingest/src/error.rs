use thiserror::Error;

/// Structural failures that abort an entire ingestion operation.
///
/// Per-product problems are *not* represented here; extraction collects
/// those as indexed strings and continues the batch. See
/// [`ItemError`] for the per-product failure kinds.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("document has no root element")]
    EmptyDocument,

    #[error("unclosed element <{tag}> at end of document")]
    UnclosedTag { tag: String },

    #[error("root element \"{path}\" not found in document")]
    UnresolvedRoot { path: String },

    #[error("no <{tag}> product elements found under <{container}>")]
    NoProducts { tag: String, container: String },
}

/// A failure mapping one product element. Caught per item during
/// extraction, rendered into the batch error list, and never aborts the
/// run.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("required field \"name\" is empty or missing at path \"{path}\"")]
    MissingName { path: String },

    #[error("required field \"price\" is empty or missing at path \"{path}\"")]
    MissingPrice { path: String },

    #[error("price \"{raw}\" did not parse as a number")]
    InvalidPrice { raw: String },
}
