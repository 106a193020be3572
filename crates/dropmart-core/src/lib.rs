pub mod mapping;
pub mod product;

pub use mapping::{FieldMapping, FieldPaths, MappingSuggestion, SampleRow, Transform};
pub use product::{Product, ProductData};
