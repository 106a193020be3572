//! End-to-end ingestion: suggestion over an unknown feed, a human-style
//! confirmation tweak, deterministic extraction, and idempotent import
//! through an in-memory store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use dropmart_core::{Product, ProductData, Transform};
use dropmart_ingest::{
    analyze, extract, import_products, suggest_mapping, Document, ProductStore,
    DEFAULT_MAX_DEPTH,
};

/// A seven-offer yml_catalog feed: six valid offers and one missing its
/// price. Prices embed a currency suffix to exercise the confirmed
/// mapping's regex transform.
const YML_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<yml_catalog date="2026-08-07">
  <shop>
    <name>Supplier</name>
    <categories>
      <category id="1">Kitchen</category>
      <category id="2">Outdoor</category>
    </categories>
    <offers>
      <offer id="101" available="true">
        <name>Enamel Mug</name>
        <price>12.90 UAH</price>
        <categoryId>1</categoryId>
        <picture>https://cdn.example/mug-front.jpg</picture>
        <picture>https://cdn.example/mug-back.jpg</picture>
        <description><![CDATA[Steel <b>enamel</b> mug]]></description>
        <vendorCode>MUG-01</vendorCode>
      </offer>
      <offer id="102" available="false">
        <name>Camp Kettle</name>
        <price>34.00 UAH</price>
        <categoryId>2</categoryId>
        <picture>https://cdn.example/kettle.jpg</picture>
        <vendorCode>KET-02</vendorCode>
      </offer>
      <offer id="103">
        <name>Plate Set</name>
        <price>18.50 UAH</price>
        <categoryId>1</categoryId>
      </offer>
      <offer id="104">
        <name>Folding Stove</name>
        <price>52.00 UAH</price>
        <categoryId>2</categoryId>
      </offer>
      <offer id="105">
        <name>Cutlery Kit</name>
        <price>9.90 UAH</price>
        <categoryId>1</categoryId>
      </offer>
      <offer id="106">
        <name>Thermo Bottle</name>
        <price>27.30 UAH</price>
        <categoryId>2</categoryId>
      </offer>
      <offer id="999">
        <name>Broken Offer</name>
        <categoryId>1</categoryId>
      </offer>
    </offers>
  </shop>
</yml_catalog>
"#;

#[derive(Default)]
struct MemoryStore {
    products: Mutex<HashMap<String, Product>>,
    creates: Mutex<usize>,
    updates: Mutex<usize>,
}

impl MemoryStore {
    fn created(&self) -> usize {
        *self.creates.lock().expect("lock poisoned")
    }

    fn updated(&self) -> usize {
        *self.updates.lock().expect("lock poisoned")
    }

    fn len(&self) -> usize {
        self.products.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_product_by_id(&self, id: &str) -> anyhow::Result<Option<Product>> {
        Ok(self.products.lock().expect("lock poisoned").get(id).cloned())
    }

    async fn create_product(&self, id: &str, data: ProductData) -> anyhow::Result<Product> {
        *self.creates.lock().expect("lock poisoned") += 1;
        let now = Utc::now();
        let product = Product {
            id: id.to_string(),
            name: data.name,
            description: data.description,
            price: data.price,
            compare_at_price: data.compare_at_price,
            images: data.images,
            category: data.category,
            tags: data.tags,
            sku: data.sku,
            stock: data.stock,
            created_at: now,
            updated_at: now,
        };
        self.products
            .lock()
            .expect("lock poisoned")
            .insert(id.to_string(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, data: ProductData) -> anyhow::Result<bool> {
        *self.updates.lock().expect("lock poisoned") += 1;
        let mut products = self.products.lock().expect("lock poisoned");
        match products.get_mut(id) {
            Some(existing) => {
                existing.name = data.name;
                existing.description = data.description;
                existing.price = data.price;
                existing.compare_at_price = data.compare_at_price;
                existing.images = data.images;
                existing.category = data.category;
                existing.tags = data.tags;
                existing.sku = data.sku;
                existing.stock = data.stock;
                existing.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[test]
fn structure_preview_profiles_the_feed_skeleton() {
    let document = Document::parse(YML_FEED).expect("expected well-formed XML");
    let node = analyze(&document.root, DEFAULT_MAX_DEPTH);

    assert_eq!(node.name, "yml_catalog");
    assert_eq!(node.attributes, ["date"]);
    let shop = &node.children[0];
    assert_eq!(shop.name, "shop");
    let offers = shop
        .children
        .iter()
        .find(|child| child.name == "offers")
        .expect("expected offers node");
    assert_eq!(offers.children[0].name, "offer");
    assert_eq!(offers.children[0].count, 7);
}

#[test]
fn suggestion_proposes_a_usable_yml_mapping() {
    let suggestion = suggest_mapping(YML_FEED)
        .expect("expected well-formed XML")
        .expect("expected a suggestion");

    assert_eq!(suggestion.confidence, 100);
    assert_eq!(suggestion.product_count, 7);
    assert_eq!(suggestion.schema.root_element, "yml_catalog");
    assert_eq!(suggestion.schema.product_element, "offer");

    let paths = &suggestion.schema.field_mappings;
    assert_eq!(paths.name, "name");
    assert_eq!(paths.price, "price");
    assert_eq!(paths.images.as_deref(), Some("picture"));
    assert_eq!(paths.category_id_to_name.as_deref(), Some("categoryId"));
    assert_eq!(paths.description.as_deref(), Some("description"));
    assert_eq!(paths.sku.as_deref(), Some("vendorCode"));

    assert_eq!(suggestion.sample_data.len(), 5);
    assert_eq!(suggestion.sample_data[0]["name"], "Enamel Mug");
    assert_eq!(suggestion.sample_data[0]["price"], "12.90 UAH");
}

#[test]
fn confirmed_mapping_extracts_normalized_products() {
    let mut mapping = suggest_mapping(YML_FEED)
        .expect("expected well-formed XML")
        .expect("expected a suggestion")
        .schema;
    // The reviewer spots the currency suffix in the preview and adds a
    // price transform before confirming.
    mapping.transforms.insert(
        "price".to_string(),
        Transform::Regex {
            pattern: "[^0-9.]".to_string(),
            replacement: String::new(),
        },
    );

    let extraction = extract(YML_FEED, &mapping).expect("expected success");
    assert_eq!(extraction.products.len(), 6);
    assert_eq!(extraction.errors.len(), 1);
    assert!(extraction.errors[0].starts_with("item 7:"));

    let mug = &extraction.products[0];
    assert_eq!(mug.id, "101");
    assert_eq!(mug.name, "Enamel Mug");
    assert!((mug.price - 12.90).abs() < 1e-9);
    assert_eq!(mug.category, "Kitchen");
    assert_eq!(
        mug.images,
        [
            "https://cdn.example/mug-front.jpg",
            "https://cdn.example/mug-back.jpg"
        ]
    );
    assert_eq!(mug.sku, "MUG-01");
    assert_eq!(mug.description.as_deref(), Some("Steel <b>enamel</b> mug"));
    // available="true" forces the fixed in-stock default.
    assert_eq!(mug.stock, 10);

    let kettle = &extraction.products[1];
    assert_eq!(kettle.category, "Outdoor");
    // available="false" forces zero stock.
    assert_eq!(kettle.stock, 0);

    for product in &extraction.products {
        assert!(!product.name.is_empty());
        assert!(product.price.is_finite());
    }
}

#[tokio::test]
async fn reimport_updates_instead_of_duplicating() {
    let mut mapping = suggest_mapping(YML_FEED)
        .expect("expected well-formed XML")
        .expect("expected a suggestion")
        .schema;
    mapping.transforms.insert(
        "price".to_string(),
        Transform::Regex {
            pattern: "[^0-9.]".to_string(),
            replacement: String::new(),
        },
    );

    let store = MemoryStore::default();

    let first = extract(YML_FEED, &mapping).expect("expected success");
    let first_report = import_products(&store, &first.products).await;
    assert_eq!(first_report.saved, 6);
    assert!(first_report.success());
    assert_eq!(store.created(), 6);
    assert_eq!(store.updated(), 0);

    let second = extract(YML_FEED, &mapping).expect("expected success");
    let second_report = import_products(&store, &second.products).await;
    assert_eq!(second_report.saved, 6);
    assert_eq!(store.created(), 6);
    assert_eq!(store.updated(), 6);
    assert_eq!(store.len(), 6);
}
