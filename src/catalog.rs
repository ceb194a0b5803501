//! Product catalog records and lookup index.
//!
//! The catalog index owns the full product set after `fit` and provides the
//! lookup structures every other component depends on: id, category, and
//! brand groupings plus a precomputed lowercase search text per product.
//!
//! # Examples
//!
//! ```
//! use canasta::catalog::{CatalogIndex, Product};
//!
//! let products = vec![
//!     Product::new(1, "2% MILK", "DAIRY").with_brand("Hillside"),
//!     Product::new(2, "WHEAT BREAD", "BAKERY"),
//! ];
//! let catalog = CatalogIndex::build(products).expect("valid catalog");
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.get(1).map(|p| p.category.as_str()), Some("DAIRY"));
//! assert_eq!(catalog.ids_in_category("dairy"), &[1]);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CanastaError, Result};

/// Fallback brand when the source row carries none.
pub const DEFAULT_BRAND: &str = "Store Brand";

/// Fallback price when the source row carries none.
pub const DEFAULT_PRICE: f32 = 5.0;

/// Maximum ids returned per category during association lookups.
///
/// Lookup-speed cap, not a business rule: association building scans at most
/// this many products of a category.
pub const CATEGORY_SCAN_CAP: usize = 10;

fn default_brand() -> String {
    DEFAULT_BRAND.to_string()
}

fn default_price() -> f32 {
    DEFAULT_PRICE
}

/// A single catalog row. Immutable once loaded into a [`CatalogIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, stable identifier.
    pub product_id: u32,
    /// Display name.
    pub name: String,
    /// Category label (e.g. "DAIRY").
    pub category: String,
    /// Optional finer-grained category.
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Brand label; defaults to [`DEFAULT_BRAND`] when missing.
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Non-negative price; defaults to [`DEFAULT_PRICE`] when missing.
    #[serde(default = "default_price")]
    pub price: f32,
}

impl Product {
    /// Create a product with the mandatory fields and defaulted extras.
    #[must_use]
    pub fn new(product_id: u32, name: &str, category: &str) -> Self {
        Self {
            product_id,
            name: name.to_string(),
            category: category.to_string(),
            sub_category: None,
            brand: default_brand(),
            price: default_price(),
        }
    }

    /// Set the brand.
    #[must_use]
    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = brand.to_string();
        self
    }

    /// Set the price.
    #[must_use]
    pub fn with_price(mut self, price: f32) -> Self {
        self.price = price;
        self
    }

    /// Set the sub-category.
    #[must_use]
    pub fn with_sub_category(mut self, sub_category: &str) -> Self {
        self.sub_category = Some(sub_category.to_string());
        self
    }
}

/// Lookup index over an owned, validated product catalog.
///
/// Category and brand lookups are case-insensitive. Iteration order is the
/// (deduplicated) input order, which downstream components rely on for
/// deterministic results.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    products: Vec<Product>,
    by_id: HashMap<u32, usize>,
    by_category: HashMap<String, Vec<u32>>,
    by_brand: HashMap<String, Vec<u32>>,
    /// Lowercase "name sub_category category brand" per product, input order.
    search_text: Vec<String>,
    skipped_rows: usize,
}

impl CatalogIndex {
    /// Build the index from a product table.
    ///
    /// Rows with a duplicate identifier are dropped (first row wins) and
    /// counted in [`CatalogIndex::skipped_rows`].
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::InvalidCatalog`] if the table is empty or a
    /// row is missing a mandatory field (name, category).
    pub fn build(products: Vec<Product>) -> Result<Self> {
        if products.is_empty() {
            return Err(CanastaError::invalid_catalog("product table is empty"));
        }

        let mut kept: Vec<Product> = Vec::with_capacity(products.len());
        let mut by_id: HashMap<u32, usize> = HashMap::with_capacity(products.len());
        let mut skipped_rows = 0;

        for product in products {
            if product.name.trim().is_empty() {
                return Err(CanastaError::invalid_catalog(format!(
                    "product {} has no name",
                    product.product_id
                )));
            }
            if product.category.trim().is_empty() {
                return Err(CanastaError::invalid_catalog(format!(
                    "product {} has no category",
                    product.product_id
                )));
            }
            if by_id.contains_key(&product.product_id) {
                skipped_rows += 1;
                continue;
            }
            by_id.insert(product.product_id, kept.len());
            kept.push(product);
        }

        let mut by_category: HashMap<String, Vec<u32>> = HashMap::new();
        let mut by_brand: HashMap<String, Vec<u32>> = HashMap::new();
        let mut search_text = Vec::with_capacity(kept.len());

        for product in &kept {
            by_category
                .entry(product.category.to_uppercase())
                .or_default()
                .push(product.product_id);
            by_brand
                .entry(product.brand.to_lowercase())
                .or_default()
                .push(product.product_id);

            let mut text = String::with_capacity(
                product.name.len() + product.category.len() + product.brand.len() + 2,
            );
            text.push_str(&product.name);
            if let Some(sub) = &product.sub_category {
                text.push(' ');
                text.push_str(sub);
            }
            text.push(' ');
            text.push_str(&product.category);
            text.push(' ');
            text.push_str(&product.brand);
            search_text.push(text.to_lowercase());
        }

        Ok(Self {
            products: kept,
            by_id,
            by_category,
            by_brand,
            search_text,
            skipped_rows,
        })
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn get(&self, product_id: u32) -> Option<&Product> {
        self.by_id.get(&product_id).map(|&i| &self.products[i])
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Category of a product, if cataloged.
    #[must_use]
    pub fn category_of(&self, product_id: u32) -> Option<&str> {
        self.get(product_id).map(|p| p.category.as_str())
    }

    /// Brand of a product, if cataloged.
    #[must_use]
    pub fn brand_of(&self, product_id: u32) -> Option<&str> {
        self.get(product_id).map(|p| p.brand.as_str())
    }

    /// Product ids of a category, case-insensitive. Empty for unknown labels.
    #[must_use]
    pub fn ids_in_category(&self, category: &str) -> &[u32] {
        self.by_category
            .get(&category.to_uppercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Product ids of a brand, case-insensitive. Empty for unknown labels.
    #[must_use]
    pub fn ids_of_brand(&self, brand: &str) -> &[u32] {
        self.by_brand
            .get(&brand.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Bounded slice of a category's ids, for association lookups.
    #[must_use]
    pub fn category_scan(&self, category: &str, cap: usize) -> &[u32] {
        let ids = self.ids_in_category(category);
        &ids[..ids.len().min(cap)]
    }

    /// Lowercase searchable text of a product, if cataloged.
    #[must_use]
    pub fn search_text(&self, product_id: u32) -> Option<&str> {
        self.by_id
            .get(&product_id)
            .map(|&i| self.search_text[i].as_str())
    }

    /// `(product_id, search_text)` pairs in catalog order.
    pub fn iter_search_text(&self) -> impl Iterator<Item = (u32, &str)> {
        self.products
            .iter()
            .zip(&self.search_text)
            .map(|(p, text)| (p.product_id, text.as_str()))
    }

    /// Rows dropped during `build` (duplicate identifiers).
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}
