//! Keyword and category association rules, and the per-product association
//! table derived from them.
//!
//! The rule tables are configuration data, not code: both ship with a
//! curated grocery/restaurant default and can be replaced wholesale from
//! JSON, so merchandisers extend pairings without touching the engine.
//!
//! The derived [`AssociationModel`] is a static lookup built once per fit
//! for a bounded, high-popularity subset of the catalog. Bounding the subset
//! is a memory/latency tradeoff; correctness only requires that entries
//! reference cataloged products and never the source product itself.
//!
//! # Examples
//!
//! ```
//! use canasta::associations::AssociationRules;
//!
//! let rules = AssociationRules::default();
//! assert!(rules.related_keywords("pizza").contains(&"cola".to_string()));
//!
//! let custom = AssociationRules::from_json(
//!     r#"{"keywords": {"taco": ["salsa"]}, "categories": {"DELI": ["BAKERY"]}}"#,
//! ).expect("valid rules JSON");
//! assert_eq!(custom.related_keywords("taco"), &["salsa".to_string()]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogIndex, CATEGORY_SCAN_CAP};
use crate::error::Result;
use crate::query::tokenize;

/// Association tables cover at most this many high-popularity products.
pub const MAX_TARGETS: usize = 500;

/// Associations retained per covered product.
pub const MAX_PER_PRODUCT: usize = 3;

/// Name keywords considered per product.
pub const KEYWORDS_PER_NAME: usize = 2;

/// Related keywords consulted per matched keyword.
pub const RELATED_KEYWORDS_USED: usize = 2;

/// Catalog hits collected per related keyword.
pub const HITS_PER_KEYWORD: usize = 2;

/// Relevance score of a keyword-rule association.
pub const KEYWORD_SCORE: f32 = 0.8;

/// Relevance score of a category-rule association.
pub const CATEGORY_SCORE: f32 = 0.7;

/// Externally loadable association rule tables.
///
/// `keywords` maps a lowercase product-name keyword to an ordered list of
/// related keywords; `categories` maps an uppercase category label to an
/// ordered list of related categories. Lookups normalize case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRules {
    #[serde(default)]
    keywords: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
}

impl Default for AssociationRules {
    /// The built-in grocery/restaurant curation.
    fn default() -> Self {
        let keyword_table: &[(&str, &[&str])] = &[
            ("beer", &["chips", "pretzels", "salsa"]),
            ("bread", &["butter", "jam", "cheese"]),
            ("burger", &["fries", "cola", "ketchup"]),
            ("cereal", &["milk", "banana", "yogurt"]),
            ("chicken", &["rice", "salad", "tortilla"]),
            ("chips", &["salsa", "cola", "dip"]),
            ("coffee", &["creamer", "sugar", "donut"]),
            ("cookies", &["milk", "coffee"]),
            ("eggs", &["bacon", "bread", "butter"]),
            ("milk", &["cereal", "cookies", "bread"]),
            ("pasta", &["sauce", "parmesan", "garlic"]),
            ("pizza", &["cola", "beer", "wings"]),
            ("salsa", &["chips", "tortilla"]),
            ("tea", &["honey", "lemon", "biscuit"]),
            ("wine", &["cheese", "crackers", "chocolate"]),
            ("yogurt", &["granola", "berries", "honey"]),
        ];
        let category_table: &[(&str, &[&str])] = &[
            ("BAKERY", &["DAIRY", "BEVERAGES"]),
            ("BEVERAGES", &["SNACKS", "FROZEN"]),
            ("DAIRY", &["BAKERY", "GROCERY", "BEVERAGES"]),
            ("FROZEN", &["BEVERAGES", "SNACKS"]),
            ("GROCERY", &["DAIRY", "PRODUCE"]),
            ("MEAT", &["PRODUCE", "GROCERY"]),
            ("PRODUCE", &["DAIRY", "MEAT"]),
            ("SNACKS", &["BEVERAGES", "GROCERY"]),
        ];

        Self {
            keywords: keyword_table
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.iter().map(|s| (*s).to_string()).collect()))
                .collect(),
            categories: category_table
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.iter().map(|s| (*s).to_string()).collect()))
                .collect(),
        }
    }
}

impl AssociationRules {
    /// Parse rule tables from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut rules: Self = serde_json::from_str(json)?;
        rules.normalize();
        Ok(rules)
    }

    /// Load rule tables from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read, or a
    /// serialization error when its contents are malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn normalize(&mut self) {
        self.keywords = self
            .keywords
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.iter().map(|s| s.to_lowercase()).collect()))
            .collect();
        self.categories = self
            .categories
            .iter()
            .map(|(k, v)| (k.to_uppercase(), v.iter().map(|s| s.to_uppercase()).collect()))
            .collect();
    }

    /// Related keywords for a keyword, in table order. Empty when unknown.
    #[must_use]
    pub fn related_keywords(&self, keyword: &str) -> &[String] {
        self.keywords
            .get(&keyword.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Related categories for a category, in table order. Empty when unknown.
    #[must_use]
    pub fn related_categories(&self, category: &str) -> &[String] {
        self.categories
            .get(&category.to_uppercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Name tokens that are keyword-table keys, in name order, deduplicated.
    #[must_use]
    pub fn match_name_keywords(&self, name: &str, cap: usize) -> Vec<String> {
        let mut matched = Vec::new();
        for token in tokenize(name) {
            if matched.len() >= cap {
                break;
            }
            if self.keywords.contains_key(&token) && !matched.contains(&token) {
                matched.push(token);
            }
        }
        matched
    }

    /// Number of keyword rules.
    #[must_use]
    pub fn keyword_rule_count(&self) -> usize {
        self.keywords.len()
    }

    /// Number of category rules.
    #[must_use]
    pub fn category_rule_count(&self) -> usize {
        self.categories.len()
    }
}

/// One precomputed "related product" suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEntry {
    /// The suggested product.
    pub product_id: u32,
    /// Fixed relevance score of the contributing rule.
    pub score: f32,
    /// Human-readable justification.
    pub reason: String,
}

/// Static per-product association lookup, built once per fit.
#[derive(Debug, Clone, Default)]
pub struct AssociationModel {
    table: HashMap<u32, Vec<AssociationEntry>>,
}

impl AssociationModel {
    /// Build the association table for the top-popularity subset of the
    /// catalog.
    ///
    /// Targets the `MAX_TARGETS` most popular products, or the first
    /// `MAX_TARGETS` in catalog order when no popularity data exists (fixed
    /// sample, cost bound only). Per target, keyword rules contribute
    /// [`KEYWORD_SCORE`] candidates and the category table backfills at
    /// [`CATEGORY_SCORE`], capped at [`MAX_PER_PRODUCT`].
    #[must_use]
    pub fn build(
        catalog: &CatalogIndex,
        popularity: &HashMap<u32, f32>,
        rules: &AssociationRules,
    ) -> Self {
        let targets = select_targets(catalog, popularity);

        let mut table = HashMap::with_capacity(targets.len());
        for target in targets {
            let entries = associations_for_target(target, catalog, rules);
            if !entries.is_empty() {
                table.insert(target, entries);
            }
        }
        Self { table }
    }

    /// Precomputed associations of a product. Empty when not covered.
    #[must_use]
    pub fn associations_for(&self, product_id: u32) -> &[AssociationEntry] {
        self.table
            .get(&product_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of products with at least one association.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no product has associations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Top-popularity product ids, or the first `MAX_TARGETS` in catalog order
/// when popularity is empty.
fn select_targets(catalog: &CatalogIndex, popularity: &HashMap<u32, f32>) -> Vec<u32> {
    if popularity.is_empty() {
        return catalog
            .products()
            .iter()
            .take(MAX_TARGETS)
            .map(|p| p.product_id)
            .collect();
    }

    let mut ranked: Vec<(u32, f32)> = popularity.iter().map(|(&id, &s)| (id, s)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .expect("popularity scores are never NaN")
            .then(a.0.cmp(&b.0))
    });
    ranked.into_iter().take(MAX_TARGETS).map(|(id, _)| id).collect()
}

fn associations_for_target(
    target: u32,
    catalog: &CatalogIndex,
    rules: &AssociationRules,
) -> Vec<AssociationEntry> {
    let Some(product) = catalog.get(target) else {
        return Vec::new();
    };

    let mut entries: Vec<AssociationEntry> = Vec::new();
    let mut chosen: HashSet<u32> = HashSet::new();
    chosen.insert(target);

    // Keyword rules first: up to two name keywords, each expanded through
    // its top related keywords against the catalog search text.
    for keyword in rules.match_name_keywords(&product.name, KEYWORDS_PER_NAME) {
        for related in rules.related_keywords(&keyword).iter().take(RELATED_KEYWORDS_USED) {
            let mut hits = 0;
            for (candidate, text) in catalog.iter_search_text() {
                if entries.len() >= MAX_PER_PRODUCT || hits >= HITS_PER_KEYWORD {
                    break;
                }
                if chosen.contains(&candidate) || !text.contains(related.as_str()) {
                    continue;
                }
                chosen.insert(candidate);
                entries.push(AssociationEntry {
                    product_id: candidate,
                    score: KEYWORD_SCORE,
                    reason: format!("{keyword} pairs well with {related}"),
                });
                hits += 1;
            }
            if entries.len() >= MAX_PER_PRODUCT {
                return entries;
            }
        }
    }

    // Category fallback for the shortfall.
    for related in rules.related_categories(&product.category) {
        for &candidate in catalog.category_scan(related, CATEGORY_SCAN_CAP) {
            if entries.len() >= MAX_PER_PRODUCT {
                return entries;
            }
            if chosen.contains(&candidate) {
                continue;
            }
            chosen.insert(candidate);
            entries.push(AssociationEntry {
                product_id: candidate,
                score: CATEGORY_SCORE,
                reason: format!("often bought with {} items", related.to_lowercase()),
            });
        }
    }

    entries
}
