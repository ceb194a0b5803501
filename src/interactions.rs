//! Interaction aggregation: popularity signals and market-basket mining.
//!
//! Builds every transaction-derived signal the engine uses: normalized
//! product and category popularity, co-purchase pair counts within baskets,
//! and ranked product/customer lists. All aggregates are rebuilt wholly on
//! each `fit`; nothing here is updated incrementally.
//!
//! # Examples
//!
//! ```
//! use canasta::catalog::{CatalogIndex, Product};
//! use canasta::interactions::{InteractionSummary, Transaction};
//!
//! let catalog = CatalogIndex::build(vec![
//!     Product::new(1, "2% MILK", "DAIRY"),
//!     Product::new(2, "WHEAT BREAD", "BAKERY"),
//! ]).expect("valid catalog");
//!
//! let transactions = vec![
//!     Transaction::new(100, 1, 1),
//!     Transaction::new(100, 2, 1),
//!     Transaction::new(101, 1, 2),
//! ];
//! let summary = InteractionSummary::build(&transactions, &catalog).expect("valid log");
//!
//! assert_eq!(summary.popularity_of(1), 1.0);
//! assert_eq!(summary.pair_count(2, 1), 1);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::error::{CanastaError, Result};

/// Pair mining considers at most this many baskets per fit.
///
/// Sampling tradeoff: on very large logs mining is bounded to the first
/// `MAX_BASKETS_MINED` baskets (basket-id order) to keep fit latency
/// predictable.
pub const MAX_BASKETS_MINED: usize = 2_000;

/// Smallest basket that contributes co-purchase pairs (inclusive).
pub const MIN_BASKET_ITEMS: usize = 2;

/// Largest basket that contributes co-purchase pairs (exclusive).
///
/// Mega-baskets produce quadratic, mostly-noise pairings and are skipped.
pub const MAX_BASKET_ITEMS: usize = 9;

/// A single purchase row. Read-only input; never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Purchasing customer.
    pub customer_id: u32,
    /// Purchased product.
    pub product_id: u32,
    /// Groups rows purchased together.
    pub basket_id: u64,
    /// Monetary amount of the row.
    #[serde(default)]
    pub amount: f32,
    /// Units purchased.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Day offset of the purchase.
    #[serde(default)]
    pub day: u32,
}

fn default_quantity() -> u32 {
    1
}

impl Transaction {
    /// Create a transaction row with the identifying fields.
    #[must_use]
    pub fn new(customer_id: u32, product_id: u32, basket_id: u64) -> Self {
        Self {
            customer_id,
            product_id,
            basket_id,
            amount: 0.0,
            quantity: 1,
            day: 0,
        }
    }

    /// Set the monetary amount.
    #[must_use]
    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = amount;
        self
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the day offset.
    #[must_use]
    pub fn with_day(mut self, day: u32) -> Self {
        self.day = day;
        self
    }
}

/// Canonically ordered unordered pair of product ids.
///
/// `PairKey::new(2, 1)` and `PairKey::new(1, 2)` are the same key, so a
/// co-purchase is never counted in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    a: u32,
    b: u32,
}

impl PairKey {
    /// Create a canonical pair (smaller id first).
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Smaller id of the pair.
    #[must_use]
    pub fn first(&self) -> u32 {
        self.a
    }

    /// Larger id of the pair.
    #[must_use]
    pub fn second(&self) -> u32 {
        self.b
    }

    /// The other id of the pair, if `product_id` is a member.
    #[must_use]
    pub fn partner_of(&self, product_id: u32) -> Option<u32> {
        if product_id == self.a {
            Some(self.b)
        } else if product_id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Transaction-derived aggregates: popularity, pairs, and rankings.
#[derive(Debug, Clone, Default)]
pub struct InteractionSummary {
    popularity: HashMap<u32, f32>,
    category_popularity: HashMap<String, f32>,
    product_counts: HashMap<u32, u32>,
    frequent_pairs: HashMap<PairKey, u32>,
    ranked_products: Vec<u32>,
    ranked_customers: Vec<u32>,
    baskets_considered: usize,
    min_support: u32,
    skipped_rows: usize,
}

impl InteractionSummary {
    /// Aggregate a transaction log against a catalog.
    ///
    /// Rows referencing products absent from the catalog are skipped and
    /// counted in [`InteractionSummary::skipped_rows`]. An empty log yields
    /// empty aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::InvalidTransactions`] when a non-empty log
    /// contains no row referencing any cataloged product.
    pub fn build(transactions: &[Transaction], catalog: &CatalogIndex) -> Result<Self> {
        let mut valid: Vec<&Transaction> = Vec::with_capacity(transactions.len());
        let mut skipped_rows = 0;
        for row in transactions {
            if catalog.get(row.product_id).is_some() {
                valid.push(row);
            } else {
                skipped_rows += 1;
            }
        }

        if valid.is_empty() {
            if transactions.is_empty() {
                return Ok(Self::default());
            }
            return Err(CanastaError::invalid_transactions(format!(
                "none of the {} rows reference a cataloged product",
                transactions.len()
            )));
        }

        let mut product_counts: HashMap<u32, u32> = HashMap::new();
        let mut customer_counts: HashMap<u32, u32> = HashMap::new();
        for row in &valid {
            *product_counts.entry(row.product_id).or_insert(0) += 1;
            *customer_counts.entry(row.customer_id).or_insert(0) += 1;
        }

        let max_count = product_counts.values().copied().max().unwrap_or(1);
        let popularity: HashMap<u32, f32> = product_counts
            .iter()
            .map(|(&id, &count)| (id, count as f32 / max_count as f32))
            .collect();

        let mut category_counts: HashMap<String, u32> = HashMap::new();
        for (&id, &count) in &product_counts {
            if let Some(category) = catalog.category_of(id) {
                *category_counts.entry(category.to_uppercase()).or_insert(0) += count;
            }
        }
        let max_category = category_counts.values().copied().max().unwrap_or(1);
        let category_popularity: HashMap<String, f32> = category_counts
            .iter()
            .map(|(name, &count)| (name.clone(), count as f32 / max_category as f32))
            .collect();

        let ranked_products = rank_by_count(&product_counts);
        let ranked_customers = rank_by_count(&customer_counts);

        let (frequent_pairs, baskets_considered, min_support) = mine_pairs(&valid);

        Ok(Self {
            popularity,
            category_popularity,
            product_counts,
            frequent_pairs,
            ranked_products,
            ranked_customers,
            baskets_considered,
            min_support,
            skipped_rows,
        })
    }

    /// Normalized popularity of a product; 0.0 when never purchased.
    #[must_use]
    pub fn popularity_of(&self, product_id: u32) -> f32 {
        self.popularity.get(&product_id).copied().unwrap_or(0.0)
    }

    /// All normalized product popularity scores.
    #[must_use]
    pub fn popularity(&self) -> &HashMap<u32, f32> {
        &self.popularity
    }

    /// Normalized popularity of a category, case-insensitive.
    #[must_use]
    pub fn category_popularity_of(&self, category: &str) -> f32 {
        self.category_popularity
            .get(&category.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// Raw purchase count of a product.
    #[must_use]
    pub fn count_of(&self, product_id: u32) -> u32 {
        self.product_counts.get(&product_id).copied().unwrap_or(0)
    }

    /// Retained co-purchase pairs and their counts.
    #[must_use]
    pub fn frequent_pairs(&self) -> &HashMap<PairKey, u32> {
        &self.frequent_pairs
    }

    /// Co-purchase count for a pair of products (order-insensitive).
    #[must_use]
    pub fn pair_count(&self, x: u32, y: u32) -> u32 {
        self.frequent_pairs
            .get(&PairKey::new(x, y))
            .copied()
            .unwrap_or(0)
    }

    /// Partners co-purchased with a product, ordered by count desc then id.
    #[must_use]
    pub fn partners_of(&self, product_id: u32) -> Vec<(u32, u32)> {
        let mut partners: Vec<(u32, u32)> = self
            .frequent_pairs
            .iter()
            .filter_map(|(key, &count)| key.partner_of(product_id).map(|p| (p, count)))
            .collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        partners
    }

    /// The `n` most purchased products (count desc, id asc).
    #[must_use]
    pub fn top_products(&self, n: usize) -> &[u32] {
        &self.ranked_products[..self.ranked_products.len().min(n)]
    }

    /// The `n` most active customers (row count desc, id asc).
    #[must_use]
    pub fn top_customers(&self, n: usize) -> &[u32] {
        &self.ranked_customers[..self.ranked_customers.len().min(n)]
    }

    /// Baskets that entered pair mining.
    #[must_use]
    pub fn baskets_considered(&self) -> usize {
        self.baskets_considered
    }

    /// Minimum co-purchase count a pair needed to be retained.
    #[must_use]
    pub fn min_support(&self) -> u32 {
        self.min_support
    }

    /// Rows dropped for referencing unknown products.
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Whether any transaction survived aggregation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_counts.is_empty()
    }
}

fn rank_by_count(counts: &HashMap<u32, u32>) -> Vec<u32> {
    let mut ranked: Vec<(u32, u32)> = counts.iter().map(|(&id, &c)| (id, c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(id, _)| id).collect()
}

/// Group rows into baskets and count unordered co-purchase pairs.
///
/// Returns the retained pairs, the number of baskets considered, and the
/// support threshold that was applied: `max(1, considered / 100)`.
fn mine_pairs(rows: &[&Transaction]) -> (HashMap<PairKey, u32>, usize, u32) {
    // BTreeMap keeps basket order stable so the sampling cap is deterministic.
    let mut baskets: BTreeMap<u64, Vec<u32>> = BTreeMap::new();
    for row in rows {
        baskets.entry(row.basket_id).or_default().push(row.product_id);
    }

    let considered = baskets.len().min(MAX_BASKETS_MINED);
    let mut pair_counts: HashMap<PairKey, u32> = HashMap::new();

    for items in baskets.values_mut().take(MAX_BASKETS_MINED) {
        items.sort_unstable();
        items.dedup();
        if items.len() < MIN_BASKET_ITEMS || items.len() >= MAX_BASKET_ITEMS {
            continue;
        }
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                *pair_counts.entry(PairKey::new(items[i], items[j])).or_insert(0) += 1;
            }
        }
    }

    let min_support = ((considered / 100) as u32).max(1);
    pair_counts.retain(|_, count| *count >= min_support);

    (pair_counts, considered, min_support)
}
