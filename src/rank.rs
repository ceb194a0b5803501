//! Recommendation records, segment strategies, and diversity-aware
//! candidate selection.
//!
//! The segment table is configuration: each named customer segment maps to a
//! focus tag, a price-preference tag, and a `diversity_factor` in `[0, 1]`
//! that controls how aggressively results are spread across categories and
//! brands. Unknown segments resolve to the default value strategy.
//!
//! # Examples
//!
//! ```
//! use canasta::rank::SegmentTable;
//!
//! let table = SegmentTable::default();
//! assert_eq!(table.strategy_for("new_customer").diversity_factor, 0.9);
//! // Unknown segments fall back to the general_value strategy.
//! assert_eq!(table.strategy_for("martian").diversity_factor, 0.5);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::Result;

/// Diversity factors below this select by score alone.
pub const DIVERSITY_THRESHOLD: f32 = 0.6;

/// Picks made by the category-diversity pass.
pub const CATEGORY_PASS_PICKS: usize = 3;

/// Upper bound of the brand-diversity pass.
pub const BRAND_PASS_CAP: usize = 8;

/// One recommended product, fully enriched from the catalog.
///
/// Transient output record: constructed fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended product.
    pub product_id: u32,
    /// Catalog display name.
    pub name: String,
    /// Catalog category.
    pub category: String,
    /// Catalog brand.
    pub brand: String,
    /// Catalog price.
    pub price: f32,
    /// Ranking score of the contributing stage.
    pub score: f32,
    /// Human-readable justification.
    pub reason: String,
    /// Similarity of this product's text to the query.
    pub similarity_to_query: f32,
}

impl Recommendation {
    /// Build a record from a catalog product plus ranking fields.
    #[must_use]
    pub fn from_product(product: &Product, score: f32, reason: &str, similarity: f32) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: product.price,
            score,
            reason: reason.to_string(),
            similarity_to_query: similarity,
        }
    }
}

/// Ranking strategy of one customer segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStrategy {
    /// Merchandising focus tag (e.g. "value_focused").
    pub focus: String,
    /// Price preference tag (e.g. "budget").
    pub price_preference: String,
    /// How aggressively to spread categories/brands, in `[0, 1]`.
    pub diversity_factor: f32,
}

fn general_value_strategy() -> SegmentStrategy {
    SegmentStrategy {
        focus: "value_focused".to_string(),
        price_preference: "budget".to_string(),
        diversity_factor: 0.5,
    }
}

/// Segment-name → strategy mapping with a default for unknown segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTable {
    #[serde(default)]
    strategies: BTreeMap<String, SegmentStrategy>,
    #[serde(default = "general_value_strategy")]
    default: SegmentStrategy,
}

impl Default for SegmentTable {
    /// The seven curated retail segments.
    fn default() -> Self {
        let entries: &[(&str, &str, &str, f32)] = &[
            ("premium_loyal", "personalized_premium", "premium", 0.8),
            ("premium_focused", "quality_focused", "premium", 0.4),
            ("excellent_loyal", "loyalty_balanced", "mid_range", 0.6),
            ("excellent_general", "balanced_general", "mid_range", 0.7),
            ("general_value", "value_focused", "budget", 0.5),
            ("at_risk", "retention_focused", "budget", 0.3),
            ("new_customer", "exploration_focused", "any", 0.9),
        ];
        Self {
            strategies: entries
                .iter()
                .map(|(name, focus, price, diversity)| {
                    (
                        (*name).to_string(),
                        SegmentStrategy {
                            focus: (*focus).to_string(),
                            price_preference: (*price).to_string(),
                            diversity_factor: *diversity,
                        },
                    )
                })
                .collect(),
            default: general_value_strategy(),
        }
    }
}

impl SegmentTable {
    /// Parse a segment table from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a segment table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read, or a
    /// serialization error when its contents are malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Strategy of a segment; unknown names resolve to the default.
    #[must_use]
    pub fn strategy_for(&self, segment: &str) -> &SegmentStrategy {
        self.strategies
            .get(segment)
            .or_else(|| self.strategies.get("general_value"))
            .unwrap_or(&self.default)
    }

    /// Known segment names, sorted.
    #[must_use]
    pub fn segment_names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }
}

/// Drop later records that repeat an earlier product id.
#[must_use]
pub fn dedup_by_id(candidates: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen: HashSet<u32> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|rec| seen.insert(rec.product_id))
        .collect()
}

/// Order candidates by score descending, product id ascending on ties.
pub fn sort_by_score(candidates: &mut [Recommendation]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .expect("ranking scores are never NaN")
            .then(a.product_id.cmp(&b.product_id))
    });
}

/// Select at most `n` candidates under the segment's diversity policy.
///
/// Low-diversity segments (`diversity_factor < DIVERSITY_THRESHOLD`) take the
/// top `n` by score. Diverse segments run three passes over the score-ordered
/// pool: a category sweep (one pick per unseen category, then fill to
/// [`CATEGORY_PASS_PICKS`]), a brand sweep up to [`BRAND_PASS_CAP`], and a
/// score-only fill to `n`.
#[must_use]
pub fn diversify(
    candidates: Vec<Recommendation>,
    strategy: &SegmentStrategy,
    n: usize,
) -> Vec<Recommendation> {
    let mut pool = dedup_by_id(candidates);
    sort_by_score(&mut pool);

    if strategy.diversity_factor < DIVERSITY_THRESHOLD || pool.len() <= 1 {
        pool.truncate(n);
        return pool;
    }

    let mut selected: Vec<Recommendation> = Vec::with_capacity(n.min(pool.len()));
    let mut taken: HashSet<u32> = HashSet::new();
    let mut seen_categories: HashSet<String> = HashSet::new();

    // Pass (a): one candidate per unseen category, best score first.
    for rec in &pool {
        if selected.len() >= n {
            break;
        }
        let category = rec.category.to_uppercase();
        if !seen_categories.contains(&category) {
            seen_categories.insert(category);
            taken.insert(rec.product_id);
            selected.push(rec.clone());
        }
    }
    // Then fill the category pass to its pick budget by score.
    for rec in &pool {
        if selected.len() >= CATEGORY_PASS_PICKS.min(n) {
            break;
        }
        if taken.insert(rec.product_id) {
            selected.push(rec.clone());
        }
    }

    // Pass (b): unseen brands only, up to the brand cap.
    let mut seen_brands: HashSet<String> = selected
        .iter()
        .map(|r| r.brand.to_lowercase())
        .collect();
    for rec in &pool {
        if selected.len() >= BRAND_PASS_CAP.min(n) {
            break;
        }
        let brand = rec.brand.to_lowercase();
        if taken.contains(&rec.product_id) || seen_brands.contains(&brand) {
            continue;
        }
        seen_brands.insert(brand);
        taken.insert(rec.product_id);
        selected.push(rec.clone());
    }

    // Pass (c): score-only fill to n.
    for rec in &pool {
        if selected.len() >= n {
            break;
        }
        if taken.insert(rec.product_id) {
            selected.push(rec.clone());
        }
    }

    selected
}
