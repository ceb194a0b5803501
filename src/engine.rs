//! Recommendation engine façade.
//!
//! One long-lived object orchestrates the whole pipeline behind a two-method
//! contract: `fit` builds the catalog index, interaction aggregates, and
//! association table in dependency order; `get_recommendations` runs query
//! matching, candidate pooling, diversity-aware ranking, and popularity
//! backfill over the immutable post-fit state.
//!
//! The engine is constructed explicitly and passed to callers; there is no
//! module-level singleton. `fit` takes `&mut self` while queries take
//! `&self`, so the borrow checker serializes refits against reads.
//!
//! # Examples
//!
//! ```
//! use canasta::engine::RecommendationEngine;
//! use canasta::catalog::Product;
//! use canasta::interactions::Transaction;
//!
//! let products = vec![
//!     Product::new(1, "2% MILK", "DAIRY").with_price(3.0),
//!     Product::new(2, "CORN CEREAL", "GROCERY"),
//! ];
//! let transactions = vec![Transaction::new(100, 1, 1)];
//!
//! let mut engine = RecommendationEngine::new();
//! engine.fit(&transactions, products).expect("valid inputs");
//!
//! let recs = engine
//!     .get_recommendations(100, "milk", 5, "general_value")
//!     .expect("fitted engine");
//! assert_eq!(recs[0].product_id, 1);
//! assert_eq!(recs[0].reason, "query match");
//! ```

use std::collections::HashSet;

use crate::associations::{
    AssociationModel, AssociationRules, KEYWORDS_PER_NAME, KEYWORD_SCORE, RELATED_KEYWORDS_USED,
};
use crate::catalog::{CatalogIndex, Product};
use crate::error::{CanastaError, Result};
use crate::interactions::{InteractionSummary, Transaction};
use crate::query::{find_matches, similarity, MAX_MATCHES};
use crate::rank::{diversify, Recommendation, SegmentTable};

/// Direct text matches carry this score.
pub const DIRECT_MATCH_SCORE: f32 = 1.0;

/// Direct matches expanded through the association table.
pub const ASSOCIATION_SOURCES: usize = 3;

/// Co-purchase partners pulled for the best direct match.
pub const COPURCHASE_PARTNERS: usize = 3;

/// Query-keyword candidates collected per related keyword.
pub const QUERY_KEYWORD_HITS: usize = 2;

/// Similarity reported for popularity-backfill records.
pub const FALLBACK_SIMILARITY: f32 = 0.5;

/// Recognized engine options.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Records returned when the caller does not pass an explicit count.
    pub n_recommendations: usize,
    /// Segment assumed when the caller does not pass one.
    pub customer_segment: String,
    /// Direct matches below this query similarity are dropped.
    pub min_similarity: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_recommendations: 6,
            customer_segment: "general_value".to_string(),
            min_similarity: 0.1,
        }
    }
}

impl EngineConfig {
    /// Set the default recommendation count.
    #[must_use]
    pub fn with_n_recommendations(mut self, n: usize) -> Self {
        self.n_recommendations = n;
        self
    }

    /// Set the default customer segment.
    #[must_use]
    pub fn with_customer_segment(mut self, segment: &str) -> Self {
        self.customer_segment = segment.to_string();
        self
    }

    /// Set the minimum direct-match similarity.
    #[must_use]
    pub fn with_min_similarity(mut self, threshold: f32) -> Self {
        self.min_similarity = threshold;
        self
    }

    /// Check option constraints.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::InvalidHyperparameter`] for out-of-range
    /// values.
    pub fn validate(&self) -> Result<()> {
        if self.n_recommendations == 0 {
            return Err(CanastaError::InvalidHyperparameter {
                param: "n_recommendations".to_string(),
                value: "0".to_string(),
                constraint: ">0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(CanastaError::InvalidHyperparameter {
                param: "min_similarity".to_string(),
                value: format!("{}", self.min_similarity),
                constraint: "within [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything derived by `fit`, replaced wholesale on each call.
#[derive(Debug, Clone)]
struct FittedState {
    catalog: CatalogIndex,
    summary: InteractionSummary,
    associations: AssociationModel,
}

/// Customer-facing recommendation engine.
///
/// State machine: Unfitted → Fitted, one-way via [`RecommendationEngine::fit`].
/// Every query method fails with [`CanastaError::NotFitted`] in the Unfitted
/// state.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
    rules: AssociationRules,
    segments: SegmentTable,
    state: Option<FittedState>,
}

impl RecommendationEngine {
    /// Create an unfitted engine with default config and rule tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the engine config.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the association rule tables.
    #[must_use]
    pub fn with_rules(mut self, rules: AssociationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the segment strategy table.
    #[must_use]
    pub fn with_segments(mut self, segments: SegmentTable) -> Self {
        self.segments = segments;
        self
    }

    /// Build all derived state from the two input tables.
    ///
    /// Runs catalog indexing, interaction aggregation, and association
    /// building in dependency order. A second call replaces prior state
    /// wholesale; there is no incremental update path.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::InvalidHyperparameter`] for bad config,
    /// [`CanastaError::InvalidCatalog`] for an unusable product table, and
    /// [`CanastaError::InvalidTransactions`] for an unusable transaction
    /// log. On error the engine is left unfitted.
    pub fn fit(&mut self, transactions: &[Transaction], products: Vec<Product>) -> Result<()> {
        self.config.validate()?;
        self.state = None;

        let catalog = CatalogIndex::build(products)?;
        let summary = InteractionSummary::build(transactions, &catalog)?;
        let associations = AssociationModel::build(&catalog, summary.popularity(), &self.rules);

        self.state = Some(FittedState {
            catalog,
            summary,
            associations,
        });
        Ok(())
    }

    /// Whether `fit` has completed.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Rows dropped during the last `fit` (duplicate catalog ids plus
    /// transactions referencing unknown products). Zero before `fit`.
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |s| s.catalog.skipped_rows() + s.summary.skipped_rows())
    }

    /// The fitted catalog index, for read-only collaborators.
    #[must_use]
    pub fn catalog(&self) -> Option<&CatalogIndex> {
        self.state.as_ref().map(|s| &s.catalog)
    }

    /// The fitted interaction aggregates, for read-only collaborators.
    #[must_use]
    pub fn interactions(&self) -> Option<&InteractionSummary> {
        self.state.as_ref().map(|s| &s.summary)
    }

    /// Ranked, deduplicated recommendations for a free-text query.
    ///
    /// A blank query returns the popularity fallback. A query matching
    /// nothing is not an error: the result degrades to the popularity
    /// fallback, empty only when the catalog itself is empty. The result
    /// never exceeds `n` records and never repeats a product id.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::NotFitted`] before `fit`.
    pub fn get_recommendations(
        &self,
        _customer_id: u32,
        query: &str,
        n: usize,
        segment: &str,
    ) -> Result<Vec<Recommendation>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| CanastaError::not_fitted("get_recommendations"))?;

        if query.trim().is_empty() {
            return Ok(self.popularity_fallback(state, n, &HashSet::new()));
        }

        let matches = find_matches(query, &state.catalog, MAX_MATCHES);
        let mut pool: Vec<Recommendation> = Vec::new();
        let mut pooled: HashSet<u32> = HashSet::new();

        // Stage 1: direct text matches.
        for &id in &matches {
            let Some(product) = state.catalog.get(id) else {
                continue;
            };
            let text = state.catalog.search_text(id).unwrap_or("");
            let sim = similarity(query, text);
            if sim < self.config.min_similarity {
                continue;
            }
            if pooled.insert(id) {
                pool.push(Recommendation::from_product(
                    product,
                    DIRECT_MATCH_SCORE,
                    "query match",
                    sim,
                ));
            }
        }

        // Stage 2: precomputed associations of the top direct matches.
        for &source in matches.iter().take(ASSOCIATION_SOURCES) {
            for entry in state.associations.associations_for(source) {
                let Some(product) = state.catalog.get(entry.product_id) else {
                    continue;
                };
                if pooled.insert(entry.product_id) {
                    let text = state.catalog.search_text(entry.product_id).unwrap_or("");
                    pool.push(Recommendation::from_product(
                        product,
                        entry.score,
                        &entry.reason,
                        similarity(query, text),
                    ));
                }
            }
        }

        // Stage 3: keyword rules applied to the query itself, for queries
        // that name a keyword without matching any product text.
        self.pool_query_keywords(state, query, &mut pool, &mut pooled);

        // Stage 4: co-purchase partners of the best direct match.
        if let Some(&best) = matches.first() {
            let source_count = state.summary.count_of(best).max(1);
            for (partner, count) in state
                .summary
                .partners_of(best)
                .into_iter()
                .take(COPURCHASE_PARTNERS)
            {
                let Some(product) = state.catalog.get(partner) else {
                    continue;
                };
                if pooled.insert(partner) {
                    let text = state.catalog.search_text(partner).unwrap_or("");
                    pool.push(Recommendation::from_product(
                        product,
                        count as f32 / source_count as f32,
                        "often bought together",
                        similarity(query, text),
                    ));
                }
            }
        }

        let strategy = self.segments.strategy_for(segment);
        let mut picked = diversify(pool, strategy, n);

        // Stage 5: popularity backfill until n is reached.
        if picked.len() < n {
            let exclude: HashSet<u32> = picked.iter().map(|r| r.product_id).collect();
            let shortfall = n - picked.len();
            picked.extend(self.popularity_fallback(state, shortfall, &exclude));
        }

        Ok(picked)
    }

    /// Recommendations using the configured defaults for count and segment.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::NotFitted`] before `fit`.
    pub fn recommend(&self, customer_id: u32, query: &str) -> Result<Vec<Recommendation>> {
        self.get_recommendations(
            customer_id,
            query,
            self.config.n_recommendations,
            &self.config.customer_segment,
        )
    }

    /// Raw substring matches without ranking or diversity.
    ///
    /// # Errors
    ///
    /// Returns [`CanastaError::NotFitted`] before `fit`.
    pub fn search_products(&self, query: &str, limit: usize) -> Result<Vec<&Product>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| CanastaError::not_fitted("search_products"))?;
        Ok(find_matches(query, &state.catalog, limit)
            .into_iter()
            .filter_map(|id| state.catalog.get(id))
            .collect())
    }

    fn pool_query_keywords(
        &self,
        state: &FittedState,
        query: &str,
        pool: &mut Vec<Recommendation>,
        pooled: &mut HashSet<u32>,
    ) {
        for keyword in self.rules.match_name_keywords(query, KEYWORDS_PER_NAME) {
            for related in self
                .rules
                .related_keywords(&keyword)
                .iter()
                .take(RELATED_KEYWORDS_USED)
            {
                let mut hits = 0;
                for (candidate, text) in state.catalog.iter_search_text() {
                    if hits >= QUERY_KEYWORD_HITS {
                        break;
                    }
                    if pooled.contains(&candidate) || !text.contains(related.as_str()) {
                        continue;
                    }
                    let Some(product) = state.catalog.get(candidate) else {
                        continue;
                    };
                    pooled.insert(candidate);
                    pool.push(Recommendation::from_product(
                        product,
                        KEYWORD_SCORE,
                        &format!("{keyword} pairs well with {related}"),
                        similarity(query, text),
                    ));
                    hits += 1;
                }
            }
        }
    }

    /// Top products by popularity, enriched from the catalog; degrades to
    /// catalog order when no transactions exist.
    fn popularity_fallback(
        &self,
        state: &FittedState,
        n: usize,
        exclude: &HashSet<u32>,
    ) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = Vec::with_capacity(n);
        let mut taken: HashSet<u32> = exclude.clone();

        let ranked = state.summary.top_products(state.catalog.len());
        let catalog_order = state.catalog.products().iter().map(|p| p.product_id);
        for id in ranked.iter().copied().chain(catalog_order) {
            if recs.len() >= n {
                break;
            }
            if !taken.insert(id) {
                continue;
            }
            let Some(product) = state.catalog.get(id) else {
                continue;
            };
            recs.push(Recommendation::from_product(
                product,
                state.summary.popularity_of(id),
                "popular product",
                FALLBACK_SIMILARITY,
            ));
        }
        recs
    }
}
