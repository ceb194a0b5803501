//! Free-text query matching against the catalog.
//!
//! Matching is a case-folded substring scan over each product's precomputed
//! search text, in catalog order, capped to keep cost bounded on large
//! catalogs. A fixed catalog plus a fixed query always yields the same
//! candidates in the same order.
//!
//! # Examples
//!
//! ```
//! use canasta::catalog::{CatalogIndex, Product};
//! use canasta::query::{find_matches, similarity};
//!
//! let catalog = CatalogIndex::build(vec![
//!     Product::new(1, "2% MILK", "DAIRY"),
//!     Product::new(2, "WHEAT BREAD", "BAKERY"),
//! ]).expect("valid catalog");
//!
//! assert_eq!(find_matches("milk", &catalog, 10), vec![1]);
//! assert_eq!(similarity("milk", "2% milk dairy store brand"), 1.0);
//! ```

use crate::catalog::CatalogIndex;

/// Default cap on direct-match candidates.
pub const MAX_MATCHES: usize = 10;

/// Lowercase alphanumeric word split.
///
/// Splits on anything that is not alphanumeric, drops empty fragments.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Fraction of query tokens contained in `text` (case-folded).
///
/// Returns 1.0 whenever the whole query occurs as a substring, so every
/// direct match scores full similarity; partial token overlap scores
/// proportionally. Empty queries score 0.0.
#[must_use]
pub fn similarity(query: &str, text: &str) -> f32 {
    let folded = text.to_lowercase();
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return 0.0;
    }
    let contained = tokens.iter().filter(|t| folded.contains(t.as_str())).count();
    contained as f32 / tokens.len() as f32
}

/// Product ids whose search text contains the case-folded query.
///
/// Scans in catalog order and stops after `limit` hits. A blank query
/// matches nothing; callers route blank queries to the popularity fallback.
#[must_use]
pub fn find_matches(query: &str, catalog: &CatalogIndex, limit: usize) -> Vec<u32> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (product_id, text) in catalog.iter_search_text() {
        if text.contains(&needle) {
            matches.push(product_id);
            if matches.len() >= limit {
                break;
            }
        }
    }
    matches
}
