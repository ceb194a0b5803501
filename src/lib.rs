//! Canasta: market-basket product recommendation engine in pure Rust.
//!
//! Canasta turns a product catalog and a transaction log into ranked,
//! deduplicated product recommendations: substring query matching, curated
//! keyword/category association rules, co-purchase pair mining, and a
//! segment-driven diversity policy, all behind a two-method fit/query
//! contract.
//!
//! # Quick Start
//!
//! ```
//! use canasta::prelude::*;
//!
//! let products = vec![
//!     Product::new(1, "2% MILK", "DAIRY").with_price(3.0),
//!     Product::new(2, "CORN CEREAL", "GROCERY"),
//!     Product::new(3, "WHEAT BREAD", "BAKERY"),
//! ];
//! let transactions = vec![
//!     Transaction::new(100, 1, 1),
//!     Transaction::new(100, 2, 1),
//! ];
//!
//! let mut engine = RecommendationEngine::new();
//! engine.fit(&transactions, products).unwrap();
//!
//! let recs = engine.get_recommendations(100, "milk", 3, "general_value").unwrap();
//! assert_eq!(recs[0].product_id, 1);
//! assert!(recs.len() <= 3);
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Product records and the catalog lookup index
//! - [`interactions`]: Popularity aggregation and market-basket pair mining
//! - [`associations`]: Keyword/category rule tables and the derived association model
//! - [`query`]: Free-text substring matching and query similarity
//! - [`rank`]: Recommendation records, segment strategies, diversity selection
//! - [`engine`]: The fit/query façade orchestrating the pipeline
//! - [`synthetic`]: Seeded demo-data generation for examples and tests
//!
//! # Lifecycle
//!
//! An engine starts Unfitted; [`engine::RecommendationEngine::fit`] moves it
//! to Fitted (one-way). Every query method fails with
//! [`error::CanastaError::NotFitted`] until then. Refitting replaces all
//! derived state wholesale. Queries take `&self` and may run concurrently;
//! `fit` takes `&mut self`, so refits are serialized against reads by the
//! borrow checker.

pub mod associations;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod interactions;
pub mod prelude;
pub mod query;
pub mod rank;
pub mod synthetic;

pub use error::{CanastaError, Result};
