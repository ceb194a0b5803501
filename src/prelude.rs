//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use canasta::prelude::*;
//! ```

pub use crate::associations::{AssociationModel, AssociationRules};
pub use crate::catalog::{CatalogIndex, Product};
pub use crate::engine::{EngineConfig, RecommendationEngine};
pub use crate::error::{CanastaError, Result};
pub use crate::interactions::{InteractionSummary, Transaction};
pub use crate::rank::{Recommendation, SegmentStrategy, SegmentTable};
pub use crate::synthetic::DemoDataGenerator;
