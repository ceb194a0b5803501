//! Seeded demo-data generation for examples and end-to-end tests.
//!
//! Produces a small grocery catalog and a basket-grouped transaction log so
//! a dashboard (or a test) can exercise the full fit/query cycle without any
//! real data. Generation is deterministic for a fixed seed. The engine
//! itself never depends on this module.
//!
//! # Examples
//!
//! ```
//! use canasta::synthetic::DemoDataGenerator;
//!
//! let generator = DemoDataGenerator::new().with_seed(42);
//! let products = generator.generate_products(50);
//! let transactions = generator.generate_transactions(&products, 20, 200);
//!
//! assert_eq!(products.len(), 50);
//! assert!(!transactions.is_empty());
//! ```

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::Product;
use crate::interactions::Transaction;

/// Category labels the generator draws from.
pub const CATEGORIES: &[&str] = &[
    "GROCERY",
    "MEAT",
    "PRODUCE",
    "DAIRY",
    "BEVERAGES",
    "SNACKS",
    "FROZEN",
    "BAKERY",
];

/// Segment names weighted roughly like a real customer base.
pub const SEGMENTS: &[(&str, f64)] = &[
    ("premium_loyal", 0.05),
    ("premium_focused", 0.10),
    ("excellent_loyal", 0.15),
    ("excellent_general", 0.20),
    ("general_value", 0.25),
    ("at_risk", 0.15),
    ("new_customer", 0.10),
];

const NAME_TEMPLATES: &[(&str, &[&str])] = &[
    (
        "GROCERY",
        &[
            "CORN CEREAL",
            "PENNE PASTA",
            "MARINARA SAUCE",
            "LONG GRAIN RICE",
            "PEANUT BUTTER",
            "STRAWBERRY JAM",
        ],
    ),
    (
        "MEAT",
        &["CHICKEN BREAST", "GROUND BEEF", "PORK CHOPS", "BACON STRIPS"],
    ),
    (
        "PRODUCE",
        &["BANANAS", "FUJI APPLES", "ROMA TOMATOES", "BABY SPINACH", "AVOCADOS"],
    ),
    (
        "DAIRY",
        &[
            "2% MILK",
            "WHOLE MILK",
            "GREEK YOGURT",
            "CHEDDAR CHEESE",
            "SALTED BUTTER",
            "VANILLA ICE CREAM",
        ],
    ),
    (
        "BEVERAGES",
        &[
            "COLA 12PK",
            "ORANGE JUICE",
            "COLD BREW COFFEE",
            "GREEN TEA",
            "SPARKLING WATER",
        ],
    ),
    (
        "SNACKS",
        &[
            "POTATO CHIPS",
            "OAT COOKIES",
            "TORTILLA CHIPS",
            "SALSA DIP",
            "PRETZELS",
            "GRANOLA BARS",
        ],
    ),
    (
        "FROZEN",
        &["PEPPERONI PIZZA", "FROZEN BERRIES", "VEGGIE MIX", "CHICKEN WINGS"],
    ),
    (
        "BAKERY",
        &["WHEAT BREAD", "SOURDOUGH LOAF", "BLUEBERRY MUFFIN", "BAGELS 6CT", "GLAZED DONUT"],
    ),
];

const BRANDS: &[&str] = &["Hillside", "Sunny Farms", "Fizz Co", "Casa Bella", "Store Brand"];

const QUALIFIERS: &[&str] = &["", "PREMIUM ", "ORGANIC ", "VALUE ", "FAMILY SIZE "];

/// Deterministic grocery demo-data generator.
#[derive(Debug, Clone)]
pub struct DemoDataGenerator {
    seed: u64,
}

impl Default for DemoDataGenerator {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl DemoDataGenerator {
    /// Create a generator with the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate `n` catalog rows with per-category price ranges.
    #[must_use]
    pub fn generate_products(&self, n: usize) -> Vec<Product> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut products = Vec::with_capacity(n);

        for i in 1..=n {
            let (category, names) = *NAME_TEMPLATES
                .choose(&mut rng)
                .expect("name templates are non-empty");
            let base = *names.choose(&mut rng).expect("template names are non-empty");
            let qualifier = *QUALIFIERS.choose(&mut rng).expect("qualifiers are non-empty");
            let brand = *BRANDS.choose(&mut rng).expect("brand pool is non-empty");

            let (lo, hi) = price_range(category);
            let price = (rng.gen_range(lo..hi) * 100.0).round() / 100.0;

            products.push(
                Product::new(i as u32, &format!("{qualifier}{base}"), category)
                    .with_brand(brand)
                    .with_price(price),
            );
        }
        products
    }

    /// Generate a basket-grouped transaction log over `products`.
    ///
    /// Each basket belongs to one of `n_customers` customers and holds one
    /// to five distinct products; amounts vary around catalog price.
    #[must_use]
    pub fn generate_transactions(
        &self,
        products: &[Product],
        n_customers: u32,
        n_baskets: u64,
    ) -> Vec<Transaction> {
        if products.is_empty() || n_customers == 0 {
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let mut transactions = Vec::new();

        for basket_id in 1..=n_baskets {
            let customer_id = rng.gen_range(1..=n_customers);
            let day = rng.gen_range(0..365);
            let basket_size = *[1usize, 2, 2, 3, 3, 4, 5]
                .choose(&mut rng)
                .expect("basket size pool is non-empty");

            let mut picks: Vec<&Product> = products
                .choose_multiple(&mut rng, basket_size.min(products.len()))
                .collect();
            picks.sort_by_key(|p| p.product_id);

            for product in picks {
                let quantity = *[1u32, 1, 1, 2, 2, 3]
                    .choose(&mut rng)
                    .expect("quantity pool is non-empty");
                let amount = product.price * quantity as f32 * rng.gen_range(0.8..1.2);
                transactions.push(
                    Transaction::new(customer_id, product.product_id, basket_id)
                        .with_amount((amount * 100.0).round() / 100.0)
                        .with_quantity(quantity)
                        .with_day(day),
                );
            }
        }
        transactions
    }

    /// Assign a weighted segment name to each of `n` customer ids.
    #[must_use]
    pub fn generate_customer_segments(&self, n: u32) -> Vec<(u32, String)> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(2));
        (1..=n)
            .map(|customer_id| {
                let roll: f64 = rng.gen_range(0.0..1.0);
                let mut cumulative = 0.0;
                for (segment, weight) in SEGMENTS {
                    cumulative += weight;
                    if roll < cumulative {
                        return (customer_id, (*segment).to_string());
                    }
                }
                (customer_id, "general_value".to_string())
            })
            .collect()
    }
}

fn price_range(category: &str) -> (f32, f32) {
    match category {
        "MEAT" => (4.0, 15.0),
        "PRODUCE" => (1.0, 6.0),
        "DAIRY" => (2.0, 8.0),
        "FROZEN" => (3.0, 12.0),
        "GROCERY" => (2.0, 8.0),
        _ => (1.5, 10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogIndex;

    #[test]
    fn test_products_are_valid_catalog_input() {
        let products = DemoDataGenerator::new().generate_products(40);
        assert_eq!(products.len(), 40);
        let catalog = CatalogIndex::build(products).expect("generated catalog is valid");
        assert_eq!(catalog.len(), 40);
        assert_eq!(catalog.skipped_rows(), 0);
    }

    #[test]
    fn test_prices_stay_in_category_range() {
        let products = DemoDataGenerator::new().with_seed(7).generate_products(100);
        for product in &products {
            let (lo, hi) = price_range(&product.category);
            assert!(product.price >= lo && product.price <= hi, "{product:?}");
        }
    }

    #[test]
    fn test_transactions_reference_generated_products() {
        let generator = DemoDataGenerator::new();
        let products = generator.generate_products(30);
        let transactions = generator.generate_transactions(&products, 10, 50);
        let max_id = products.len() as u32;
        assert!(transactions.iter().all(|t| t.product_id >= 1 && t.product_id <= max_id));
        assert!(transactions.iter().all(|t| t.customer_id >= 1 && t.customer_id <= 10));
    }

    #[test]
    fn test_baskets_hold_distinct_products() {
        let generator = DemoDataGenerator::new().with_seed(3);
        let products = generator.generate_products(30);
        let transactions = generator.generate_transactions(&products, 10, 50);
        for basket_id in 1..=50u64 {
            let mut ids: Vec<u32> = transactions
                .iter()
                .filter(|t| t.basket_id == basket_id)
                .map(|t| t.product_id)
                .collect();
            let before = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), before, "basket {basket_id} repeats a product");
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = DemoDataGenerator::new().with_seed(9).generate_products(20);
        let b = DemoDataGenerator::new().with_seed(9).generate_products(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = DemoDataGenerator::new().with_seed(1).generate_products(20);
        let b = DemoDataGenerator::new().with_seed(2).generate_products(20);
        assert_ne!(a, b);
    }

    #[test]
    fn test_segments_are_known_names() {
        let assignments = DemoDataGenerator::new().generate_customer_segments(50);
        assert_eq!(assignments.len(), 50);
        let known: Vec<&str> = SEGMENTS.iter().map(|(name, _)| *name).collect();
        assert!(assignments.iter().all(|(_, s)| known.contains(&s.as_str())));
    }

    #[test]
    fn test_empty_inputs_yield_empty_log() {
        let generator = DemoDataGenerator::new();
        assert!(generator.generate_transactions(&[], 10, 50).is_empty());
        let products = generator.generate_products(5);
        assert!(generator.generate_transactions(&products, 0, 50).is_empty());
    }
}
