//! Integration tests for the canasta recommendation engine.
//!
//! These tests verify end-to-end workflows combining catalog indexing,
//! interaction aggregation, association building, and ranked queries.

use std::collections::HashSet;
use std::io::Write;

use canasta::prelude::*;

fn grocery_products() -> Vec<Product> {
    vec![
        Product::new(1, "2% MILK", "DAIRY").with_brand("Hillside").with_price(3.0),
        Product::new(2, "CORN CEREAL", "GROCERY").with_brand("Sunny Farms").with_price(4.5),
        Product::new(3, "WHEAT BREAD", "BAKERY").with_brand("Hillside").with_price(2.5),
        Product::new(4, "COLA 12PK", "BEVERAGES").with_brand("Fizz Co").with_price(6.0),
        Product::new(5, "PEPPERONI PIZZA", "FROZEN").with_brand("Casa Bella").with_price(8.0),
        Product::new(6, "OAT COOKIES", "SNACKS").with_brand("Sunny Farms").with_price(3.5),
        Product::new(7, "LAGER BEER 6PK", "BEVERAGES").with_brand("Fizz Co").with_price(9.0),
        Product::new(8, "POTATO CHIPS", "SNACKS").with_brand("Store Brand").with_price(2.0),
    ]
}

fn grocery_transactions() -> Vec<Transaction> {
    vec![
        // Milk and cereal travel together.
        Transaction::new(100, 1, 1).with_amount(3.1),
        Transaction::new(100, 2, 1).with_amount(4.4),
        Transaction::new(101, 1, 2).with_amount(2.9),
        Transaction::new(101, 2, 2).with_amount(4.6),
        // Pizza, cola, beer basket.
        Transaction::new(102, 5, 3).with_amount(8.2),
        Transaction::new(102, 4, 3).with_amount(6.1),
        Transaction::new(102, 7, 3).with_amount(8.8),
        // Assorted singles.
        Transaction::new(103, 1, 4).with_amount(3.0),
        Transaction::new(104, 8, 5).with_amount(2.0),
    ]
}

fn fitted_engine() -> RecommendationEngine {
    let mut engine = RecommendationEngine::new();
    engine
        .fit(&grocery_transactions(), grocery_products())
        .expect("valid demo inputs");
    engine
}

#[test]
fn test_full_recommendation_workflow() {
    let engine = fitted_engine();
    assert!(engine.is_fitted());

    let recs = engine
        .get_recommendations(100, "milk", 6, "general_value")
        .expect("fitted engine");

    assert!(!recs.is_empty());
    assert!(recs.len() <= 6);
    assert_eq!(recs[0].product_id, 1);
    assert_eq!(recs[0].reason, "query match");

    // Co-purchase mining should surface cereal for a milk query.
    assert!(recs.iter().any(|r| r.product_id == 2));
}

#[test]
fn test_direct_match_on_empty_transaction_log() {
    // Scenario: one-product catalog, no transactions, query hits the name.
    let mut engine = RecommendationEngine::new();
    engine
        .fit(
            &[],
            vec![Product::new(1, "2% MILK", "DAIRY").with_brand("X").with_price(3.0)],
        )
        .expect("valid inputs");

    let recs = engine
        .get_recommendations(1, "milk", 6, "general_value")
        .expect("fitted engine");
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].product_id, 1);
    assert_eq!(recs[0].reason, "query match");
}

#[test]
fn test_empty_query_is_popularity_fallback() {
    // Scenario: blank query returns min(n, catalog size) popular products.
    let engine = fitted_engine();

    let recs = engine
        .get_recommendations(100, "", 5, "general_value")
        .expect("fitted engine");
    assert_eq!(recs.len(), 5);
    assert!(recs.iter().all(|r| r.reason == "popular product"));

    let all = engine
        .get_recommendations(100, "", 50, "general_value")
        .expect("fitted engine");
    assert_eq!(all.len(), grocery_products().len());
}

#[test]
fn test_zero_match_query_never_errors() {
    // Scenario: unmatched query plus empty log still yields the fallback.
    let mut engine = RecommendationEngine::new();
    engine.fit(&[], grocery_products()).expect("valid inputs");

    let recs = engine
        .get_recommendations(1, "xylophone", 4, "general_value")
        .expect("fitted engine");
    assert_eq!(recs.len(), 4);
    // With no transactions the fallback degrades to catalog order.
    assert_eq!(
        recs.iter().map(|r| r.product_id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_frequent_pair_counts_and_symmetry() {
    // Scenario: two baskets {1,2} and one {1,3} at support 1.
    let catalog = CatalogIndex::build(vec![
        Product::new(1, "A", "X"),
        Product::new(2, "B", "X"),
        Product::new(3, "C", "Y"),
    ])
    .expect("valid catalog");
    let rows = vec![
        Transaction::new(1, 1, 1),
        Transaction::new(1, 2, 1),
        Transaction::new(2, 1, 2),
        Transaction::new(2, 2, 2),
        Transaction::new(3, 1, 3),
        Transaction::new(3, 3, 3),
    ];
    let summary = InteractionSummary::build(&rows, &catalog).expect("valid log");

    assert_eq!(summary.pair_count(1, 2), 2);
    assert_eq!(summary.pair_count(1, 3), 1);
    assert_eq!(summary.pair_count(2, 1), 2);
    // One canonical key per unordered pair.
    assert_eq!(summary.frequent_pairs().len(), 2);
}

#[test]
fn test_high_diversity_segment_spreads_categories() {
    // Scenario: diversity 0.9 with candidates spanning two categories.
    let strategy = SegmentStrategy {
        focus: "exploration_focused".to_string(),
        price_preference: "any".to_string(),
        diversity_factor: 0.9,
    };
    let make = |id: u32, category: &str, score: f32| Recommendation {
        product_id: id,
        name: format!("P{id}"),
        category: category.to_string(),
        brand: "B".to_string(),
        price: 1.0,
        score,
        reason: "query match".to_string(),
        similarity_to_query: 1.0,
    };
    let pool = vec![
        make(1, "DAIRY", 1.0),
        make(2, "DAIRY", 0.9),
        make(3, "DAIRY", 0.8),
        make(4, "BAKERY", 0.7),
        make(5, "BAKERY", 0.6),
    ];

    let picked = canasta::rank::diversify(pool, &strategy, 5);
    let first_three: HashSet<&str> = picked[..3].iter().map(|r| r.category.as_str()).collect();
    assert!(first_three.len() >= 2);
}

#[test]
fn test_recommendations_match_catalog_exactly() {
    let engine = fitted_engine();
    let catalog = engine.catalog().expect("fitted");

    for query in ["milk", "pizza", "", "beer", "unmatched query"] {
        let recs = engine
            .get_recommendations(100, query, 8, "premium_loyal")
            .expect("fitted engine");
        for rec in recs {
            let product = catalog.get(rec.product_id).expect("id is cataloged");
            assert_eq!(rec.name, product.name);
            assert_eq!(rec.category, product.category);
            assert_eq!(rec.brand, product.brand);
            assert!((rec.price - product.price).abs() < f32::EPSILON);
        }
    }
}

#[test]
fn test_association_rules_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"keywords": {{"pizza": ["beer"]}}, "categories": {{"FROZEN": ["BEVERAGES"]}}}}"#
    )
    .expect("write rules");

    let rules = AssociationRules::from_path(file.path()).expect("rules load");
    assert_eq!(rules.related_keywords("pizza"), &["beer".to_string()]);

    let mut engine = RecommendationEngine::new().with_rules(rules);
    engine
        .fit(&grocery_transactions(), grocery_products())
        .expect("valid inputs");
    let recs = engine
        .get_recommendations(102, "pizza", 6, "general_value")
        .expect("fitted engine");
    // Custom rule routes pizza to the cataloged beer.
    assert!(recs.iter().any(|r| r.product_id == 7));
}

#[test]
fn test_segment_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"strategies": {{"vip": {{"focus": "premium", "price_preference": "premium", "diversity_factor": 0.2}}}}}}"#
    )
    .expect("write table");

    let table = SegmentTable::from_path(file.path()).expect("table load");
    let mut engine = RecommendationEngine::new().with_segments(table);
    engine
        .fit(&grocery_transactions(), grocery_products())
        .expect("valid inputs");

    // Low diversity: results are pure score order, still bounded and unique.
    let recs = engine
        .get_recommendations(100, "milk", 4, "vip")
        .expect("fitted engine");
    assert!(recs.len() <= 4);
    let ids: HashSet<u32> = recs.iter().map(|r| r.product_id).collect();
    assert_eq!(ids.len(), recs.len());
}

#[test]
fn test_refit_workflow() {
    let mut engine = fitted_engine();
    let replacement = vec![Product::new(50, "ESPRESSO ROAST COFFEE", "BEVERAGES")];
    engine.fit(&[], replacement).expect("valid inputs");

    let recs = engine
        .get_recommendations(1, "coffee", 6, "general_value")
        .expect("fitted engine");
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].product_id, 50);

    // Old catalog ids are gone after the refit.
    assert!(engine.catalog().expect("fitted").get(1).is_none());
}

#[test]
fn test_synthetic_demo_cycle() {
    let generator = DemoDataGenerator::new().with_seed(11);
    let products = generator.generate_products(60);
    let transactions = generator.generate_transactions(&products, 25, 300);

    let mut engine = RecommendationEngine::new();
    engine.fit(&transactions, products).expect("demo data is valid");

    let summary = engine.interactions().expect("fitted");
    assert!(!summary.is_empty());
    let max_popularity = summary
        .popularity()
        .values()
        .fold(0.0f32, |acc, &v| acc.max(v));
    assert!((max_popularity - 1.0).abs() < 1e-6);
    assert!(!summary.top_customers(5).is_empty());

    for (customer_id, segment) in generator.generate_customer_segments(25) {
        let recs = engine
            .get_recommendations(customer_id, "milk", 6, &segment)
            .expect("fitted engine");
        assert!(recs.len() <= 6);
        let ids: HashSet<u32> = recs.iter().map(|r| r.product_id).collect();
        assert_eq!(ids.len(), recs.len());
    }
}

#[test]
fn test_search_products_workflow() {
    let engine = fitted_engine();

    let hits = engine.search_products("snacks", 10).expect("fitted engine");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|p| p.category == "SNACKS"));

    let capped = engine.search_products("a", 3).expect("fitted engine");
    assert!(capped.len() <= 3);
}

#[test]
fn test_not_fitted_surface() {
    let engine = RecommendationEngine::new();
    assert!(!engine.is_fitted());
    assert!(engine.get_recommendations(1, "milk", 5, "general_value").is_err());
    assert!(engine.search_products("milk", 5).is_err());
    assert!(engine.catalog().is_none());
    assert_eq!(engine.skipped_rows(), 0);
}
