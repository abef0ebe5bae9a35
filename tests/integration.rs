//! Integration tests for salescope

use std::io::Write;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use salescope::segmentation::{customer_segment, SegmentationConfig};
use salescope::{analysis, build_profiles, load_events, AnalyticsError};
use salescope::{segment_customers, RecommendConfig, Recommender};

/// Create a test CSV ledger with a small but varied customer population.
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Customer ID,Product ID,Product Category,Purchase Amount,Purchase Date"
    )
    .unwrap();

    // C001: heavy, frequent, recent buyer
    writeln!(file, "C001,P001,Electronics,450.00,2024-12-27").unwrap();
    writeln!(file, "C001,P002,Electronics,300.00,2024-12-20").unwrap();
    writeln!(file, "C001,P003,Kitchen,120.00,2024-12-15").unwrap();
    writeln!(file, "C001,P004,Books,30.00,2024-12-28").unwrap();

    // C002: one large purchase
    writeln!(file, "C002,P001,Electronics,800.00,2024-12-22").unwrap();

    // C003: frequent small purchases
    writeln!(file, "C003,P004,Books,12.00,2024-12-18").unwrap();
    writeln!(file, "C003,P005,Books,8.00,2024-12-21").unwrap();
    writeln!(file, "C003,P006,Grocery,15.00,2024-12-26").unwrap();
    writeln!(file, "C003,P006,Grocery,9.00,2024-12-29").unwrap();

    // C004: stale customer, last seen months ago
    writeln!(file, "C004,P002,Electronics,200.00,2024-06-01").unwrap();

    // C005: middling on every axis
    writeln!(file, "C005,P003,Kitchen,90.00,2024-12-19").unwrap();
    writeln!(file, "C005,P005,Books,20.00,2024-12-23").unwrap();

    file
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

#[test]
fn test_end_to_end_segmentation() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let profiles = build_profiles(&events, reference_date());
    assert_eq!(profiles.len(), 5);

    let report = segment_customers(&profiles, &SegmentationConfig::default()).unwrap();

    // The six segments partition the population exactly.
    assert_eq!(report.segments.len(), 6);
    let total: usize = report.segments.iter().map(|s| s.customer_count).sum();
    assert_eq!(total, 5);

    let mut members: Vec<&str> = report
        .segments
        .iter()
        .flat_map(|s| s.members.iter().map(String::as_str))
        .collect();
    members.sort();
    assert_eq!(members, vec!["C001", "C002", "C003", "C004", "C005"]);

    // C001 spends the most and buys the most often.
    let top_segment = &report.segments[0];
    assert_eq!(top_segment.name, "High-Value Frequent Buyers");
    assert!(top_segment.members.contains(&"C001".to_string()));
}

#[test]
fn test_customer_segment_lookup() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let profiles = build_profiles(&events, reference_date());

    let result =
        customer_segment(&profiles, &SegmentationConfig::default(), "C004").unwrap();
    // Last purchase in June, far past the median-recency cutoff.
    assert_eq!(result.segment, "Inactive Customers");
    assert_eq!(result.profile.purchase_count, 1);

    let err = customer_segment(&profiles, &SegmentationConfig::default(), "C999").unwrap_err();
    assert!(matches!(err, AnalyticsError::CustomerNotFound(_)));
}

#[test]
fn test_end_to_end_recommendations() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let recommender = Recommender::new(&events).unwrap();
    let config = RecommendConfig::default();

    let recs = recommender.recommend("C002", 5, &config).unwrap();

    // C002 only ever bought P001; everything recommended must be new.
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|r| r.product_id != "P001"));
    // Catalog has 6 products, one purchased: at most 5 candidates.
    assert!(recs.len() <= 5);
    // Scores are finite and ranked.
    for pair in recs.windows(2) {
        assert!(pair[0].score.is_finite());
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_recommendations_are_reproducible() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let config = RecommendConfig::default();

    let first = Recommender::new(&events)
        .unwrap()
        .recommend("C003", 4, &config)
        .unwrap();
    let second = Recommender::new(&events)
        .unwrap()
        .recommend("C003", 4, &config)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_customer_gets_popularity_fallback() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let recommender = Recommender::new(&events).unwrap();

    let recs = recommender
        .recommend("C999", 3, &RecommendConfig::default())
        .unwrap();
    assert_eq!(recs.len(), 3);
    // P001 has the largest total spend across the population.
    assert_eq!(recs[0].product_id, "P001");
}

#[test]
fn test_full_analysis_over_ledger() {
    let file = create_test_csv();
    let events = load_events(file.path().to_str().unwrap()).unwrap();

    let report = analysis::full_analysis(&events, 3).unwrap();
    assert_eq!(report.products.total_products, 6);
    assert_eq!(report.customers.total_customers, 5);
    assert_eq!(report.products.top_products[0].product_id, "P001");
    assert_eq!(report.products.top_products[0].revenue, 1250.0);
    assert_eq!(report.categories.categories[0].category, "Electronics");
}

#[test]
fn test_single_customer_full_catalog() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Customer ID,Product ID,Product Category,Purchase Amount,Purchase Date"
    )
    .unwrap();
    writeln!(file, "C1,P1,Books,20.00,2024-12-01").unwrap();
    writeln!(file, "C1,P2,Books,5.00,2024-12-02").unwrap();

    let events = load_events(file.path().to_str().unwrap()).unwrap();
    let recommender = Recommender::new(&events).unwrap();

    // C1 already owns the whole catalog: nothing left to recommend.
    let recs = recommender
        .recommend("C1", 5, &RecommendConfig::default())
        .unwrap();
    assert!(recs.is_empty());

    // Segmentation of the single-customer population still resolves.
    let profiles = build_profiles(&events, reference_date());
    let report = segment_customers(&profiles, &SegmentationConfig::default()).unwrap();
    let total: usize = report.segments.iter().map(|s| s.customer_count).sum();
    assert_eq!(total, 1);
}
