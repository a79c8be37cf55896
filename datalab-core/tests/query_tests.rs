use datalab_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::{fixture, rstest};

// ===== Fixtures =====

#[fixture]
fn datasets() -> Vec<Record> {
    vec![
        Record::new(
            "1",
            RecordKind::Dataset,
            "Customer Sentiment Analysis",
            "Retail customer feedback and sentiment scores from Q3 2024",
        )
        .with_tags(["retail", "sentiment", "nlp"])
        .with_metadata("type", "Text"),
        Record::new(
            "2",
            RecordKind::Dataset,
            "Product Catalog Images",
            "High-resolution product images with metadata and annotations",
        )
        .with_tags(["computer-vision", "retail", "catalog"])
        .with_metadata("type", "Image"),
        Record::new(
            "3",
            RecordKind::Dataset,
            "Sales Transaction Logs",
            "Transactional data with fraud detection labels",
        )
        .with_tags(["finance", "fraud-detection", "transactions"])
        .with_metadata("type", "Structured"),
        Record::new(
            "4",
            RecordKind::Pipeline,
            "Data Preprocessing Pipeline",
            "Automated data cleaning and feature engineering",
        )
        .with_tags(["preprocessing", "automation"])
        .with_metadata("status", "active"),
    ]
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

// ===== match_records =====

#[rstest]
fn test_empty_query_returns_all_in_order(datasets: Vec<Record>) {
    let matched = match_records("", &datasets);
    assert_eq!(matched, datasets);
}

#[rstest]
fn test_whitespace_query_returns_all(datasets: Vec<Record>) {
    assert_eq!(match_records("   \t", &datasets).len(), datasets.len());
}

#[rstest]
#[case("RETAIL", vec!["1", "2"])]
#[case("  sentiment ", vec!["1"])]
#[case("fraud", vec!["3"])]
#[case("images", vec!["2"])]
#[case("vision", vec!["2"])]
#[case("data", vec!["2", "3", "4"])]
#[case("nothing-like-this", vec![])]
fn test_match_records(datasets: Vec<Record>, #[case] query: &str, #[case] expected: Vec<&str>) {
    let matched = match_records(query, &datasets);
    assert_eq!(ids(&matched), expected);
}

#[test]
fn test_match_is_case_insensitive() {
    let records = vec![Record::new("r", RecordKind::Dataset, "retail data", "")];
    let matched = match_records("RETAIL", &records);
    assert_eq!(matched, records);
}

#[test]
fn test_match_bias_edge_case() {
    let records = vec![
        Record::new("1", RecordKind::EdgeCase, "Gender Bias in Job Descriptions", "")
            .with_tags(["language bias"]),
        Record::new("2", RecordKind::EdgeCase, "Outlier", ""),
    ];

    let matched = match_records("bias", &records);
    assert_eq!(ids(&matched), vec!["1"]);
}

#[rstest]
fn test_match_leaves_input_untouched(datasets: Vec<Record>) {
    let before = datasets.clone();
    let _ = match_records("retail", &datasets);
    assert_eq!(datasets, before);
}

// ===== RecordQuery =====

#[rstest]
fn test_record_query_by_kind(datasets: Vec<Record>) {
    let query = RecordQuery::new("data").with_kind(RecordKind::Pipeline);
    assert_eq!(ids(&query.apply(&datasets)), vec!["4"]);
}

#[rstest]
fn test_record_query_facet(datasets: Vec<Record>) {
    let query = RecordQuery::new("").with_facet("type", "text");
    assert_eq!(ids(&query.apply(&datasets)), vec!["1"]);
}

#[rstest]
fn test_record_query_all_facet_is_ignored(datasets: Vec<Record>) {
    let query = RecordQuery::new("retail").with_facet("type", "All");
    assert_eq!(ids(&query.apply(&datasets)), vec!["1", "2"]);
}

#[rstest]
fn test_record_query_missing_metadata_does_not_match(datasets: Vec<Record>) {
    let query = RecordQuery::new("").with_facet("severity", "high");
    assert!(query.apply(&datasets).is_empty());
}

#[rstest]
fn test_record_query_matches_single(datasets: Vec<Record>) {
    let query = RecordQuery::new("catalog").with_facet("type", "Image");
    assert!(query.matches(&datasets[1]));
    assert!(!query.matches(&datasets[0]));
}

#[test]
fn test_record_query_numeric_facet() {
    let record = Record::new("q", RecordKind::Dataset, "Quality", "").with_metadata("quality", 92);
    assert!(RecordQuery::new("").with_facet("quality", "92").matches(&record));
}

// ===== Properties =====

fn arb_record() -> impl Strategy<Value = Record> {
    (
        "[a-z0-9]{1,6}",
        "[A-Za-z ]{0,20}",
        "[A-Za-z ]{0,30}",
        prop::collection::vec("[a-z-]{1,8}", 0..4),
    )
        .prop_map(|(id, name, description, tags)| {
            Record::new(id, RecordKind::Dataset, name, description).with_tags(tags)
        })
}

proptest! {
    #[test]
    fn prop_match_is_a_stable_subsequence(
        records in prop::collection::vec(arb_record(), 0..10),
        query in "[A-Za-z ]{0,4}",
    ) {
        let matched = match_records(&query, &records);

        let mut cursor = records.iter();
        for record in &matched {
            prop_assert!(cursor.any(|candidate| candidate == record));
        }
    }

    #[test]
    fn prop_match_ignores_case(
        records in prop::collection::vec(arb_record(), 0..10),
        query in "[A-Za-z]{0,4}",
    ) {
        let lower = match_records(&query.to_lowercase(), &records);
        let upper = match_records(&query.to_uppercase(), &records);
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn prop_empty_query_is_identity(records in prop::collection::vec(arb_record(), 0..10)) {
        prop_assert_eq!(match_records("", &records), records);
    }
}
