//! Cross tabulation and breakdown tests over the demo world.

mod common;

use epi_indicators::{breakdown_by_category, cross_table, AnalysisError};

#[test]
fn test_age_by_gender_cross_table() {
    common::init_logging();
    let table = cross_table(
        &common::variables(),
        "age",
        "gender",
        &common::case_records(),
        true,
    )
    .unwrap();

    assert_eq!(
        table.columns(),
        ["<5", "5-14", "15-24", "25-44", "45-59", ">60"]
    );
    assert_eq!(table.rows(), ["Male", "Female"]);

    // Only the first report is a male under five
    assert_eq!(table.value("Male", "<5"), Some(1));
    assert_eq!(table.value("Female", "<5"), Some(0));
    assert_eq!(table.value("Female", ">60"), Some(3));
    assert_eq!(table.value("Male", ">60"), Some(0));
    assert_eq!(table.value("Male", "5-14"), Some(1));
    assert_eq!(table.value("Female", "5-14"), Some(1));

    // Row sums recover the gender totals
    let male_total: u64 = table
        .columns()
        .iter()
        .map(|c| table.value("Male", c).unwrap())
        .sum();
    assert_eq!(male_total, 4);
}

#[test]
fn test_cross_table_keeps_ids_without_names() {
    let table = cross_table(
        &common::variables(),
        "age",
        "gender",
        &common::case_records(),
        false,
    )
    .unwrap();
    assert_eq!(
        table.columns(),
        ["age_1", "age_2", "age_3", "age_4", "age_5", "age_6"]
    );
    assert_eq!(table.value("gen_2", "age_6"), Some(3));
}

#[test]
fn test_cross_table_unknown_category() {
    let err = cross_table(
        &common::variables(),
        "age",
        "occupation",
        &common::case_records(),
        true,
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownCategoryError(c) if c == "occupation"));
}

#[test]
fn test_gender_breakdown() {
    let breakdown =
        breakdown_by_category(&common::variables(), "gender", &common::case_records(), true)
            .unwrap();
    assert_eq!(breakdown.labels(), ["Male", "Female"]);
    assert_eq!(breakdown.get("Male"), Some(4.0));
    assert_eq!(breakdown.get("Female"), Some(6.0));

    let by_id =
        breakdown_by_category(&common::variables(), "gender", &common::case_records(), false)
            .unwrap();
    assert_eq!(by_id.get("gen_1"), Some(4.0));
    assert_eq!(by_id.get("gen_2"), Some(6.0));
}

#[test]
fn test_age_breakdown_keeps_id_order() {
    let breakdown =
        breakdown_by_category(&common::variables(), "age", &common::case_records(), false)
            .unwrap();
    assert_eq!(
        breakdown.labels(),
        ["age_1", "age_2", "age_3", "age_4", "age_5", "age_6"]
    );
    assert_eq!(breakdown.get("age_1"), Some(1.0));
    assert_eq!(breakdown.get("age_6"), Some(3.0));
}

#[test]
fn test_hierarchy_breakdown_counts_reports() {
    let clinics =
        breakdown_by_category(&common::variables(), "clinic", &common::case_records(), true)
            .unwrap();
    // Ordered by count, ties by label
    assert_eq!(clinics.labels(), ["7", "8", "10", "11"]);
    assert_eq!(clinics.get("7"), Some(3.0));
    assert_eq!(clinics.get("10"), Some(2.0));

    let regions =
        breakdown_by_category(&common::variables(), "region", &common::case_records(), true)
            .unwrap();
    assert_eq!(regions.labels(), ["2", "3"]);
    assert_eq!(regions.get("2"), Some(6.0));
    assert_eq!(regions.get("3"), Some(4.0));
}
