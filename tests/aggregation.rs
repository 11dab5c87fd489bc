mod common;

use std::collections::HashMap;

use cole::decoder::FileReader;
use cole::query::{AggFunc, AggResult, CompareOp, Predicate, QueryExecutor};

fn group_map(results: Vec<(String, AggResult)>) -> HashMap<String, AggResult> {
    results.into_iter().collect()
}

#[test]
fn scalar_aggregates_over_cities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.col");
    common::write_cities(&path);

    let mut reader = FileReader::open(&path).unwrap();

    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Sum, "age").unwrap();
    let result = executor.execute_aggregate().unwrap();
    assert_eq!(result.count, 5);
    assert_eq!(result.sum, 145);

    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Count, "age").unwrap();
    assert_eq!(executor.execute_aggregate().unwrap().count, 5);

    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Min, "age").unwrap();
    assert_eq!(executor.execute_aggregate().unwrap().min, Some(25));

    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Max, "age").unwrap();
    assert_eq!(executor.execute_aggregate().unwrap().max, Some(35));
}

#[test]
fn group_by_counts_cities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.col");
    common::write_cities(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_group_by("city").unwrap();
    let groups = group_map(executor.execute_group_by().unwrap());

    assert_eq!(groups.len(), 3);
    assert_eq!(groups["Paris"].count, 2);
    assert_eq!(groups["Lyon"].count, 2);
    assert_eq!(groups["Nice"].count, 1);
}

#[test]
fn group_by_sums_categories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.col");
    common::write_sales(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_group_by("category").unwrap();
    executor.set_aggregation(AggFunc::Sum, "value").unwrap();
    let groups = group_map(executor.execute_group_by().unwrap());

    assert_eq!(groups.len(), 3);
    assert_eq!(groups["A"].sum, 250);
    assert_eq!(groups["B"].sum, 450);
    assert_eq!(groups["C"].sum, 300);
}

#[test]
fn group_by_integer_keys_are_stringified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.col");
    common::write_sales(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_group_by("value").unwrap();
    let groups = group_map(executor.execute_group_by().unwrap());

    assert_eq!(groups.len(), 5);
    assert_eq!(groups["300"].count, 1);
}

#[test]
fn aggregation_respects_filters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.col");
    common::write_cities(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    executor.add_filter(Predicate::new("age", CompareOp::Gt, 25));
    executor.set_aggregation(AggFunc::Sum, "age").unwrap();
    let result = executor.execute_aggregate().unwrap();
    assert_eq!(result.count, 3);
    assert_eq!(result.sum, 95);
}

#[test]
fn aggregate_equals_fold_of_query() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.col");
    common::write_sales(&path);

    let mut reader = FileReader::open(&path).unwrap();

    let mut executor = QueryExecutor::new(&mut reader);
    executor.add_filter(Predicate::new("value", CompareOp::Ge, 150));
    executor.set_aggregation(AggFunc::Sum, "value").unwrap();
    let aggregated = executor.execute_aggregate().unwrap();

    let mut executor = QueryExecutor::new(&mut reader);
    executor.add_filter(Predicate::new("value", CompareOp::Ge, 150));
    let batches = executor.execute_query().unwrap();
    let folded_count: usize = batches.iter().map(|b| b.num_rows).sum();
    let folded_sum: i128 = batches
        .iter()
        .flat_map(|b| b.column("value").unwrap().as_i32().unwrap().to_vec())
        .map(i128::from)
        .sum();

    assert_eq!(aggregated.count as usize, folded_count);
    assert_eq!(aggregated.sum, folded_sum);
}

#[test]
fn group_counts_partition_the_filtered_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.col");
    common::write_sales(&path);

    let mut reader = FileReader::open(&path).unwrap();

    let mut executor = QueryExecutor::new(&mut reader);
    executor.add_filter(Predicate::new("value", CompareOp::Gt, 100));
    executor.set_group_by("category").unwrap();
    let groups = executor.execute_group_by().unwrap();
    let group_total: i64 = groups.iter().map(|(_, agg)| agg.count).sum();

    let mut executor = QueryExecutor::new(&mut reader);
    executor.add_filter(Predicate::new("value", CompareOp::Gt, 100));
    executor.set_aggregation(AggFunc::Count, "id").unwrap();
    let counted = executor.execute_aggregate().unwrap();

    assert_eq!(group_total, counted.count);
}

#[test]
fn string_aggregation_is_rejected_strictly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.col");
    common::write_cities(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    let err = executor.set_aggregation(AggFunc::Sum, "city").unwrap_err();
    assert!(err.to_string().contains("not supported"));

    // Count never reads values, so it is fine on a string column
    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Count, "city").unwrap();
    assert_eq!(executor.execute_aggregate().unwrap().count, 5);
}

#[test]
fn missing_configuration_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.col");
    common::write_cities(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    assert!(executor.execute_aggregate().is_err());
    assert!(executor.execute_group_by().is_err());
    assert!(executor.set_aggregation(AggFunc::Sum, "nope").is_err());
    assert!(executor.set_group_by("nope").is_err());
}

#[test]
fn aggregates_span_row_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.col");
    common::write_two_groups(&path);

    let mut reader = FileReader::open(&path).unwrap();
    let mut executor = QueryExecutor::new(&mut reader);
    executor.set_aggregation(AggFunc::Sum, "value").unwrap();
    let result = executor.execute_aggregate().unwrap();
    assert_eq!(result.count, 6);
    assert_eq!(result.sum, 21);
}
