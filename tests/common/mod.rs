#![allow(dead_code)]

use std::path::Path;

use cole::encoder::FileWriter;
use cole::format::{ColumnSchema, ColumnType, Encoding, Schema};

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// `id` Int64/Plain, `age` Int32/Plain, `city` String/Dictionary, 5 rows.
pub fn write_cities(path: &Path) {
    let schema = Schema::new(vec![
        ColumnSchema::new("id", ColumnType::Int64, Encoding::Plain),
        ColumnSchema::new("age", ColumnType::Int32, Encoding::Plain),
        ColumnSchema::new("city", ColumnType::String, Encoding::Dictionary),
    ])
    .unwrap();

    let mut writer = FileWriter::create(path, schema).unwrap();
    writer.write_i64_column(0, &[1, 2, 3, 4, 5]).unwrap();
    writer.write_i32_column(1, &[25, 30, 25, 35, 30]).unwrap();
    writer
        .write_string_column(2, &strings(&["Paris", "Lyon", "Paris", "Nice", "Lyon"]))
        .unwrap();
    writer.close().unwrap();
}

/// `value` Int32/Plain, `category` String/Dictionary, `id` Int64/Plain,
/// 5 rows.
pub fn write_sales(path: &Path) {
    let schema = Schema::new(vec![
        ColumnSchema::new("value", ColumnType::Int32, Encoding::Plain),
        ColumnSchema::new("category", ColumnType::String, Encoding::Dictionary),
        ColumnSchema::new("id", ColumnType::Int64, Encoding::Plain),
    ])
    .unwrap();

    let mut writer = FileWriter::create(path, schema).unwrap();
    writer
        .write_i32_column(0, &[100, 200, 150, 300, 250])
        .unwrap();
    writer
        .write_string_column(1, &strings(&["A", "B", "A", "C", "B"]))
        .unwrap();
    writer.write_i64_column(2, &[1, 2, 3, 4, 5]).unwrap();
    writer.close().unwrap();
}

/// One Int32/Plain column `value`, two row groups: [1,2,3] then [4,5,6].
pub fn write_two_groups(path: &Path) {
    let schema = Schema::new(vec![ColumnSchema::new(
        "value",
        ColumnType::Int32,
        Encoding::Plain,
    )])
    .unwrap();

    let mut writer = FileWriter::create(path, schema).unwrap();
    writer.write_i32_column(0, &[1, 2, 3]).unwrap();
    writer.flush_row_group().unwrap();
    writer.write_i32_column(0, &[4, 5, 6]).unwrap();
    writer.close().unwrap();
}
