pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod format;
pub mod query;

#[cfg(test)]
mod tests {
    use crate::decoder::FileReader;
    use crate::encoder::FileWriter;
    use crate::format::{ColumnSchema, ColumnType, Encoding, Schema};
    use crate::query::{AggFunc, CompareOp, Predicate, QueryExecutor};

    #[test]
    fn test_write_read_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.col");

        let schema = Schema::new(vec![
            ColumnSchema::new("id", ColumnType::Int64, Encoding::Plain),
            ColumnSchema::new("ts", ColumnType::Int64, Encoding::Delta),
            ColumnSchema::new("level", ColumnType::Int32, Encoding::Rle),
            ColumnSchema::new("host", ColumnType::String, Encoding::Dictionary),
        ])
        .unwrap();

        let mut writer = FileWriter::create(&path, schema).unwrap();
        let n = 1000i64;
        let ids: Vec<i64> = (0..n).collect();
        let ts: Vec<i64> = (0..n).map(|i| 1_700_000_000 + i * 10).collect();
        let levels: Vec<i32> = (0..n).map(|i| (i / 100) as i32).collect();
        let hosts: Vec<String> = (0..n)
            .map(|i| format!("host-{}", i % 4))
            .collect();
        writer.write_i64_column(0, &ids).unwrap();
        writer.write_i64_column(1, &ts).unwrap();
        writer.write_i32_column(2, &levels).unwrap();
        writer.write_string_column(3, &hosts).unwrap();
        writer.close().unwrap();

        let mut reader = FileReader::open(&path).unwrap();
        assert_eq!(reader.total_rows() as i64, n);
        assert_eq!(reader.num_row_groups(), 1);
        assert_eq!(reader.read_i64_column(0, 0).unwrap(), ids);
        assert_eq!(reader.read_i64_column(0, 1).unwrap(), ts);
        assert_eq!(reader.read_i32_column(0, 2).unwrap(), levels);
        assert_eq!(reader.read_string_column(0, 3).unwrap(), hosts);
        assert!(reader.read_i64_column(1, 0).is_err());

        let mut executor = QueryExecutor::new(&mut reader);
        executor.add_filter(Predicate::new("level", CompareOp::Ge, 5));
        executor.set_aggregation(AggFunc::Count, "id").unwrap();
        assert_eq!(executor.execute_aggregate().unwrap().count, 500);
    }
}
