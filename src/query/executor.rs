//! The query executor façade: assembles projection, filters, aggregation,
//! and group-by into one of three execution shapes over a scanner.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::decoder::FileReader;
use crate::format::{ColumnType, SchemaError};

use super::batch::{Batch, ColumnData};
use super::predicate::Predicate;
use super::scanner::{Scanner, DEFAULT_BATCH_SIZE};
use super::{QueryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AggFunc {
    Count,
    Sum,
    Min,
    Max,
}

/// Accumulated aggregates. The sum is widened to i128 so it cannot wrap
/// on i64 inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggResult {
    pub count: i64,
    pub sum: i128,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl AggResult {
    fn update(&mut self, func: AggFunc, value: Option<i64>) {
        self.count += 1;
        match (func, value) {
            (AggFunc::Count, _) => {}
            (AggFunc::Sum, Some(v)) => self.sum += i128::from(v),
            (AggFunc::Min, Some(v)) => {
                self.min = Some(self.min.map_or(v, |m| m.min(v)));
            }
            (AggFunc::Max, Some(v)) => {
                self.max = Some(self.max.map_or(v, |m| m.max(v)));
            }
            // unreachable for integer columns; string columns are rejected
            // when the aggregation is configured
            (_, None) => {}
        }
    }
}

/// Wraps a reader and executes one query shape: a batched scan, a scalar
/// aggregate, or a single-key group-by.
pub struct QueryExecutor<'a> {
    reader: &'a mut FileReader,
    projection: Vec<String>,
    filters: Vec<Predicate>,
    aggregation: Option<(AggFunc, String)>,
    group_by: Option<String>,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(reader: &'a mut FileReader) -> Self {
        Self {
            reader,
            projection: Vec::new(),
            filters: Vec::new(),
            aggregation: None,
            group_by: None,
        }
    }

    /// Replaces the selected column list. Empty selects all columns.
    pub fn set_projection(&mut self, columns: Vec<String>) {
        self.projection = columns;
    }

    pub fn add_filter(&mut self, pred: Predicate) {
        self.filters.push(pred);
    }

    /// Sum/Min/Max over a string column are rejected here; Count reads no
    /// values and is accepted on any column.
    pub fn set_aggregation(&mut self, func: AggFunc, column: impl Into<String>) -> Result<()> {
        let column = column.into();
        let schema = self.reader.schema();
        let idx = schema
            .column_index(&column)
            .ok_or_else(|| SchemaError::UnknownColumn {
                name: column.clone(),
            })?;
        if func != AggFunc::Count && schema.columns()[idx].ty == ColumnType::String {
            #[allow(clippy::useless_conversion)]
            return Err(QueryError::StringAggregation { func, column }.into());
        }
        self.aggregation = Some((func, column));
        Ok(())
    }

    pub fn set_group_by(&mut self, column: impl Into<String>) -> Result<()> {
        let column = column.into();
        if self.reader.schema().column_index(&column).is_none() {
            #[allow(clippy::useless_conversion)]
            return Err(QueryError::Schema(SchemaError::UnknownColumn { name: column }).into());
        }
        self.group_by = Some(column);
        Ok(())
    }

    fn scan(&mut self, columns: &[String]) -> Result<Scanner<'_>> {
        let mut scanner = Scanner::new(self.reader, columns, DEFAULT_BATCH_SIZE)?;
        for pred in &self.filters {
            scanner.add_filter(pred.clone());
        }
        Ok(scanner)
    }

    /// All surviving batches, projection applied.
    pub fn execute_query(&mut self) -> Result<Vec<Batch>> {
        let projection = self.projection.clone();
        let mut scanner = self.scan(&projection)?;
        let mut batches = Vec::new();
        while scanner.has_next() {
            batches.push(scanner.next()?);
        }
        Ok(batches)
    }

    /// Folds the filtered scan into a single aggregate.
    pub fn execute_aggregate(&mut self) -> Result<AggResult> {
        let (func, column) = self
            .aggregation
            .clone()
            .ok_or(QueryError::MissingAggregation)?;

        let mut scanner = self.scan(std::slice::from_ref(&column))?;
        let mut result = AggResult::default();
        while scanner.has_next() {
            let batch = scanner.next()?;
            let data = batch.column(&column).expect("aggregate column projected");
            fold_batch(&mut result, func, data, batch.num_rows);
        }
        Ok(result)
    }

    /// Groups the filtered rows by one column (string, or integer
    /// stringified) and aggregates per group. With no aggregation
    /// configured each group carries its row count. Result order is
    /// unspecified.
    pub fn execute_group_by(&mut self) -> Result<Vec<(String, AggResult)>> {
        let group_column = self.group_by.clone().ok_or(QueryError::MissingGroupBy)?;
        let (func, agg_column) = match &self.aggregation {
            Some((func, column)) => (*func, Some(column.clone())),
            None => (AggFunc::Count, None),
        };

        let mut columns = vec![group_column.clone()];
        if let Some(agg) = &agg_column {
            if *agg != group_column {
                columns.push(agg.clone());
            }
        }

        let mut scanner = self.scan(&columns)?;
        let mut groups: HashMap<String, AggResult> = HashMap::new();
        while scanner.has_next() {
            let batch = scanner.next()?;
            let keys = batch.column(&group_column).expect("group column projected");
            let agg_data = agg_column
                .as_ref()
                .map(|c| batch.column(c).expect("aggregate column projected"));
            for row in 0..batch.num_rows {
                let key = group_key(keys, row);
                let value = agg_data.and_then(|d| d.int_at(row));
                groups.entry(key).or_default().update(func, value);
            }
        }
        Ok(groups.into_iter().collect())
    }
}

fn group_key(column: &ColumnData, row: usize) -> String {
    match column {
        ColumnData::Int32(v) => v[row].to_string(),
        ColumnData::Int64(v) => v[row].to_string(),
        ColumnData::Str(v) => v[row].clone(),
    }
}

/// Batch-at-a-time fold: Count touches only the row count, Sum/Min/Max
/// also read the values.
fn fold_batch(result: &mut AggResult, func: AggFunc, data: &ColumnData, num_rows: usize) {
    result.count += num_rows as i64;
    match func {
        AggFunc::Count => {}
        AggFunc::Sum => {
            for row in 0..num_rows {
                if let Some(v) = data.int_at(row) {
                    result.sum += i128::from(v);
                }
            }
        }
        AggFunc::Min => {
            for row in 0..num_rows {
                if let Some(v) = data.int_at(row) {
                    result.min = Some(result.min.map_or(v, |m| m.min(v)));
                }
            }
        }
        AggFunc::Max => {
            for row in 0..num_rows {
                if let Some(v) = data.int_at(row) {
                    result.max = Some(result.max.map_or(v, |m| m.max(v)));
                }
            }
        }
    }
}
