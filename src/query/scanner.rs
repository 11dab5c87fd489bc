//! Batched scans over a reader: one row-group per step, page statistics
//! consulted before decode, predicate masks folded over a roaring bitmap.

use roaring::RoaringBitmap;

use crate::decoder::FileReader;
use crate::format::{ColumnType, SchemaError};

use super::batch::{Batch, ColumnData};
use super::predicate::Predicate;
use super::{QueryError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// A single-pass scan over a reader. Borrows the reader for its lifetime
/// and only advances its own cursor; to re-scan, construct a new scanner.
pub struct Scanner<'a> {
    reader: &'a mut FileReader,
    /// Schema indices of the columns materialized into batches.
    selected: Vec<usize>,
    filters: Vec<Predicate>,
    batch_size: usize,
    row_group_idx: usize,
}

impl<'a> Scanner<'a> {
    /// An empty `columns` list selects every column. Unknown names fail
    /// construction.
    pub fn new(reader: &'a mut FileReader, columns: &[String], batch_size: usize) -> Result<Self> {
        let schema = reader.schema();
        let selected = if columns.is_empty() {
            (0..schema.len()).collect()
        } else {
            columns
                .iter()
                .map(|name| {
                    schema
                        .column_index(name)
                        .ok_or_else(|| SchemaError::UnknownColumn { name: name.clone() })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(Self {
            reader,
            selected,
            filters: Vec::new(),
            batch_size,
            row_group_idx: 0,
        })
    }

    /// Filters are conjunctive and applied in declaration order.
    pub fn add_filter(&mut self, pred: Predicate) {
        self.filters.push(pred);
    }

    /// The advisory batch size. The scanner currently emits one batch per
    /// surviving row group; callers must only rely on the total row count
    /// across the stream.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn has_next(&self) -> bool {
        self.row_group_idx < self.reader.num_row_groups()
    }

    /// Produces the batch for the next row group that survives page
    /// skipping. Row order equals write order. When every remaining row
    /// group is skipped, returns an empty batch.
    pub fn next(&mut self) -> Result<Batch> {
        loop {
            if !self.has_next() {
                return Ok(self.empty_batch());
            }
            let rg = self.row_group_idx;

            // Everything the decode phase needs, resolved up front so the
            // metadata borrow ends before the reads start.
            let plan = self.plan_row_group(rg)?;
            let Some(plan) = plan else {
                // proven unsatisfiable from page-0 stats
                self.row_group_idx += 1;
                continue;
            };

            let mut decoded: Vec<Option<ColumnData>> = vec![None; plan.types.len()];
            for &(idx, ty) in &plan.needed {
                let data = match ty {
                    ColumnType::Int32 => ColumnData::Int32(self.reader.read_i32_column(rg, idx)?),
                    ColumnType::Int64 => ColumnData::Int64(self.reader.read_i64_column(rg, idx)?),
                    ColumnType::String => {
                        ColumnData::Str(self.reader.read_string_column(rg, idx)?)
                    }
                };
                decoded[idx] = Some(data);
            }

            // AND-fold the predicate masks in declaration order.
            let mut mask = RoaringBitmap::new();
            mask.insert_range(0..plan.num_rows);
            for (pred, &col_idx) in self.filters.iter().zip(&plan.filter_columns) {
                let column = decoded[col_idx].as_ref().expect("filter column decoded");
                let mut pred_mask = RoaringBitmap::new();
                for row in 0..plan.num_rows {
                    let value = column.int_at(row as usize).ok_or_else(|| {
                        QueryError::StringFilter {
                            column: pred.column.clone(),
                        }
                    })?;
                    if pred.eval(value) {
                        pred_mask.insert(row);
                    }
                }
                mask &= pred_mask;
            }

            let batch = self.gather(&decoded, &mask);
            self.row_group_idx += 1;
            return Ok(batch);
        }
    }

    fn empty_batch(&self) -> Batch {
        let schema = self.reader.schema();
        Batch {
            columns: self
                .selected
                .iter()
                .map(|&i| ColumnData::empty(schema.columns()[i].ty))
                .collect(),
            column_names: self
                .selected
                .iter()
                .map(|&i| schema.columns()[i].name.clone())
                .collect(),
            num_rows: 0,
        }
    }

    /// Resolves filter columns, checks page-0 statistics, and returns the
    /// decode plan, or `None` when some predicate proves the row group
    /// cannot contain a match.
    fn plan_row_group(&self, rg: usize) -> Result<Option<RowGroupPlan>> {
        let metadata = self.reader.metadata();
        let schema = metadata.schema();
        let rg_meta = metadata.row_group(rg)?;

        let mut filter_columns = Vec::with_capacity(self.filters.len());
        for pred in &self.filters {
            let idx = schema
                .column_index(&pred.column)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    name: pred.column.clone(),
                })?;
            filter_columns.push(idx);

            let first_page = rg_meta.column_chunks()[idx].page_headers().first();
            if first_page.is_some_and(|page| pred.can_skip_page(&page.stats)) {
                return Ok(None);
            }
        }

        let mut needed: Vec<(usize, ColumnType)> = Vec::new();
        for &idx in self.selected.iter().chain(&filter_columns) {
            if !needed.iter().any(|&(i, _)| i == idx) {
                needed.push((idx, schema.columns()[idx].ty));
            }
        }

        Ok(Some(RowGroupPlan {
            num_rows: rg_meta.num_rows(),
            types: schema.columns().iter().map(|c| c.ty).collect(),
            needed,
            filter_columns,
        }))
    }

    /// Materializes the surviving rows of the selected columns.
    fn gather(&self, decoded: &[Option<ColumnData>], mask: &RoaringBitmap) -> Batch {
        let schema = self.reader.schema();
        let mut columns = Vec::with_capacity(self.selected.len());
        let mut column_names = Vec::with_capacity(self.selected.len());
        for &idx in &self.selected {
            let source = decoded[idx].as_ref().expect("selected column decoded");
            let column = match source {
                ColumnData::Int32(values) => {
                    ColumnData::Int32(mask.iter().map(|row| values[row as usize]).collect())
                }
                ColumnData::Int64(values) => {
                    ColumnData::Int64(mask.iter().map(|row| values[row as usize]).collect())
                }
                ColumnData::Str(values) => {
                    ColumnData::Str(mask.iter().map(|row| values[row as usize].clone()).collect())
                }
            };
            columns.push(column);
            column_names.push(schema.columns()[idx].name.clone());
        }
        Batch {
            columns,
            column_names,
            num_rows: mask.len() as usize,
        }
    }
}

struct RowGroupPlan {
    num_rows: u32,
    /// Element types by schema position, sizing the decode scratch table.
    types: Vec<ColumnType>,
    /// (schema index, type) of every column to decode: selection plus
    /// filter-only columns, deduplicated.
    needed: Vec<(usize, ColumnType)>,
    /// Schema index of each filter's column, in filter order.
    filter_columns: Vec<usize>,
}
