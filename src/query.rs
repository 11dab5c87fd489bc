//! Vectorized query execution over a [`FileReader`](crate::decoder::FileReader):
//! batched scans with predicate pushdown, scalar aggregation, and
//! single-key group-by.

use cfg_if::cfg_if;
use thiserror::Error;

use crate::decoder::error::DecoderError;
use crate::format::SchemaError;

pub mod batch;
pub mod executor;
pub mod predicate;
pub mod scanner;

pub use batch::{Batch, ColumnData};
pub use executor::{AggFunc, AggResult, QueryExecutor};
pub use predicate::{CompareOp, Predicate};
pub use scanner::{Scanner, DEFAULT_BATCH_SIZE};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Decoder(#[from] DecoderError),
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
    #[error("aggregation {func:?} over string column {column:?} is not supported")]
    StringAggregation { func: AggFunc, column: String },
    #[error("filter on string column {column:?} is not supported")]
    StringFilter { column: String },
    #[error("no aggregation configured")]
    MissingAggregation,
    #[error("no group-by column configured")]
    MissingGroupBy,
}

cfg_if!(
    if #[cfg(debug_assertions)] {
        pub type Result<T> = anyhow::Result<T>;
    } else {
        pub type Result<T> = std::result::Result<T, QueryError>;
    }
);
