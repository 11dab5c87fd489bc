use cfg_if::cfg_if;
use thiserror::Error;

use crate::encoding::EncodingError;
use crate::format::SchemaError;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("column {name:?} has {actual} buffered values, row group expects {expected}")]
    RowCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("writer is already closed")]
    Closed,
}

cfg_if!(
    if #[cfg(debug_assertions)] {
        pub type Result<T> = anyhow::Result<T>;
    } else {
        pub type Result<T> = std::result::Result<T, EncoderError>;
    }
);
