use cfg_if::cfg_if;
use thiserror::Error;

use crate::encoding::EncodingError;
use crate::format::deserialize::ConversionError;
use crate::format::SchemaError;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file too small: {size} bytes, minimum {minimum}")]
    TooSmall { size: u64, minimum: u64 },
    #[error("Invalid file magic: {found:#010x}")]
    InvalidFileMagic { found: u32 },
    #[error("Invalid footer magic: {found:#010x}")]
    InvalidFooterMagic { found: u32 },
    #[error("metadata offset {offset} beyond end of file ({file_size} bytes)")]
    MetadataOffsetOutOfRange { offset: u64, file_size: u64 },
    #[error("Corrupt metadata: {0}")]
    CorruptMetadata(#[from] ConversionError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
}

cfg_if!(
    if #[cfg(debug_assertions)] {
        pub type Result<T> = anyhow::Result<T>;
    } else {
        pub type Result<T> = std::result::Result<T, DecoderError>;
    }
);
