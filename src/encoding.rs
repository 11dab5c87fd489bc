//! Page payload codecs: plain, run-length, delta, dictionary, and the
//! varint primitives they share.
//!
//! Encoders are pure functions over a full page of values. Decoders take
//! the page's payload bytes plus the declared value count and verify both
//! the count and exact byte consumption, so a corrupt page never decodes
//! silently.

use thiserror::Error;

use crate::format::Encoding;

pub mod delta;
pub mod dictionary;
pub mod plain;
pub mod run_length;
pub mod varint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Truncated varint: unexpected end of buffer")]
    Truncated,
    #[error("Varint overflow: more than {max_bytes} bytes for {ty}")]
    Overflow { ty: &'static str, max_bytes: usize },
    #[error("invalid run of length 0")]
    InvalidRun,
    #[error("Invalid dictionary index {index} (dictionary size {dict_size})")]
    InvalidDictIndex { index: i64, dict_size: u32 },
    #[error("page declared {expected} values, decoded {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },
    #[error("{0} trailing bytes after page data")]
    TrailingBytes(usize),
    #[error("invalid UTF-8 in string data")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("page encoding {encoding:?} cannot hold {ty} values")]
    InvalidPageEncoding {
        encoding: Encoding,
        ty: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EncodingError>;

/// Encoded page payload plus the cheap distinct-count estimate the
/// encoding yields for free (dictionary size for dictionary pages, run
/// count for run-length pages, 0 = unknown otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPage {
    pub data: Vec<u8>,
    pub distinct_count_estimate: u32,
}

impl EncodedPage {
    fn opaque(data: Vec<u8>) -> Self {
        Self {
            data,
            distinct_count_estimate: 0,
        }
    }
}

pub fn encode_i32_page(encoding: Encoding, values: &[i32]) -> Result<EncodedPage> {
    Ok(match encoding {
        Encoding::Plain => EncodedPage::opaque(plain::encode_i32(values)),
        Encoding::Rle => {
            let (data, num_runs) = run_length::encode_i32(values);
            EncodedPage {
                data,
                distinct_count_estimate: num_runs,
            }
        }
        Encoding::Delta => EncodedPage::opaque(delta::encode_i32(values)),
        Encoding::Dictionary => {
            return Err(EncodingError::InvalidPageEncoding {
                encoding,
                ty: "i32",
            })
        }
    })
}

pub fn encode_i64_page(encoding: Encoding, values: &[i64]) -> Result<EncodedPage> {
    Ok(match encoding {
        Encoding::Plain => EncodedPage::opaque(plain::encode_i64(values)),
        Encoding::Rle => {
            let (data, num_runs) = run_length::encode_i64(values);
            EncodedPage {
                data,
                distinct_count_estimate: num_runs,
            }
        }
        Encoding::Delta => EncodedPage::opaque(delta::encode_i64(values)),
        Encoding::Dictionary => {
            return Err(EncodingError::InvalidPageEncoding {
                encoding,
                ty: "i64",
            })
        }
    })
}

pub fn encode_string_page(encoding: Encoding, values: &[String]) -> Result<EncodedPage> {
    Ok(match encoding {
        Encoding::Plain => EncodedPage::opaque(plain::encode_strings(values)),
        Encoding::Dictionary => {
            let (data, dict_size) = dictionary::encode(values);
            EncodedPage {
                data,
                distinct_count_estimate: dict_size,
            }
        }
        Encoding::Rle | Encoding::Delta => {
            return Err(EncodingError::InvalidPageEncoding {
                encoding,
                ty: "string",
            })
        }
    })
}

pub fn decode_i32_page(encoding: Encoding, data: &[u8], num_values: usize) -> Result<Vec<i32>> {
    match encoding {
        Encoding::Plain => plain::decode_i32(data, num_values),
        Encoding::Rle => run_length::decode_i32(data, num_values),
        Encoding::Delta => delta::decode_i32(data, num_values),
        Encoding::Dictionary => Err(EncodingError::InvalidPageEncoding {
            encoding,
            ty: "i32",
        }),
    }
}

pub fn decode_i64_page(encoding: Encoding, data: &[u8], num_values: usize) -> Result<Vec<i64>> {
    match encoding {
        Encoding::Plain => plain::decode_i64(data, num_values),
        Encoding::Rle => run_length::decode_i64(data, num_values),
        Encoding::Delta => delta::decode_i64(data, num_values),
        Encoding::Dictionary => Err(EncodingError::InvalidPageEncoding {
            encoding,
            ty: "i64",
        }),
    }
}

pub fn decode_string_page(encoding: Encoding, data: &[u8], num_values: usize) -> Result<Vec<String>> {
    match encoding {
        Encoding::Plain => plain::decode_strings(data, num_values),
        Encoding::Dictionary => dictionary::decode(data, num_values),
        Encoding::Rle | Encoding::Delta => Err(EncodingError::InvalidPageEncoding {
            encoding,
            ty: "string",
        }),
    }
}
