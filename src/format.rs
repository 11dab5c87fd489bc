//! Structs for interpreting the on-disk file format.
//! All multi-byte integers are laid out little-endian; strings are UTF-8.
//!
//! ```text
//! // ================= File =====================
//! File       := Header Page* Metadata Footer
//!
//! Header     := u32 FILE_MAGIC ("COLE")
//!               u16 version_major
//!               u16 version_minor
//!
//! // Pages are written in row-group order, column-major within a group.
//! Page       := PageHeader PageData
//! PageHeader := u32 uncompressed_size
//!               u32 compressed_size
//!               u32 num_values
//!               u8  encoding
//!               PageStats
//! PageStats  := u8 has_min, i64 min
//!               u8 has_max, i64 max
//!               u32 null_count
//!               u32 distinct_count_estimate
//!
//! Metadata   := u32 num_cols (u32 name_len, name, u8 type, u8 encoding)^num_cols
//!               u32 num_row_groups (RowGroupMeta)^num_row_groups
//!               u32 total_rows
//! RowGroupMeta    := u32 num_rows (ColumnChunkMeta)^num_cols
//! ColumnChunkMeta := u64 file_offset u64 total_size
//!                    u32 num_pages (PageHeader)^num_pages
//!
//! Footer     := u32 FOOTER_MAGIC ("FOOT") u64 metadata_offset
//! ```
//!
//! `file_offset` points at the chunk's first on-disk page header;
//! `total_size` covers page headers and page data.

use derive_getters::Getters;
use num_enum::TryFromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod deserialize;
pub mod serialize;

/// "COLE", little-endian.
pub const FILE_MAGIC: u32 = 0x454C_4F43;
/// "FOOT", little-endian.
pub const FOOTER_MAGIC: u32 = 0x464F_4F54;

pub const FORMAT_VERSION_MAJOR: u16 = 1;
pub const FORMAT_VERSION_MINOR: u16 = 0;

/// magic + major + minor
pub const FILE_HEADER_SIZE: u64 = 8;
/// footer magic + metadata offset
pub const FOOTER_SIZE: u64 = 12;
/// Header plus footer plus at least an empty metadata block.
pub const MIN_FILE_SIZE: u64 = 20;

/// Serialized size of [`PageStats`].
pub const PAGE_STATS_SIZE: usize = 26;
/// Serialized size of [`PageHeader`].
pub const PAGE_HEADER_SIZE: usize = 13 + PAGE_STATS_SIZE;

#[derive(TryFromPrimitive, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ColumnType {
    Int32 = 0,
    Int64 = 1,
    String = 2,
}

#[derive(TryFromPrimitive, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Encoding {
    Plain = 0,
    Rle = 1,
    Delta = 2,
    Dictionary = 3,
}

impl Encoding {
    /// The allowed type/encoding matrix: integers take Plain/Rle/Delta,
    /// strings take Plain/Dictionary.
    pub fn supports(self, ty: ColumnType) -> bool {
        match ty {
            ColumnType::Int32 | ColumnType::Int64 => {
                matches!(self, Encoding::Plain | Encoding::Rle | Encoding::Delta)
            }
            ColumnType::String => matches!(self, Encoding::Plain | Encoding::Dictionary),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate column name {name:?}")]
    DuplicateColumn { name: String },
    #[error("unsupported encoding {encoding:?} for {ty:?} column {name:?}")]
    UnsupportedEncoding {
        name: String,
        ty: ColumnType,
        encoding: Encoding,
    },
    #[error("unknown column {name:?}")]
    UnknownColumn { name: String },
    #[error("column index {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },
    #[error("row group index {index} out of range ({count} row groups)")]
    RowGroupOutOfRange { index: usize, count: usize },
    #[error("column {name:?} is {expected:?}, got {found:?} values")]
    TypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnSchema {
    pub name: String,
    pub ty: ColumnType,
    pub encoding: Encoding,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, ty: ColumnType, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            ty,
            encoding,
        }
    }
}

/// Ordered column list. Column indices are stable; lookup by name resolves
/// to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    /// Validates uniqueness of names and the type/encoding matrix.
    pub fn new(columns: Vec<ColumnSchema>) -> Result<Self, SchemaError> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SchemaError::DuplicateColumn {
                    name: col.name.clone(),
                });
            }
            if !col.encoding.supports(col.ty) {
                return Err(SchemaError::UnsupportedEncoding {
                    name: col.name.clone(),
                    ty: col.ty,
                    encoding: col.encoding,
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, index: usize) -> Result<&ColumnSchema, SchemaError> {
        self.columns.get(index).ok_or(SchemaError::ColumnOutOfRange {
            index,
            count: self.columns.len(),
        })
    }
}

/// Per-page statistics enabling predicate pushdown. Min/max are present for
/// integer pages only; `distinct_count_estimate` is 0 when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageStats {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub null_count: u32,
    pub distinct_count_estimate: u32,
}

impl PageStats {
    /// Stats for a string page: no min/max, only the distinct estimate.
    pub fn without_bounds(distinct_count_estimate: u32) -> Self {
        Self {
            min: None,
            max: None,
            null_count: 0,
            distinct_count_estimate,
        }
    }

    /// Min/max by linear scan over the page's values, widened to i64.
    pub fn from_values(values: impl IntoIterator<Item = i64>, distinct_count_estimate: u32) -> Self {
        let mut min = None;
        let mut max = None;
        for v in values {
            min = Some(match min {
                None => v,
                Some(m) => std::cmp::min(m, v),
            });
            max = Some(match max {
                None => v,
                Some(m) => std::cmp::max(m, v),
            });
        }
        Self {
            min,
            max,
            null_count: 0,
            distinct_count_estimate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    pub num_values: u32,
    pub encoding: Encoding,
    pub stats: PageStats,
}

/// On-disk location of one column within one row group.
#[derive(Getters, Debug, Clone, PartialEq, Eq)]
pub struct ColumnChunkMeta {
    /// Byte offset of the chunk's first page header.
    #[getter(skip)]
    file_offset: u64,
    /// Total on-disk size of the chunk, page headers included.
    #[getter(skip)]
    total_size: u64,
    page_headers: Vec<PageHeader>,
}

impl ColumnChunkMeta {
    pub fn new(file_offset: u64, total_size: u64, page_headers: Vec<PageHeader>) -> Self {
        Self {
            file_offset,
            total_size,
            page_headers,
        }
    }

    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// The number of values across all pages of this chunk.
    pub fn num_values(&self) -> u64 {
        self.page_headers
            .iter()
            .map(|p| u64::from(p.num_values))
            .sum()
    }
}

#[derive(Getters, Debug, Clone, PartialEq, Eq)]
pub struct RowGroupMeta {
    #[getter(skip)]
    num_rows: u32,
    column_chunks: Vec<ColumnChunkMeta>,
}

impl RowGroupMeta {
    pub fn new(num_rows: u32, column_chunks: Vec<ColumnChunkMeta>) -> Self {
        Self {
            num_rows,
            column_chunks,
        }
    }

    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }
}

/// The resident file metadata: schema, row-group list, total row count.
#[derive(Getters, Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    schema: Schema,
    row_groups: Vec<RowGroupMeta>,
    #[getter(skip)]
    total_rows: u32,
}

impl FileMetadata {
    pub fn new(schema: Schema, row_groups: Vec<RowGroupMeta>, total_rows: u32) -> Self {
        Self {
            schema,
            row_groups,
            total_rows,
        }
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    pub fn row_group(&self, index: usize) -> Result<&RowGroupMeta, SchemaError> {
        self.row_groups.get(index).ok_or(SchemaError::RowGroupOutOfRange {
            index,
            count: self.row_groups.len(),
        })
    }
}
