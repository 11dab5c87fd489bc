//! Bounded little-endian parsing of the format structs.
//!
//! All reads go through [`ByteCursor`], which checks the remaining length
//! before every access, so a truncated metadata region surfaces as a
//! [`ConversionError`] rather than a panic.

use thiserror::Error;

use super::{
    ColumnChunkMeta, ColumnSchema, ColumnType, Encoding, FileMetadata, PageHeader, PageStats,
    RowGroupMeta, Schema, SchemaError,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("metadata ended unexpectedly at byte {0}")]
    UnexpectedEnd(usize),
    #[error("invalid column type tag {0}")]
    InvalidColumnType(u8),
    #[error("invalid encoding tag {0}")]
    InvalidEncoding(u8),
    #[error("column name is not valid UTF-8")]
    InvalidUtf8,
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A cursor over a byte slice with bounds-checked primitive reads.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ConversionError> {
        if self.remaining() < len {
            return Err(ConversionError::UnexpectedEnd(self.pos));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, ConversionError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, ConversionError> {
        Ok(u32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, ConversionError> {
        Ok(u64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64, ConversionError> {
        Ok(i64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap()))
    }
}

/// A trait for constructing format structs from the on-disk byte order.
pub trait TryFromLeBytes: Sized {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError>;
}

impl TryFromLeBytes for PageStats {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError> {
        let has_min = cursor.read_u8()? != 0;
        let min = cursor.read_i64()?;
        let has_max = cursor.read_u8()? != 0;
        let max = cursor.read_i64()?;
        let null_count = cursor.read_u32()?;
        let distinct_count_estimate = cursor.read_u32()?;
        Ok(Self {
            min: has_min.then_some(min),
            max: has_max.then_some(max),
            null_count,
            distinct_count_estimate,
        })
    }
}

impl TryFromLeBytes for PageHeader {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError> {
        let uncompressed_size = cursor.read_u32()?;
        let compressed_size = cursor.read_u32()?;
        let num_values = cursor.read_u32()?;
        let tag = cursor.read_u8()?;
        let encoding = Encoding::try_from(tag).map_err(|_| ConversionError::InvalidEncoding(tag))?;
        let stats = PageStats::try_from_le_bytes(cursor)?;
        Ok(Self {
            uncompressed_size,
            compressed_size,
            num_values,
            encoding,
            stats,
        })
    }
}

impl TryFromLeBytes for ColumnSchema {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError> {
        let name_len = cursor.read_u32()? as usize;
        let name = std::str::from_utf8(cursor.read_bytes(name_len)?)
            .map_err(|_| ConversionError::InvalidUtf8)?
            .to_owned();
        let ty_tag = cursor.read_u8()?;
        let ty =
            ColumnType::try_from(ty_tag).map_err(|_| ConversionError::InvalidColumnType(ty_tag))?;
        let enc_tag = cursor.read_u8()?;
        let encoding =
            Encoding::try_from(enc_tag).map_err(|_| ConversionError::InvalidEncoding(enc_tag))?;
        Ok(Self { name, ty, encoding })
    }
}

impl TryFromLeBytes for ColumnChunkMeta {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError> {
        let file_offset = cursor.read_u64()?;
        let total_size = cursor.read_u64()?;
        let num_pages = cursor.read_u32()? as usize;
        let mut page_headers = Vec::with_capacity(num_pages.min(cursor.remaining()));
        for _ in 0..num_pages {
            page_headers.push(PageHeader::try_from_le_bytes(cursor)?);
        }
        Ok(Self::new(file_offset, total_size, page_headers))
    }
}

impl TryFromLeBytes for FileMetadata {
    fn try_from_le_bytes(cursor: &mut ByteCursor<'_>) -> Result<Self, ConversionError> {
        let num_cols = cursor.read_u32()? as usize;
        let mut columns = Vec::with_capacity(num_cols.min(cursor.remaining()));
        for _ in 0..num_cols {
            columns.push(ColumnSchema::try_from_le_bytes(cursor)?);
        }
        let schema = Schema::new(columns)?;

        let num_row_groups = cursor.read_u32()? as usize;
        let mut row_groups = Vec::with_capacity(num_row_groups.min(cursor.remaining()));
        for _ in 0..num_row_groups {
            let num_rows = cursor.read_u32()?;
            let mut column_chunks = Vec::with_capacity(schema.len());
            for _ in 0..schema.len() {
                column_chunks.push(ColumnChunkMeta::try_from_le_bytes(cursor)?);
            }
            row_groups.push(RowGroupMeta::new(num_rows, column_chunks));
        }
        let total_rows = cursor.read_u32()?;

        Ok(Self::new(schema, row_groups, total_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::serialize::WriteLe;

    #[test]
    fn page_stats_round_trip() {
        let stats = PageStats {
            min: Some(-5),
            max: Some(120),
            null_count: 0,
            distinct_count_estimate: 7,
        };
        let mut buf = Vec::new();
        stats.write_le(&mut buf).unwrap();
        assert_eq!(buf.len(), crate::format::PAGE_STATS_SIZE);

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(PageStats::try_from_le_bytes(&mut cursor).unwrap(), stats);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn absent_bounds_round_trip() {
        let stats = PageStats::without_bounds(3);
        let mut buf = Vec::new();
        stats.write_le(&mut buf).unwrap();
        let mut cursor = ByteCursor::new(&buf);
        let parsed = PageStats::try_from_le_bytes(&mut cursor).unwrap();
        assert_eq!(parsed.min, None);
        assert_eq!(parsed.max, None);
        assert_eq!(parsed.distinct_count_estimate, 3);
    }

    #[test]
    fn metadata_round_trip() {
        let schema = Schema::new(vec![
            ColumnSchema::new("id", ColumnType::Int64, Encoding::Plain),
            ColumnSchema::new("city", ColumnType::String, Encoding::Dictionary),
        ])
        .unwrap();
        let page = PageHeader {
            uncompressed_size: 40,
            compressed_size: 12,
            num_values: 5,
            encoding: Encoding::Plain,
            stats: PageStats::from_values([1i64, 5], 0),
        };
        let meta = FileMetadata::new(
            schema,
            vec![RowGroupMeta::new(
                5,
                vec![
                    ColumnChunkMeta::new(8, 51, vec![page]),
                    ColumnChunkMeta::new(59, 80, vec![page]),
                ],
            )],
            5,
        );

        let mut buf = Vec::new();
        meta.write_le(&mut buf).unwrap();
        let mut cursor = ByteCursor::new(&buf);
        let parsed = FileMetadata::try_from_le_bytes(&mut cursor).unwrap();
        assert_eq!(parsed, meta);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn truncated_metadata_is_rejected() {
        let schema = Schema::new(vec![ColumnSchema::new(
            "id",
            ColumnType::Int32,
            Encoding::Plain,
        )])
        .unwrap();
        let meta = FileMetadata::new(schema, Vec::new(), 0);
        let mut buf = Vec::new();
        meta.write_le(&mut buf).unwrap();

        for len in 0..buf.len() - 1 {
            let mut cursor = ByteCursor::new(&buf[..len]);
            assert!(
                FileMetadata::try_from_le_bytes(&mut cursor).is_err(),
                "prefix of {len} bytes parsed"
            );
        }
    }
}
