//! File writer: buffers one row-group of column data in memory, encodes
//! each column chunk on flush, and finalizes the file with metadata and
//! footer on close.

pub mod error;

pub use error::Result;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::encoding;
use crate::format::serialize::WriteLe;
use crate::format::{
    ColumnChunkMeta, ColumnType, FileMetadata, PageHeader, PageStats, RowGroupMeta, Schema,
    SchemaError, FILE_HEADER_SIZE, FILE_MAGIC, FOOTER_MAGIC, FORMAT_VERSION_MAJOR,
    FORMAT_VERSION_MINOR, PAGE_HEADER_SIZE,
};

use error::EncoderError;

/// Row-group row-count cap. The writer flushes automatically once every
/// column buffer is aligned at or past this many rows.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10_000;

#[derive(Debug, Clone)]
enum ColumnBuffer {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Str(Vec<String>),
}

impl ColumnBuffer {
    fn new(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int32 => ColumnBuffer::Int32(Vec::new()),
            ColumnType::Int64 => ColumnBuffer::Int64(Vec::new()),
            ColumnType::String => ColumnBuffer::Str(Vec::new()),
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnBuffer::Int32(v) => v.len(),
            ColumnBuffer::Int64(v) => v.len(),
            ColumnBuffer::Str(v) => v.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            ColumnBuffer::Int32(v) => v.clear(),
            ColumnBuffer::Int64(v) => v.clear(),
            ColumnBuffer::Str(v) => v.clear(),
        }
    }
}

/// A writer for the file format. Owns the output handle exclusively from
/// construction until [`close`](FileWriter::close); dropping an unclosed
/// writer leaves the file unterminated (no footer).
pub struct FileWriter {
    output: Option<BufWriter<File>>,
    schema: Schema,
    buffers: Vec<ColumnBuffer>,
    row_groups: Vec<RowGroupMeta>,
    /// Running absolute byte offset of the next write.
    offset: u64,
    total_rows: u32,
    row_group_size: usize,
}

impl FileWriter {
    /// Creates the file and writes the header. The schema is already
    /// validated by [`Schema::new`].
    pub fn create(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        let mut output = BufWriter::new(File::create(path)?);
        output.write_all(&FILE_MAGIC.to_le_bytes())?;
        output.write_all(&FORMAT_VERSION_MAJOR.to_le_bytes())?;
        output.write_all(&FORMAT_VERSION_MINOR.to_le_bytes())?;

        let buffers = schema.columns().iter().map(|c| ColumnBuffer::new(c.ty)).collect();

        Ok(Self {
            output: Some(output),
            schema,
            buffers,
            row_groups: Vec::new(),
            offset: FILE_HEADER_SIZE,
            total_rows: 0,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn set_row_group_size(&mut self, rows: usize) {
        self.row_group_size = rows.max(1);
    }

    /// Rows buffered in the current (unflushed) row group.
    pub fn buffered_rows(&self) -> usize {
        self.buffers.iter().map(ColumnBuffer::len).max().unwrap_or(0)
    }

    pub fn write_i32_column(&mut self, col_idx: usize, values: &[i32]) -> Result<()> {
        self.check_open()?;
        let col = self.schema.column(col_idx)?;
        match &mut self.buffers[col_idx] {
            ColumnBuffer::Int32(buf) => buf.extend_from_slice(values),
            _ => {
                #[allow(clippy::useless_conversion)]
                return Err(EncoderError::Schema(SchemaError::TypeMismatch {
                    name: col.name.clone(),
                    expected: col.ty,
                    found: ColumnType::Int32,
                })
                .into());
            }
        }
        self.maybe_flush()
    }

    pub fn write_i64_column(&mut self, col_idx: usize, values: &[i64]) -> Result<()> {
        self.check_open()?;
        let col = self.schema.column(col_idx)?;
        match &mut self.buffers[col_idx] {
            ColumnBuffer::Int64(buf) => buf.extend_from_slice(values),
            _ => {
                #[allow(clippy::useless_conversion)]
                return Err(EncoderError::Schema(SchemaError::TypeMismatch {
                    name: col.name.clone(),
                    expected: col.ty,
                    found: ColumnType::Int64,
                })
                .into());
            }
        }
        self.maybe_flush()
    }

    pub fn write_string_column(&mut self, col_idx: usize, values: &[String]) -> Result<()> {
        self.check_open()?;
        let col = self.schema.column(col_idx)?;
        match &mut self.buffers[col_idx] {
            ColumnBuffer::Str(buf) => buf.extend_from_slice(values),
            _ => {
                #[allow(clippy::useless_conversion)]
                return Err(EncoderError::Schema(SchemaError::TypeMismatch {
                    name: col.name.clone(),
                    expected: col.ty,
                    found: ColumnType::String,
                })
                .into());
            }
        }
        self.maybe_flush()
    }

    fn check_open(&self) -> Result<()> {
        if self.output.is_none() {
            #[allow(clippy::useless_conversion)]
            return Err(EncoderError::Closed.into());
        }
        Ok(())
    }

    /// Auto-flush once every buffer is row-aligned at or past the cap.
    /// An unaligned state never flushes here, so the alignment check in
    /// [`flush_row_group`](FileWriter::flush_row_group) stays authoritative.
    fn maybe_flush(&mut self) -> Result<()> {
        let Some(first) = self.buffers.first() else {
            return Ok(());
        };
        let len = first.len();
        if len >= self.row_group_size && self.buffers.iter().all(|b| b.len() == len) {
            return self.flush_row_group();
        }
        Ok(())
    }

    /// Encodes every column buffer as one page, writes the pages, records
    /// the row-group metadata, and clears the buffers. Flushing an empty
    /// row group is a no-op. All columns must hold the same number of rows.
    pub fn flush_row_group(&mut self) -> Result<()> {
        self.check_open()?;
        if self.buffers.iter().all(|b| b.len() == 0) {
            return Ok(());
        }

        let num_rows = self.buffers[0].len();
        for (col, buffer) in self.schema.columns().iter().zip(&self.buffers) {
            if buffer.len() != num_rows {
                #[allow(clippy::useless_conversion)]
                return Err(EncoderError::RowCountMismatch {
                    name: col.name.clone(),
                    expected: num_rows,
                    actual: buffer.len(),
                }
                .into());
            }
        }

        let Self {
            output,
            schema,
            buffers,
            row_groups,
            offset,
            total_rows,
            ..
        } = self;
        let out = output.as_mut().expect("checked open above");

        let mut column_chunks = Vec::with_capacity(buffers.len());
        for (col, buffer) in schema.columns().iter().zip(buffers.iter_mut()) {
            let (page, stats, uncompressed_size) = match buffer {
                ColumnBuffer::Int32(values) => {
                    let page = encoding::encode_i32_page(col.encoding, values)?;
                    let stats = PageStats::from_values(
                        values.iter().map(|&v| i64::from(v)),
                        page.distinct_count_estimate,
                    );
                    (page, stats, values.len() * 4)
                }
                ColumnBuffer::Int64(values) => {
                    let page = encoding::encode_i64_page(col.encoding, values)?;
                    let stats = PageStats::from_values(
                        values.iter().copied(),
                        page.distinct_count_estimate,
                    );
                    (page, stats, values.len() * 8)
                }
                ColumnBuffer::Str(values) => {
                    let page = encoding::encode_string_page(col.encoding, values)?;
                    let stats = PageStats::without_bounds(page.distinct_count_estimate);
                    let uncompressed: usize = values.iter().map(|s| 4 + s.len()).sum();
                    (page, stats, uncompressed)
                }
            };

            let header = PageHeader {
                uncompressed_size: uncompressed_size as u32,
                compressed_size: page.data.len() as u32,
                num_values: num_rows as u32,
                encoding: col.encoding,
                stats,
            };

            let chunk_offset = *offset;
            header.write_le(out)?;
            out.write_all(&page.data)?;
            let chunk_size = (PAGE_HEADER_SIZE + page.data.len()) as u64;
            *offset += chunk_size;

            column_chunks.push(ColumnChunkMeta::new(chunk_offset, chunk_size, vec![header]));
            buffer.clear();
        }

        row_groups.push(RowGroupMeta::new(num_rows as u32, column_chunks));
        *total_rows += num_rows as u32;
        Ok(())
    }

    /// Flushes any buffered row group, writes the metadata block and the
    /// footer, and releases the handle. A second close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.output.is_none() {
            return Ok(());
        }
        if self.buffers.iter().any(|b| b.len() > 0) {
            self.flush_row_group()?;
        }

        let metadata_offset = self.offset;
        let metadata = FileMetadata::new(
            self.schema.clone(),
            std::mem::take(&mut self.row_groups),
            self.total_rows,
        );

        let mut out = self.output.take().expect("checked open above");
        metadata.write_le(&mut out)?;
        out.write_all(&FOOTER_MAGIC.to_le_bytes())?;
        out.write_all(&metadata_offset.to_le_bytes())?;
        out.flush()?;
        Ok(())
    }
}
