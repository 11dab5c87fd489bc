//! File reader: validates the header, footer, and metadata region at open
//! time, keeps the metadata resident, and decodes column chunks on demand.

pub mod error;

pub use error::Result;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::encoding;
use crate::format::deserialize::{ByteCursor, TryFromLeBytes};
use crate::format::{
    ColumnChunkMeta, ColumnType, Encoding, FileMetadata, Schema, SchemaError, FILE_HEADER_SIZE,
    FILE_MAGIC, FOOTER_MAGIC, FOOTER_SIZE, MIN_FILE_SIZE, PAGE_HEADER_SIZE,
};

use error::DecoderError;

/// A reader for the file format. Holds exactly one read handle; column
/// reads seek it, so concurrent reads through one reader must be
/// serialized by the caller. Multiple readers on the same path are fine.
#[derive(Debug)]
pub struct FileReader {
    file: File,
    metadata: FileMetadata,
    version: (u16, u16),
}

impl FileReader {
    /// Opens and validates the file: minimum size, header magic, footer
    /// magic, metadata offset bounds, then a full metadata parse. The
    /// metadata stays resident for the reader's lifetime.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();
        if file_size < MIN_FILE_SIZE {
            #[allow(clippy::useless_conversion)]
            return Err(DecoderError::TooSmall {
                size: file_size,
                minimum: MIN_FILE_SIZE,
            }
            .into());
        }

        let mut header = [0u8; FILE_HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        let magic = u32::from_le_bytes(header[0..4].try_into().unwrap());
        if magic != FILE_MAGIC {
            #[allow(clippy::useless_conversion)]
            return Err(DecoderError::InvalidFileMagic { found: magic }.into());
        }
        let version = (
            u16::from_le_bytes(header[4..6].try_into().unwrap()),
            u16::from_le_bytes(header[6..8].try_into().unwrap()),
        );

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;
        let footer_magic = u32::from_le_bytes(footer[0..4].try_into().unwrap());
        if footer_magic != FOOTER_MAGIC {
            #[allow(clippy::useless_conversion)]
            return Err(DecoderError::InvalidFooterMagic { found: footer_magic }.into());
        }
        let metadata_offset = u64::from_le_bytes(footer[4..12].try_into().unwrap());
        if metadata_offset < FILE_HEADER_SIZE || metadata_offset >= file_size - FOOTER_SIZE {
            #[allow(clippy::useless_conversion)]
            return Err(DecoderError::MetadataOffsetOutOfRange {
                offset: metadata_offset,
                file_size,
            }
            .into());
        }

        let metadata_len = (file_size - FOOTER_SIZE - metadata_offset) as usize;
        file.seek(SeekFrom::Start(metadata_offset))?;
        let mut buf = vec![0u8; metadata_len];
        file.read_exact(&mut buf)?;
        let mut cursor = ByteCursor::new(&buf);
        let metadata =
            FileMetadata::try_from_le_bytes(&mut cursor).map_err(DecoderError::CorruptMetadata)?;

        Ok(Self {
            file,
            metadata,
            version,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.metadata.schema()
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// (major, minor) from the file header.
    pub fn format_version(&self) -> (u16, u16) {
        self.version
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.row_groups().len()
    }

    pub fn total_rows(&self) -> u32 {
        self.metadata.total_rows()
    }

    pub fn read_i32_column(&mut self, row_group_idx: usize, col_idx: usize) -> Result<Vec<i32>> {
        let Self { file, metadata, .. } = self;
        let chunk = locate_chunk(metadata, row_group_idx, col_idx, ColumnType::Int32)?;
        read_pages(file, chunk, encoding::decode_i32_page)
    }

    pub fn read_i64_column(&mut self, row_group_idx: usize, col_idx: usize) -> Result<Vec<i64>> {
        let Self { file, metadata, .. } = self;
        let chunk = locate_chunk(metadata, row_group_idx, col_idx, ColumnType::Int64)?;
        read_pages(file, chunk, encoding::decode_i64_page)
    }

    pub fn read_string_column(
        &mut self,
        row_group_idx: usize,
        col_idx: usize,
    ) -> Result<Vec<String>> {
        let Self { file, metadata, .. } = self;
        let chunk = locate_chunk(metadata, row_group_idx, col_idx, ColumnType::String)?;
        read_pages(file, chunk, encoding::decode_string_page)
    }
}

fn locate_chunk<'a>(
    metadata: &'a FileMetadata,
    row_group_idx: usize,
    col_idx: usize,
    requested: ColumnType,
) -> error::Result<&'a ColumnChunkMeta> {
    let col = metadata.schema().column(col_idx)?;
    if col.ty != requested {
        #[allow(clippy::useless_conversion)]
        return Err(DecoderError::Schema(SchemaError::TypeMismatch {
            name: col.name.clone(),
            expected: col.ty,
            found: requested,
        })
        .into());
    }
    let row_group = metadata.row_group(row_group_idx)?;
    Ok(&row_group.column_chunks()[col_idx])
}

/// Walks the chunk's pages: skips each on-disk page header, reads exactly
/// `compressed_size` payload bytes, decodes with the page's declared
/// encoding, and accumulates `num_values` values per page.
fn read_pages<T>(
    file: &mut File,
    chunk: &ColumnChunkMeta,
    decode: impl Fn(Encoding, &[u8], usize) -> encoding::Result<Vec<T>>,
) -> error::Result<Vec<T>> {
    let mut out = Vec::with_capacity(chunk.num_values() as usize);
    let mut pos = chunk.file_offset();
    for page in chunk.page_headers() {
        let data_offset = pos + PAGE_HEADER_SIZE as u64;
        file.seek(SeekFrom::Start(data_offset))?;
        let mut data = vec![0u8; page.compressed_size as usize];
        file.read_exact(&mut data)?;
        out.extend(decode(page.encoding, &data, page.num_values as usize)?);
        pos = data_offset + u64::from(page.compressed_size);
    }
    Ok(out)
}
