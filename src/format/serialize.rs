//! Little-endian serialization of the format structs.

use std::io::{self, Write};

use super::{ColumnChunkMeta, ColumnSchema, FileMetadata, PageHeader, PageStats, RowGroupMeta};

/// A trait for writing a struct to a stream in the on-disk byte order.
pub trait WriteLe {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

impl WriteLe for PageStats {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[self.min.is_some() as u8])?;
        w.write_all(&self.min.unwrap_or(0).to_le_bytes())?;
        w.write_all(&[self.max.is_some() as u8])?;
        w.write_all(&self.max.unwrap_or(0).to_le_bytes())?;
        w.write_all(&self.null_count.to_le_bytes())?;
        w.write_all(&self.distinct_count_estimate.to_le_bytes())
    }
}

impl WriteLe for PageHeader {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.uncompressed_size.to_le_bytes())?;
        w.write_all(&self.compressed_size.to_le_bytes())?;
        w.write_all(&self.num_values.to_le_bytes())?;
        w.write_all(&[self.encoding as u8])?;
        self.stats.write_le(w)
    }
}

impl WriteLe for ColumnSchema {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&(self.name.len() as u32).to_le_bytes())?;
        w.write_all(self.name.as_bytes())?;
        w.write_all(&[self.ty as u8, self.encoding as u8])
    }
}

impl WriteLe for ColumnChunkMeta {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.file_offset().to_le_bytes())?;
        w.write_all(&self.total_size().to_le_bytes())?;
        w.write_all(&(self.page_headers().len() as u32).to_le_bytes())?;
        for page in self.page_headers() {
            page.write_le(w)?;
        }
        Ok(())
    }
}

impl WriteLe for RowGroupMeta {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.num_rows().to_le_bytes())?;
        for chunk in self.column_chunks() {
            chunk.write_le(w)?;
        }
        Ok(())
    }
}

impl WriteLe for FileMetadata {
    fn write_le<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&(self.schema().len() as u32).to_le_bytes())?;
        for col in self.schema().columns() {
            col.write_le(w)?;
        }
        w.write_all(&(self.row_groups().len() as u32).to_le_bytes())?;
        for rg in self.row_groups() {
            rg.write_le(w)?;
        }
        w.write_all(&self.total_rows().to_le_bytes())
    }
}
