//! The IND index codec.
//!
//! An index file summarizes a set of archives living in one directory:
//! for each archive it stores the name, the per-entry name checksums, and
//! the per-entry (offset, size) pairs mirroring that archive's file
//! table.  It owns no payload bytes.
//!
//! Layout: a count field (`archive count * 2`), a table of
//! (name offset, info offset) pairs, one trailing total-size slot, then
//! the records themselves.  Each record's name is zero-padded out to a
//! 4-byte-aligned absolute offset (minimum padded length 8), measured
//! from the record's own position in the file.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::archive::Archive;
use crate::error::{Error, Result};
use crate::io_stream::{Endian, EndianReader, EndianWriter};

// ── IndexFileInfo ─────────────────────────────────────────────────────────────

/// Offset/size of one archive entry, shadowed into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexFileInfo {
    pub offset: i32,
    pub size:   i32,
}

// ── IndexRecord ───────────────────────────────────────────────────────────────

/// One archive's summary: name plus checksum and offset/size lists
/// parallel to the archive's entries.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub name:  String,
    pub crcs:  Vec<u32>,
    pub files: Vec<IndexFileInfo>,
    /// Absolute stream offset this record decodes/encodes at; the name
    /// padding is aligned relative to it.
    base_offset: i32,
}

impl IndexRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crcs: Vec::new(),
            files: Vec::new(),
            base_offset: 0,
        }
    }

    /// Lowercased name truncated to 8 characters; the archive behind this
    /// record lives at `<base>/<short name>.arc`.
    pub fn short_name(&self) -> String {
        let end = self.name.len().min(8);
        self.name[..end].to_ascii_lowercase()
    }

    /// Serialized size at the record's current base offset.
    pub fn byte_len(&self) -> usize {
        let padded = padded_name_len(self.base_offset, self.name.len());
        padded as usize + 4 + self.crcs.len() * 4 + self.files.len() * 8
    }

    fn import<R: Read + Seek>(reader: &mut EndianReader<R>, base_offset: i32) -> Result<Self> {
        let name = reader.read_cstr()?;
        let padded = padded_name_len(base_offset, name.len());
        for _ in 0..padded - name.len() as i32 - 1 {
            reader.read_u8()?;
        }

        let file_count = reader.read_i32()?;
        let mut crcs = Vec::new();
        for _ in 0..file_count {
            crcs.push(reader.read_u32()?);
        }
        let mut files = Vec::new();
        for _ in 0..file_count {
            files.push(IndexFileInfo {
                offset: reader.read_i32()?,
                size:   reader.read_i32()?,
            });
        }
        Ok(Self { name, crcs, files, base_offset })
    }

    fn export<W: Write + Seek>(&self, writer: &mut EndianWriter<W>) -> Result<()> {
        writer.write_cstr(&self.name)?;
        let padded = padded_name_len(self.base_offset, self.name.len());
        for _ in 0..padded - self.name.len() as i32 - 1 {
            writer.write_u8(0)?;
        }

        writer.write_i32(self.crcs.len() as i32)?;
        for &crc in &self.crcs {
            writer.write_u32(crc)?;
        }
        for info in &self.files {
            writer.write_i32(info.offset)?;
            writer.write_i32(info.size)?;
        }
        Ok(())
    }
}

/// Name-field length padded so that `base_offset + len` is 4-byte
/// aligned, never shorter than 8.
pub fn padded_name_len(base_offset: i32, name_len: usize) -> i32 {
    let mut len = (name_len as i32 + 1).max(8);
    while (base_offset + len) % 4 != 0 {
        len += 1;
    }
    len
}

// ── Index ─────────────────────────────────────────────────────────────────────

pub struct Index {
    endian:    Endian,
    base_path: PathBuf,
    pub records: Vec<IndexRecord>,
}

impl Index {
    pub fn new(base_path: impl Into<PathBuf>, endian: Endian) -> Self {
        Self {
            endian,
            base_path: base_path.into(),
            records: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Serialized size at the records' current base offsets.
    pub fn byte_len(&self) -> usize {
        let mut len = 4 + self.records.len() * 8 + 4;
        for record in &self.records {
            len += record.byte_len();
        }
        len
    }

    // ── Stream codec ─────────────────────────────────────────────────────────

    /// Read a complete index from `stream`.
    pub fn import<R: Read + Seek>(&mut self, stream: R) -> Result<()> {
        let mut reader = EndianReader::new(stream, self.endian);

        let archive_count = reader.read_i32()? / 2;
        let mut name_offsets = Vec::new();
        for _ in 0..archive_count {
            name_offsets.push(reader.read_i32()?);
            reader.read_i32()?; // info offset, re-derived on export
        }

        for offset in name_offsets {
            reader.seek(SeekFrom::Start(offset as u64))?;
            self.records.push(IndexRecord::import(&mut reader, offset)?);
        }
        Ok(())
    }

    /// Write the complete index to `stream`: count, a reserved offset-pair
    /// table plus the trailing total-size slot, the records, then the
    /// reserved region patched with the actual offsets and total size.
    pub fn export<W: Write + Seek>(&mut self, stream: W) -> Result<()> {
        let mut writer = EndianWriter::new(stream, self.endian);
        writer.write_i32(self.records.len() as i32 * 2)?;
        let reserved = vec![0u8; self.records.len() * 8 + 4];
        writer.write_bytes(&reserved)?; // patched below

        let mut offsets = Vec::with_capacity(self.records.len());
        for record in &mut self.records {
            let name_offset = writer.stream_position()? as i32;
            record.base_offset = name_offset;
            let info_offset = name_offset + padded_name_len(name_offset, record.name.len());
            offsets.push((name_offset, info_offset));
            record.export(&mut writer)?;
        }

        let total = writer.stream_position()? as i32;
        writer.seek(SeekFrom::Start(4))?;
        for (name_offset, info_offset) in offsets {
            writer.write_i32(name_offset)?;
            writer.write_i32(info_offset)?;
        }
        writer.write_i32(total)
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn has_archive(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Case-insensitive name lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Open and import the archive a record refers to.
    pub fn get_archive(&self, name: &str) -> Result<Archive> {
        let i = self
            .index_of(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        let path = self.archive_path(&self.records[i]);
        let file = std::fs::File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                e.into()
            }
        })?;
        let mut archive = Archive::new(self.endian);
        archive.import(file)?;
        Ok(archive)
    }

    /// Export `archive` over the file a record refers to.
    pub fn set_archive(&self, name: &str, archive: &Archive) -> Result<()> {
        let i = self
            .index_of(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        let file = std::fs::File::create(self.archive_path(&self.records[i]))?;
        archive.export(file)
    }

    // ── Synchronization ──────────────────────────────────────────────────────

    /// Re-derive every record's checksum and offset/size lists from the
    /// live contents of its archive on disk, in archive-entry order.
    pub fn synchronize(&mut self) -> Result<()> {
        for i in 0..self.records.len() {
            let name = self.records[i].name.clone();
            let archive = self.get_archive(&name)?;
            let record = &mut self.records[i];
            record.crcs = archive.entries.iter().map(|e| e.crc).collect();
            record.files = archive
                .entries
                .iter()
                .map(|e| IndexFileInfo { offset: e.offset, size: e.size })
                .collect();
        }
        Ok(())
    }

    fn archive_path(&self, record: &IndexRecord) -> PathBuf {
        self.base_path.join(format!("{}.arc", record.short_name()))
    }
}
