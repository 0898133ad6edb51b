//! The ARC container codec — the primary embedding surface.
//!
//! ```no_run
//! use arctool::{Archive, Endian};
//!
//! // Build and write
//! let mut ar = Archive::new(Endian::Little);
//! ar.add_file("readme.txt", b"Hello, world!".to_vec());
//! let mut out = std::fs::File::create("out.arc")?;
//! ar.export(&mut out)?;
//!
//! // Read
//! let mut ar = Archive::new(Endian::Little);
//! ar.import(&mut std::fs::File::open("out.arc")?)?;
//! assert!(ar.file_exists("readme.txt"));
//! # Ok::<(), arctool::Error>(())
//! ```
//!
//! An archive is an ordered list of [`FileEntry`] records plus a parallel
//! list of payload blobs; `entries[i]` and `payloads[i]` always describe
//! the same logical file, and every mutation keeps the two in step.
//!
//! On disk the payload blobs come first (concatenated in file-table
//! order, no padding), followed by the file table.  The 4-byte field at
//! offset 0 locating the table is always stored as raw little-endian
//! bytes, even when the archive itself is big-endian.

use chrono::Utc;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::crc32::Crc32;
use crate::error::{Error, Result};
use crate::io_stream::{Endian, EndianReader, EndianWriter};

// ── FileEntry ─────────────────────────────────────────────────────────────────

/// One file-table record: checksum of the name, payload location, and an
/// opaque timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub crc:       u32,
    pub offset:    i32,
    pub size:      i32,
    pub name:      String,
    pub timestamp: i64,
}

impl FileEntry {
    fn import<R: Read + Seek>(reader: &mut EndianReader<R>) -> Result<Self> {
        Ok(Self {
            crc:       reader.read_u32()?,
            offset:    reader.read_i32()?,
            size:      reader.read_i32()?,
            name:      reader.read_cstr()?,
            timestamp: reader.read_i64()?,
        })
    }

    fn export<W: Write + Seek>(&self, writer: &mut EndianWriter<W>) -> Result<()> {
        writer.write_u32(self.crc)?;
        writer.write_i32(self.offset)?;
        writer.write_i32(self.size)?;
        writer.write_cstr(&self.name)?;
        writer.write_i64(self.timestamp)
    }

    /// Serialized size of this record in the file table.
    fn byte_len(&self) -> usize {
        12 + (self.name.len() + 1) + 8
    }
}

// ── Archive ───────────────────────────────────────────────────────────────────

pub struct Archive {
    endian:   Endian,
    hasher:   Crc32,
    pub entries:  Vec<FileEntry>,
    pub payloads: Vec<Vec<u8>>,
}

impl Archive {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn new(endian: Endian) -> Self {
        Self::with_hasher(endian, Crc32::default())
    }

    /// Bind a non-default name-checksum configuration.
    pub fn with_hasher(endian: Endian, hasher: Crc32) -> Self {
        Self {
            endian,
            hasher,
            entries:  Vec::new(),
            payloads: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized size: header, payload bytes, entry count, file table.
    pub fn byte_len(&self) -> usize {
        let mut len = 4 + 4;
        for entry in &self.entries {
            len += entry.size as usize + entry.byte_len();
        }
        len
    }

    // ── Stream codec ─────────────────────────────────────────────────────────

    /// Read a complete archive from `stream`.
    ///
    /// On failure the instance may hold a partially appended file table
    /// and must be discarded.
    pub fn import<R: Read + Seek>(&mut self, stream: R) -> Result<()> {
        let mut reader = EndianReader::new(stream, self.endian);

        // The table-offset field is raw little-endian bytes no matter
        // which byte order the archive declares.
        let raw = reader.read_bytes(4)?;
        let table_offset = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);

        reader.seek(SeekFrom::Start(table_offset as u64))?;
        let count = reader.read_i32()?;
        for _ in 0..count {
            self.entries.push(FileEntry::import(&mut reader)?);
        }

        for i in 0..count as usize {
            reader.seek(SeekFrom::Start(self.entries[i].offset as u64))?;
            let payload = reader.read_bytes(self.entries[i].size as usize)?;
            self.payloads.push(payload);
        }
        Ok(())
    }

    /// Write the complete archive to `stream`: a 4-byte placeholder, every
    /// payload back to back, the file table, then the placeholder patched
    /// with the table offset as raw little-endian bytes.
    pub fn export<W: Write + Seek>(&self, stream: W) -> Result<()> {
        let mut writer = EndianWriter::new(stream, self.endian);
        writer.write_bytes(&[0u8; 4])?; // reserved; patched below

        for payload in &self.payloads {
            writer.write_bytes(payload)?;
        }

        let table_offset = writer.stream_position()? as u32;
        writer.write_i32(self.entries.len() as i32)?;
        for entry in &self.entries {
            entry.export(&mut writer)?;
        }

        writer.seek(SeekFrom::Start(0))?;
        writer.write_bytes(&table_offset.to_le_bytes())
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn file_exists(&self, name: &str) -> bool {
        self.index_of_name(name).is_some()
    }

    /// Case-insensitive name lookup.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn index_of_crc(&self, crc: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.crc == crc)
    }

    pub fn get_file(&self, name: &str) -> Result<&[u8]> {
        let i = self
            .index_of_name(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        Ok(&self.payloads[i])
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Replace the payload of an existing entry, refreshing its offset,
    /// size, and timestamp.
    pub fn set_file(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let i = self
            .index_of_name(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        self.entries[i].offset = self.file_offset(i);
        self.entries[i].size = data.len() as i32;
        self.entries[i].timestamp = Utc::now().timestamp_millis();
        self.payloads[i] = data;
        Ok(())
    }

    /// Append a new entry, keying it by the checksum of its name.
    pub fn add_file(&mut self, name: &str, data: Vec<u8>) {
        let index = self.entries.len();
        let entry = self.new_entry(name, data.len() as i32);
        self.entries.push(entry);
        self.entries[index].offset = self.file_offset(index);
        self.payloads.push(data);
    }

    /// Insert a new entry at `index`, shifting later entries up.
    pub fn insert_file(&mut self, name: &str, index: usize, data: Vec<u8>) -> Result<()> {
        if index > self.entries.len() {
            return Err(Error::IndexOutOfRange { index, len: self.entries.len() });
        }
        let entry = self.new_entry(name, data.len() as i32);
        self.entries.insert(index, entry);
        self.entries[index].offset = self.file_offset(index);
        self.payloads.insert(index, data);
        Ok(())
    }

    /// Remove an entry and its payload as a pair.
    pub fn remove_file(&mut self, name: &str) -> Result<()> {
        let i = self
            .index_of_name(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        self.entries.remove(i);
        self.payloads.remove(i);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn new_entry(&self, name: &str, size: i32) -> FileEntry {
        FileEntry {
            crc: self.hasher.compute(name.as_bytes(), true, true),
            offset: 0,
            size,
            name: name.to_owned(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    // The first entry keeps its stored offset; every later entry derives
    // its own as its size added to the previous entry's offset.  Not a
    // cumulative sum of preceding sizes — kept as-is for layout
    // compatibility with existing archives and tooling.
    fn file_offset(&self, index: usize) -> i32 {
        if index == 0 {
            self.entries[0].offset
        } else {
            self.entries[index].size + self.file_offset(index - 1)
        }
    }
}
