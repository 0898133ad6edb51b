pub mod io_stream;
pub mod crc32;
pub mod archive;
pub mod index;
pub mod error;

pub use archive::{Archive, FileEntry};
pub use crc32::Crc32;
pub use error::{Error, Result};
pub use index::{Index, IndexFileInfo, IndexRecord};
pub use io_stream::{Endian, EndianReader, EndianWriter};
