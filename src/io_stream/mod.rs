//! Endian-bound primitive codec — reader and writer.
//!
//! # Byte order
//! [`EndianReader`] and [`EndianWriter`] wrap a seekable stream and bind a
//! byte order at construction.  Every multi-byte field read or written
//! through them is assembled in that order; there is a single
//! implementation branching only where the bytes are put together, not two
//! parallel reader/writer hierarchies.
//!
//! # Strings
//! Narrow strings are NUL-terminated 8-bit sequences (one byte per
//! character, the low byte on write).  Wide strings are NUL-terminated
//! sequences of 16-bit units in the bound order.
//!
//! # Half floats
//! [`read_f16`](EndianReader::read_f16) and
//! [`write_f16`](EndianWriter::write_f16) convert between binary16 and
//! `f32` via [`f16_bits_to_f32`] and [`f32_to_f16_bits`].  Decoding is the
//! exact binary16 → binary32 conversion; encoding rounds to the nearest
//! representable half and clamps a rounding overflow past the largest
//! finite half to 0x7BFF instead of producing an infinity.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};

// ── Endian ───────────────────────────────────────────────────────────────────

/// Byte order bound to a reader or writer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "le" | "little" => Some(Endian::Little),
            "be" | "big" => Some(Endian::Big),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endian::Little => "le",
            Endian::Big => "be",
        }
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct EndianReader<R> {
    inner: R,
    endian: Endian,
}

impl<R: Read + Seek> EndianReader<R> {
    pub fn new(inner: R, endian: Endian) -> Self {
        Self { inner, endian }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.inner.seek(pos)?)
    }

    pub fn stream_position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_u16::<LittleEndian>()?,
            Endian::Big => self.inner.read_u16::<BigEndian>()?,
        })
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_i16::<LittleEndian>()?,
            Endian::Big => self.inner.read_i16::<BigEndian>()?,
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_u32::<LittleEndian>()?,
            Endian::Big => self.inner.read_u32::<BigEndian>()?,
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_i32::<LittleEndian>()?,
            Endian::Big => self.inner.read_i32::<BigEndian>()?,
        })
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_u64::<LittleEndian>()?,
            Endian::Big => self.inner.read_u64::<BigEndian>()?,
        })
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_i64::<LittleEndian>()?,
            Endian::Big => self.inner.read_i64::<BigEndian>()?,
        })
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_f32::<LittleEndian>()?,
            Endian::Big => self.inner.read_f32::<BigEndian>()?,
        })
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(match self.endian {
            Endian::Little => self.inner.read_f64::<LittleEndian>()?,
            Endian::Big => self.inner.read_f64::<BigEndian>()?,
        })
    }

    /// Read a binary16 value and widen it to `f32`.
    pub fn read_f16(&mut self) -> Result<f32> {
        let bits = self.read_u16()?;
        Ok(f16_bits_to_f32(bits))
    }

    /// Decimal fields are not part of any supported layout.
    pub fn read_decimal(&mut self) -> Result<f64> {
        Err(Error::NotSupported("decimal"))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read bytes up to (and consuming) a NUL terminator.
    pub fn read_cstr(&mut self) -> Result<String> {
        let mut out = String::new();
        loop {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            out.push(b as char);
        }
        Ok(out)
    }

    /// Read 16-bit units in the bound order up to a 16-bit NUL terminator.
    pub fn read_wstr(&mut self) -> Result<String> {
        let mut units = Vec::new();
        loop {
            let u = self.read_u16()?;
            if u == 0 {
                break;
            }
            units.push(u);
        }
        Ok(String::from_utf16_lossy(&units))
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct EndianWriter<W> {
    inner: W,
    endian: Endian,
}

impl<W: Write + Seek> EndianWriter<W> {
    pub fn new(inner: W, endian: Endian) -> Self {
        Self { inner, endian }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.inner.seek(pos)?)
    }

    pub fn stream_position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        Ok(self.inner.write_u8(v)?)
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        Ok(self.inner.write_i8(v)?)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_u16::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_u16::<BigEndian>(v)?,
        })
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_i16::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_i16::<BigEndian>(v)?,
        })
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_u32::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_u32::<BigEndian>(v)?,
        })
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_i32::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_i32::<BigEndian>(v)?,
        })
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_u64::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_u64::<BigEndian>(v)?,
        })
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_i64::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_i64::<BigEndian>(v)?,
        })
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_f32::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_f32::<BigEndian>(v)?,
        })
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        Ok(match self.endian {
            Endian::Little => self.inner.write_f64::<LittleEndian>(v)?,
            Endian::Big => self.inner.write_f64::<BigEndian>(v)?,
        })
    }

    /// Narrow an `f32` to binary16 and write it.
    pub fn write_f16(&mut self, v: f32) -> Result<()> {
        self.write_u16(f32_to_f16_bits(v))
    }

    /// Decimal fields are not part of any supported layout.
    pub fn write_decimal(&mut self, _v: f64) -> Result<()> {
        Err(Error::NotSupported("decimal"))
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(data)?)
    }

    /// Write each character's low byte, then a NUL terminator.
    pub fn write_cstr(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            self.write_u8(c as u8)?;
        }
        self.write_u8(0)
    }

    /// Write 16-bit units in the bound order, then a 16-bit NUL terminator.
    pub fn write_wstr(&mut self, s: &str) -> Result<()> {
        for u in s.encode_utf16() {
            self.write_u16(u)?;
        }
        self.write_u16(0)
    }
}

// ── Half-float conversion ────────────────────────────────────────────────────

/// Exact binary16 → binary32 conversion.
pub fn f16_bits_to_f32(bits: u16) -> f32 {
    let mut mant = (bits & 0x03ff) as u32;
    let mut exp = (bits & 0x7c00) as u32;
    if exp == 0x7c00 {
        // infinity / NaN: widen the exponent, carry the mantissa through
        exp = 0x3fc00;
    } else if exp != 0 {
        exp += 0x1c000;
    } else if mant != 0 {
        // subnormal: renormalize, borrowing from the exponent
        exp = 0x1c400;
        loop {
            mant <<= 1;
            exp -= 0x400;
            if mant & 0x400 != 0 {
                break;
            }
        }
        mant &= 0x3ff;
    }
    f32::from_bits(((bits as u32 & 0x8000) << 16) | ((exp | mant) << 13))
}

/// binary32 → binary16, round to nearest.  A finite value whose rounded
/// form would cross into the infinity encoding clamps to 0x7BFF.
pub fn f32_to_f16_bits(v: f32) -> u16 {
    let fbits = v.to_bits();
    let sign = ((fbits >> 16) & 0x8000) as u16;
    let val = (fbits & 0x7fff_ffff) + 0x1000; // rounding bias
    if val >= 0x4780_0000 {
        if (fbits & 0x7fff_ffff) >= 0x4780_0000 {
            if val < 0x7f80_0000 {
                return sign | 0x7c00;
            }
            // NaN: keep the top mantissa bits
            return sign | 0x7c00 | ((fbits & 0x007f_ffff) >> 13) as u16;
        }
        // rounding overflowed past the largest finite half
        return sign | 0x7bff;
    }
    if val >= 0x3880_0000 {
        return sign | ((val - 0x3800_0000) >> 13) as u16;
    }
    if val < 0x3300_0000 {
        return sign; // rounds to (signed) zero
    }
    let exp = ((fbits & 0x7fff_ffff) >> 23) as i32;
    if exp < 102 {
        return sign;
    }
    let mant = (fbits & 0x007f_ffff) | 0x0080_0000;
    sign | ((mant + (0x0080_0000u32 >> (exp - 102))) >> (126 - exp)) as u16
}
