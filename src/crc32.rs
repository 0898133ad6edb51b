//! Table-driven, fully configurable CRC-32 engine.
//!
//! Archive entries are keyed by a checksum of the file name whose
//! parameters (polynomial, initial value, final XOR, reflection) are not
//! fixed, so the engine accepts an arbitrary configuration instead of
//! hard-coding one variant.  [`Crc32::default`] is the name-keying
//! configuration used by the archive codec.

const DEFAULT_POLYNOMIAL: u32 = 0x04C1_1DB7;

/// A 256-entry CRC-32 lookup table plus the values applied around it.
/// Immutable once built.
pub struct Crc32 {
    table: [u32; 256],
    init: u32,
    xor_out: u32,
    reflected: bool,
}

impl Crc32 {
    /// Build the lookup table for `polynomial`.  With `reflect_table` set,
    /// each index is bit-reversed before the division steps and each entry
    /// bit-reversed after, producing the standard reflected table.
    pub fn new(polynomial: u32, init: u32, xor_out: u32, reflect_table: bool) -> Self {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let top = if reflect_table {
                (i as u8).reverse_bits() as u32
            } else {
                i as u32
            };
            let mut k = top << 24;
            for _ in 0..8 {
                if k & 0x8000_0000 != 0 {
                    k = (k << 1) ^ polynomial;
                } else {
                    k <<= 1;
                }
            }
            *entry = if reflect_table { k.reverse_bits() } else { k };
        }
        Self { table, init, xor_out, reflected: reflect_table }
    }

    pub fn init(&self) -> u32 {
        self.init
    }

    pub fn xor_out(&self) -> u32 {
        self.xor_out
    }

    /// Checksum `data`, optionally bit-reversing each input byte and the
    /// final result.
    ///
    /// An unreflected table drives the MSB-first loop; a reflected table
    /// drives the equivalent LSB-first loop over the bit-reversed
    /// accumulator.  Both orientations produce identical checksums for the
    /// same flags, so a reflected table is purely a different spelling of
    /// the same function.
    pub fn compute(&self, data: &[u8], reflect_input: bool, reflect_output: bool) -> u32 {
        let crc = if self.reflected {
            let mut crc = self.init.reverse_bits();
            for &b in data {
                let cur = if reflect_input { b } else { b.reverse_bits() };
                crc = (crc >> 8) ^ self.table[((crc ^ cur as u32) & 0xff) as usize];
            }
            crc.reverse_bits() ^ self.xor_out
        } else {
            let mut crc = self.init;
            for &b in data {
                let cur = if reflect_input { b.reverse_bits() } else { b };
                crc ^= (cur as u32) << 24;
                crc = (crc << 8) ^ self.table[(crc >> 24) as usize];
            }
            crc ^ self.xor_out
        };
        if reflect_output {
            crc.reverse_bits()
        } else {
            crc
        }
    }
}

impl Default for Crc32 {
    /// The archive name-keying configuration: polynomial 0x04C11DB7,
    /// initial value 0xFFFFFFFF, final XOR 0xFFFFFFFF, unreflected table.
    fn default() -> Self {
        Self::new(DEFAULT_POLYNOMIAL, u32::MAX, u32::MAX, false)
    }
}
