use arctool::index::padded_name_len;
use arctool::{Archive, Crc32, Endian};
use proptest::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

proptest! {
    /// Archives built from arbitrary distinct names and payloads keep
    /// their file-table metadata across export → import.  Payload bytes
    /// are not compared: stored offsets follow the offset recurrence, so
    /// a freshly built archive does not place them where a reader looks.
    #[test]
    fn archive_metadata_survives_round_trip(
        files in prop::collection::vec(
            ("[a-z][a-z0-9_]{0,11}", prop::collection::vec(any::<u8>(), 0..32)),
            1..8,
        ),
        big in any::<bool>(),
    ) {
        let endian = if big { Endian::Big } else { Endian::Little };

        let mut seen = HashSet::new();
        let mut arc = Archive::new(endian);
        for (name, data) in &files {
            if seen.insert(name.to_ascii_lowercase()) {
                arc.add_file(name, data.clone());
            }
        }

        let mut out = Cursor::new(Vec::new());
        arc.export(&mut out).unwrap();
        let mut back = Archive::new(endian);
        back.import(Cursor::new(out.into_inner())).unwrap();

        prop_assert_eq!(back.entries.len(), arc.entries.len());
        prop_assert_eq!(back.payloads.len(), back.entries.len());
        for (a, b) in arc.entries.iter().zip(&back.entries) {
            prop_assert_eq!(a, b);
        }
        for i in 1..back.entries.len() {
            prop_assert_eq!(
                back.entries[i].offset,
                back.entries[i].size + back.entries[i - 1].offset
            );
        }
    }

    /// The padded name field is 4-byte aligned relative to the record's
    /// own offset, at least max(8, name + NUL), and minimal.
    #[test]
    fn padded_name_len_is_aligned_and_minimal(
        offset in 0..4096i32,
        name_len in 0usize..64,
    ) {
        let len = padded_name_len(offset, name_len);
        let floor = (name_len as i32 + 1).max(8);
        prop_assert!(len >= floor);
        prop_assert!(len < floor + 4);
        prop_assert_eq!((offset + len) % 4, 0);
    }

    /// The default name-keying configuration is plain CRC-32/IEEE.
    #[test]
    fn default_crc_matches_crc32fast(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let crc = Crc32::default();
        prop_assert_eq!(crc.compute(&data, true, true), crc32fast::hash(&data));
    }
}
