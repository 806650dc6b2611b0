//! Byte to code point tables for the table-driven code pages
//!
//! Every table here is a full 256-entry map plus the inverse map used when
//! encoding. Tables are built on first use and never mutated afterwards, so
//! they can be shared between threads freely.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Fixed mapping of every byte value to a Unicode scalar value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePointTable([char; 256]);

impl CodePointTable {
    /// Create a table from all 256 entries
    pub const fn new(entries: [char; 256]) -> Self {
        Self(entries)
    }

    /// Create a table whose lower half is 7-bit ASCII
    ///
    /// `upper[i]` is the character for byte `0x80 + i`.
    pub const fn from_upper_half(upper: &[char; 128]) -> Self {
        let mut entries = ['\0'; 256];
        let mut i = 0;
        while i < 128 {
            entries[i] = i as u8 as char;
            entries[i + 128] = upper[i];
            i += 1;
        }
        Self(entries)
    }

    /// ISO-8859-1: every byte maps to the code point of the same value
    pub const fn latin1() -> Self {
        let mut entries = ['\0'; 256];
        let mut i = 0;
        while i < 256 {
            entries[i] = i as u8 as char;
            i += 1;
        }
        Self(entries)
    }

    /// Character for a byte
    #[inline]
    pub fn get(&self, byte: u8) -> char {
        self.0[byte as usize]
    }

    /// Iterate `(byte, char)` pairs in byte order
    pub fn iter(&self) -> impl Iterator<Item = (u8, char)> + '_ {
        self.0.iter().enumerate().map(|(byte, &ch)| (byte as u8, ch))
    }

    /// Derive the encoding direction of this table
    ///
    /// Bytes are visited in ascending order. When one code point appears at
    /// several bytes the highest byte is kept. U+0000 is only recorded for
    /// byte 0x00.
    pub fn invert(&self) -> InverseTable {
        let mut map = HashMap::with_capacity(256);
        for (byte, ch) in self.iter() {
            if byte == 0 && ch == '\0' {
                map.insert('\0', 0);
                continue;
            }
            if ch != '\0' {
                map.insert(ch, byte);
            }
        }
        InverseTable(map)
    }
}

/// Code point to byte map derived from a [`CodePointTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseTable(HashMap<char, u8>);

impl InverseTable {
    /// Byte for a character, if the code page can represent it
    #[inline]
    pub fn get(&self, ch: char) -> Option<u8> {
        self.0.get(&ch).copied()
    }

    /// Number of distinct characters that can be encoded
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing can be encoded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single-byte code page backed by a table pair
#[derive(Debug, Clone)]
pub struct SingleByteTable {
    name: &'static str,
    decode: CodePointTable,
    encode: InverseTable,
}

impl SingleByteTable {
    /// Build the table pair, deriving the inverse map
    pub fn new(name: &'static str, decode: CodePointTable) -> Self {
        let encode = decode.invert();
        Self {
            name,
            decode,
            encode,
        }
    }

    /// Canonical name of the code page
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The decoding table
    pub fn code_points(&self) -> &CodePointTable {
        &self.decode
    }

    /// The encoding table
    pub fn inverse(&self) -> &InverseTable {
        &self.encode
    }

    /// Decode one byte
    #[inline]
    pub fn decode_byte(&self, byte: u8) -> char {
        self.decode.get(byte)
    }

    /// Encode one character
    #[inline]
    pub fn encode_char(&self, ch: char) -> Option<u8> {
        self.encode.get(ch)
    }
}

/// Kamenický (CP895) as used by Czech and Slovak BBS software
pub static CP895: LazyLock<SingleByteTable> =
    LazyLock::new(|| SingleByteTable::new("CP895", CodePointTable::from_upper_half(&CP895_UPPER)));

/// ISO-8859-1
pub static ISO_8859_1: LazyLock<SingleByteTable> =
    LazyLock::new(|| SingleByteTable::new("ISO-8859-1", CodePointTable::latin1()));

/// ISO-8859-9 (Latin-5, Turkish)
pub static ISO_8859_9: LazyLock<SingleByteTable> =
    LazyLock::new(|| SingleByteTable::new("ISO-8859-9", latin5()));

/// IBM PC code page 437
pub static CP437: LazyLock<SingleByteTable> = LazyLock::new(|| {
    SingleByteTable::new(
        "CP437",
        CodePointTable::from_upper_half(&oem_cp::code_table::DECODING_TABLE_CP437),
    )
});

/// DOS Western European code page 850
pub static CP850: LazyLock<SingleByteTable> = LazyLock::new(|| {
    SingleByteTable::new(
        "CP850",
        CodePointTable::from_upper_half(&oem_cp::code_table::DECODING_TABLE_CP850),
    )
});

/// DOS Central European code page 852
pub static CP852: LazyLock<SingleByteTable> = LazyLock::new(|| {
    SingleByteTable::new(
        "CP852",
        CodePointTable::from_upper_half(&oem_cp::code_table::DECODING_TABLE_CP852),
    )
});

// 0xA0 and 0xAA both carry U+00AA; encoding picks 0xAA.
#[rustfmt::skip]
static CP895_UPPER: [char; 128] = [
    // 0x80
    '\u{010C}', '\u{011B}', '\u{0161}', '\u{00FD}', '\u{00E1}', '\u{00ED}', '\u{00E9}', '\u{0159}',
    '\u{017E}', '\u{00FA}', '\u{016F}', '\u{0165}', '\u{010F}', '\u{0148}', '\u{0160}', '\u{011A}',
    // 0x90
    '\u{00C1}', '\u{00CD}', '\u{00C9}', '\u{0158}', '\u{017D}', '\u{00DA}', '\u{016E}', '\u{0164}',
    '\u{010E}', '\u{0147}', '\u{00D6}', '\u{00DC}', '\u{00A3}', '\u{00A5}', '\u{20A7}', '\u{0192}',
    // 0xA0
    '\u{00AA}', '\u{02C7}', '\u{02D8}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{00A6}', '\u{00A7}',
    '\u{00A4}', '\u{00A9}', '\u{00AA}', '\u{00AB}', '\u{00AC}', '\u{00AD}', '\u{00AE}', '\u{00AF}',
    // 0xB0
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{255C}', '\u{255B}', '\u{2510}',
    // 0xC0
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{255E}', '\u{255F}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{2567}',
    // 0xD0
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256B}',
    '\u{256A}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{258C}', '\u{2590}', '\u{2580}',
    // 0xE0
    '\u{03B1}', '\u{00DF}', '\u{0393}', '\u{03C0}', '\u{03A3}', '\u{03C3}', '\u{00B5}', '\u{03C4}',
    '\u{03A6}', '\u{0398}', '\u{03A9}', '\u{03B4}', '\u{221E}', '\u{03C6}', '\u{03B5}', '\u{2229}',
    // 0xF0
    '\u{2261}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{2320}', '\u{2321}', '\u{00F7}', '\u{2248}',
    '\u{00B0}', '\u{2219}', '\u{00B7}', '\u{221A}', '\u{207F}', '\u{00B2}', '\u{25A0}', '\u{00A0}',
];

/// ISO-8859-9 differs from ISO-8859-1 in six letters only
const fn latin5() -> CodePointTable {
    let CodePointTable(mut entries) = CodePointTable::latin1();
    entries[0xD0] = 'Ğ';
    entries[0xDD] = 'İ';
    entries[0xDE] = 'Ş';
    entries[0xF0] = 'ğ';
    entries[0xFD] = 'ı';
    entries[0xFE] = 'ş';
    CodePointTable(entries)
}
