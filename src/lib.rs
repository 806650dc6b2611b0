//! # bbs-charmap - Legacy Code Page Conversion for BBS Software
//!
//! Converts text between the 8-bit code pages still spoken by bulletin-board
//! and FidoNet-style messaging systems and UTF-8, in both directions.
//!
//! ## Features
//!
//! - **Name-based dispatch** with the identifiers found in message headers
//!   (`CP866`, `+7_FIDO`, `IBMPC`, `LATIN-2`, ...)
//! - **Kamenický (CP895)** built in, alongside provider-backed standard pages
//! - **Streaming transforms** that work through bounded buffers
//! - **Never-failing decode**, unmappable characters encode as `0x1A`
//!
//! ## Quick Start
//!
//! ```rust
//! use bbs_charmap::{decode, encode};
//!
//! assert_eq!(decode(&[0x92, 0xA5, 0xE1, 0xE2], "cp866"), "Тест");
//! assert_eq!(&*encode("Čěšý", "CP895"), &[0x80, 0x81, 0x82, 0x83]);
//!
//! // Characters the code page lacks become the SUB control byte
//! assert_eq!(&*encode("1€", "CP866"), &[b'1', 0x1A]);
//! ```

#![deny(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub mod registry;
pub mod stream;
pub mod tables;
pub mod transform;

pub use registry::{Charset, DEFAULT_CODE_PAGE, UNIVERSAL, decode, encode};
pub use stream::{Direction, StreamingTranslator};
pub use transform::{Codec, Progress, SUBSTITUTE, Status, Transform};

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Code page identifier is not supported
    UnknownCodePage(String),
    /// Invalid input data or arguments
    InvalidInput(String),
    /// A transform stopped making progress
    Stalled {
        /// Input offset where conversion stopped
        position: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownCodePage(name) => write!(f, "Unknown code page: {}", name),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Stalled { position } => {
                write!(f, "Conversion stalled at input position {}", position)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Where a code page's mapping comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Table compiled into this crate
    Table,
    /// Single-byte encoding from `encoding_rs`
    Whatwg,
}

impl Provider {
    /// Lowercase label, as used by the CLI
    pub fn label(self) -> &'static str {
        match self {
            Provider::Table => "table",
            Provider::Whatwg => "whatwg",
        }
    }
}

/// Supported legacy code pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum CodePage {
    /// IBM866 / DOS Cyrillic (Russian)
    CP_866,
    /// DOS Code Page 850 (Western European OEM)
    CP_850,
    /// DOS Code Page 852 (Central European OEM)
    CP_852,
    /// Windows-1250 (Central/Eastern European)
    WINDOWS_1250,
    /// Windows-1251 (Cyrillic)
    WINDOWS_1251,
    /// Windows-1252 (Western European)
    WINDOWS_1252,
    /// Macintosh Roman (Windows code page 10000)
    MAC_ROMAN,
    /// DOS Code Page 437 (US OEM)
    CP_437,
    /// Kamenický (Czech/Slovak)
    CP_895,
    /// ISO-8859-1 (Latin-1) - Western European
    ISO_8859_1,
    /// ISO-8859-2 (Latin-2) - Central/Eastern European
    ISO_8859_2,
    /// ISO-8859-5 (Cyrillic)
    ISO_8859_5,
    /// ISO-8859-9 (Turkish)
    ISO_8859_9,
    /// KOI8-R (Russian)
    KOI8_R,
}

impl CodePage {
    /// Every supported code page, in listing order
    pub const ALL: [CodePage; 14] = [
        CodePage::CP_866,
        CodePage::CP_850,
        CodePage::CP_852,
        CodePage::WINDOWS_1250,
        CodePage::WINDOWS_1251,
        CodePage::WINDOWS_1252,
        CodePage::MAC_ROMAN,
        CodePage::CP_437,
        CodePage::CP_895,
        CodePage::ISO_8859_1,
        CodePage::ISO_8859_2,
        CodePage::ISO_8859_5,
        CodePage::ISO_8859_9,
        CodePage::KOI8_R,
    ];

    /// Canonical identifier of this code page
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Every identifier that selects this code page, canonical one first
    ///
    /// `LATIN-5` and `LATIN-9` are kept as the messaging software of the
    /// era used them: they select ISO-8859-5 and ISO-8859-9.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CodePage::CP_866 => &["CP866", "+7_FIDO", "+7", "IBM866", "CP848"],
            CodePage::CP_850 => &["CP850"],
            CodePage::CP_852 => &["CP852"],
            CodePage::WINDOWS_1250 => &["CP1250"],
            CodePage::WINDOWS_1251 => &["CP1251"],
            CodePage::WINDOWS_1252 => &["CP1252"],
            CodePage::MAC_ROMAN => &["CP10000"],
            CodePage::CP_437 => &["CP437", "IBMPC"],
            CodePage::CP_895 => &["CP895"],
            CodePage::ISO_8859_1 => &["LATIN-1"],
            CodePage::ISO_8859_2 => &["LATIN-2"],
            CodePage::ISO_8859_5 => &["LATIN-5"],
            CodePage::ISO_8859_9 => &["LATIN-9"],
            CodePage::KOI8_R => &["KOI8-R"],
        }
    }

    /// Name of the underlying standard
    pub fn standard_name(self) -> &'static str {
        match self {
            CodePage::CP_866 => "IBM866",
            CodePage::CP_850 => "IBM850",
            CodePage::CP_852 => "IBM852",
            CodePage::WINDOWS_1250 => "windows-1250",
            CodePage::WINDOWS_1251 => "windows-1251",
            CodePage::WINDOWS_1252 => "windows-1252",
            CodePage::MAC_ROMAN => "macintosh",
            CodePage::CP_437 => "IBM437",
            CodePage::CP_895 => "Kamenicky",
            CodePage::ISO_8859_1 => "ISO-8859-1",
            CodePage::ISO_8859_2 => "ISO-8859-2",
            CodePage::ISO_8859_5 => "ISO-8859-5",
            CodePage::ISO_8859_9 => "ISO-8859-9",
            CodePage::KOI8_R => "KOI8-R",
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            CodePage::CP_866 => "DOS Cyrillic, the FidoNet +7 character set",
            CodePage::CP_850 => "DOS Western European OEM",
            CodePage::CP_852 => "DOS Central European OEM",
            CodePage::WINDOWS_1250 => "Windows code page for Central and Eastern European languages",
            CodePage::WINDOWS_1251 => "Windows code page for Cyrillic scripts",
            CodePage::WINDOWS_1252 => "Windows code page for Western European languages",
            CodePage::MAC_ROMAN => "Classic Macintosh Roman character encoding",
            CodePage::CP_437 => "Original IBM PC character set with box-drawing characters",
            CodePage::CP_895 => "Kamenicky brothers' Czech and Slovak DOS code page",
            CodePage::ISO_8859_1 => "Latin alphabet No. 1, Western European",
            CodePage::ISO_8859_2 => "Latin alphabet No. 2, Central European",
            CodePage::ISO_8859_5 => "Latin/Cyrillic alphabet",
            CodePage::ISO_8859_9 => "Latin alphabet No. 5, Turkish",
            CodePage::KOI8_R => "Russian KOI8 from RFC 1489",
        }
    }

    /// Where the mapping comes from
    pub fn provider(self) -> Provider {
        match self.codec() {
            Codec::Table(_) => Provider::Table,
            Codec::Whatwg(_) => Provider::Whatwg,
        }
    }

    /// Transform implementing this code page
    pub fn codec(self) -> Codec {
        use transform::WhatwgCodec;

        match self {
            CodePage::CP_866 => Codec::Whatwg(WhatwgCodec(encoding_rs::IBM866)),
            CodePage::CP_850 => Codec::Table(&tables::CP850),
            CodePage::CP_852 => Codec::Table(&tables::CP852),
            CodePage::WINDOWS_1250 => Codec::Whatwg(WhatwgCodec(encoding_rs::WINDOWS_1250)),
            CodePage::WINDOWS_1251 => Codec::Whatwg(WhatwgCodec(encoding_rs::WINDOWS_1251)),
            CodePage::WINDOWS_1252 => Codec::Whatwg(WhatwgCodec(encoding_rs::WINDOWS_1252)),
            CodePage::MAC_ROMAN => Codec::Whatwg(WhatwgCodec(encoding_rs::MACINTOSH)),
            CodePage::CP_437 => Codec::Table(&tables::CP437),
            CodePage::CP_895 => Codec::Table(&tables::CP895),
            CodePage::ISO_8859_1 => Codec::Table(&tables::ISO_8859_1),
            CodePage::ISO_8859_2 => Codec::Whatwg(WhatwgCodec(encoding_rs::ISO_8859_2)),
            CodePage::ISO_8859_5 => Codec::Whatwg(WhatwgCodec(encoding_rs::ISO_8859_5)),
            CodePage::ISO_8859_9 => Codec::Table(&tables::ISO_8859_9),
            CodePage::KOI8_R => Codec::Whatwg(WhatwgCodec(encoding_rs::KOI8_R)),
        }
    }

    /// Decode bytes in this code page to a string
    pub fn decode(self, input: &[u8]) -> Result<String> {
        transform::decode_to_string(&self.codec(), input)
    }

    /// Encode a string into this code page, substituting [`SUBSTITUTE`]
    /// for characters it cannot represent
    pub fn encode(self, input: &str) -> Result<Vec<u8>> {
        transform::encode_to_vec(&self.codec(), input)
    }

    /// Summary suitable for listings and JSON output
    pub fn info(self) -> CodePageInfo {
        CodePageInfo {
            name: self.name(),
            aliases: self.aliases(),
            standard: self.standard_name(),
            provider: self.provider(),
            codec: self.codec().name(),
            description: self.description(),
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict, case-insensitive parse of a code page identifier
///
/// Unlike [`decode`] and [`encode`], unknown identifiers are an error here.
impl FromStr for CodePage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        registry::lookup(&s.to_uppercase()).ok_or_else(|| Error::UnknownCodePage(s.to_string()))
    }
}

/// Descriptive record for a code page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePageInfo {
    /// Canonical identifier
    pub name: &'static str,
    /// All identifiers, canonical first
    pub aliases: &'static [&'static str],
    /// Underlying standard
    pub standard: &'static str,
    /// Mapping source
    pub provider: Provider,
    /// Table or provider encoding name
    pub codec: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// Converter between two legacy code pages, going through UTF-8
pub struct Translator {
    from: CodePage,
    to: CodePage,
}

impl Translator {
    /// Create a new translator between two code pages
    pub fn new(from: CodePage, to: CodePage) -> Self {
        Self { from, to }
    }

    /// Get source code page
    pub fn from_code_page(&self) -> CodePage {
        self.from
    }

    /// Get target code page
    pub fn to_code_page(&self) -> CodePage {
        self.to
    }

    /// Convert data from source to target code page
    ///
    /// Characters missing from the target become [`SUBSTITUTE`].
    pub fn convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        if self.from == self.to {
            return Ok(input.to_vec());
        }
        let text = self.from.decode(input)?;
        self.to.encode(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_page_properties() {
        assert_eq!(CodePage::CP_866.name(), "CP866");
        assert_eq!(CodePage::ISO_8859_1.name(), "LATIN-1");
        assert_eq!(CodePage::CP_895.provider(), Provider::Table);
        assert_eq!(CodePage::KOI8_R.provider(), Provider::Whatwg);
        assert!(CodePage::CP_866.aliases().contains(&"+7_FIDO"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ibmpc".parse::<CodePage>(), Ok(CodePage::CP_437));
        assert_eq!("+7".parse::<CodePage>(), Ok(CodePage::CP_866));
        assert_eq!(
            "EBCDIC".parse::<CodePage>(),
            Err(Error::UnknownCodePage("EBCDIC".to_string()))
        );
        assert!("UTF-8".parse::<CodePage>().is_err());
    }

    #[test]
    fn test_every_alias_parses_back() {
        for page in CodePage::ALL {
            for alias in page.aliases() {
                assert_eq!(alias.parse::<CodePage>(), Ok(page));
            }
        }
    }

    #[test]
    fn test_cp866_round_trip() {
        assert_eq!(CodePage::CP_866.decode(&[0x92, 0xA5, 0xE1, 0xE2]).unwrap(), "Тест");
        assert_eq!(
            CodePage::CP_866.encode("Тест").unwrap(),
            vec![0x92, 0xA5, 0xE1, 0xE2]
        );
    }

    #[test]
    fn test_koi8r_and_windows_1251() {
        assert_eq!(CodePage::KOI8_R.decode(&[0xF4, 0xC5, 0xD3, 0xD4]).unwrap(), "Тест");
        assert_eq!(
            CodePage::WINDOWS_1251.encode("Тест").unwrap(),
            vec![0xD2, 0xE5, 0xF1, 0xF2]
        );
    }

    #[test]
    fn test_windows_1252_special_chars() {
        assert_eq!(CodePage::WINDOWS_1252.decode(&[0x80, 0x99]).unwrap(), "€™");
    }

    #[test]
    fn test_latin2_central_european() {
        assert_eq!(CodePage::ISO_8859_2.decode(&[0xA9, 0xE8]).unwrap(), "Šč");
    }

    #[test]
    fn test_every_page_substitutes_unmappable() {
        for page in CodePage::ALL {
            let bytes = page.encode("a\u{4E2D}b").unwrap();
            assert_eq!(bytes, vec![b'a', SUBSTITUTE, b'b'], "{}", page);
        }
    }

    #[test]
    fn test_every_page_decodes_ascii() {
        for page in CodePage::ALL {
            assert_eq!(page.decode(b"Hello, BBS!").unwrap(), "Hello, BBS!", "{}", page);
        }
    }

    #[test]
    fn test_translator_cp866_to_koi8r() {
        let translator = Translator::new(CodePage::CP_866, CodePage::KOI8_R);
        assert_eq!(translator.from_code_page(), CodePage::CP_866);
        assert_eq!(translator.to_code_page(), CodePage::KOI8_R);
        let output = translator.convert(&[0x92, 0xA5, 0xE1, 0xE2]).unwrap();
        assert_eq!(output, vec![0xF4, 0xC5, 0xD3, 0xD4]);
    }

    #[test]
    fn test_translator_substitutes_missing_characters() {
        // box drawing exists in CP437 but not in Latin-1
        let translator = Translator::new(CodePage::CP_437, CodePage::ISO_8859_1);
        let output = translator.convert(&[b'[', 0xC9, b']']).unwrap();
        assert_eq!(output, vec![b'[', SUBSTITUTE, b']']);
    }

    #[test]
    fn test_info_serializes() {
        let info = CodePage::CP_437.info();
        assert_eq!(info.aliases, &["CP437", "IBMPC"]);
        assert_eq!(info.provider, Provider::Table);
        assert_eq!(info.codec, "CP437");
        assert_eq!(CodePage::MAC_ROMAN.info().codec, "macintosh");
        assert_eq!(CodePage::CP_866.info().codec, "IBM866");
        assert_eq!(Provider::Whatwg.label(), "whatwg");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnknownCodePage("X".into()).to_string(),
            "Unknown code page: X"
        );
        assert_eq!(
            Error::Stalled { position: 7 }.to_string(),
            "Conversion stalled at input position 7"
        );
    }
}
