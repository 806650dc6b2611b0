//! Code page identifier lookup and the whole-string conversion entry points
//!
//! Identifiers come from message headers and user configuration, so
//! neither direction fails on an unknown name: both fall back to
//! [`DEFAULT_CODE_PAGE`]. Decoding normalizes the identifier to upper case
//! first, encoding matches it exactly.

use std::borrow::Cow;

use crate::CodePage;

/// Identifier that selects UTF-8 passthrough
pub const UNIVERSAL: &str = "UTF-8";

/// Code page used for identifiers that are not recognized
pub const DEFAULT_CODE_PAGE: CodePage = CodePage::ISO_8859_1;

/// Result of resolving an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Input is already UTF-8 and passes through unchanged
    Utf8,
    /// A legacy code page
    Legacy(CodePage),
}

impl Charset {
    /// Resolve an identifier for decoding (case-insensitive)
    pub fn for_decode(name: &str) -> Self {
        Self::resolve(&name.to_uppercase())
    }

    /// Resolve an identifier for encoding (case-sensitive)
    pub fn for_encode(name: &str) -> Self {
        Self::resolve(name)
    }

    fn resolve(name: &str) -> Self {
        if name == UNIVERSAL {
            return Charset::Utf8;
        }
        match lookup(name) {
            Some(page) => Charset::Legacy(page),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    code_page = name,
                    fallback = DEFAULT_CODE_PAGE.name(),
                    "unknown code page, using fallback"
                );
                Charset::Legacy(DEFAULT_CODE_PAGE)
            }
        }
    }
}

/// Exact-match lookup of a code page identifier or alias
pub fn lookup(name: &str) -> Option<CodePage> {
    CodePage::ALL
        .into_iter()
        .find(|page| page.aliases().contains(&name))
}

/// Every recognized identifier with the code page it selects
pub fn identifiers() -> impl Iterator<Item = (&'static str, CodePage)> {
    CodePage::ALL
        .into_iter()
        .flat_map(|page| page.aliases().iter().map(move |&alias| (alias, page)))
}

/// Decode code page bytes to a string
///
/// Never fails. `UTF-8` returns the input itself, borrowed when it is valid
/// UTF-8 and lossily repaired when it is not. If conversion reports an error
/// the input is returned the same way.
///
/// ```rust
/// use bbs_charmap::decode;
///
/// assert_eq!(decode(&[0x80, 0x81, 0x82, 0x83], "cp895"), "Čěšý");
/// assert_eq!(decode("Тест".as_bytes(), "utf-8"), "Тест");
/// // unknown identifiers decode as Latin-1
/// assert_eq!(decode(&[0xE9], "X-UNKNOWN"), "é");
/// ```
pub fn decode<'a>(input: &'a [u8], code_page: &str) -> Cow<'a, str> {
    let page = match Charset::for_decode(code_page) {
        Charset::Utf8 => return String::from_utf8_lossy(input),
        Charset::Legacy(page) => page,
    };
    match page.decode(input) {
        Ok(text) => Cow::Owned(text),
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                code_page = page.name(),
                error = %_err,
                "decode failed, returning input unconverted"
            );
            String::from_utf8_lossy(input)
        }
    }
}

/// Encode a string into code page bytes
///
/// Characters the code page cannot represent become
/// [`SUBSTITUTE`](crate::SUBSTITUTE). `UTF-8` returns the input bytes.
///
/// # Panics
///
/// Panics if the conversion itself breaks down, which the substitution
/// policy rules out for every supported code page.
///
/// ```rust
/// use bbs_charmap::encode;
///
/// assert_eq!(&*encode("Тест", "CP866"), &[0x92, 0xA5, 0xE1, 0xE2]);
/// assert_eq!(&*encode("Тест", "UTF-8"), "Тест".as_bytes());
/// ```
pub fn encode<'a>(input: &'a str, code_page: &str) -> Cow<'a, [u8]> {
    let page = match Charset::for_encode(code_page) {
        Charset::Utf8 => return Cow::Borrowed(input.as_bytes()),
        Charset::Legacy(page) => page,
    };
    match page.encode(input) {
        Ok(bytes) => Cow::Owned(bytes),
        Err(err) => panic!("encoding to {} failed: {}", page.name(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SUBSTITUTE;

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(lookup("+7_FIDO"), Some(CodePage::CP_866));
        assert_eq!(lookup("CP848"), Some(CodePage::CP_866));
        assert_eq!(lookup("IBMPC"), Some(CodePage::CP_437));
        assert_eq!(lookup("CP10000"), Some(CodePage::MAC_ROMAN));
        assert_eq!(lookup("cp866"), None);
        assert_eq!(lookup(UNIVERSAL), None);
    }

    #[test]
    fn test_identifiers_are_unique() {
        let names: Vec<_> = identifiers().map(|(name, _)| name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
        assert_eq!(names.len(), 19);
    }

    #[test]
    fn test_charset_resolution() {
        assert_eq!(Charset::for_decode("koi8-r"), Charset::Legacy(CodePage::KOI8_R));
        assert_eq!(Charset::for_encode("koi8-r"), Charset::Legacy(DEFAULT_CODE_PAGE));
        assert_eq!(Charset::for_encode("KOI8-R"), Charset::Legacy(CodePage::KOI8_R));
        assert_eq!(Charset::for_decode("utf-8"), Charset::Utf8);
        assert_eq!(Charset::for_encode("utf-8"), Charset::Legacy(DEFAULT_CODE_PAGE));
        assert_eq!(Charset::for_encode("UTF-8"), Charset::Utf8);
    }

    #[test]
    fn test_decode_cp866() {
        assert_eq!(decode(b"\x92\xa5\xe1\xe2", "CP866"), "Тест");
    }

    #[test]
    fn test_decode_cp895() {
        assert_eq!(decode(b"\x80\x81\x82\x83", "CP895"), "Čěšý");
    }

    #[test]
    fn test_decode_utf8_is_identity() {
        let input = "Тест".as_bytes();
        let output = decode(input, "UTF-8");
        assert!(matches!(output, Cow::Borrowed(_)));
        assert_eq!(output, "Тест");
    }

    #[test]
    fn test_decode_utf8_repairs_invalid_input() {
        assert_eq!(decode(b"a\xffb", "UTF-8"), "a\u{FFFD}b");
    }

    #[test]
    fn test_encode_cp866() {
        assert_eq!(&*encode("Тест", "CP866"), b"\x92\xa5\xe1\xe2");
    }

    #[test]
    fn test_encode_cp895() {
        assert_eq!(&*encode("Čěšý", "CP895"), b"\x80\x81\x82\x83");
    }

    #[test]
    fn test_encode_utf8_is_identity() {
        let output = encode("Тест", "UTF-8");
        assert!(matches!(output, Cow::Borrowed(_)));
        assert_eq!(&*output, "Тест".as_bytes());
    }

    #[test]
    fn test_utf8_identity_for_every_text() {
        for text in ["", "plain", "Čěšý", "Тест", "╔═╗ ∞ 中文"] {
            assert_eq!(decode(text.as_bytes(), UNIVERSAL), text);
            assert_eq!(&*encode(text, UNIVERSAL), text.as_bytes());
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_latin1() {
        let input = [b'A', 0xC9, 0xE9, 0xFF];
        assert_eq!(decode(&input, "NO-SUCH-PAGE"), decode(&input, "LATIN-1"));
        assert_eq!(decode(&input, "NO-SUCH-PAGE"), "AÉéÿ");

        assert_eq!(
            encode("AÉé€", "NO-SUCH-PAGE"),
            encode("AÉé€", "LATIN-1")
        );
        assert_eq!(&*encode("AÉé€", "NO-SUCH-PAGE"), &[b'A', 0xC9, 0xE9, SUBSTITUTE]);
    }

    #[test]
    fn test_encode_is_case_sensitive() {
        // lower case is not recognized for encoding and falls back to Latin-1
        assert_eq!(&*encode("Čěšý", "cp895"), &[SUBSTITUTE, SUBSTITUTE, SUBSTITUTE, 0xFD]);
        assert_eq!(decode(b"\x80\x81\x82\x83", "cp895"), "Čěšý");
    }

    #[test]
    fn test_encode_substitutes_and_keeps_going() {
        assert_eq!(&*encode("a中b中c", "CP895"), &[b'a', SUBSTITUTE, b'b', SUBSTITUTE, b'c']);
    }

    #[test]
    fn test_decode_encode_every_alias() {
        for (name, page) in identifiers() {
            let bytes = encode("Hello", name);
            assert_eq!(&*bytes, b"Hello", "{}", name);
            assert_eq!(decode(&bytes, name), "Hello", "{} ({})", name, page);
        }
    }
}
