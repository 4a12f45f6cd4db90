//! General text conversion for CCSIDs other than the built-in EBCDIC pages

use crate::ebcdic::EbcdicTable;
use encoding_rs::{Encoder, EncoderResult, Encoding};

/// A converter resolved from a CCSID's encoding name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// CCSID 37 via the built-in tables
    Ebcdic037,
    /// CCSID 1140 via the built-in tables
    Ebcdic1140,
    /// US-ASCII, seven bits per character
    Ascii,
    /// ISO-8859-1, one byte per code point below U+0100
    Latin1,
    /// UTF-16 big endian without byte order mark
    Utf16Be,
    /// Any converter provided by `encoding_rs`
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    /// Resolve an encoding name from the CCSID table
    ///
    /// Returns `None` for names this build has no converter for; callers
    /// report those as unsupported encodings.
    pub fn resolve(name: &str) -> Option<Self> {
        let encoding = match name {
            "Cp037" => return Some(TextEncoding::Ebcdic037),
            "Cp1140" => return Some(TextEncoding::Ebcdic1140),
            "ASCII" => return Some(TextEncoding::Ascii),
            "ISO8859_1" => return Some(TextEncoding::Latin1),
            "UTF-16BE" => return Some(TextEncoding::Utf16Be),
            "UTF-8" => encoding_rs::UTF_8,
            "Cp1252" => encoding_rs::WINDOWS_1252,
            "Cp1250" => encoding_rs::WINDOWS_1250,
            "Cp1251" => encoding_rs::WINDOWS_1251,
            "Cp1253" => encoding_rs::WINDOWS_1253,
            "Cp1254" => encoding_rs::WINDOWS_1254,
            "Cp1255" => encoding_rs::WINDOWS_1255,
            "Cp1256" => encoding_rs::WINDOWS_1256,
            "Cp1257" => encoding_rs::WINDOWS_1257,
            "Cp1258" => encoding_rs::WINDOWS_1258,
            "MS874" => encoding_rs::WINDOWS_874,
            "ISO8859_2" => encoding_rs::ISO_8859_2,
            "ISO8859_3" => encoding_rs::ISO_8859_3,
            "ISO8859_4" => encoding_rs::ISO_8859_4,
            "ISO8859_5" => encoding_rs::ISO_8859_5,
            "ISO8859_6" => encoding_rs::ISO_8859_6,
            "ISO8859_7" => encoding_rs::ISO_8859_7,
            "ISO8859_8" => encoding_rs::ISO_8859_8,
            "ISO8859_9" => encoding_rs::WINDOWS_1254,
            "ISO8859_15" => encoding_rs::ISO_8859_15,
            "KOI8_R" => encoding_rs::KOI8_R,
            "Cp866" => encoding_rs::IBM866,
            "MacRoman" => encoding_rs::MACINTOSH,
            "MacCyrillic" => encoding_rs::X_MAC_CYRILLIC,
            "Cp943" | "Cp942" => encoding_rs::SHIFT_JIS,
            "EUC_JP" | "Cp33722" => encoding_rs::EUC_JP,
            "EUC_KR" | "Cp949" => encoding_rs::EUC_KR,
            "GB2312" | "GBK" | "Cp1381" | "Cp1386" => encoding_rs::GBK,
            "GB18030" => encoding_rs::GB18030,
            "Big5" | "Cp950" => encoding_rs::BIG5,
            _ => return None,
        };
        Some(TextEncoding::Whatwg(encoding))
    }

    /// Bytes per code unit; fixed-width fields hold whole units only
    pub fn code_unit_width(&self) -> usize {
        match self {
            TextEncoding::Utf16Be => 2,
            _ => 1,
        }
    }

    /// Encode text, writing `?` (or the EBCDIC substitute) for unmappable characters
    pub(crate) fn encode(&self, text: &str, cp037: &EbcdicTable, cp1140: &EbcdicTable) -> Vec<u8> {
        match *self {
            TextEncoding::Ebcdic037 => cp037.encode(text),
            TextEncoding::Ebcdic1140 => cp1140.encode(text),
            TextEncoding::Ascii => text
                .chars()
                .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|ch| if (ch as u32) < 0x100 { ch as u8 } else { b'?' })
                .collect(),
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            TextEncoding::Whatwg(encoding) => encode_whatwg(encoding, text),
        }
    }

    /// Decode bytes, replacing malformed sequences with U+FFFD
    pub(crate) fn decode(&self, bytes: &[u8], cp037: &EbcdicTable, cp1140: &EbcdicTable) -> String {
        match *self {
            TextEncoding::Ebcdic037 => cp037.decode(bytes),
            TextEncoding::Ebcdic1140 => cp1140.decode(bytes),
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Utf16Be => decode_utf16_be(bytes),
            TextEncoding::Whatwg(encoding) => encoding.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

fn encode_whatwg(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder: Encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut remaining = text;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(remaining.len())
            .unwrap_or(remaining.len() * 4 + 16);
        out.reserve(needed);
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut out, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::Unmappable(_) => out.push(b'?'),
            EncoderResult::OutputFull => {}
        }
    }
    out
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 2 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (EbcdicTable, EbcdicTable) {
        (EbcdicTable::cp037(), EbcdicTable::cp1140())
    }

    #[test]
    fn test_resolve() {
        assert_eq!(TextEncoding::resolve("Cp037"), Some(TextEncoding::Ebcdic037));
        assert_eq!(TextEncoding::resolve("UTF-16BE"), Some(TextEncoding::Utf16Be));
        assert_eq!(
            TextEncoding::resolve("Cp943"),
            Some(TextEncoding::Whatwg(encoding_rs::SHIFT_JIS))
        );
        assert_eq!(TextEncoding::resolve("Cp273"), None);
    }

    #[test]
    fn test_utf16_round_trip() {
        let (a, b) = tables();
        let bytes = TextEncoding::Utf16Be.encode("A\u{00E9}\u{1F600}", &a, &b);
        assert_eq!(&bytes[..4], &[0x00, 0x41, 0x00, 0xE9]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(TextEncoding::Utf16Be.decode(&bytes, &a, &b), "A\u{00E9}\u{1F600}");
    }

    #[test]
    fn test_shift_jis() {
        let (a, b) = tables();
        let sjis = TextEncoding::resolve("Cp943").unwrap();
        let bytes = sjis.encode("\u{65E5}\u{672C}", &a, &b);
        assert_eq!(bytes, vec![0x93, 0xFA, 0x96, 0x7B]);
        assert_eq!(sjis.decode(&bytes, &a, &b), "\u{65E5}\u{672C}");
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let (a, b) = tables();
        let latin2 = TextEncoding::resolve("ISO8859_2").unwrap();
        assert_eq!(latin2.encode("a\u{65E5}b", &a, &b), b"a?b".to_vec());
        assert_eq!(TextEncoding::Latin1.encode("\u{20AC}", &a, &b), b"?".to_vec());
    }

    #[test]
    fn test_odd_utf16_length() {
        let (a, b) = tables();
        assert_eq!(TextEncoding::Utf16Be.decode(&[0x00, 0x41, 0x00], &a, &b), "A\u{FFFD}");
    }

    #[test]
    fn test_ascii_is_seven_bit() {
        let (a, b) = tables();
        let ascii = TextEncoding::resolve("ASCII").unwrap();
        assert_eq!(ascii, TextEncoding::Ascii);
        assert_eq!(ascii.encode("A\u{00E9}\u{00FF}z", &a, &b), b"A??z".to_vec());
        assert_eq!(ascii.decode(&[0x41, 0xE9], &a, &b), "A\u{FFFD}");
    }
}
