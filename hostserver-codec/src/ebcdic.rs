//! EBCDIC code page 37 tables
//!
//! CP037 maps all 256 byte values one-to-one onto U+0000..U+00FF, so the
//! decode table is a permutation of Latin-1 and the encode table is its
//! exact inverse. Code points with no CP037 byte encode to `0x3F` (EBCDIC
//! SUB, decoded as U+001A).
//!
//! CCSID 1140 is CP037 with the euro sign at `0x9F` in place of the
//! currency sign.

/// Byte written for any code point CP037 cannot represent
pub const SUBSTITUTE: u8 = 0x3F;

/// EBCDIC space
pub const EBCDIC_SPACE: u8 = 0x40;

/// CP037 byte to UTF-16 code unit
pub static CP037_TO_UNICODE: [u16; 256] = [
    /* 0_ */ 0x0000, 0x0001, 0x0002, 0x0003, 0x009C, 0x0009, 0x0086, 0x007F, 0x0097, 0x008D, 0x008E, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    /* 1_ */ 0x0010, 0x0011, 0x0012, 0x0013, 0x009D, 0x0085, 0x0008, 0x0087, 0x0018, 0x0019, 0x0092, 0x008F, 0x001C, 0x001D, 0x001E, 0x001F,
    /* 2_ */ 0x0080, 0x0081, 0x0082, 0x0083, 0x0084, 0x000A, 0x0017, 0x001B, 0x0088, 0x0089, 0x008A, 0x008B, 0x008C, 0x0005, 0x0006, 0x0007,
    /* 3_ */ 0x0090, 0x0091, 0x0016, 0x0093, 0x0094, 0x0095, 0x0096, 0x0004, 0x0098, 0x0099, 0x009A, 0x009B, 0x0014, 0x0015, 0x009E, 0x001A,
    /* 4_ */ 0x0020, 0x00A0, 0x00E2, 0x00E4, 0x00E0, 0x00E1, 0x00E3, 0x00E5, 0x00E7, 0x00F1, 0x00A2, 0x002E, 0x003C, 0x0028, 0x002B, 0x007C,
    /* 5_ */ 0x0026, 0x00E9, 0x00EA, 0x00EB, 0x00E8, 0x00ED, 0x00EE, 0x00EF, 0x00EC, 0x00DF, 0x0021, 0x0024, 0x002A, 0x0029, 0x003B, 0x00AC,
    /* 6_ */ 0x002D, 0x002F, 0x00C2, 0x00C4, 0x00C0, 0x00C1, 0x00C3, 0x00C5, 0x00C7, 0x00D1, 0x00A6, 0x002C, 0x0025, 0x005F, 0x003E, 0x003F,
    /* 7_ */ 0x00F8, 0x00C9, 0x00CA, 0x00CB, 0x00C8, 0x00CD, 0x00CE, 0x00CF, 0x00CC, 0x0060, 0x003A, 0x0023, 0x0040, 0x0027, 0x003D, 0x0022,
    /* 8_ */ 0x00D8, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x00AB, 0x00BB, 0x00F0, 0x00FD, 0x00FE, 0x00B1,
    /* 9_ */ 0x00B0, 0x006A, 0x006B, 0x006C, 0x006D, 0x006E, 0x006F, 0x0070, 0x0071, 0x0072, 0x00AA, 0x00BA, 0x00E6, 0x00B8, 0x00C6, 0x00A4,
    /* A_ */ 0x00B5, 0x007E, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078, 0x0079, 0x007A, 0x00A1, 0x00BF, 0x00D0, 0x00DD, 0x00DE, 0x00AE,
    /* B_ */ 0x005E, 0x00A3, 0x00A5, 0x00B7, 0x00A9, 0x00A7, 0x00B6, 0x00BC, 0x00BD, 0x00BE, 0x005B, 0x005D, 0x00AF, 0x00A8, 0x00B4, 0x00D7,
    /* C_ */ 0x007B, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047, 0x0048, 0x0049, 0x00AD, 0x00F4, 0x00F6, 0x00F2, 0x00F3, 0x00F5,
    /* D_ */ 0x007D, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F, 0x0050, 0x0051, 0x0052, 0x00B9, 0x00FB, 0x00FC, 0x00F9, 0x00FA, 0x00FF,
    /* E_ */ 0x005C, 0x00F7, 0x0053, 0x0054, 0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005A, 0x00B2, 0x00D4, 0x00D6, 0x00D2, 0x00D3, 0x00D5,
    /* F_ */ 0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038, 0x0039, 0x00B3, 0x00DB, 0x00DC, 0x00D9, 0x00DA, 0x009F,
];

/// Byte position of the euro sign in CCSID 1140
const CP1140_EURO_BYTE: u8 = 0x9F;
const EURO_SIGN: u16 = 0x20AC;

/// Precomputed encode/decode tables for one single-byte EBCDIC code page
///
/// The encode table covers every code point in `0..=0xFFFF`; the single-byte
/// cache keeps one ready-made `String` per byte so decoding a one-byte field
/// does not go through the general loop.
#[derive(Debug, Clone)]
pub struct EbcdicTable {
    ccsid: u32,
    to_unicode: [u16; 256],
    from_unicode: Box<[u8]>,
    single: Vec<String>,
}

impl EbcdicTable {
    /// Tables for CCSID 37
    pub fn cp037() -> Self {
        Self::from_decode_table(37, CP037_TO_UNICODE)
    }

    /// Tables for CCSID 1140 (CP037 with euro)
    pub fn cp1140() -> Self {
        let mut table = CP037_TO_UNICODE;
        table[CP1140_EURO_BYTE as usize] = EURO_SIGN;
        Self::from_decode_table(1140, table)
    }

    fn from_decode_table(ccsid: u32, to_unicode: [u16; 256]) -> Self {
        let mut from_unicode = vec![SUBSTITUTE; 0x10000].into_boxed_slice();
        for (byte, &unit) in to_unicode.iter().enumerate() {
            from_unicode[unit as usize] = byte as u8;
        }

        let single = to_unicode
            .iter()
            .map(|&unit| char::from_u32(unit as u32).unwrap_or('\u{FFFD}').to_string())
            .collect();

        Self {
            ccsid,
            to_unicode,
            from_unicode,
            single,
        }
    }

    /// CCSID these tables implement
    pub fn ccsid(&self) -> u32 {
        self.ccsid
    }

    /// Encode one character, substituting `0x3F` when unmappable
    #[inline]
    pub fn encode_char(&self, ch: char) -> u8 {
        let cp = ch as u32;
        if cp > 0xFFFF {
            SUBSTITUTE
        } else {
            self.from_unicode[cp as usize]
        }
    }

    /// Decode one byte
    #[inline]
    pub fn decode_byte(&self, byte: u8) -> char {
        char::from_u32(self.to_unicode[byte as usize] as u32).unwrap_or('\u{FFFD}')
    }

    /// Decode one byte to its cached string form
    #[inline]
    pub fn decode_byte_str(&self, byte: u8) -> &str {
        &self.single[byte as usize]
    }

    /// Encode text, one byte per character
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars().map(|ch| self.encode_char(ch)).collect()
    }

    /// Encode text into `out`, returning the number of bytes written
    ///
    /// Characters that do not fit are dropped.
    pub fn encode_into(&self, text: &str, out: &mut [u8]) -> usize {
        let mut written = 0;
        for (slot, ch) in out.iter_mut().zip(text.chars()) {
            *slot = self.encode_char(ch);
            written += 1;
        }
        written
    }

    /// Decode bytes to text
    pub fn decode(&self, bytes: &[u8]) -> String {
        match bytes {
            [single] => self.single[*single as usize].clone(),
            _ => bytes.iter().map(|&b| self.decode_byte(b)).collect(),
        }
    }
}
