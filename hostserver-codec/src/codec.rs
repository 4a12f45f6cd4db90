//! Text codec instance
//!
//! A `Codec` owns the EBCDIC lookup tables. Build one with [`Codec::new`]
//! when a test or embedding needs an isolated instance, or borrow the
//! process-wide one from [`Codec::shared`]; both behave identically since
//! the tables never change after construction.

use crate::ccsid::{CCSID_EBCDIC_US, encoding_name};
use crate::ebcdic::EbcdicTable;
use crate::error::{HostServerError, HostServerResult};
use crate::text::TextEncoding;
use once_cell::sync::Lazy;

static SHARED: Lazy<Codec> = Lazy::new(Codec::new);

/// Converts between Unicode text and host byte encodings
#[derive(Debug, Clone)]
pub struct Codec {
    cp037: EbcdicTable,
    cp1140: EbcdicTable,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    pub fn new() -> Self {
        Self {
            cp037: EbcdicTable::cp037(),
            cp1140: EbcdicTable::cp1140(),
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> &'static Codec {
        &SHARED
    }

    /// The CCSID 37 tables
    pub fn cp037(&self) -> &EbcdicTable {
        &self.cp037
    }

    /// Encode text as CCSID 37, substituting `0x3F` for unmappable characters
    pub fn text_to_ebcdic37(&self, text: &str) -> Vec<u8> {
        self.cp037.encode(text)
    }

    pub fn ebcdic37_to_text(&self, bytes: &[u8]) -> String {
        self.cp037.decode(bytes)
    }

    /// Resolve the converter for a CCSID
    pub fn encoding_for(&self, ccsid: u32) -> HostServerResult<TextEncoding> {
        if ccsid == CCSID_EBCDIC_US {
            return Ok(TextEncoding::Ebcdic037);
        }
        encoding_name(ccsid)
            .and_then(TextEncoding::resolve)
            .ok_or(HostServerError::UnsupportedEncoding(ccsid))
    }

    pub fn text_to_bytes(&self, text: &str, ccsid: u32) -> HostServerResult<Vec<u8>> {
        let encoding = self.encoding_for(ccsid)?;
        Ok(encoding.encode(text, &self.cp037, &self.cp1140))
    }

    pub fn bytes_to_text(&self, bytes: &[u8], ccsid: u32) -> HostServerResult<String> {
        let encoding = self.encoding_for(ccsid)?;
        Ok(encoding.decode(bytes, &self.cp037, &self.cp1140))
    }

    /// Encode text into exactly `length` bytes
    ///
    /// Short values are right-padded with the encoding's space; long values
    /// are cut after the last character that fits whole. `length` must be a
    /// multiple of the encoding's code unit (two bytes for UTF-16).
    pub fn text_to_padded_bytes(
        &self,
        text: &str,
        ccsid: u32,
        length: usize,
    ) -> HostServerResult<Vec<u8>> {
        let encoding = self.encoding_for(ccsid)?;
        let unit = encoding.code_unit_width();
        if length % unit != 0 {
            return Err(HostServerError::InvalidData(format!(
                "field of {} byte(s) does not hold whole {}-byte units of CCSID {}",
                length, unit, ccsid
            )));
        }

        let mut bytes = Vec::with_capacity(length);
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let encoded = encoding.encode(ch.encode_utf8(&mut buf), &self.cp037, &self.cp1140);
            if bytes.len() + encoded.len() > length {
                break;
            }
            bytes.extend_from_slice(&encoded);
        }

        let space = encoding.encode(" ", &self.cp037, &self.cp1140);
        while bytes.len() + space.len() <= length {
            bytes.extend_from_slice(&space);
        }
        Ok(bytes)
    }

    /// Write the padded form of `text` into `out[offset..offset + length]`
    ///
    /// Nothing is written unless the conversion succeeds and the field fits.
    pub fn write_padded(
        &self,
        text: &str,
        ccsid: u32,
        out: &mut [u8],
        offset: usize,
        length: usize,
    ) -> HostServerResult<()> {
        let available = out.len();
        let padded = self.text_to_padded_bytes(text, ccsid, length)?;
        out.get_mut(offset..offset.saturating_add(length))
            .ok_or_else(|| {
                HostServerError::InvalidData(format!(
                    "text field of {} byte(s) at offset {} exceeds buffer of {} byte(s)",
                    length, offset, available
                ))
            })?
            .copy_from_slice(&padded);
        Ok(())
    }
}
