//! WSP primitive value encodings.
//!
//! Implements the octet-level grammar of WAP-230 section 8.4.2 that the
//! MMS encapsulation builds on: unsigned variable-length integers,
//! short and long integers, value lengths and NUL-terminated text.

use crate::error::{Error, Result};
use crate::message::EncodedStringValue;

/// Quote octet prefixed to text whose first octet has the high bit set.
pub const QUOTE: u8 = 0x7F;
/// Quote octet prefixed to quoted-string values.
pub const QUOTED_STRING: u8 = 0x22;
/// Marks a value length encoded as a following uintvar.
pub const LENGTH_QUOTE: u8 = 0x1F;
/// Largest length that fits in a single short-length octet.
pub const SHORT_LENGTH_MAX: u8 = 30;

const END_OF_STRING: u8 = 0x00;
const SHORT_INTEGER_MASK: u8 = 0x80;

/// Cursor over PDU bytes.
///
/// Offsets reported in errors are absolute, also for readers created
/// with [`Reader::sub_reader`].
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader over the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            base: 0,
        }
    }

    /// Returns the absolute offset of the next unread byte.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Returns the unread input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Returns true if all input has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| Error::UnexpectedEof(self.position()))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| Error::UnexpectedEof(self.input.len() + self.base))?;
        let slice = &self.input[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Consumes `len` bytes and returns a reader limited to them.
    pub fn sub_reader(&mut self, len: usize) -> Result<Self> {
        let base = self.position();
        let input = self.take(len)?;
        Ok(Self {
            input,
            pos: 0,
            base,
        })
    }

    /// Reads an unsigned variable-length integer (at most 5 octets).
    pub fn read_uintvar(&mut self) -> Result<u32> {
        let start = self.position();
        let mut value: u32 = 0;
        for _ in 0..5 {
            let byte = self.read_u8()?;
            value = value
                .checked_mul(0x80)
                .map(|v| v | u32::from(byte & 0x7F))
                .ok_or_else(|| self.invalid(start, "uintvar overflow"))?;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(self.invalid(start, "uintvar longer than 5 octets"))
    }

    /// Reads a short-integer (one octet with the high bit set).
    pub fn read_short_integer(&mut self) -> Result<u8> {
        let start = self.position();
        let byte = self.read_u8()?;
        if byte & SHORT_INTEGER_MASK == 0 {
            return Err(self.invalid(start, "expected short-integer"));
        }
        Ok(byte & 0x7F)
    }

    /// Reads a long-integer (short length followed by big-endian octets).
    pub fn read_long_integer(&mut self) -> Result<u64> {
        let start = self.position();
        let len = self.read_u8()?;
        if len == 0 || len > 8 {
            return Err(self.invalid(start, "long-integer length out of range"));
        }
        let octets = self.take(usize::from(len))?;
        Ok(octets
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }

    /// Reads an integer-value (short-integer or long-integer).
    pub fn read_integer_value(&mut self) -> Result<u64> {
        match self.peek() {
            Some(byte) if byte & SHORT_INTEGER_MASK != 0 => {
                self.read_short_integer().map(u64::from)
            }
            Some(_) => self.read_long_integer(),
            None => Err(Error::UnexpectedEof(self.position())),
        }
    }

    /// Reads a value-length (short-length or length-quote + uintvar).
    pub fn read_value_length(&mut self) -> Result<usize> {
        let start = self.position();
        let byte = self.read_u8()?;
        match byte {
            0..=SHORT_LENGTH_MAX => Ok(usize::from(byte)),
            LENGTH_QUOTE => {
                let len = self.read_uintvar()?;
                usize::try_from(len).map_err(|_| self.invalid(start, "value length too large"))
            }
            _ => Err(self.invalid(start, "expected value-length")),
        }
    }

    /// Reads a NUL-terminated text-string, dropping a leading quote.
    pub fn read_text_string(&mut self) -> Result<&'a [u8]> {
        if matches!(self.peek(), Some(QUOTE | QUOTED_STRING)) {
            self.pos += 1;
        }
        let rest = self.remaining();
        let len = rest
            .iter()
            .position(|b| *b == END_OF_STRING)
            .ok_or_else(|| Error::UnexpectedEof(self.base + self.input.len()))?;
        let text = &rest[..len];
        self.pos += len + 1;
        Ok(text)
    }

    /// Reads an encoded-string-value.
    ///
    /// Plain text values are reported with charset `0` (unspecified).
    pub fn read_encoded_string_value(&mut self) -> Result<EncodedStringValue> {
        match self.peek() {
            Some(byte) if byte <= LENGTH_QUOTE => {
                let len = self.read_value_length()?;
                let mut value = self.sub_reader(len)?;
                let charset = value.read_integer_value()?;
                let charset = u32::try_from(charset)
                    .map_err(|_| value.invalid(value.position(), "charset out of range"))?;
                let text = value.read_text_string()?;
                Ok(EncodedStringValue::with_charset(charset, text.to_vec()))
            }
            Some(_) => Ok(EncodedStringValue::new(self.read_text_string()?.to_vec())),
            None => Err(Error::UnexpectedEof(self.position())),
        }
    }

    /// Skips one value of any well-known header.
    ///
    /// The first octet of every WSP value tells its extent: lengths up to
    /// 30 (short-length), 31 (length-quote), text or a single short-integer.
    pub fn skip_value(&mut self) -> Result<()> {
        match self.peek() {
            Some(0..=SHORT_LENGTH_MAX | LENGTH_QUOTE) => {
                let len = self.read_value_length()?;
                self.take(len).map(|_| ())
            }
            Some(0x20..=0x7F) => self.read_text_string().map(|_| ()),
            Some(_) => self.read_u8().map(|_| ()),
            None => Err(Error::UnexpectedEof(self.position())),
        }
    }

    /// Builds an [`Error::InvalidValue`] at the given absolute offset.
    pub(crate) fn invalid(&self, position: usize, message: &str) -> Error {
        Error::InvalidValue {
            position,
            message: message.to_string(),
        }
    }
}

/// Appends a uintvar.
pub fn write_uintvar(buf: &mut Vec<u8>, value: u32) {
    let mut octets = [0u8; 5];
    let mut idx = octets.len();
    let mut rest = value;
    loop {
        idx -= 1;
        // Masked to 7 bits above, so the cast is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let low = (rest & 0x7F) as u8;
        octets[idx] = if idx == octets.len() - 1 { low } else { low | 0x80 };
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    buf.extend_from_slice(&octets[idx..]);
}

/// Appends a short-integer. Values must be below 128.
pub fn write_short_integer(buf: &mut Vec<u8>, value: u8) {
    buf.push(value | SHORT_INTEGER_MASK);
}

/// Appends a long-integer using the fewest octets.
pub fn write_long_integer(buf: &mut Vec<u8>, value: u64) {
    let octets = value.to_be_bytes();
    let skip = octets.iter().take_while(|b| **b == 0).count().min(7);
    let significant = &octets[skip..];
    // At most 8 octets.
    #[allow(clippy::cast_possible_truncation)]
    let len = significant.len() as u8;
    buf.push(len);
    buf.extend_from_slice(significant);
}

/// Appends an integer-value, short form when it fits.
pub fn write_integer_value(buf: &mut Vec<u8>, value: u64) {
    match u8::try_from(value) {
        Ok(short) if short < 0x80 => write_short_integer(buf, short),
        _ => write_long_integer(buf, value),
    }
}

/// Appends a value-length.
///
/// # Errors
///
/// Returns an error if the length does not fit a uintvar.
pub fn write_value_length(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    match u8::try_from(len) {
        Ok(short) if short <= SHORT_LENGTH_MAX => buf.push(short),
        _ => {
            let len = u32::try_from(len)
                .map_err(|_| Error::Encode(format!("value length {len}")))?;
            buf.push(LENGTH_QUOTE);
            write_uintvar(buf, len);
        }
    }
    Ok(())
}

/// Appends a NUL-terminated text-string, quoting a high first octet.
///
/// # Errors
///
/// Returns an error if the text contains a NUL octet.
pub fn write_text_string(buf: &mut Vec<u8>, text: &[u8]) -> Result<()> {
    if text.contains(&END_OF_STRING) {
        return Err(Error::Encode("text-string containing NUL".to_string()));
    }
    if text.first().is_some_and(|b| *b & 0x80 != 0) {
        buf.push(QUOTE);
    }
    buf.extend_from_slice(text);
    buf.push(END_OF_STRING);
    Ok(())
}

/// Appends an encoded-string-value.
///
/// Values without a charset are written as plain text.
///
/// # Errors
///
/// Returns an error if the text contains a NUL octet.
pub fn write_encoded_string_value(buf: &mut Vec<u8>, value: &EncodedStringValue) -> Result<()> {
    if value.charset == 0 {
        return write_text_string(buf, &value.text);
    }
    let mut inner = Vec::with_capacity(value.text.len() + 4);
    write_integer_value(&mut inner, u64::from(value.charset));
    write_text_string(&mut inner, &value.text)?;
    write_value_length(buf, inner.len())?;
    buf.extend_from_slice(&inner);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreadable_literal)]
mod tests {
    use super::*;

    #[test]
    fn test_uintvar() {
        let mut buf = Vec::new();
        write_uintvar(&mut buf, 0x7F);
        assert_eq!(buf, [0x7F]);

        buf.clear();
        write_uintvar(&mut buf, 0x80);
        assert_eq!(buf, [0x81, 0x00]);

        buf.clear();
        write_uintvar(&mut buf, 0x3FFF);
        assert_eq!(buf, [0xFF, 0x7F]);

        let mut reader = Reader::new(&[0x83, 0x98, 0x0A]);
        assert_eq!(reader.read_uintvar().unwrap(), (3 << 14) | (0x18 << 7) | 0x0A);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_uintvar_too_long() {
        let mut reader = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert!(reader.read_uintvar().is_err());
    }

    #[test]
    fn test_long_integer() {
        let mut buf = Vec::new();
        write_long_integer(&mut buf, 0x0102_0304);
        assert_eq!(buf, [0x04, 0x01, 0x02, 0x03, 0x04]);

        buf.clear();
        write_long_integer(&mut buf, 0);
        assert_eq!(buf, [0x01, 0x00]);

        let mut reader = Reader::new(&[0x02, 0x01, 0x00]);
        assert_eq!(reader.read_long_integer().unwrap(), 256);
    }

    #[test]
    fn test_integer_value_forms() {
        let mut buf = Vec::new();
        write_integer_value(&mut buf, 106);
        assert_eq!(buf, [0xEA]);

        buf.clear();
        write_integer_value(&mut buf, 2026);
        assert_eq!(buf, [0x02, 0x07, 0xEA]);

        let mut reader = Reader::new(&[0xEA, 0x02, 0x07, 0xEA]);
        assert_eq!(reader.read_integer_value().unwrap(), 106);
        assert_eq!(reader.read_integer_value().unwrap(), 2026);
    }

    #[test]
    fn test_value_length() {
        let mut buf = Vec::new();
        write_value_length(&mut buf, 30).unwrap();
        assert_eq!(buf, [30]);

        buf.clear();
        write_value_length(&mut buf, 200).unwrap();
        assert_eq!(buf, [LENGTH_QUOTE, 0x81, 0x48]);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_value_length().unwrap(), 200);
    }

    #[test]
    fn test_text_string_quoting() {
        let mut buf = Vec::new();
        write_text_string(&mut buf, b"abc").unwrap();
        assert_eq!(buf, b"abc\0");

        buf.clear();
        write_text_string(&mut buf, &[0xE3, 0x81, 0x82]).unwrap();
        assert_eq!(buf, [QUOTE, 0xE3, 0x81, 0x82, 0x00]);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_text_string().unwrap(), [0xE3, 0x81, 0x82]);
        assert!(reader.is_eof());

        assert!(write_text_string(&mut buf, b"a\0b").is_err());
    }

    #[test]
    fn test_text_string_unterminated() {
        let mut reader = Reader::new(b"abc");
        assert!(matches!(
            reader.read_text_string(),
            Err(Error::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_encoded_string_value_with_charset() {
        let value = EncodedStringValue::with_charset(106, b"+15551234567/TYPE=PLMN".to_vec());
        let mut buf = Vec::new();
        write_encoded_string_value(&mut buf, &value).unwrap();
        assert_eq!(buf[1], 0xEA);

        let mut reader = Reader::new(&buf);
        let decoded = reader.read_encoded_string_value().unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_skip_value() {
        // short-integer, text, short-length block, then a marker
        let bytes = [0x81, b'x', b'y', 0x00, 0x02, 0xAA, 0xBB, 0x42];
        let mut reader = Reader::new(&bytes);
        reader.skip_value().unwrap();
        reader.skip_value().unwrap();
        reader.skip_value().unwrap();
        assert_eq!(reader.read_u8().unwrap(), 0x42);
    }

    #[test]
    fn test_sub_reader_positions_are_absolute() {
        let bytes = [0x00, 0x00, 0x01];
        let mut reader = Reader::new(&bytes);
        reader.take(2).unwrap();
        let mut sub = reader.sub_reader(1).unwrap();
        assert_eq!(sub.position(), 2);
        match sub.read_short_integer() {
            Err(Error::InvalidValue { position, .. }) => assert_eq!(position, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
