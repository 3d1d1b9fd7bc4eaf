//! Charset normalization of downloaded parts.
//!
//! Japanese carriers deliver text in legacy encodings and encode their
//! emoji as vendor glyphs in the Shift_JIS user-defined area. Before a
//! message is stored, such parts are decoded, their glyphs moved to the
//! Unicode private use area and the result re-encoded as UTF-8.

use std::borrow::Cow;

use encoding_rs::{EncoderResult, Encoding, ISO_2022_JP, SHIFT_JIS};
use mmsledger_pdu::{PduPart, RetrieveConf, TEXT_HTML, charset};
use tracing::debug;

use crate::{Error, Result};

/// First user-defined code point of Windows-31J.
const PUA_START: u32 = 0xE000;
/// Last user-defined code point of Windows-31J.
const PUA_END: u32 = 0xE757;
/// Index pointer of the first user-defined double-byte code (`F0 40`).
const PUA_POINTER: u32 = 8836;

/// Normalize one payload.
///
/// Returns the payload and its charset after normalization. Payloads that
/// need no conversion are returned borrowed with their charset unchanged;
/// converted payloads are always UTF-8.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] if an HTML part names a charset
/// that has no decoder.
pub fn normalize<'a>(
    data: &'a [u8],
    charset: u32,
    content_type: &str,
) -> Result<(Cow<'a, [u8]>, u32)> {
    let is_html = content_type == TEXT_HTML;

    let text = if charset == charset::SHIFT_JIS || (charset == charset::ANY_CHARSET && is_html) {
        remap_glyphs(&decode(SHIFT_JIS, data))
    } else if charset == charset::ISO_2022_JP {
        decode(ISO_2022_JP, data)
    } else if is_html && charset != charset::UTF_8 {
        let encoding = charset::encoding_for(charset).ok_or(Error::UnsupportedCharset(charset))?;
        decode(encoding, data)
    } else {
        return Ok((Cow::Borrowed(data), charset));
    };

    debug!(charset, content_type, "Converted part to UTF-8");
    Ok((Cow::Owned(text.into_bytes()), charset::UTF_8))
}

/// Normalize a part in place, replacing payload and charset together.
///
/// # Errors
///
/// See [`normalize`]. The part is left untouched on error.
pub fn normalize_part(part: &mut PduPart) -> Result<()> {
    let (data, charset) = normalize(&part.data, part.charset, &part.content_type)?;
    if let Cow::Owned(data) = data {
        part.set_data(charset, data);
    }
    Ok(())
}

/// Normalize every part of a downloaded message.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_message(conf: &mut RetrieveConf) -> Result<()> {
    for part in conf.body.parts_mut() {
        debug!(
            content_type = %part.content_type,
            charset = part.charset,
            "Normalizing part"
        );
        normalize_part(part)?;
    }
    Ok(())
}

fn decode(encoding: &'static Encoding, data: &[u8]) -> String {
    encoding.decode_without_bom_handling(data).0.into_owned()
}

/// Map a vendor glyph, given as its two Shift_JIS bytes, to its code point.
///
/// Returns `None` when the lead byte is not one of the glyph rows
/// `0xF7`, `0xF9` or `0xFB`.
#[must_use]
pub fn remap_glyph(first: u8, second: u8) -> Option<char> {
    let base: u32 = match (first, second < 0xA0) {
        (0xF7, true) => 0xE100,
        (0xF7, false) => 0xE200,
        (0xF9, true) => 0xE000,
        (0xF9, false) => 0xE300,
        (0xFB, true) => 0xE400,
        (0xFB, false) => 0xE500,
        _ => return None,
    };

    let second = u32::from(second);
    let offset = if second < 0x80 {
        second.checked_sub(0x40)?
    } else if second > 0xA0 {
        second - 0xA0
    } else {
        second - 0x41
    };
    char::from_u32(base + offset)
}

/// Replace every vendor glyph in `text`, keeping all other characters.
fn remap_glyphs(text: &str) -> String {
    let mut encoder = SHIFT_JIS.new_encoder();
    text.chars()
        .map(|c| {
            legacy_bytes(&mut encoder, c)
                .and_then(|(first, second)| remap_glyph(first, second))
                .unwrap_or(c)
        })
        .collect()
}

/// Windows-31J double-byte form of a character, if it has one.
fn legacy_bytes(encoder: &mut encoding_rs::Encoder, c: char) -> Option<(u8, u8)> {
    if c.is_ascii() {
        return None;
    }

    let cp = u32::from(c);
    if (PUA_START..=PUA_END).contains(&cp) {
        // The user-defined rows are not in the Shift_JIS encode index
        let pointer = cp - PUA_START + PUA_POINTER;
        let (lead, trail) = (pointer / 188, pointer % 188);
        let lead = lead + if lead < 0x1F { 0x81 } else { 0xC1 };
        let trail = trail + if trail < 0x3F { 0x40 } else { 0x41 };
        return Some((u8::try_from(lead).ok()?, u8::try_from(trail).ok()?));
    }

    let mut utf8 = [0_u8; 4];
    let mut out = [0_u8; 8];
    let (result, _, written) =
        encoder.encode_from_utf8_without_replacement(c.encode_utf8(&mut utf8), &mut out, false);
    match (result, written) {
        (EncoderResult::InputEmpty, 2) => Some((out[0], out[1])),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mmsledger_pdu::{ContentType, PduBody, TEXT_PLAIN};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_remap_glyph_rows() {
        assert_eq!(remap_glyph(0xF7, 0x41), Some('\u{E101}'));
        assert_eq!(remap_glyph(0xF7, 0xA1), Some('\u{E201}'));
        assert_eq!(remap_glyph(0xF9, 0x80), Some('\u{E03F}'));
        assert_eq!(remap_glyph(0xF9, 0xA0), Some('\u{E35F}'));
        assert_eq!(remap_glyph(0xFB, 0xA5), Some('\u{E505}'));
        assert_eq!(remap_glyph(0xFB, 0x40), Some('\u{E400}'));
    }

    #[test]
    fn test_remap_glyph_other_rows() {
        assert_eq!(remap_glyph(0x82, 0xA0), None);
        assert_eq!(remap_glyph(0xF8, 0x41), None);
        assert_eq!(remap_glyph(0xFA, 0xA5), None);
    }

    #[test]
    fn test_shift_jis_glyphs_are_remapped() {
        // "A", HIRAGANA A, a glyph in row F7 and one in row F9
        let data = [0x41, 0x82, 0xA0, 0xF7, 0x41, 0xF9, 0xA5];
        let (out, charset) = normalize(&data, charset::SHIFT_JIS, TEXT_PLAIN).unwrap();
        assert_eq!(charset, charset::UTF_8);
        assert_eq!(
            std::str::from_utf8(&out).unwrap(),
            "A\u{3042}\u{E101}\u{E305}"
        );
    }

    #[test]
    fn test_untagged_html_is_read_as_shift_jis() {
        let data = [b'<', b'p', b'>', 0xFB, 0xA5];
        let (out, charset) = normalize(&data, charset::ANY_CHARSET, TEXT_HTML).unwrap();
        assert_eq!(charset, charset::UTF_8);
        assert_eq!(std::str::from_utf8(&out).unwrap(), "<p>\u{E505}");
    }

    #[test]
    fn test_iso_2022_jp() {
        // ESC $ B, HIRAGANA A, ESC ( B
        let data = [0x1B, 0x24, 0x42, 0x24, 0x22, 0x1B, 0x28, 0x42];
        let (out, charset) = normalize(&data, charset::ISO_2022_JP, TEXT_PLAIN).unwrap();
        assert_eq!(charset, charset::UTF_8);
        assert_eq!(std::str::from_utf8(&out).unwrap(), "\u{3042}");
    }

    #[test]
    fn test_html_in_other_charset() {
        let (out, charset) = normalize(&[0xE9], charset::ISO_8859_1, TEXT_HTML).unwrap();
        assert_eq!(charset, charset::UTF_8);
        assert_eq!(std::str::from_utf8(&out).unwrap(), "\u{E9}");
    }

    #[test]
    fn test_html_in_unknown_charset_fails() {
        let err = normalize(b"x", 9999, TEXT_HTML).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCharset(9999)));
    }

    #[test]
    fn test_other_parts_are_borrowed() {
        let data = [0xE9, 0x00, 0xFF];
        for (charset, content_type) in [
            (charset::UTF_8, TEXT_HTML),
            (charset::ISO_8859_1, TEXT_PLAIN),
            (charset::ANY_CHARSET, "image/jpeg"),
        ] {
            let (out, out_charset) = normalize(&data, charset, content_type).unwrap();
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(out_charset, charset);
        }
    }

    #[test]
    fn test_normalize_message_updates_parts() {
        let body: PduBody = [
            PduPart::new(TEXT_PLAIN, vec![0x82, 0xA0]).with_charset(charset::SHIFT_JIS),
            PduPart::new("image/gif", vec![0x47, 0x49, 0x46]),
        ]
        .into_iter()
        .collect();
        let mut conf = RetrieveConf::new(ContentType::new(mmsledger_pdu::MULTIPART_MIXED), body);

        normalize_message(&mut conf).unwrap();
        let parts: Vec<_> = conf.body.parts().collect();
        assert_eq!(parts[0].charset, charset::UTF_8);
        assert_eq!(parts[0].data, "\u{3042}".as_bytes());
        assert_eq!(parts[1].charset, charset::ANY_CHARSET);
        assert_eq!(parts[1].data, b"GIF");
    }

    proptest! {
        #[test]
        fn converted_output_is_utf8(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            for charset in [charset::SHIFT_JIS, charset::ISO_2022_JP] {
                let (out, out_charset) = normalize(&data, charset, TEXT_PLAIN).unwrap();
                prop_assert_eq!(out_charset, charset::UTF_8);
                prop_assert!(std::str::from_utf8(&out).is_ok());
            }
        }

        #[test]
        fn ascii_shift_jis_text_is_unchanged(text in "[ -~]{0,64}") {
            let (out, _) = normalize(text.as_bytes(), charset::SHIFT_JIS, TEXT_PLAIN).unwrap();
            prop_assert_eq!(&*out, text.as_bytes());
        }

        #[test]
        fn remap_glyph_lands_in_private_use_area(first in any::<u8>(), second in any::<u8>()) {
            if let Some(c) = remap_glyph(first, second) {
                let in_private_use_area = ('\u{E000}'..='\u{F8FF}').contains(&c);
                prop_assert!(in_private_use_area);
            }
        }
    }
}
