//! Character set identifiers (IANA MIBenum) as carried in PDUs.

use encoding_rs::Encoding;

/// Charset not specified.
pub const ANY_CHARSET: u32 = 0x00;
/// US-ASCII
pub const US_ASCII: u32 = 0x03;
/// ISO-8859-1
pub const ISO_8859_1: u32 = 0x04;
/// ISO-8859-2
pub const ISO_8859_2: u32 = 0x05;
/// ISO-8859-3
pub const ISO_8859_3: u32 = 0x06;
/// ISO-8859-4
pub const ISO_8859_4: u32 = 0x07;
/// ISO-8859-5
pub const ISO_8859_5: u32 = 0x08;
/// ISO-8859-6
pub const ISO_8859_6: u32 = 0x09;
/// ISO-8859-7
pub const ISO_8859_7: u32 = 0x0A;
/// ISO-8859-8
pub const ISO_8859_8: u32 = 0x0B;
/// ISO-8859-9
pub const ISO_8859_9: u32 = 0x0C;
/// `Shift_JIS`, decoded with the Windows-31J extensions.
pub const SHIFT_JIS: u32 = 0x11;
/// EUC-JP
pub const EUC_JP: u32 = 0x12;
/// ISO-2022-JP
pub const ISO_2022_JP: u32 = 0x27;
/// UTF-8
pub const UTF_8: u32 = 0x6A;
/// ISO-10646-UCS-2
pub const UCS2: u32 = 0x03E8;
/// UTF-16
pub const UTF_16: u32 = 0x03F7;
/// GB2312
pub const GB2312: u32 = 0x07E9;
/// Big5
pub const BIG5: u32 = 0x07EA;

const MIME_NAMES: &[(u32, &str)] = &[
    (ANY_CHARSET, "*"),
    (US_ASCII, "us-ascii"),
    (ISO_8859_1, "iso-8859-1"),
    (ISO_8859_2, "iso-8859-2"),
    (ISO_8859_3, "iso-8859-3"),
    (ISO_8859_4, "iso-8859-4"),
    (ISO_8859_5, "iso-8859-5"),
    (ISO_8859_6, "iso-8859-6"),
    (ISO_8859_7, "iso-8859-7"),
    (ISO_8859_8, "iso-8859-8"),
    (ISO_8859_9, "iso-8859-9"),
    (SHIFT_JIS, "shift_JIS"),
    (EUC_JP, "euc-jp"),
    (ISO_2022_JP, "iso-2022-jp"),
    (UTF_8, "utf-8"),
    (UCS2, "iso-10646-ucs-2"),
    (UTF_16, "utf-16"),
    (GB2312, "gb2312"),
    (BIG5, "big5"),
];

/// Returns the MIME name registered for a MIBenum.
#[must_use]
pub fn mime_name(mib_enum: u32) -> Option<&'static str> {
    MIME_NAMES
        .iter()
        .find(|(code, _)| *code == mib_enum)
        .map(|(_, name)| *name)
}

/// Returns the MIBenum for a MIME name (case-insensitive).
#[must_use]
pub fn mib_enum(name: &str) -> Option<u32> {
    MIME_NAMES
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}

/// Resolves a MIBenum to a decoder.
///
/// UCS-2 has no WHATWG label and is decoded as big-endian UTF-16.
/// Returns `None` for unknown codes and for "any charset".
#[must_use]
pub fn encoding_for(mib_enum: u32) -> Option<&'static Encoding> {
    match mib_enum {
        ANY_CHARSET => None,
        UCS2 => Some(encoding_rs::UTF_16BE),
        code => mime_name(code).and_then(|name| Encoding::for_label(name.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_name_lookup() {
        assert_eq!(mime_name(SHIFT_JIS), Some("shift_JIS"));
        assert_eq!(mime_name(39), Some("iso-2022-jp"));
        assert_eq!(mime_name(4242), None);
        assert_eq!(mib_enum("UTF-8"), Some(UTF_8));
    }

    #[test]
    fn test_encoding_for() {
        assert_eq!(encoding_for(SHIFT_JIS), Some(encoding_rs::SHIFT_JIS));
        assert_eq!(encoding_for(ISO_2022_JP), Some(encoding_rs::ISO_2022_JP));
        assert_eq!(encoding_for(UTF_8), Some(encoding_rs::UTF_8));
        assert_eq!(encoding_for(UCS2), Some(encoding_rs::UTF_16BE));
        assert_eq!(encoding_for(ANY_CHARSET), None);
        assert_eq!(encoding_for(9999), None);
    }
}
