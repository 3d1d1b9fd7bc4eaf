//! WSP content type handling.

use std::collections::BTreeMap;
use std::fmt;

use crate::charset;
use crate::encoding::{
    LENGTH_QUOTE, Reader, write_integer_value, write_short_integer, write_text_string,
    write_value_length,
};
use crate::error::{Error, Result};

/// `text/plain`
pub const TEXT_PLAIN: &str = "text/plain";
/// `text/html`
pub const TEXT_HTML: &str = "text/html";
/// `application/smil`
pub const APP_SMIL: &str = "application/smil";
/// `application/vnd.wap.multipart.mixed`
pub const MULTIPART_MIXED: &str = "application/vnd.wap.multipart.mixed";
/// `application/vnd.wap.multipart.related`
pub const MULTIPART_RELATED: &str = "application/vnd.wap.multipart.related";
/// `application/vnd.wap.multipart.alternative`
pub const MULTIPART_ALTERNATIVE: &str = "application/vnd.wap.multipart.alternative";
/// `application/vnd.wap.mms-message`, the HTTP content type of PDUs.
pub const MMS_MESSAGE: &str = "application/vnd.wap.mms-message";

/// WSP assigned content type numbers, indexed by code.
const WELL_KNOWN_MEDIA: &[&str] = &[
    "*/*",
    "text/*",
    TEXT_HTML,
    TEXT_PLAIN,
    "text/x-hdml",
    "text/x-ttml",
    "text/x-vCalendar",
    "text/x-vCard",
    "text/vnd.wap.wml",
    "text/vnd.wap.wmlscript",
    "text/vnd.wap.wta-event",
    "multipart/*",
    "multipart/mixed",
    "multipart/form-data",
    "multipart/byterantes",
    "multipart/alternative",
    "application/*",
    "application/java-vm",
    "application/x-www-form-urlencoded",
    "application/x-hdmlc",
    "application/vnd.wap.wmlc",
    "application/vnd.wap.wmlscriptc",
    "application/vnd.wap.wta-eventc",
    "application/vnd.wap.uaprof",
    "application/vnd.wap.wtls-ca-certificate",
    "application/vnd.wap.wtls-user-certificate",
    "application/x-x509-ca-cert",
    "application/x-x509-user-cert",
    "image/*",
    "image/gif",
    "image/jpeg",
    "image/tiff",
    "image/png",
    "image/vnd.wap.wbmp",
    "application/vnd.wap.multipart.*",
    MULTIPART_MIXED,
    "application/vnd.wap.multipart.form-data",
    "application/vnd.wap.multipart.byteranges",
    MULTIPART_ALTERNATIVE,
    "application/xml",
    "text/xml",
    "application/vnd.wap.wbxml",
    "application/x-x968-cross-cert",
    "application/x-x968-ca-cert",
    "application/x-x968-user-cert",
    "text/vnd.wap.si",
    "application/vnd.wap.sic",
    "text/vnd.wap.sl",
    "application/vnd.wap.slc",
    "text/vnd.wap.co",
    "application/vnd.wap.coc",
    MULTIPART_RELATED,
    "application/vnd.wap.sia",
    "text/vnd.wap.connectivity-xml",
    "application/vnd.wap.connectivity-wbxml",
    "application/pkcs7-mime",
    "application/vnd.wap.hashed-certificate",
    "application/vnd.wap.signed-certificate",
    "application/vnd.wap.cert-response",
    "application/xhtml+xml",
    "application/wml+xml",
    "text/css",
    MMS_MESSAGE,
];

/// Well-known parameter codes (high bit set).
mod param {
    pub const Q: u8 = 0x80;
    pub const CHARSET: u8 = 0x81;
    pub const LEVEL: u8 = 0x82;
    pub const TYPE: u8 = 0x83;
    pub const NAME_V1_1: u8 = 0x85;
    pub const FILENAME_V1_1: u8 = 0x86;
    pub const TYPE_RELATED: u8 = 0x89;
    pub const START_V1_2: u8 = 0x8A;
    pub const START_INFO_V1_2: u8 = 0x8B;
    pub const NAME: u8 = 0x97;
    pub const FILENAME: u8 = 0x98;
    pub const START: u8 = 0x99;
    pub const START_INFO: u8 = 0x9A;
}

/// Content type of a PDU or body part.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentType {
    /// Media type, e.g. `text/plain`.
    pub media_type: String,
    /// Charset MIBenum, `0` when unspecified.
    pub charset: u32,
    /// Remaining parameters (type, start, name, ...).
    pub parameters: BTreeMap<String, String>,
}

impl ContentType {
    /// Creates a content type without parameters.
    #[must_use]
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            charset: charset::ANY_CHARSET,
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the charset.
    #[must_use]
    pub const fn with_charset(mut self, charset: u32) -> Self {
        self.charset = charset;
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Checks if this is one of the WSP multipart types.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        let lower = self.media_type.to_ascii_lowercase();
        lower.starts_with("application/vnd.wap.multipart.") || lower.starts_with("multipart/")
    }

    /// Reads a Content-type-value.
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self> {
        match reader.peek() {
            Some(byte) if byte & 0x80 != 0 => {
                let code = reader.read_short_integer()?;
                Ok(Self::new(well_known_media(u64::from(code))?))
            }
            Some(byte) if byte > LENGTH_QUOTE => {
                let text = reader.read_text_string()?;
                Ok(Self::new(String::from_utf8_lossy(text)))
            }
            Some(_) => {
                let len = reader.read_value_length()?;
                let mut inner = reader.sub_reader(len)?;
                let mut content_type = Self::new(read_media(&mut inner)?);
                while !inner.is_eof() {
                    content_type.read_parameter(&mut inner)?;
                }
                Ok(content_type)
            }
            None => Err(Error::UnexpectedEof(reader.position())),
        }
    }

    fn read_parameter(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        let Some(token) = reader.peek() else {
            return Err(Error::UnexpectedEof(reader.position()));
        };
        if token & 0x80 == 0 {
            let name = String::from_utf8_lossy(reader.read_text_string()?).to_lowercase();
            let value = read_text_value(reader)?;
            self.parameters.insert(name, value);
            return Ok(());
        }

        reader.read_u8()?;
        match token {
            param::CHARSET => {
                self.charset = read_charset(reader)?;
            }
            param::Q => {
                let q = reader.read_uintvar()?;
                self.parameters.insert("q".to_string(), q.to_string());
            }
            param::TYPE_RELATED => {
                let value = match reader.peek() {
                    Some(byte) if byte & 0x80 != 0 => {
                        well_known_media(u64::from(reader.read_short_integer()?))?.to_string()
                    }
                    _ => String::from_utf8_lossy(reader.read_text_string()?).into_owned(),
                };
                self.parameters.insert("type".to_string(), value);
            }
            _ => {
                let name = match token {
                    param::LEVEL => "level",
                    param::TYPE => "type",
                    param::NAME | param::NAME_V1_1 => "name",
                    param::FILENAME | param::FILENAME_V1_1 => "filename",
                    param::START | param::START_V1_2 => "start",
                    param::START_INFO | param::START_INFO_V1_2 => "start-info",
                    // Unknown parameters are dropped
                    _ => return reader.skip_value(),
                };
                let value = read_text_value(reader)?;
                self.parameters.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Appends the Content-type-value encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded.
    pub(crate) fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        if self.charset == charset::ANY_CHARSET && self.parameters.is_empty() {
            return write_media(buf, &self.media_type);
        }

        let mut inner = Vec::new();
        write_media(&mut inner, &self.media_type)?;
        if self.charset != charset::ANY_CHARSET {
            inner.push(param::CHARSET);
            write_integer_value(&mut inner, u64::from(self.charset));
        }
        for (name, value) in &self.parameters {
            match name.as_str() {
                "type" => {
                    inner.push(param::TYPE_RELATED);
                    write_media(&mut inner, value)?;
                }
                "start" => {
                    inner.push(param::START_V1_2);
                    write_text_string(&mut inner, value.as_bytes())?;
                }
                "start-info" => {
                    inner.push(param::START_INFO_V1_2);
                    write_text_string(&mut inner, value.as_bytes())?;
                }
                "name" => {
                    inner.push(param::NAME_V1_1);
                    write_text_string(&mut inner, value.as_bytes())?;
                }
                "filename" => {
                    inner.push(param::FILENAME_V1_1);
                    write_text_string(&mut inner, value.as_bytes())?;
                }
                _ => {
                    write_text_string(&mut inner, name.as_bytes())?;
                    write_text_string(&mut inner, value.as_bytes())?;
                }
            }
        }
        write_value_length(buf, inner.len())?;
        buf.extend_from_slice(&inner);
        Ok(())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media_type)?;
        if let Some(name) = charset::mime_name(self.charset).filter(|_| self.charset != 0) {
            write!(f, "; charset={name}")?;
        }
        for (key, value) in &self.parameters {
            write!(f, "; {key}={value}")?;
        }
        Ok(())
    }
}

/// Looks up a WSP well-known media type.
fn well_known_media(code: u64) -> Result<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|idx| WELL_KNOWN_MEDIA.get(idx).copied())
        .ok_or_else(|| Error::InvalidContentType(format!("unknown well-known media {code:#x}")))
}

fn read_media(reader: &mut Reader<'_>) -> Result<String> {
    match reader.peek() {
        Some(byte) if byte & 0x80 != 0 || byte <= LENGTH_QUOTE => {
            let code = reader.read_integer_value()?;
            Ok(well_known_media(code)?.to_string())
        }
        Some(_) => Ok(String::from_utf8_lossy(reader.read_text_string()?).into_owned()),
        None => Err(Error::UnexpectedEof(reader.position())),
    }
}

fn write_media(buf: &mut Vec<u8>, media_type: &str) -> Result<()> {
    let code = WELL_KNOWN_MEDIA
        .iter()
        .position(|known| known.eq_ignore_ascii_case(media_type))
        .and_then(|idx| u8::try_from(idx).ok());
    match code {
        Some(code) => {
            write_short_integer(buf, code);
            Ok(())
        }
        None => write_text_string(buf, media_type.as_bytes()),
    }
}

fn read_charset(reader: &mut Reader<'_>) -> Result<u32> {
    match reader.peek() {
        Some(byte) if byte & 0x80 != 0 || byte <= LENGTH_QUOTE => {
            let start = reader.position();
            let code = reader.read_integer_value()?;
            u32::try_from(code).map_err(|_| reader.invalid(start, "charset out of range"))
        }
        Some(_) => {
            let name = String::from_utf8_lossy(reader.read_text_string()?).into_owned();
            Ok(charset::mib_enum(&name).unwrap_or(charset::ANY_CHARSET))
        }
        None => Err(Error::UnexpectedEof(reader.position())),
    }
}

/// Reads a typed or untyped parameter value as text.
fn read_text_value(reader: &mut Reader<'_>) -> Result<String> {
    match reader.peek() {
        Some(0x00) => {
            reader.read_u8()?;
            Ok(String::new())
        }
        Some(byte) if byte & 0x80 != 0 || byte <= LENGTH_QUOTE => {
            Ok(reader.read_integer_value()?.to_string())
        }
        Some(_) => Ok(String::from_utf8_lossy(reader.read_text_string()?).into_owned()),
        None => Err(Error::UnexpectedEof(reader.position())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> ContentType {
        let mut reader = Reader::new(bytes);
        let ct = ContentType::read(&mut reader).unwrap();
        assert!(reader.is_eof());
        ct
    }

    #[test]
    fn test_constrained_well_known() {
        let ct = parse(&[0x83]);
        assert_eq!(ct.media_type, TEXT_PLAIN);
        assert_eq!(ct.charset, 0);

        let ct = parse(&[0x82]);
        assert_eq!(ct.media_type, TEXT_HTML);
    }

    #[test]
    fn test_extension_media() {
        let ct = parse(b"application/smil\0");
        assert_eq!(ct.media_type, APP_SMIL);
    }

    #[test]
    fn test_general_form_with_charset() {
        // length 3: text/plain, charset=Shift_JIS
        let ct = parse(&[0x03, 0x83, 0x81, 0x91]);
        assert_eq!(ct.media_type, TEXT_PLAIN);
        assert_eq!(ct.charset, charset::SHIFT_JIS);
    }

    #[test]
    fn test_multipart_related_parameters() {
        let mut bytes = vec![0xB3, 0x89];
        bytes.extend_from_slice(b"application/smil\0");
        bytes.push(0x8A);
        bytes.extend_from_slice(b"<smil>\0");
        let mut encoded = vec![u8::try_from(bytes.len()).unwrap()];
        encoded.extend_from_slice(&bytes);

        let ct = parse(&encoded);
        assert_eq!(ct.media_type, MULTIPART_RELATED);
        assert!(ct.is_multipart());
        assert_eq!(ct.parameter("type"), Some(APP_SMIL));
        assert_eq!(ct.parameter("start"), Some("<smil>"));
    }

    #[test]
    fn test_write_constrained_and_general() {
        let mut buf = Vec::new();
        ContentType::new(TEXT_HTML).write(&mut buf).unwrap();
        assert_eq!(buf, [0x82]);

        buf.clear();
        ContentType::new(TEXT_PLAIN)
            .with_charset(charset::UTF_8)
            .write(&mut buf)
            .unwrap();
        assert_eq!(buf, [0x03, 0x83, 0x81, 0xEA]);
    }

    #[test]
    fn test_unknown_well_known_media() {
        let mut reader = Reader::new(&[0xFF]);
        assert!(matches!(
            ContentType::read(&mut reader),
            Err(Error::InvalidContentType(_))
        ));
    }

    #[test]
    fn test_unknown_parameter_is_skipped() {
        // text/plain, unknown token 0x8F with a text value, charset=UTF-8
        let mut bytes = vec![0x83, 0x8F];
        bytes.extend_from_slice(b"x-vendor\0");
        bytes.extend_from_slice(&[0x81, 0xEA]);
        let mut encoded = vec![u8::try_from(bytes.len()).unwrap()];
        encoded.extend_from_slice(&bytes);

        let ct = parse(&encoded);
        assert_eq!(ct.media_type, TEXT_PLAIN);
        assert_eq!(ct.charset, charset::UTF_8);
        assert!(ct.parameters.is_empty());
    }

    #[test]
    fn test_display() {
        let ct = ContentType::new(TEXT_PLAIN).with_charset(charset::UTF_8);
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");
    }
}
