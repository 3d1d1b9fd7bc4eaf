//! PDU message structures.

use crate::charset;
use crate::content_type::ContentType;
use crate::header::{CURRENT_MMS_VERSION, MessageType};

/// A header value with an optional charset (encoded-string-value).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedStringValue {
    /// Charset MIBenum, `0` when the value was plain text.
    pub charset: u32,
    /// Raw text octets.
    pub text: Vec<u8>,
}

impl EncodedStringValue {
    /// Creates a plain text value.
    #[must_use]
    pub const fn new(text: Vec<u8>) -> Self {
        Self {
            charset: charset::ANY_CHARSET,
            text,
        }
    }

    /// Creates a value tagged with a charset.
    #[must_use]
    pub const fn with_charset(charset: u32, text: Vec<u8>) -> Self {
        Self { charset, text }
    }

    /// Decodes the value to a string, falling back to lossy UTF-8.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        match charset::encoding_for(self.charset) {
            Some(encoding) => encoding
                .decode_without_bom_handling(&self.text)
                .0
                .into_owned(),
            None => String::from_utf8_lossy(&self.text).into_owned(),
        }
    }
}

impl From<&str> for EncodedStringValue {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

/// One entry of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PduPart {
    /// Media type of the part, e.g. `text/plain`.
    pub content_type: String,
    /// Charset MIBenum, `0` when unspecified.
    pub charset: u32,
    /// `name` parameter of the content type.
    pub name: Option<String>,
    /// `filename` parameter of the content type.
    pub filename: Option<String>,
    /// Content-ID header.
    pub content_id: Option<String>,
    /// Content-Location header.
    pub content_location: Option<String>,
    /// Raw payload.
    pub data: Vec<u8>,
}

impl PduPart {
    /// Creates a part with the given media type and payload.
    #[must_use]
    pub fn new(content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            data,
            ..Self::default()
        }
    }

    /// Sets the charset.
    #[must_use]
    pub const fn with_charset(mut self, charset: u32) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the Content-Location header.
    #[must_use]
    pub fn with_content_location(mut self, location: impl Into<String>) -> Self {
        self.content_location = Some(location.into());
        self
    }

    /// Sets the Content-ID header.
    #[must_use]
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// Replaces the payload and its charset together.
    pub fn set_data(&mut self, charset: u32, data: Vec<u8>) {
        self.charset = charset;
        self.data = data;
    }

    /// Content type including the part-level parameters.
    #[must_use]
    pub fn full_content_type(&self) -> ContentType {
        let mut content_type = ContentType::new(self.content_type.clone()).with_charset(self.charset);
        if let Some(name) = &self.name {
            content_type = content_type.with_parameter("name", name.clone());
        }
        if let Some(filename) = &self.filename {
            content_type = content_type.with_parameter("filename", filename.clone());
        }
        content_type
    }
}

/// Multipart message body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PduBody {
    parts: Vec<PduPart>,
}

impl PduBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Appends a part.
    pub fn add_part(&mut self, part: PduPart) {
        self.parts.push(part);
    }

    /// Number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the body has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterates over the parts.
    pub fn parts(&self) -> impl Iterator<Item = &PduPart> {
        self.parts.iter()
    }

    /// Iterates mutably over the parts.
    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut PduPart> {
        self.parts.iter_mut()
    }
}

impl FromIterator<PduPart> for PduBody {
    fn from_iter<I: IntoIterator<Item = PduPart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

/// m-retrieve-conf: the downloaded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveConf {
    /// X-Mms-Transaction-ID; present when the relay wants an acknowledgement.
    pub transaction_id: Option<Vec<u8>>,
    /// X-Mms-MMS-Version.
    pub mms_version: u8,
    /// Message-ID.
    pub message_id: Option<Vec<u8>>,
    /// Date in seconds since the epoch.
    pub date: Option<u64>,
    /// From; `None` when absent or left to the relay to insert.
    pub from: Option<EncodedStringValue>,
    /// To recipients.
    pub to: Vec<EncodedStringValue>,
    /// Cc recipients.
    pub cc: Vec<EncodedStringValue>,
    /// Subject.
    pub subject: Option<EncodedStringValue>,
    /// X-Mms-Message-Class as text.
    pub message_class: Option<String>,
    /// Content type of the whole message.
    pub content_type: ContentType,
    /// Message body.
    pub body: PduBody,
}

impl RetrieveConf {
    /// Creates a retrieve-conf with the given content type and body.
    #[must_use]
    pub const fn new(content_type: ContentType, body: PduBody) -> Self {
        Self {
            transaction_id: None,
            mms_version: CURRENT_MMS_VERSION,
            message_id: None,
            date: None,
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            subject: None,
            message_class: None,
            content_type,
            body,
        }
    }
}

/// m-notification-ind: announces a message waiting at the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInd {
    /// X-Mms-Transaction-ID.
    pub transaction_id: Vec<u8>,
    /// X-Mms-MMS-Version.
    pub mms_version: u8,
    /// From.
    pub from: Option<EncodedStringValue>,
    /// Subject.
    pub subject: Option<EncodedStringValue>,
    /// X-Mms-Message-Size.
    pub message_size: u64,
    /// X-Mms-Expiry as relative seconds.
    pub expiry: Option<u64>,
    /// X-Mms-Content-Location: where to fetch the message.
    pub content_location: Vec<u8>,
}

/// m-acknowledge-ind: confirms a retrieval to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcknowledgeInd {
    /// X-Mms-MMS-Version.
    pub mms_version: u8,
    /// X-Mms-Transaction-ID copied from the retrieve-conf.
    pub transaction_id: Vec<u8>,
    /// From; `None` asks the relay to insert the address.
    pub from: Option<EncodedStringValue>,
}

impl AcknowledgeInd {
    /// Creates an acknowledgement for the given version and transaction.
    #[must_use]
    pub const fn new(mms_version: u8, transaction_id: Vec<u8>) -> Self {
        Self {
            mms_version,
            transaction_id,
            from: None,
        }
    }

    /// Sets the From address.
    pub fn set_from(&mut self, from: EncodedStringValue) {
        self.from = Some(from);
    }
}

/// Any PDU this library can parse or compose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericPdu {
    /// m-notification-ind
    NotificationInd(NotificationInd),
    /// m-retrieve-conf
    RetrieveConf(RetrieveConf),
    /// m-acknowledge-ind
    AcknowledgeInd(AcknowledgeInd),
}

impl GenericPdu {
    /// Message type of this PDU.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::NotificationInd(_) => MessageType::NotificationInd,
            Self::RetrieveConf(_) => MessageType::RetrieveConf,
            Self::AcknowledgeInd(_) => MessageType::AcknowledgeInd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_string_lossy() {
        let value = EncodedStringValue::with_charset(charset::SHIFT_JIS, vec![0x82, 0xA0]);
        assert_eq!(value.to_string_lossy(), "\u{3042}");

        let plain = EncodedStringValue::from("hello");
        assert_eq!(plain.to_string_lossy(), "hello");
    }

    #[test]
    fn test_set_data_updates_charset() {
        let mut part = PduPart::new("text/plain", b"abc".to_vec()).with_charset(charset::SHIFT_JIS);
        part.set_data(charset::UTF_8, b"xyz".to_vec());
        assert_eq!(part.charset, charset::UTF_8);
        assert_eq!(part.data, b"xyz");
    }

    #[test]
    fn test_full_content_type() {
        let mut part = PduPart::new("image/jpeg", Vec::new());
        part.name = Some("cat.jpg".to_string());
        let ct = part.full_content_type();
        assert_eq!(ct.parameter("name"), Some("cat.jpg"));
        assert_eq!(ct.charset, 0);
    }
}
