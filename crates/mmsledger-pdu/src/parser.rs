//! PDU parser.
//!
//! Sans-I/O: operates on a complete PDU held in memory and never panics
//! on malformed input.

use crate::content_type::ContentType;
use crate::encoding::Reader;
use crate::error::{Error, Result};
use crate::header::{MessageType, field, from_token, part_field};
use crate::message::{
    AcknowledgeInd, EncodedStringValue, GenericPdu, NotificationInd, PduBody, PduPart,
    RetrieveConf,
};

const MESSAGE_CLASSES: &[&str] = &["personal", "advertisement", "informational", "auto"];

/// Parses a PDU from wire bytes.
///
/// # Errors
///
/// Returns an error if the PDU is truncated, malformed, lacks a mandatory
/// header or has a message type this library does not handle.
pub fn parse(input: &[u8]) -> Result<GenericPdu> {
    PduParser::new(input).parse()
}

/// Header values collected before the body.
#[derive(Debug, Default)]
struct HeaderValues {
    message_type: Option<u8>,
    transaction_id: Option<Vec<u8>>,
    mms_version: Option<u8>,
    message_id: Option<Vec<u8>>,
    date: Option<u64>,
    from: Option<EncodedStringValue>,
    to: Vec<EncodedStringValue>,
    cc: Vec<EncodedStringValue>,
    subject: Option<EncodedStringValue>,
    message_class: Option<String>,
    message_size: Option<u64>,
    expiry: Option<u64>,
    content_location: Option<Vec<u8>>,
    content_type: Option<ContentType>,
}

/// Parser over a single PDU.
pub struct PduParser<'a> {
    reader: Reader<'a>,
}

impl<'a> PduParser<'a> {
    /// Creates a parser for the given bytes.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
        }
    }

    /// Parses the PDU.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse(mut self) -> Result<GenericPdu> {
        let headers = self.parse_headers()?;
        let code = headers
            .message_type
            .ok_or(Error::MissingHeader("X-Mms-Message-Type"))?;
        let mms_version = headers
            .mms_version
            .unwrap_or(crate::header::CURRENT_MMS_VERSION);

        match MessageType::from_code(code) {
            Some(MessageType::RetrieveConf) => {
                let content_type = headers
                    .content_type
                    .ok_or(Error::MissingHeader("Content-Type"))?;
                let body = if content_type.is_multipart() {
                    self.parse_multipart()?
                } else {
                    let mut part = part_from_content_type(&content_type);
                    part.data = self.reader.remaining().to_vec();
                    std::iter::once(part).collect()
                };
                Ok(GenericPdu::RetrieveConf(RetrieveConf {
                    transaction_id: headers.transaction_id,
                    mms_version,
                    message_id: headers.message_id,
                    date: headers.date,
                    from: headers.from,
                    to: headers.to,
                    cc: headers.cc,
                    subject: headers.subject,
                    message_class: headers.message_class,
                    content_type,
                    body,
                }))
            }
            Some(MessageType::NotificationInd) => {
                Ok(GenericPdu::NotificationInd(NotificationInd {
                    transaction_id: headers
                        .transaction_id
                        .ok_or(Error::MissingHeader("X-Mms-Transaction-ID"))?,
                    mms_version,
                    from: headers.from,
                    subject: headers.subject,
                    message_size: headers.message_size.unwrap_or_default(),
                    expiry: headers.expiry,
                    content_location: headers
                        .content_location
                        .ok_or(Error::MissingHeader("X-Mms-Content-Location"))?,
                }))
            }
            Some(MessageType::AcknowledgeInd) => {
                Ok(GenericPdu::AcknowledgeInd(AcknowledgeInd {
                    mms_version,
                    transaction_id: headers
                        .transaction_id
                        .ok_or(Error::MissingHeader("X-Mms-Transaction-ID"))?,
                    from: headers.from,
                }))
            }
            Some(MessageType::SendReq) | None => Err(Error::UnsupportedMessageType(code)),
        }
    }

    fn parse_headers(&mut self) -> Result<HeaderValues> {
        let mut headers = HeaderValues::default();
        let reader = &mut self.reader;

        while let Some(code) = reader.peek() {
            if code & 0x80 == 0 {
                // Application-header: token text followed by its value.
                reader.read_text_string()?;
                reader.read_text_string()?;
                continue;
            }
            reader.read_u8()?;

            match code {
                field::MESSAGE_TYPE => headers.message_type = Some(reader.read_u8()?),
                field::TRANSACTION_ID => {
                    headers.transaction_id = Some(reader.read_text_string()?.to_vec());
                }
                field::MMS_VERSION => headers.mms_version = Some(reader.read_short_integer()?),
                field::MESSAGE_ID => {
                    headers.message_id = Some(reader.read_text_string()?.to_vec());
                }
                field::DATE => headers.date = Some(reader.read_long_integer()?),
                field::FROM => headers.from = read_from(reader)?,
                field::TO => headers.to.push(reader.read_encoded_string_value()?),
                field::CC => headers.cc.push(reader.read_encoded_string_value()?),
                field::SUBJECT => headers.subject = Some(reader.read_encoded_string_value()?),
                field::CONTENT_LOCATION => {
                    headers.content_location = Some(reader.read_text_string()?.to_vec());
                }
                field::MESSAGE_SIZE => headers.message_size = Some(reader.read_long_integer()?),
                field::EXPIRY => {
                    let len = reader.read_value_length()?;
                    let mut value = reader.sub_reader(len)?;
                    value.read_u8()?;
                    headers.expiry = Some(value.read_long_integer()?);
                }
                field::MESSAGE_CLASS => headers.message_class = Some(read_message_class(reader)?),
                field::CONTENT_TYPE => {
                    // Content-Type is always the last header.
                    headers.content_type = Some(ContentType::read(reader)?);
                    break;
                }
                _ => reader.skip_value()?,
            }
        }

        Ok(headers)
    }

    fn parse_multipart(&mut self) -> Result<PduBody> {
        let reader = &mut self.reader;
        if reader.is_eof() {
            return Ok(PduBody::new());
        }

        let count = reader.read_uintvar()?;
        let mut body = PduBody::new();
        for _ in 0..count {
            let headers_len = reader.read_uintvar()?;
            let headers_len = to_len(reader, headers_len)?;
            let data_len = reader.read_uintvar()?;
            let data_len = to_len(reader, data_len)?;

            let mut headers = reader.sub_reader(headers_len)?;
            let content_type = ContentType::read(&mut headers)?;
            let mut part = part_from_content_type(&content_type);
            read_part_headers(&mut headers, &mut part)?;

            part.data = reader.take(data_len)?.to_vec();
            body.add_part(part);
        }
        Ok(body)
    }
}

fn to_len(reader: &Reader<'_>, value: u32) -> Result<usize> {
    usize::try_from(value).map_err(|_| reader.invalid(reader.position(), "length too large"))
}

fn read_from(reader: &mut Reader<'_>) -> Result<Option<EncodedStringValue>> {
    let len = reader.read_value_length()?;
    let mut value = reader.sub_reader(len)?;
    let start = value.position();
    match value.read_u8()? {
        from_token::ADDRESS_PRESENT => Ok(Some(value.read_encoded_string_value()?)),
        from_token::INSERT_ADDRESS => Ok(None),
        _ => Err(value.invalid(start, "unknown From token")),
    }
}

fn read_message_class(reader: &mut Reader<'_>) -> Result<String> {
    match reader.peek() {
        Some(byte) if byte & 0x80 != 0 => {
            let start = reader.position();
            let code = reader.read_short_integer()?;
            MESSAGE_CLASSES
                .get(usize::from(code))
                .map(|class| (*class).to_string())
                .ok_or_else(|| reader.invalid(start, "unknown message class"))
        }
        _ => Ok(String::from_utf8_lossy(reader.read_text_string()?).into_owned()),
    }
}

/// Reads the headers following a part's content type.
///
/// Headers this library does not interpret end the scan; the
/// remaining header octets are bounded by the entry and ignored.
fn read_part_headers(headers: &mut Reader<'_>, part: &mut PduPart) -> Result<()> {
    while let Some(code) = headers.peek() {
        match code {
            part_field::CONTENT_LOCATION => {
                headers.read_u8()?;
                part.content_location =
                    Some(String::from_utf8_lossy(headers.read_text_string()?).into_owned());
            }
            part_field::CONTENT_ID => {
                headers.read_u8()?;
                part.content_id =
                    Some(String::from_utf8_lossy(headers.read_text_string()?).into_owned());
            }
            _ => break,
        }
    }
    Ok(())
}

fn part_from_content_type(content_type: &ContentType) -> PduPart {
    let mut part = PduPart::new(content_type.media_type.clone(), Vec::new())
        .with_charset(content_type.charset);
    part.name = content_type.parameter("name").map(str::to_string);
    part.filename = content_type.parameter("filename").map(str::to_string);
    part
}

pub(crate) fn message_class_code(class: &str) -> Option<u8> {
    MESSAGE_CLASSES
        .iter()
        .position(|known| known.eq_ignore_ascii_case(class))
        .and_then(|idx| u8::try_from(idx).ok())
}
