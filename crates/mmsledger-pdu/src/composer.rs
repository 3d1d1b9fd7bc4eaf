//! PDU composer.

use crate::encoding::{
    QUOTED_STRING, write_encoded_string_value, write_long_integer, write_short_integer,
    write_text_string, write_uintvar, write_value_length,
};
use crate::error::{Error, Result};
use crate::header::{MessageType, field, from_token, part_field};
use crate::message::{
    AcknowledgeInd, EncodedStringValue, GenericPdu, NotificationInd, PduBody, RetrieveConf,
};
use crate::parser::message_class_code;

/// Relative-token of the X-Mms-Expiry value.
const EXPIRY_RELATIVE: u8 = 0x81;

/// Composes a PDU into wire bytes.
///
/// # Errors
///
/// Returns an error if a value cannot be represented on the wire, such
/// as text containing NUL octets or a part larger than a uintvar.
pub fn compose(pdu: &GenericPdu) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match pdu {
        GenericPdu::AcknowledgeInd(ack) => compose_acknowledge_ind(&mut buf, ack)?,
        GenericPdu::NotificationInd(notification) => {
            compose_notification_ind(&mut buf, notification)?;
        }
        GenericPdu::RetrieveConf(conf) => compose_retrieve_conf(&mut buf, conf)?,
    }
    Ok(buf)
}

fn write_message_type(buf: &mut Vec<u8>, message_type: MessageType) {
    buf.push(field::MESSAGE_TYPE);
    buf.push(message_type.code());
}

fn write_version(buf: &mut Vec<u8>, version: u8) {
    buf.push(field::MMS_VERSION);
    write_short_integer(buf, version);
}

fn write_from(buf: &mut Vec<u8>, from: Option<&EncodedStringValue>) -> Result<()> {
    let mut inner = Vec::new();
    match from {
        Some(address) if !address.text.is_empty() => {
            inner.push(from_token::ADDRESS_PRESENT);
            write_encoded_string_value(&mut inner, address)?;
        }
        _ => inner.push(from_token::INSERT_ADDRESS),
    }
    buf.push(field::FROM);
    write_value_length(buf, inner.len())?;
    buf.extend_from_slice(&inner);
    Ok(())
}

fn compose_acknowledge_ind(buf: &mut Vec<u8>, ack: &AcknowledgeInd) -> Result<()> {
    write_message_type(buf, MessageType::AcknowledgeInd);
    buf.push(field::TRANSACTION_ID);
    write_text_string(buf, &ack.transaction_id)?;
    write_version(buf, ack.mms_version);
    write_from(buf, ack.from.as_ref())
}

fn compose_notification_ind(buf: &mut Vec<u8>, notification: &NotificationInd) -> Result<()> {
    write_message_type(buf, MessageType::NotificationInd);
    buf.push(field::TRANSACTION_ID);
    write_text_string(buf, &notification.transaction_id)?;
    write_version(buf, notification.mms_version);
    if notification.from.is_some() {
        write_from(buf, notification.from.as_ref())?;
    }
    if let Some(subject) = &notification.subject {
        buf.push(field::SUBJECT);
        write_encoded_string_value(buf, subject)?;
    }
    buf.push(field::MESSAGE_CLASS);
    write_short_integer(buf, 0);
    buf.push(field::MESSAGE_SIZE);
    write_long_integer(buf, notification.message_size);
    if let Some(expiry) = notification.expiry {
        let mut inner = vec![EXPIRY_RELATIVE];
        write_long_integer(&mut inner, expiry);
        buf.push(field::EXPIRY);
        write_value_length(buf, inner.len())?;
        buf.extend_from_slice(&inner);
    }
    buf.push(field::CONTENT_LOCATION);
    write_text_string(buf, &notification.content_location)
}

fn compose_retrieve_conf(buf: &mut Vec<u8>, conf: &RetrieveConf) -> Result<()> {
    write_message_type(buf, MessageType::RetrieveConf);
    if let Some(transaction_id) = &conf.transaction_id {
        buf.push(field::TRANSACTION_ID);
        write_text_string(buf, transaction_id)?;
    }
    write_version(buf, conf.mms_version);
    if let Some(message_id) = &conf.message_id {
        buf.push(field::MESSAGE_ID);
        write_text_string(buf, message_id)?;
    }
    if let Some(date) = conf.date {
        buf.push(field::DATE);
        write_long_integer(buf, date);
    }
    if conf.from.is_some() {
        write_from(buf, conf.from.as_ref())?;
    }
    for to in &conf.to {
        buf.push(field::TO);
        write_encoded_string_value(buf, to)?;
    }
    for cc in &conf.cc {
        buf.push(field::CC);
        write_encoded_string_value(buf, cc)?;
    }
    if let Some(subject) = &conf.subject {
        buf.push(field::SUBJECT);
        write_encoded_string_value(buf, subject)?;
    }
    if let Some(class) = &conf.message_class {
        buf.push(field::MESSAGE_CLASS);
        match message_class_code(class) {
            Some(code) => write_short_integer(buf, code),
            None => write_text_string(buf, class.as_bytes())?,
        }
    }
    buf.push(field::CONTENT_TYPE);
    conf.content_type.write(buf)?;

    if conf.content_type.is_multipart() {
        write_multipart(buf, &conf.body)
    } else {
        if let Some(part) = conf.body.parts().next() {
            buf.extend_from_slice(&part.data);
        }
        Ok(())
    }
}

fn write_multipart(buf: &mut Vec<u8>, body: &PduBody) -> Result<()> {
    write_uintvar(buf, to_uintvar(body.len())?);
    for part in body.parts() {
        let mut headers = Vec::new();
        part.full_content_type().write(&mut headers)?;
        if let Some(location) = &part.content_location {
            headers.push(part_field::CONTENT_LOCATION);
            write_text_string(&mut headers, location.as_bytes())?;
        }
        if let Some(content_id) = &part.content_id {
            headers.push(part_field::CONTENT_ID);
            headers.push(QUOTED_STRING);
            write_text_string(&mut headers, content_id.as_bytes())?;
        }
        write_uintvar(buf, to_uintvar(headers.len())?);
        write_uintvar(buf, to_uintvar(part.data.len())?);
        buf.extend_from_slice(&headers);
        buf.extend_from_slice(&part.data);
    }
    Ok(())
}

fn to_uintvar(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Encode(format!("length {len}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::charset;
    use crate::content_type::{ContentType, MULTIPART_RELATED, TEXT_PLAIN};
    use crate::header::CURRENT_MMS_VERSION;
    use crate::message::PduPart;
    use crate::parser::parse;

    #[test]
    fn test_acknowledge_ind_bytes() {
        let mut ack = AcknowledgeInd::new(CURRENT_MMS_VERSION, b"T1".to_vec());
        ack.set_from(EncodedStringValue::from("5551234"));
        let bytes = compose(&GenericPdu::AcknowledgeInd(ack)).unwrap();

        let mut expected = vec![0x8C, 0x85, 0x98, b'T', b'1', 0x00, 0x8D, 0x92, 0x89, 0x09, 0x80];
        expected.extend_from_slice(b"5551234\0");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_acknowledge_ind_without_number_inserts_address() {
        let mut ack = AcknowledgeInd::new(CURRENT_MMS_VERSION, b"T1".to_vec());
        ack.set_from(EncodedStringValue::from(""));
        let bytes = compose(&GenericPdu::AcknowledgeInd(ack)).unwrap();
        assert!(bytes.ends_with(&[0x89, 0x01, 0x81]));
    }

    #[test]
    fn test_retrieve_conf_parses_back() {
        let body: PduBody = [
            PduPart::new(TEXT_PLAIN, b"hello".to_vec())
                .with_charset(charset::UTF_8)
                .with_content_id("<text0>")
                .with_content_location("text0.txt"),
            PduPart::new("image/png", vec![0x89, 0x50, 0x4E, 0x47]),
        ]
        .into_iter()
        .collect();
        let mut conf = RetrieveConf::new(
            ContentType::new(MULTIPART_RELATED).with_parameter("start", "<smil>"),
            body,
        );
        conf.message_id = Some(b"abc@relay".to_vec());
        conf.subject = Some(EncodedStringValue::with_charset(charset::UTF_8, b"Hi".to_vec()));
        conf.message_class = Some("personal".to_string());

        let pdu = GenericPdu::RetrieveConf(conf);
        let bytes = compose(&pdu).unwrap();
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed, pdu);
    }

    #[test]
    fn test_text_with_nul_is_rejected() {
        let ack = AcknowledgeInd::new(CURRENT_MMS_VERSION, b"T\x001".to_vec());
        assert!(matches!(
            compose(&GenericPdu::AcknowledgeInd(ack)),
            Err(Error::Encode(_))
        ));
    }
}
