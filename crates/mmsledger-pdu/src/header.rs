//! MMS header field codes and message types (OMA-MMS-ENC section 7).
//!
//! Field codes are listed as they appear on the wire, with the
//! short-integer high bit already set.

/// Well-known header field codes.
pub mod field {
    /// Bcc
    pub const BCC: u8 = 0x81;
    /// Cc
    pub const CC: u8 = 0x82;
    /// X-Mms-Content-Location
    pub const CONTENT_LOCATION: u8 = 0x83;
    /// Content-Type
    pub const CONTENT_TYPE: u8 = 0x84;
    /// Date
    pub const DATE: u8 = 0x85;
    /// X-Mms-Delivery-Report
    pub const DELIVERY_REPORT: u8 = 0x86;
    /// X-Mms-Expiry
    pub const EXPIRY: u8 = 0x88;
    /// From
    pub const FROM: u8 = 0x89;
    /// X-Mms-Message-Class
    pub const MESSAGE_CLASS: u8 = 0x8A;
    /// Message-ID
    pub const MESSAGE_ID: u8 = 0x8B;
    /// X-Mms-Message-Type
    pub const MESSAGE_TYPE: u8 = 0x8C;
    /// X-Mms-MMS-Version
    pub const MMS_VERSION: u8 = 0x8D;
    /// X-Mms-Message-Size
    pub const MESSAGE_SIZE: u8 = 0x8E;
    /// X-Mms-Priority
    pub const PRIORITY: u8 = 0x8F;
    /// X-Mms-Read-Report
    pub const READ_REPORT: u8 = 0x90;
    /// X-Mms-Report-Allowed
    pub const REPORT_ALLOWED: u8 = 0x91;
    /// Subject
    pub const SUBJECT: u8 = 0x96;
    /// To
    pub const TO: u8 = 0x97;
    /// X-Mms-Transaction-Id
    pub const TRANSACTION_ID: u8 = 0x98;
    /// X-Mms-Retrieve-Status
    pub const RETRIEVE_STATUS: u8 = 0x99;
    /// X-Mms-Retrieve-Text
    pub const RETRIEVE_TEXT: u8 = 0x9A;
}

/// Token values of the From header.
pub mod from_token {
    /// An address follows.
    pub const ADDRESS_PRESENT: u8 = 0x80;
    /// The relay inserts the sender address.
    pub const INSERT_ADDRESS: u8 = 0x81;
}

/// Header codes used inside multipart entries.
pub mod part_field {
    /// Content-Location (WSP 0x0E)
    pub const CONTENT_LOCATION: u8 = 0x8E;
    /// Content-ID (WSP 0x40)
    pub const CONTENT_ID: u8 = 0xC0;
}

/// MMS version 1.0.
pub const MMS_VERSION_1_0: u8 = 0x10;
/// MMS version 1.2.
pub const MMS_VERSION_1_2: u8 = 0x12;
/// Version written into composed PDUs.
pub const CURRENT_MMS_VERSION: u8 = MMS_VERSION_1_2;

/// X-Mms-Message-Type values handled by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// m-send-req
    SendReq,
    /// m-notification-ind
    NotificationInd,
    /// m-retrieve-conf
    RetrieveConf,
    /// m-acknowledge-ind
    AcknowledgeInd,
}

impl MessageType {
    /// Decimal value as stored in message records (e.g. 132 for m-retrieve-conf).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::SendReq => 0x80,
            Self::NotificationInd => 0x82,
            Self::RetrieveConf => 0x84,
            Self::AcknowledgeInd => 0x85,
        }
    }

    /// Looks up a message type by its code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x80 => Some(Self::SendReq),
            0x82 => Some(Self::NotificationInd),
            0x84 => Some(Self::RetrieveConf),
            0x85 => Some(Self::AcknowledgeInd),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_codes() {
        assert_eq!(MessageType::RetrieveConf.code(), 132);
        assert_eq!(MessageType::AcknowledgeInd.code(), 133);
        assert_eq!(MessageType::from_code(130), Some(MessageType::NotificationInd));
        assert_eq!(MessageType::from_code(0x81), None);
    }
}
