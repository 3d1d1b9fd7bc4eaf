//! # mmsledger-pdu
//!
//! MMS encapsulation (OMA-MMS-ENC) PDU library.
//!
//! ## Features
//!
//! - **WSP primitives**: uintvar, short/long integers, value lengths, text
//! - **Parsing**: m-retrieve-conf (with multipart bodies), m-notification-ind,
//!   m-acknowledge-ind
//! - **Composition**: the same three message types back to wire bytes
//! - **Charsets**: IANA MIBenum table and decoder lookup
//!
//! ## Quick Start
//!
//! ```ignore
//! use mmsledger_pdu::{AcknowledgeInd, GenericPdu, CURRENT_MMS_VERSION};
//!
//! let pdu = mmsledger_pdu::parse(&response_bytes)?;
//! if let GenericPdu::RetrieveConf(conf) = pdu {
//!     for part in conf.body.parts() {
//!         println!("{} ({} bytes)", part.content_type, part.data.len());
//!     }
//!     if let Some(transaction_id) = conf.transaction_id {
//!         let ack = AcknowledgeInd::new(CURRENT_MMS_VERSION, transaction_id);
//!         let bytes = mmsledger_pdu::compose(&GenericPdu::AcknowledgeInd(ack))?;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod composer;
mod content_type;
mod error;
mod header;
mod message;
mod parser;

pub mod charset;
pub mod encoding;

pub use composer::compose;
pub use content_type::{
    APP_SMIL, ContentType, MMS_MESSAGE, MULTIPART_ALTERNATIVE, MULTIPART_MIXED,
    MULTIPART_RELATED, TEXT_HTML, TEXT_PLAIN,
};
pub use error::{Error, Result};
pub use header::{CURRENT_MMS_VERSION, MMS_VERSION_1_0, MMS_VERSION_1_2, MessageType, field};
pub use message::{
    AcknowledgeInd, EncodedStringValue, GenericPdu, NotificationInd, PduBody, PduPart,
    RetrieveConf,
};
pub use parser::{PduParser, parse};
