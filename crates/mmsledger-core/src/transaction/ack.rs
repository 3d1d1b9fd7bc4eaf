//! M-Acknowledge.ind construction and dispatch.

use mmsledger_pdu::{
    AcknowledgeInd, CURRENT_MMS_VERSION, EncodedStringValue, GenericPdu, RetrieveConf,
};
use tracing::debug;

use crate::Result;
use crate::config::TransactionSettings;
use crate::transport::Transport;

/// Build the acknowledgement for a retrieved message.
///
/// Returns `None` when the relay did not ask for one, i.e. the message
/// carries no transaction id.
#[must_use]
pub fn build_acknowledge(
    conf: &RetrieveConf,
    settings: &TransactionSettings,
) -> Option<AcknowledgeInd> {
    let transaction_id = conf.transaction_id.clone()?;
    let mut ack = AcknowledgeInd::new(CURRENT_MMS_VERSION, transaction_id);
    ack.set_from(EncodedStringValue::from(settings.local_number.as_str()));
    Some(ack)
}

/// Compose and send the acknowledgement, if one is required.
///
/// Posts to `content_location` when `notify_wap_mmsc` is set, otherwise to
/// the transport's default endpoint. Returns whether anything was sent.
///
/// # Errors
///
/// Returns an error if composing or sending fails.
pub async fn send_acknowledge(
    transport: &dyn Transport,
    settings: &TransactionSettings,
    conf: &RetrieveConf,
    content_location: &str,
) -> Result<bool> {
    let Some(ack) = build_acknowledge(conf, settings) else {
        debug!("No transaction id, relay does not want an acknowledgement");
        return Ok(false);
    };

    let pdu = mmsledger_pdu::compose(&GenericPdu::AcknowledgeInd(ack))?;
    let endpoint = settings.notify_wap_mmsc.then_some(content_location);
    transport.send(pdu, endpoint).await?;
    Ok(true)
}
