//! Duplicate delivery detection.

use mmsledger_pdu::{MessageType, RetrieveConf};

use crate::Result;
use crate::store::RecordStore;

/// Returns true if a retrieve-conf with the same Message-ID is already stored.
///
/// Messages without a Message-ID are never duplicates.
///
/// # Errors
///
/// Returns an error if the store lookup fails.
pub async fn is_duplicate(store: &dyn RecordStore, conf: &RetrieveConf) -> Result<bool> {
    let Some(raw) = conf.message_id.as_deref() else {
        return Ok(false);
    };

    let message_id = String::from_utf8_lossy(raw);
    Ok(store
        .find_message(&message_id, MessageType::RetrieveConf)
        .await?
        .is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mmsledger_pdu::{ContentType, PduBody};

    use super::*;
    use crate::store::{MessageBox, MessageRepository, NewNotification};

    fn conf(message_id: Option<&str>) -> RetrieveConf {
        let mut conf = RetrieveConf::new(ContentType::new("text/plain"), PduBody::new());
        conf.message_id = message_id.map(|id| id.as_bytes().to_vec());
        conf
    }

    #[tokio::test]
    async fn test_duplicate_by_message_id() {
        let repo = MessageRepository::in_memory().await.unwrap();
        assert!(!is_duplicate(&repo, &conf(Some("<a@relay>"))).await.unwrap());

        repo.persist(&conf(Some("<a@relay>")), MessageBox::Inbox)
            .await
            .unwrap();
        assert!(is_duplicate(&repo, &conf(Some("<a@relay>"))).await.unwrap());
        assert!(!is_duplicate(&repo, &conf(Some("<b@relay>"))).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_message_id_is_never_duplicate() {
        let repo = MessageRepository::in_memory().await.unwrap();
        repo.persist(&conf(None), MessageBox::Inbox).await.unwrap();
        assert!(!is_duplicate(&repo, &conf(None)).await.unwrap());
    }

    #[tokio::test]
    async fn test_notifications_do_not_count() {
        let repo = MessageRepository::in_memory().await.unwrap();
        repo.insert_notification(&NewNotification {
            transaction_id: "<a@relay>".to_string(),
            content_location: "http://mmsc/a".to_string(),
            ..NewNotification::default()
        })
        .await
        .unwrap();
        assert!(!is_duplicate(&repo, &conf(Some("<a@relay>"))).await.unwrap());
    }
}
