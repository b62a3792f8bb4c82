//! Single-slot hand-off of one notification across a full page navigation.

use super::storage::SessionStorage;
use super::types::Notification;
use std::sync::Arc;

/// Session storage key of the pending slot
pub const PENDING_NOTIFICATION_KEY: &str = "pendingNotification";

pub struct PendingNotificationStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl PendingNotificationStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_key(storage, PENDING_NOTIFICATION_KEY)
    }

    pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Overwrite the slot with `notification`. Failures are logged, not raised:
    /// the worst case is a lost toast after navigation.
    pub fn enqueue(&self, notification: &Notification) {
        let json = match serde_json::to_string(notification) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize pending notification: {}", e);
                return;
            }
        };

        match self.storage.set_item(&self.key, &json) {
            Ok(()) => tracing::debug!("Queued {} notification for next page", notification.severity()),
            Err(e) => tracing::warn!("Failed to queue pending notification: {}", e),
        }
    }

    /// Take the pending notification, leaving the slot empty.
    ///
    /// A value that does not parse back into a notification is discarded.
    pub fn drain(&self) -> Option<Notification> {
        let raw = match self.storage.take_item(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read pending notification: {}", e);
                if let Err(e) = self.storage.remove_item(&self.key) {
                    tracing::warn!("Failed to clear pending notification slot: {}", e);
                }
                return None;
            }
        };

        match serde_json::from_str::<Notification>(&raw) {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::warn!("Discarding unparsable pending notification: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::storage::{FileStorage, MemoryStorage};
    use crate::notifications::types::Severity;
    use tempfile::tempdir;

    fn store() -> (Arc<MemoryStorage>, PendingNotificationStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = PendingNotificationStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_enqueue_then_drain_once() {
        let (_, store) = store();
        let n = Notification::success("Tópico deletado com sucesso!").unwrap();

        store.enqueue(&n);
        assert_eq!(store.drain(), Some(n));
        assert_eq!(store.drain(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let (_, store) = store();
        store.enqueue(&Notification::success("first").unwrap());
        store.enqueue(&Notification::error("second").unwrap());

        let drained = store.drain().unwrap();
        assert_eq!(drained.message(), "second");
        assert_eq!(drained.severity(), Severity::Error);
        assert_eq!(store.drain(), None);
    }

    #[test]
    fn test_stored_shape() {
        let (storage, store) = store();
        store.enqueue(&Notification::success("ok").unwrap());
        let raw = storage.get_item(PENDING_NOTIFICATION_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"message": "ok", "type": "success"}));
    }

    #[test]
    fn test_unparsable_value_is_discarded() {
        let (storage, store) = store();
        for garbage in ["{not json", "null", "42", r#"{"message":""}"#, r#"{"type":"error"}"#] {
            storage.set_item(PENDING_NOTIFICATION_KEY, garbage).unwrap();
            assert_eq!(store.drain(), None, "value {:?}", garbage);
            assert_eq!(storage.get_item(PENDING_NOTIFICATION_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_missing_type_defaults_to_success() {
        let (storage, store) = store();
        storage
            .set_item(PENDING_NOTIFICATION_KEY, r#"{"message":"Configurações atualizadas"}"#)
            .unwrap();
        assert_eq!(store.drain().unwrap().severity(), Severity::Success);
    }

    #[test]
    fn test_corrupt_session_file_yields_none() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "][").unwrap();

        let storage = Arc::new(FileStorage::new(&path).unwrap());
        let store = PendingNotificationStore::new(storage.clone());
        assert_eq!(store.drain(), None);
        assert_eq!(storage.get_item(PENDING_NOTIFICATION_KEY).unwrap(), None);
        assert_eq!(store.drain(), None);

        store.enqueue(&Notification::success("after reset").unwrap());
        assert_eq!(store.drain().unwrap().message(), "after reset");
    }
}
