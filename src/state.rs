use crate::api::{ClusterApiClient, DEFAULT_API_PREFIX};
use crate::commands::TopicActions;
use crate::error::{ConsoleError, Result};
use crate::notifications::{
    Deduplicator, DeliveryCoordinator, FileStorage, InMemorySurface, NotificationRenderer,
    PendingNotificationStore, SessionStorage, ToastHandle, ToastId, ToastSurface,
    DEFAULT_CONTAINER_ID, DEFAULT_FAILURE_MESSAGE, PENDING_NOTIFICATION_KEY,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    // Notification settings
    #[serde(default = "default_dedup_window")]
    pub dedup_window_ms: u64,
    #[serde(default = "default_auto_dismiss")]
    pub auto_dismiss_ms: u64,
    #[serde(default = "default_exit_transition")]
    pub exit_transition_ms: u64,
    #[serde(default = "default_container_id")]
    pub container_id: String,
    #[serde(default = "default_pending_key")]
    pub pending_key: String,
    #[serde(default = "default_failure_message")]
    pub generic_failure_message: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_dedup_window() -> u64 {
    10_000
}

fn default_auto_dismiss() -> u64 {
    5_000
}

fn default_exit_transition() -> u64 {
    300
}

fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.to_string()
}

fn default_pending_key() -> String {
    PENDING_NOTIFICATION_KEY.to_string()
}

fn default_failure_message() -> String {
    DEFAULT_FAILURE_MESSAGE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_prefix: default_api_prefix(),
            request_timeout_secs: default_request_timeout(),
            dedup_window_ms: default_dedup_window(),
            auto_dismiss_ms: default_auto_dismiss(),
            exit_transition_ms: default_exit_transition(),
            container_id: default_container_id(),
            pending_key: default_pending_key(),
            generic_failure_message: default_failure_message(),
        }
    }
}

impl Settings {
    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }

    pub fn exit_transition(&self) -> Duration {
        Duration::from_millis(self.exit_transition_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.dedup_window_ms == 0 {
            return Err(ConsoleError::Config("dedup_window_ms must be positive".to_string()));
        }
        if self.pending_key.trim().is_empty() {
            return Err(ConsoleError::Config("pending_key must not be empty".to_string()));
        }
        Ok(())
    }
}

pub struct ConsoleState {
    pub settings: Arc<RwLock<Settings>>,
    pub surface: Arc<dyn ToastSurface>,
    pub storage: Arc<dyn SessionStorage>,
    pub data_dir: PathBuf,
    api: RwLock<ClusterApiClient>,
    /// Coordinator of the current page; replaced on every full page load
    page: RwLock<Arc<DeliveryCoordinator>>,
    toasts: RwLock<HashMap<ToastId, ToastHandle>>,
}

impl ConsoleState {
    pub fn new(data_dir: &Path, surface: Arc<dyn ToastSurface>) -> Result<Self> {
        // Load environment variables from .env file (for development)
        let _ = dotenvy::dotenv();

        std::fs::create_dir_all(data_dir)?;
        let settings = Self::load_settings(data_dir);
        settings.validate()?;

        let api = ClusterApiClient::with_options(
            &settings.api_base_url,
            &settings.api_prefix,
            settings.request_timeout(),
        )?;
        let storage: Arc<dyn SessionStorage> =
            Arc::new(FileStorage::new(data_dir.join("session.json"))?);
        let page = Self::build_coordinator(&settings, &surface, &storage);

        tracing::info!(
            "Console state ready: api={}{}, data_dir={:?}",
            settings.api_base_url,
            settings.api_prefix,
            data_dir
        );

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            surface,
            storage,
            data_dir: data_dir.to_path_buf(),
            api: RwLock::new(api),
            page: RwLock::new(Arc::new(page)),
            toasts: RwLock::new(HashMap::new()),
        })
    }

    /// State with an in-memory surface, for hosts that draw toasts themselves.
    pub fn headless(data_dir: &Path) -> Result<(Self, Arc<InMemorySurface>)> {
        let container_id = Self::load_settings(data_dir).container_id;
        let surface = Arc::new(InMemorySurface::new(container_id));
        let state = Self::new(data_dir, surface.clone())?;
        Ok((state, surface))
    }

    fn build_coordinator(
        settings: &Settings,
        surface: &Arc<dyn ToastSurface>,
        storage: &Arc<dyn SessionStorage>,
    ) -> DeliveryCoordinator {
        let renderer = NotificationRenderer::new(Arc::clone(surface))
            .with_timings(settings.auto_dismiss(), settings.exit_transition());
        DeliveryCoordinator::new(
            renderer,
            Deduplicator::new(settings.dedup_window()),
            PendingNotificationStore::with_key(Arc::clone(storage), settings.pending_key.clone()),
        )
        .with_failure_message(settings.generic_failure_message.clone())
    }

    fn load_settings(data_dir: &Path) -> Settings {
        let settings_path = data_dir.join("settings.json");
        let mut settings = if settings_path.exists() {
            std::fs::read_to_string(&settings_path)
                .ok()
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if let Ok(url) = std::env::var("TOPIC_CONSOLE_API_URL") {
            tracing::info!("Using TOPIC_CONSOLE_API_URL from environment variable");
            settings.api_base_url = url;
        }

        settings
    }

    pub fn save_settings(&self) -> Result<()> {
        let settings_path = self.data_dir.join("settings.json");
        let settings = self.settings.read();
        let json = serde_json::to_string_pretty(&*settings)?;
        std::fs::write(settings_path, json)?;
        Ok(())
    }

    /// Coordinator of the page currently displayed.
    pub fn coordinator(&self) -> Arc<DeliveryCoordinator> {
        Arc::clone(&self.page.read())
    }

    /// A full navigation: start a fresh coordinator (empty dedup cache, no
    /// bound containers, no hooks). The session storage carries over.
    pub fn begin_page(&self) -> Arc<DeliveryCoordinator> {
        let settings = self.settings.read().clone();
        let coordinator = Arc::new(Self::build_coordinator(&settings, &self.surface, &self.storage));
        *self.page.write() = Arc::clone(&coordinator);
        coordinator
    }

    pub fn topic_actions(&self) -> TopicActions<ClusterApiClient> {
        TopicActions::new(self.api.read().clone(), self.coordinator())
    }

    /// Replace the settings, rebuild the API client and persist. Timing
    /// changes apply from the next page on.
    pub fn apply_settings(&self, new_settings: Settings) -> Result<()> {
        new_settings.validate()?;
        let api = ClusterApiClient::with_options(
            &new_settings.api_base_url,
            &new_settings.api_prefix,
            new_settings.request_timeout(),
        )?;

        *self.api.write() = api;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    pub(crate) fn track_toast(&self, handle: ToastHandle) {
        let mut toasts = self.toasts.write();
        toasts.retain(|_, h| !h.is_removed());
        toasts.insert(handle.id(), handle);
    }

    pub(crate) fn toast(&self, id: ToastId) -> Option<ToastHandle> {
        self.toasts.read().get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.dedup_window(), Duration::from_secs(10));
        assert_eq!(settings.auto_dismiss(), Duration::from_secs(5));
        assert_eq!(settings.api_prefix, "/api/clusters");
        assert_eq!(settings.pending_key, "pendingNotification");
    }

    #[test]
    fn test_partial_settings_file() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"auto_dismiss_ms": 2000, "api_prefix": "/api/cluster"}"#,
        )
        .unwrap();

        let settings = ConsoleState::load_settings(temp_dir.path());
        assert_eq!(settings.auto_dismiss(), Duration::from_secs(2));
        assert_eq!(settings.api_prefix, "/api/cluster");
        assert_eq!(settings.dedup_window_ms, 10_000);
    }

    #[test]
    fn test_invalid_settings_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{ nope").unwrap();
        let settings = ConsoleState::load_settings(temp_dir.path());
        assert_eq!(settings.exit_transition_ms, 300);
    }

    #[test]
    fn test_zero_dedup_window_rejected() {
        let settings = Settings {
            dedup_window_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConsoleError::Config(_))));
    }

    #[tokio::test]
    async fn test_pending_crosses_pages_and_restarts() {
        let temp_dir = tempdir().unwrap();
        let (state, _) = ConsoleState::headless(temp_dir.path()).unwrap();

        let deleted = crate::notifications::Notification::success("Tópico deletado com sucesso!").unwrap();
        state.coordinator().notify_after_navigation(&deleted);
        drop(state);

        let (state, surface) = ConsoleState::headless(temp_dir.path()).unwrap();
        let page = state.begin_page();
        assert!(page.on_page_load().is_shown());
        assert_eq!(surface.messages(), vec!["Tópico deletado com sucesso!".to_string()]);
        assert!(page.pending().drain().is_none());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let temp_dir = tempdir().unwrap();
        let (state, _) = ConsoleState::headless(temp_dir.path()).unwrap();
        state.settings.write().auto_dismiss_ms = 8_000;
        state.save_settings().unwrap();

        let reloaded = ConsoleState::load_settings(temp_dir.path());
        assert_eq!(reloaded.auto_dismiss_ms, 8_000);
    }

    #[tokio::test]
    async fn test_apply_settings_rejects_bad_url() {
        let temp_dir = tempdir().unwrap();
        let (state, _) = ConsoleState::headless(temp_dir.path()).unwrap();
        let before = state.settings.read().api_base_url.clone();

        let bad = Settings {
            api_base_url: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(state.apply_settings(bad), Err(ConsoleError::InvalidUrl(_))));
        assert_eq!(state.settings.read().api_base_url, before);
    }
}
