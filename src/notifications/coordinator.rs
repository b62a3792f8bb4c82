//! Routes UI lifecycle events to the decoder, dedup cache, pending slot and
//! renderer.

use super::dedup::Deduplicator;
use super::headers::{decode_notification, triggered_signals};
use super::pending::PendingNotificationStore;
use super::renderer::{NotificationRenderer, ToastHandle};
use super::types::Notification;
use parking_lot::{Mutex, RwLock};
use reqwest::header::HeaderMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Shown when a failed exchange carries no usable text
pub const DEFAULT_FAILURE_MESSAGE: &str = "Erro na operação";
/// Container the coordinator attaches to on a full page load
pub const ROOT_CONTAINER: &str = "body";

/// A network exchange that produced a response, whatever its status.
#[derive(Debug, Clone)]
pub struct CompletedExchange {
    /// Response URL; identifies the signal's origin for dedup
    pub source: String,
    pub status: u16,
    pub headers: HeaderMap,
}

impl CompletedExchange {
    pub fn new(source: impl Into<String>, status: u16, headers: HeaderMap) -> Self {
        Self {
            source: source.into(),
            status,
            headers,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A network exchange that failed, with whatever text describes the failure.
#[derive(Debug, Clone)]
pub struct FailedExchange {
    pub source: String,
    pub detail: Option<String>,
}

impl FailedExchange {
    pub fn new(source: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            source: source.into(),
            detail,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A full page load
    PageLoaded,
    /// Part of the page was replaced without navigation
    FragmentSwapped { container: String },
    ExchangeCompleted(CompletedExchange),
    ExchangeFailed(FailedExchange),
    /// Out-of-band cleanup signal (close a modal, reset a form)
    EntityCreated { signal: String },
}

/// What the coordinator did with an event.
#[derive(Debug)]
pub enum Delivery {
    Shown(ToastHandle),
    /// Same signal already shown within the dedup window
    Suppressed,
    /// A toast was due but the page has no container
    NotMounted,
    /// Nothing to show
    Quiet,
}

impl Delivery {
    pub fn is_shown(&self) -> bool {
        matches!(self, Delivery::Shown(_))
    }

    fn from_render(handle: Option<ToastHandle>) -> Self {
        match handle {
            Some(handle) => Delivery::Shown(handle),
            None => Delivery::NotMounted,
        }
    }
}

pub type SignalHook = Arc<dyn Fn(&str) + Send + Sync>;

pub struct DeliveryCoordinator {
    renderer: NotificationRenderer,
    dedup: Mutex<Deduplicator>,
    pending: PendingNotificationStore,
    failure_message: String,
    /// Containers whose listeners are already bound
    attached: Mutex<HashSet<String>>,
    hooks: RwLock<HashMap<String, Vec<SignalHook>>>,
}

impl DeliveryCoordinator {
    pub fn new(
        renderer: NotificationRenderer,
        dedup: Deduplicator,
        pending: PendingNotificationStore,
    ) -> Self {
        Self {
            renderer,
            dedup: Mutex::new(dedup),
            pending,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            attached: Mutex::new(HashSet::new()),
            hooks: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.failure_message = message;
        }
        self
    }

    pub fn pending(&self) -> &PendingNotificationStore {
        &self.pending
    }

    /// Mark `container` as bound. Returns `false` if it already was, so a
    /// repeated swap of the same fragment does not bind twice.
    pub fn attach(&self, container: &str) -> bool {
        let newly = self.attached.lock().insert(container.to_string());
        if newly {
            tracing::debug!("Attached notification listeners to '{}'", container);
        }
        newly
    }

    pub fn is_attached(&self, container: &str) -> bool {
        self.attached.lock().contains(container)
    }

    /// Register a cleanup hook for an entity-created style signal.
    pub fn on_signal<F>(&self, signal: impl Into<String>, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.hooks
            .write()
            .entry(signal.into())
            .or_default()
            .push(Arc::new(hook));
    }

    pub fn handle(&self, event: LifecycleEvent) -> Delivery {
        match event {
            LifecycleEvent::PageLoaded => self.on_page_load(),
            LifecycleEvent::FragmentSwapped { container } => self.on_fragment_swapped(&container),
            LifecycleEvent::ExchangeCompleted(exchange) => self.on_exchange_completed(&exchange),
            LifecycleEvent::ExchangeFailed(failure) => self.on_exchange_failed(&failure),
            LifecycleEvent::EntityCreated { signal } => {
                self.dispatch_signal(&signal);
                Delivery::Quiet
            }
        }
    }

    /// Drain the pending slot into a toast. No dedup: the slot is consumed.
    pub fn on_page_load(&self) -> Delivery {
        self.attach(ROOT_CONTAINER);
        self.deliver_pending()
    }

    pub fn on_fragment_swapped(&self, container: &str) -> Delivery {
        self.attach(container);
        let expired = self.dedup.lock().sweep(Instant::now());
        if expired > 0 {
            tracing::debug!("Swept {} expired dedup entries", expired);
        }
        self.deliver_pending()
    }

    pub fn on_exchange_completed(&self, exchange: &CompletedExchange) -> Delivery {
        let delivery = match decode_notification(&exchange.headers) {
            Some(notification) => {
                let novel = self.dedup.lock().should_render(&notification, &exchange.source);
                if novel {
                    Delivery::from_render(self.renderer.show(&notification))
                } else {
                    Delivery::Suppressed
                }
            }
            None => Delivery::Quiet,
        };

        for signal in triggered_signals(&exchange.headers) {
            self.dispatch_signal(&signal);
        }

        delivery
    }

    /// Always shows an error toast; failures bypass decoding and dedup.
    pub fn on_exchange_failed(&self, failure: &FailedExchange) -> Delivery {
        let message = failure
            .detail
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(self.failure_message.as_str());

        tracing::warn!("Exchange with '{}' failed: {}", failure.source, message);

        match Notification::error(message) {
            Ok(notification) => Delivery::from_render(self.renderer.show(&notification)),
            Err(e) => {
                tracing::warn!("Cannot build failure notification: {}", e);
                Delivery::Quiet
            }
        }
    }

    /// Show a notification right away, outside any exchange.
    pub fn notify(&self, notification: &Notification) -> Delivery {
        Delivery::from_render(self.renderer.show(notification))
    }

    /// Park a notification for the next page; call right before navigating.
    pub fn notify_after_navigation(&self, notification: &Notification) {
        self.pending.enqueue(notification);
    }

    pub fn dismiss(&self, handle: &ToastHandle) -> bool {
        self.renderer.dismiss(handle)
    }

    fn deliver_pending(&self) -> Delivery {
        match self.pending.drain() {
            Some(notification) => Delivery::from_render(self.renderer.show(&notification)),
            None => Delivery::Quiet,
        }
    }

    fn dispatch_signal(&self, signal: &str) {
        let hooks: Vec<SignalHook> = self
            .hooks
            .read()
            .get(signal)
            .map(|hooks| hooks.to_vec())
            .unwrap_or_default();

        if hooks.is_empty() {
            tracing::debug!("No hooks registered for signal '{}'", signal);
            return;
        }
        tracing::debug!("Dispatching signal '{}' to {} hook(s)", signal, hooks.len());
        for hook in hooks {
            hook(signal);
        }
    }
}

/// Periodically sweep expired dedup entries while the coordinator lives.
pub fn spawn_dedup_sweeper(coordinator: &Arc<DeliveryCoordinator>, period: Duration) -> JoinHandle<()> {
    let weak: Weak<DeliveryCoordinator> = Arc::downgrade(coordinator);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(coordinator) = weak.upgrade() else {
                break;
            };
            let expired = coordinator.dedup.lock().sweep(Instant::now());
            if expired > 0 {
                tracing::debug!("Dedup sweeper evicted {} entries", expired);
            }
        }
    })
}
