//! Notification delivery for console actions.
//!
//! This module provides:
//! - Decoding of server-sent notification headers
//! - A time-bounded dedup cache for signals repeated across fragment swaps
//! - Toast rendering with auto and manual dismissal
//! - A single-slot pending store that survives a full page navigation
//! - The coordinator that ties these to UI lifecycle events

mod coordinator;
mod dedup;
mod headers;
mod pending;
mod renderer;
mod storage;
mod surface;
mod types;

pub use coordinator::{
    spawn_dedup_sweeper, CompletedExchange, Delivery, DeliveryCoordinator, FailedExchange,
    LifecycleEvent, SignalHook, DEFAULT_FAILURE_MESSAGE, ROOT_CONTAINER,
};
pub use dedup::{DedupKey, Deduplicator, DEFAULT_DEDUP_WINDOW};
pub use headers::{
    decode_notification, triggered_signals, NOTIFICATION_BASE64_HEADER, NOTIFICATION_HEADER,
    NOTIFICATION_TYPE_HEADER, TRIGGER_HEADER,
};
pub use pending::{PendingNotificationStore, PENDING_NOTIFICATION_KEY};
pub use renderer::{NotificationRenderer, ToastHandle, DEFAULT_AUTO_DISMISS, DEFAULT_EXIT_TRANSITION};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use surface::{
    InMemorySurface, MountedToast, ToastId, ToastPhase, ToastStyle, ToastSurface, ToastView,
    DEFAULT_CONTAINER_ID,
};
pub use types::{Notification, Severity};
