//! The mount point toasts are rendered into.
//!
//! A `ToastSurface` stands for the notification container of a page. Hosts
//! with a DOM or webview forward the calls to it; `InMemorySurface` keeps the
//! toasts in memory for headless hosts.

use super::types::{Notification, Severity};
use crate::error::{ConsoleError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Default id of the element toasts are mounted into
pub const DEFAULT_CONTAINER_ID: &str = "notification-container";

pub type ToastId = Uuid;

/// Severity-derived presentation classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastStyle {
    pub background: &'static str,
    pub text: &'static str,
    pub icon: &'static str,
}

impl ToastStyle {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Success => Self {
                background: "bg-green-100 dark:bg-green-900/30 border-green-400 dark:border-green-600",
                text: "text-green-800 dark:text-green-200",
                icon: "fa-check-circle",
            },
            Severity::Error => Self {
                background: "bg-red-100 dark:bg-red-900/30 border-red-400 dark:border-red-600",
                text: "text-red-800 dark:text-red-200",
                icon: "fa-exclamation-circle",
            },
        }
    }
}

/// Everything a surface needs to draw one toast
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastView {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub style: ToastStyle,
    pub shown_at: DateTime<Utc>,
}

impl ToastView {
    pub fn new(notification: &Notification) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: notification.message().to_string(),
            severity: notification.severity(),
            style: ToastStyle::for_severity(notification.severity()),
            shown_at: Utc::now(),
        }
    }

    /// Markup of the toast element, entering state, with a close control.
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<div id=\"toast-{id}\" data-severity=\"{severity}\" data-shown-at=\"{shown_at}\" ",
                "class=\"notification-enter {background} {text} border-l-4 p-4 mb-3 rounded-lg shadow-lg ",
                "flex items-center justify-between max-w-2xl mx-auto\">",
                "<div class=\"flex items-center space-x-3\">",
                "<i class=\"fas {icon} text-xl\"></i>",
                "<span class=\"font-medium\">{message}</span>",
                "</div>",
                "<button type=\"button\" data-dismiss=\"toast-{id}\" class=\"ml-4 {text} hover:opacity-75 transition\">",
                "<i class=\"fas fa-times\"></i>",
                "</button>",
                "</div>"
            ),
            id = self.id,
            severity = self.severity,
            shown_at = self.shown_at.to_rfc3339(),
            background = self.style.background,
            text = self.style.text,
            icon = self.style.icon,
            message = escape_html(&self.message),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub trait ToastSurface: Send + Sync {
    /// Mount a toast. Fails with `MountPoint` when the container is absent.
    fn mount(&self, toast: &ToastView) -> Result<()>;

    /// Start the exit transition of a mounted toast.
    fn begin_exit(&self, id: ToastId);

    /// Remove a toast. Unknown ids are ignored.
    fn remove(&self, id: ToastId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Exiting,
}

#[derive(Debug, Clone)]
pub struct MountedToast {
    pub view: ToastView,
    pub phase: ToastPhase,
}

/// Headless surface: keeps mounted toasts in memory, newest last.
pub struct InMemorySurface {
    container_id: String,
    container_present: AtomicBool,
    toasts: RwLock<Vec<MountedToast>>,
}

impl Default for InMemorySurface {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_ID)
    }
}

impl InMemorySurface {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            container_present: AtomicBool::new(true),
            toasts: RwLock::new(Vec::new()),
        }
    }

    /// A surface whose page has no notification container.
    pub fn without_container() -> Self {
        let surface = Self::default();
        surface.set_container_present(false);
        surface
    }

    pub fn set_container_present(&self, present: bool) {
        self.container_present.store(present, Ordering::Release);
    }

    pub fn toasts(&self) -> Vec<MountedToast> {
        self.toasts.read().clone()
    }

    pub fn len(&self) -> usize {
        self.toasts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.read().is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts.read().iter().map(|t| t.view.message.clone()).collect()
    }

    pub fn phase_of(&self, id: ToastId) -> Option<ToastPhase> {
        self.toasts.read().iter().find(|t| t.view.id == id).map(|t| t.phase)
    }
}

impl ToastSurface for InMemorySurface {
    fn mount(&self, toast: &ToastView) -> Result<()> {
        if !self.container_present.load(Ordering::Acquire) {
            return Err(ConsoleError::MountPoint(self.container_id.clone()));
        }
        self.toasts.write().push(MountedToast {
            view: toast.clone(),
            phase: ToastPhase::Entering,
        });
        Ok(())
    }

    fn begin_exit(&self, id: ToastId) {
        if let Some(toast) = self.toasts.write().iter_mut().find(|t| t.view.id == id) {
            toast.phase = ToastPhase::Exiting;
        }
    }

    fn remove(&self, id: ToastId) {
        self.toasts.write().retain(|t| t.view.id != id);
    }
}
