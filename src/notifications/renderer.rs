//! Toast lifecycle: mount, auto-dismiss, manual dismiss.

use super::surface::{ToastId, ToastSurface, ToastView};
use super::types::Notification;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Delay before a toast dismisses itself (5 seconds)
pub const DEFAULT_AUTO_DISMISS: Duration = Duration::from_secs(5);
/// Length of the exit transition before removal
pub const DEFAULT_EXIT_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Live,
    Exiting,
    Removed,
}

struct ToastState {
    id: ToastId,
    phase: Mutex<Phase>,
    timer: Mutex<Option<JoinHandle<()>>>,
    surface: Arc<dyn ToastSurface>,
    exit_transition: Duration,
}

impl ToastState {
    /// Live -> Exiting. Only the first caller wins; later calls return false.
    fn begin_exit(self: &Arc<Self>) -> bool {
        {
            let mut phase = self.phase.lock();
            if *phase != Phase::Live {
                return false;
            }
            *phase = Phase::Exiting;
        }

        self.surface.begin_exit(self.id);

        match Handle::try_current() {
            Ok(runtime) => {
                let state = Arc::clone(self);
                runtime.spawn(async move {
                    tokio::time::sleep(state.exit_transition).await;
                    state.finish_removal();
                });
            }
            Err(_) => self.finish_removal(),
        }
        true
    }

    fn finish_removal(&self) {
        let mut phase = self.phase.lock();
        if *phase == Phase::Removed {
            return;
        }
        *phase = Phase::Removed;
        drop(phase);
        self.surface.remove(self.id);
        tracing::debug!("Removed toast {}", self.id);
    }
}

/// Handle to a mounted toast. Cloning shares the same toast.
#[derive(Clone)]
pub struct ToastHandle {
    state: Arc<ToastState>,
}

impl std::fmt::Debug for ToastHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastHandle")
            .field("id", &self.state.id)
            .field("phase", &*self.state.phase.lock())
            .finish()
    }
}

impl ToastHandle {
    pub fn id(&self) -> ToastId {
        self.state.id
    }

    /// Whether the toast is still on screen and not yet leaving.
    pub fn is_live(&self) -> bool {
        *self.state.phase.lock() == Phase::Live
    }

    pub fn is_removed(&self) -> bool {
        *self.state.phase.lock() == Phase::Removed
    }

    /// Dismiss manually. The auto-dismiss timer is cancelled before the exit
    /// transition starts. Returns `false` if the toast was already leaving.
    pub fn dismiss(&self) -> bool {
        if let Some(timer) = self.state.timer.lock().take() {
            timer.abort();
        }
        self.state.begin_exit()
    }
}

pub struct NotificationRenderer {
    surface: Arc<dyn ToastSurface>,
    auto_dismiss: Duration,
    exit_transition: Duration,
}

impl NotificationRenderer {
    pub fn new(surface: Arc<dyn ToastSurface>) -> Self {
        Self {
            surface,
            auto_dismiss: DEFAULT_AUTO_DISMISS,
            exit_transition: DEFAULT_EXIT_TRANSITION,
        }
    }

    pub fn with_timings(mut self, auto_dismiss: Duration, exit_transition: Duration) -> Self {
        self.auto_dismiss = auto_dismiss;
        self.exit_transition = exit_transition;
        self
    }

    /// Mount a toast for `notification`.
    ///
    /// Returns `None` when the page has no notification container. Without a
    /// tokio runtime no auto-dismiss timer is armed.
    pub fn show(&self, notification: &Notification) -> Option<ToastHandle> {
        let view = ToastView::new(notification);

        if let Err(e) = self.surface.mount(&view) {
            tracing::debug!("Skipping toast: {}", e);
            return None;
        }

        let state = Arc::new(ToastState {
            id: view.id,
            phase: Mutex::new(Phase::Live),
            timer: Mutex::new(None),
            surface: Arc::clone(&self.surface),
            exit_transition: self.exit_transition,
        });

        match Handle::try_current() {
            Ok(runtime) => {
                let timer_state = Arc::clone(&state);
                let auto_dismiss = self.auto_dismiss;
                let timer = runtime.spawn(async move {
                    tokio::time::sleep(auto_dismiss).await;
                    timer_state.timer.lock().take();
                    timer_state.begin_exit();
                });
                *state.timer.lock() = Some(timer);
            }
            Err(_) => {
                tracing::warn!("No async runtime; toast {} will not auto-dismiss", view.id);
            }
        }

        tracing::info!(
            "Showing {} toast {}: {}",
            view.severity,
            view.id,
            view.message
        );
        Some(ToastHandle { state })
    }

    pub fn dismiss(&self, handle: &ToastHandle) -> bool {
        handle.dismiss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::surface::{InMemorySurface, ToastPhase};
    use crate::notifications::types::Severity;

    fn renderer() -> (Arc<InMemorySurface>, NotificationRenderer) {
        let surface = Arc::new(InMemorySurface::default());
        let renderer = NotificationRenderer::new(surface.clone());
        (surface, renderer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_delay() {
        let (surface, renderer) = renderer();
        let handle = renderer.show(&Notification::success("Tópico criado").unwrap()).unwrap();
        assert_eq!(surface.len(), 1);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(handle.is_live());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(surface.phase_of(handle.id()), Some(ToastPhase::Exiting));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(handle.is_removed());
        assert!(surface.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_cancels_timer() {
        let (surface, renderer) = renderer();
        let handle = renderer.show(&Notification::error("Erro ao salvar").unwrap()).unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(renderer.dismiss(&handle));
        assert!(!renderer.dismiss(&handle));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_removed());
        assert!(surface.is_empty());
        assert!(!handle.dismiss());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_stack() {
        let (surface, renderer) = renderer();
        let first = renderer.show(&Notification::success("one").unwrap()).unwrap();
        let _second = renderer.show(&Notification::success("two").unwrap()).unwrap();
        assert_eq!(surface.messages(), vec!["one", "two"]);

        first.dismiss();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(surface.messages(), vec!["two"]);
    }

    #[tokio::test]
    async fn test_missing_container_is_silent() {
        let surface = Arc::new(InMemorySurface::without_container());
        let renderer = NotificationRenderer::new(surface.clone());
        assert!(renderer.show(&Notification::success("lost").unwrap()).is_none());
        assert!(surface.is_empty());
    }

    #[test]
    fn test_without_runtime_dismiss_removes_immediately() {
        let (surface, renderer) = renderer();
        let handle = renderer
            .show(&Notification::new("no runtime", Severity::Success).unwrap())
            .unwrap();
        assert_eq!(surface.len(), 1);

        assert!(handle.dismiss());
        assert!(handle.is_removed());
        assert!(surface.is_empty());
    }
}
