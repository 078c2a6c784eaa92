//! 通知（ステータスメッセージ）の状態管理
//!
//! 表示できる通知は常に1件のみ。新しい通知は前の通知を無条件に置き換え、
//! 保留中の自動非表示タイマーも取り消す。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub auto_hide: bool,
}

/// `show` ごとに発行される識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTicket(u64);

/// 通知の描画先（UI側のアダプタ）
///
/// 状態が変わるたびに順序どおり呼ばれる。`None` は非表示
pub trait NotificationView: Send + Sync {
    fn render(&self, notification: Option<&Notification>);
}

struct Inner {
    generation: u64,
    current: Option<Notification>,
    pending: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    view: Option<Arc<dyn NotificationView>>,
    hide_delay: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        if let Some(view) = &self.view {
            view.render(inner.current.as_ref());
        }
    }

    fn dismiss(&self, ticket: NotificationTicket) -> bool {
        let mut inner = self.lock();
        if inner.generation != ticket.0 || inner.current.is_none() {
            return false;
        }
        inner.generation += 1;
        inner.current = None;
        self.publish(&inner);
        true
    }
}

#[derive(Clone)]
pub struct NotificationController {
    shared: Arc<Shared>,
}

impl NotificationController {
    pub fn new(hide_delay: Duration) -> Self {
        Self::build(hide_delay, None)
    }

    pub fn with_view(hide_delay: Duration, view: Arc<dyn NotificationView>) -> Self {
        Self::build(hide_delay, Some(view))
    }

    fn build(hide_delay: Duration, view: Option<Arc<dyn NotificationView>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    generation: 0,
                    current: None,
                    pending: None,
                }),
                view,
                hide_delay,
            }),
        }
    }

    /// 通知を表示する
    ///
    /// `auto_hide` のときは一定時間後に非表示になる（その前に別の通知が
    /// 表示された場合は何もしない）
    pub fn show(
        &self,
        message: impl Into<String>,
        severity: Severity,
        auto_hide: bool,
    ) -> NotificationTicket {
        let notification = Notification {
            message: message.into(),
            severity,
            auto_hide,
        };
        debug!(message = %notification.message, ?severity, auto_hide, "通知を表示");

        let mut inner = self.shared.lock();
        if let Some(handle) = inner.pending.take() {
            handle.abort();
        }
        inner.generation += 1;
        let ticket = NotificationTicket(inner.generation);
        inner.current = Some(notification);
        self.shared.publish(&inner);

        if auto_hide {
            inner.pending = self.schedule_hide(ticket);
        }
        ticket
    }

    fn schedule_hide(&self, ticket: NotificationTicket) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("tokioランタイム外のため自動非表示を予約できません");
                return None;
            }
        };

        let shared = Arc::clone(&self.shared);
        let delay = shared.hide_delay;
        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.dismiss(ticket);
        }))
    }

    /// 表示中の通知を直ちに非表示にする
    pub fn hide(&self) {
        let mut inner = self.shared.lock();
        if let Some(handle) = inner.pending.take() {
            handle.abort();
        }
        inner.generation += 1;
        if inner.current.take().is_some() {
            self.shared.publish(&inner);
        }
    }

    /// `ticket` の通知がまだ表示中なら非表示にする
    pub fn dismiss(&self, ticket: NotificationTicket) -> bool {
        self.shared.dismiss(ticket)
    }

    pub fn current(&self) -> Option<Notification> {
        self.shared.lock().current.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.shared.lock().current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct Recorder {
        frames: Mutex<Vec<Option<String>>>,
    }

    impl NotificationView for Recorder {
        fn render(&self, notification: Option<&Notification>) {
            self.frames
                .lock()
                .unwrap()
                .push(notification.map(|n| n.message.clone()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_hide_after_delay() {
        let controller = NotificationController::new(DELAY);
        controller.show("Range selected successfully!", Severity::Info, true);
        assert!(controller.is_visible());

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert!(controller.is_visible());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!controller.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_notification_stays() {
        let controller = NotificationController::new(DELAY);
        controller.show("Processing your request...", Severity::Info, false);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            controller.current().map(|n| n.message),
            Some("Processing your request...".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_replaces_and_restarts_timer() {
        let controller = NotificationController::new(DELAY);
        controller.show("first", Severity::Info, true);

        tokio::time::sleep(Duration::from_secs(3)).await;
        controller.show("second", Severity::Error, true);
        let current = controller.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Error);

        // 最初のタイマー期限（t=5s）を過ぎても2件目は表示されたまま
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(controller.current().unwrap().message, "second");

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(!controller.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_show_cancels_pending_hide() {
        let controller = NotificationController::new(DELAY);
        controller.show("saved", Severity::Info, true);
        controller.show("Processing your request...", Severity::Info, false);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(controller.is_visible());
    }

    #[tokio::test]
    async fn test_hide_forces_hidden() {
        let controller = NotificationController::new(DELAY);
        controller.show("Processing your request...", Severity::Info, false);
        controller.hide();
        assert!(controller.current().is_none());
    }

    #[tokio::test]
    async fn test_dismiss_only_current_ticket() {
        let controller = NotificationController::new(DELAY);
        let processing = controller.show("Processing your request...", Severity::Info, false);
        controller.show("Error: rate limited", Severity::Error, true);

        assert!(!controller.dismiss(processing));
        assert_eq!(controller.current().unwrap().message, "Error: rate limited");

        let latest = controller.show("Processing your request...", Severity::Info, false);
        assert!(controller.dismiss(latest));
        assert!(!controller.is_visible());
    }

    #[tokio::test]
    async fn test_view_sees_every_transition() {
        let recorder = Arc::new(Recorder::default());
        let controller = NotificationController::with_view(DELAY, recorder.clone());

        controller.show("a", Severity::Info, false);
        controller.show("b", Severity::Info, false);
        controller.hide();
        controller.hide();

        let frames = recorder.frames.lock().unwrap().clone();
        assert_eq!(
            frames,
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
    }

    #[test]
    fn test_show_without_runtime_keeps_visible() {
        let controller = NotificationController::new(DELAY);
        controller.show("no runtime", Severity::Info, true);
        assert!(controller.is_visible());
    }
}
