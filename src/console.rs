//! 端末への通知表示
//!
//! 自動で消えない通知（処理中）はスピナー、それ以外は1行で出力する

use crate::notification::{Notification, NotificationView, Severity};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct ConsoleView {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(message: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

impl NotificationView for ConsoleView {
    fn render(&self, notification: Option<&Notification>) {
        let mut spinner = self
            .spinner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }

        match notification {
            Some(n) if !n.auto_hide => {
                *spinner = Some(Self::start_spinner(&n.message));
            }
            Some(n) => match n.severity {
                Severity::Info => println!("✔ {}", n.message),
                Severity::Error => eprintln!("✖ {}", n.message),
            },
            None => {}
        }
    }
}
