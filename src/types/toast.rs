use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How long a toast stays up after it is shown.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Flavor of a toast notification.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    /// Confirmation or other neutral notice.
    #[default]
    Info,

    /// Something went wrong.
    Error,
}

/// A short-lived notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Notification text.
    pub text: String,

    /// Notification flavor.
    pub kind: ToastKind,

    shown_at: Instant,
}

impl Toast {
    /// When this toast was displayed.
    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }

    /// Whether the toast is still within its display window at `now`.
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < TOAST_DURATION
    }
}

/// Holds at most one toast and dismisses it once [`TOAST_DURATION`] elapses.
///
/// Showing a toast while another is visible replaces it and restarts the
/// timer.  Time is read from `tokio::time` so paused test clocks apply.
#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
}

impl ToastSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast now.
    pub fn show(&mut self, text: impl Into<String>, kind: ToastKind) {
        self.show_at(text, kind, Instant::now());
    }

    /// Show a toast as of `now`.
    pub fn show_at(&mut self, text: impl Into<String>, kind: ToastKind, now: Instant) {
        self.current = Some(Toast {
            text: text.into(),
            kind,
            shown_at: now,
        });
    }

    /// The visible toast, if any.
    pub fn visible(&self) -> Option<&Toast> {
        self.visible_at(Instant::now())
    }

    /// The toast visible at `now`, if any.
    pub fn visible_at(&self, now: Instant) -> Option<&Toast> {
        self.current.as_ref().filter(|toast| toast.is_visible_at(now))
    }

    /// Drop the toast if it has expired; returns true when one was dismissed.
    pub fn tick(&mut self) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|toast| !toast.is_visible_at(Instant::now()));
        if expired {
            self.current = None;
        }
        expired
    }

    /// Take the visible toast out of the slot, e.g. once it has been printed.
    pub fn take(&mut self) -> Option<Toast> {
        let now = Instant::now();
        self.current.take().filter(|toast| toast.is_visible_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn toast_expires_after_four_seconds() {
        let mut slot = ToastSlot::new();
        slot.show("Message copied", ToastKind::Info);
        assert_eq!(slot.visible().map(|t| t.kind), Some(ToastKind::Info));

        tokio::time::advance(Duration::from_millis(3_999)).await;
        assert!(slot.visible().is_some());
        assert!(!slot.tick());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(slot.visible().is_none());
        assert!(slot.tick());
        assert!(!slot.tick());
    }

    #[tokio::test(start_paused = true)]
    async fn new_toast_replaces_and_restarts() {
        let mut slot = ToastSlot::new();
        slot.show("first", ToastKind::Info);
        tokio::time::advance(Duration::from_secs(3)).await;

        slot.show("second", ToastKind::Error);
        tokio::time::advance(Duration::from_secs(3)).await;

        let toast = slot.visible().expect("replacement should still be visible");
        assert_eq!(toast.text, "second");
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn take_empties_the_slot() {
        let mut slot = ToastSlot::new();
        slot.show("hello", ToastKind::Info);
        assert_eq!(slot.take().map(|t| t.text), Some("hello".to_string()));
        assert!(slot.take().is_none());
    }
}
