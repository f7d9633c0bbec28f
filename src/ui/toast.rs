//! Short-lived notification overlay.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::notification::Notification;

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

#[derive(Debug)]
pub struct ToastCenter {
    toasts: VecDeque<Toast>,
    ttl: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl ToastCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            ttl,
        }
    }

    /// Newest last. The oldest toast is dropped once the stack is full.
    pub fn push(&mut self, notification: Notification, now: Instant) {
        if self.toasts.len() == MAX_VISIBLE_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            notification,
            shown_at: now,
        });
    }

    /// Drop expired toasts. Returns true if anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        let ttl = self.ttl;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < ttl);
        self.toasts.len() != before
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let start = Instant::now();
        let mut center = ToastCenter::new(Duration::from_secs(2));
        center.push(Notification::chat_cleared(), start);
        center.push(Notification::api_key_saved(), start + Duration::from_secs(1));

        assert!(!center.prune(start + Duration::from_millis(1500)));
        assert_eq!(center.len(), 2);

        assert!(center.prune(start + Duration::from_millis(2500)));
        let remaining: Vec<_> = center
            .visible()
            .map(|toast| toast.notification.title.clone())
            .collect();
        assert_eq!(remaining, vec!["API Key Saved".to_string()]);

        assert!(center.prune(start + Duration::from_secs(5)));
        assert!(center.is_empty());
    }

    #[test]
    fn stack_keeps_only_the_newest() {
        let now = Instant::now();
        let mut center = ToastCenter::default();
        for index in 0..5 {
            center.push(Notification::normal(format!("t{index}"), ""), now);
        }

        let titles: Vec<_> = center
            .visible()
            .map(|toast| toast.notification.title.as_str())
            .collect();
        assert_eq!(titles, vec!["t2", "t3", "t4"]);
    }
}
