use std::time::Duration;

use tokio::time::Instant;

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(4000);

pub const KEY_VALID: &str = "Your API key is valid!";
pub const KEY_INVALID: &str = "Your API key is invalid";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong!";
pub const GENERATE_FAILED: &str = "Failed to generate API key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification; never persisted
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Toasts currently on screen, oldest first
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        });

        id
    }

    /// Drop expired toasts and return the rest
    pub fn active(&mut self, now: Instant) -> &[Toast] {
        self.toasts.retain(|toast| toast.expires_at > now);
        &self.toasts
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.toasts.iter().map(|toast| toast.expires_at).min()
    }
}
