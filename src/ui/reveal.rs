use std::time::Duration;

use tokio::time::Instant;

use crate::domain::PlaintextKey;

/// How long the copy button shows its copied indicator
pub const COPY_RESET_DELAY: Duration = Duration::from_millis(1500);

/// One-time reveal of a freshly generated key
///
/// Dismissal drops the key; the dialog can only be reopened with a new one.
#[derive(Debug, Default)]
pub struct RevealDialog {
    key: Option<PlaintextKey>,
}

impl RevealDialog {
    pub fn open(&mut self, key: PlaintextKey) {
        self.key = Some(key);
    }

    /// Close and forget the key; returns whether the dialog was open
    pub fn dismiss(&mut self) -> bool {
        self.key.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.key.is_some()
    }

    pub fn key(&self) -> Option<&PlaintextKey> {
        self.key.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    NotCopied,
    Copied,
}

/// Copy affordance: `NotCopied -> Copied`, back after `COPY_RESET_DELAY`
#[derive(Debug, Default)]
pub struct CopyButton {
    copied_at: Option<Instant>,
}

impl CopyButton {
    pub fn state(&self, now: Instant) -> CopyState {
        match self.revert_at() {
            Some(revert_at) if now < revert_at => CopyState::Copied,
            _ => CopyState::NotCopied,
        }
    }

    pub fn is_disabled(&self, now: Instant) -> bool {
        self.state(now) == CopyState::Copied
    }

    /// Register a click; false when the button is disabled
    pub fn press(&mut self, now: Instant) -> bool {
        if self.is_disabled(now) {
            return false;
        }

        self.copied_at = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.copied_at = None;
    }

    /// When the copied indicator goes away, if it is showing
    pub fn revert_at(&self) -> Option<Instant> {
        self.copied_at.map(|at| at + COPY_RESET_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismiss_forgets_key() {
        let mut dialog = RevealDialog::default();
        assert!(!dialog.is_open());

        dialog.open(PlaintextKey::new("rhr_scouting_abc"));
        assert_eq!(dialog.key().map(PlaintextKey::expose), Some("rhr_scouting_abc"));

        assert!(dialog.dismiss());
        assert!(dialog.key().is_none());
        assert!(!dialog.dismiss());
    }

    #[test]
    fn test_copy_reverts_after_delay() {
        let start = Instant::now();
        let mut button = CopyButton::default();
        assert_eq!(button.state(start), CopyState::NotCopied);

        assert!(button.press(start));
        assert_eq!(button.state(start), CopyState::Copied);
        assert_eq!(
            button.state(start + COPY_RESET_DELAY - Duration::from_millis(1)),
            CopyState::Copied
        );
        assert_eq!(button.state(start + COPY_RESET_DELAY), CopyState::NotCopied);
    }

    #[test]
    fn test_copy_disabled_while_copied() {
        let start = Instant::now();
        let mut button = CopyButton::default();

        assert!(button.press(start));
        assert!(!button.press(start + Duration::from_millis(500)));
        assert_eq!(button.revert_at(), Some(start + COPY_RESET_DELAY));

        assert!(button.press(start + COPY_RESET_DELAY));
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut button = CopyButton::default();
        button.press(start);
        button.reset();

        assert_eq!(button.state(start), CopyState::NotCopied);
        assert!(button.revert_at().is_none());
    }
}
