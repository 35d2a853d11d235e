//! Client UI state machine
//!
//! Two independent widgets (generate, validate), a reveal-once dialog with a
//! copy button, and auto-dismissing toasts. The browser page under `public/`
//! walks the same states; `KeyConsole` drives them from a terminal.

mod client;
mod clipboard;
mod console;
mod error;
mod reveal;
mod toast;
mod widget;

pub use client::{KeysApi, KeysHttpClient};
pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use console::{ConsoleSnapshot, KeyConsole, ToastView};
pub use error::UiError;
pub use reveal::{CopyButton, CopyState, RevealDialog, COPY_RESET_DELAY};
pub use toast::{
    Toast, ToastKind, ToastQueue, GENERATE_FAILED, KEY_INVALID, KEY_VALID, SOMETHING_WENT_WRONG,
    TOAST_DURATION,
};
pub use widget::WidgetState;

#[cfg(test)]
pub use client::MockKeysApi;
