use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{
    Clipboard, CopyButton, CopyState, KeysApi, RevealDialog, ToastKind, ToastQueue, UiError,
    WidgetState, GENERATE_FAILED, KEY_INVALID, KEY_VALID, SOMETHING_WENT_WRONG,
};

/// Toast as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Everything the page shows at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSnapshot {
    pub generate: WidgetState,
    pub validate: WidgetState,
    pub entered_key: String,
    /// Key in the reveal dialog; `None` when the dialog is closed
    pub displayed_key: Option<String>,
    pub copy: CopyState,
    pub toasts: Vec<ToastView>,
}

impl ConsoleSnapshot {
    pub fn dialog_open(&self) -> bool {
        self.displayed_key.is_some()
    }
}

#[derive(Debug, Default)]
struct ConsoleView {
    generate: WidgetState,
    validate: WidgetState,
    entered_key: String,
    dialog: RevealDialog,
    copy: CopyButton,
    toasts: ToastQueue,
}

/// Drives the generate and validate widgets against a `KeysApi`
///
/// Cloning shares the same view, so a request can be awaited on one handle
/// while another renders.
#[derive(Clone)]
pub struct KeyConsole {
    api: Arc<dyn KeysApi>,
    clipboard: Arc<dyn Clipboard>,
    view: Arc<Mutex<ConsoleView>>,
}

impl KeyConsole {
    pub fn new(api: Arc<dyn KeysApi>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            api,
            clipboard,
            view: Arc::new(Mutex::new(ConsoleView::default())),
        }
    }

    /// Text typed into the validate widget's input
    pub async fn set_entered_key(&self, text: impl Into<String>) {
        self.view.lock().await.entered_key = text.into();
    }

    /// Generate button: on success the reveal dialog opens with the new key
    pub async fn generate(&self) -> Result<(), UiError> {
        self.view.lock().await.generate.begin("generate")?;

        let result = self.api.create_key().await;

        let mut view = self.view.lock().await;
        view.generate.finish();

        match result {
            Ok(key) => {
                debug!("Key generated, opening reveal dialog");
                view.copy.reset();
                view.dialog.open(key);
            }
            Err(e) => {
                warn!(error = %e, "Key generation failed");
                view.toasts.push(ToastKind::Error, GENERATE_FAILED, Instant::now());
            }
        }

        Ok(())
    }

    /// Validate button: checks the entered key and reports with a toast
    pub async fn validate(&self) -> Result<(), UiError> {
        let candidate = {
            let mut view = self.view.lock().await;
            view.validate.begin("validate")?;
            view.entered_key.clone()
        };

        let result = self.api.verify_key(&candidate).await;

        let mut view = self.view.lock().await;
        view.validate.finish();

        let now = Instant::now();
        match result {
            Ok(true) => view.toasts.push(ToastKind::Success, KEY_VALID, now),
            Ok(false) => view.toasts.push(ToastKind::Error, KEY_INVALID, now),
            Err(e) => {
                warn!(error = %e, "Key validation failed");
                view.toasts.push(ToastKind::Error, SOMETHING_WENT_WRONG, now)
            }
        };

        Ok(())
    }

    /// Copy button: writes the displayed key to the clipboard
    ///
    /// A click while the copied indicator shows does nothing.
    pub async fn copy(&self) -> Result<(), UiError> {
        let mut view = self.view.lock().await;
        let now = Instant::now();

        if view.copy.is_disabled(now) {
            return Ok(());
        }

        let key = view.dialog.key().ok_or(UiError::NothingToCopy)?;
        self.clipboard.write_text(key.expose())?;
        view.copy.press(now);

        Ok(())
    }

    /// Done button: closes the dialog and forgets the key
    pub async fn dismiss_dialog(&self) {
        let mut view = self.view.lock().await;
        view.dialog.dismiss();
        view.copy.reset();
    }

    pub async fn dismiss_toast(&self, id: u64) -> bool {
        self.view.lock().await.toasts.dismiss(id)
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        let mut view = self.view.lock().await;
        let now = Instant::now();

        let toasts = view
            .toasts
            .active(now)
            .iter()
            .map(|toast| ToastView {
                id: toast.id,
                kind: toast.kind,
                message: toast.message.clone(),
            })
            .collect();

        ConsoleSnapshot {
            generate: view.generate,
            validate: view.validate,
            entered_key: view.entered_key.clone(),
            displayed_key: view.dialog.key().map(|key| key.expose().to_string()),
            copy: view.copy.state(now),
            toasts,
        }
    }

    /// Next instant the snapshot changes on its own (copy revert or toast expiry)
    pub async fn next_deadline(&self) -> Option<Instant> {
        let view = self.view.lock().await;
        let now = Instant::now();

        let copy_revert = view.copy.revert_at().filter(|at| *at > now);
        let toast_expiry = view.toasts.next_expiry();

        match (copy_revert, toast_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
