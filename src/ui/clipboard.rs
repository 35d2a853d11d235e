use std::io::Write;
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD, Engine};

use super::UiError;

/// Destination for the copy button
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), UiError>;
}

/// Clipboard held in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|contents| contents.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), UiError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| UiError::Clipboard("clipboard lock poisoned".to_string()))?;

        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Terminal clipboard via the OSC 52 escape sequence
///
/// The terminal emulator, not this process, owns the system clipboard; this
/// works over SSH wherever the emulator honours OSC 52.
#[derive(Debug)]
pub struct Osc52Clipboard<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> Result<W, UiError> {
        self.out
            .into_inner()
            .map_err(|_| UiError::Clipboard("clipboard lock poisoned".to_string()))
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn write_text(&self, text: &str) -> Result<(), UiError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| UiError::Clipboard("clipboard lock poisoned".to_string()))?;

        write!(out, "\x1b]52;c;{}\x07", STANDARD.encode(text))
            .and_then(|_| out.flush())
            .map_err(|e| UiError::Clipboard(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());

        clipboard.write_text("rhr_scouting_abc").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("rhr_scouting_abc"));
    }

    #[test]
    fn test_osc52_sequence() {
        let clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.write_text("hello").unwrap();

        let written = String::from_utf8(clipboard.into_inner().unwrap()).unwrap();
        assert_eq!(written, "\x1b]52;c;aGVsbG8=\x07");
    }
}
