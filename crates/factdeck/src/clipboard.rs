use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

/// Destination for copied fact text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The platform clipboard, through the same backend eframe uses.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .context("Failed to open clipboard")?
            .set_text(text)
            .context("Failed to write to clipboard")?;
        tracing::debug!(chars = text.chars().count(), "copied to clipboard");
        Ok(())
    }
}

/// Run the write on a worker thread; the result arrives on the returned channel.
pub fn spawn_write(clipboard: Arc<dyn Clipboard>, text: String) -> Receiver<Result<()>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        // The receiver may be gone if the window closed mid-copy
        let _ = tx.send(clipboard.write_text(&text));
    });
    rx
}
