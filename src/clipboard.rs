use anyhow::{Context, Result};
use std::collections::VecDeque;

/// Number of past transcripts kept for the paste-previous hotkey.
pub const HISTORY_SLOTS: usize = 2;

/// Ring of the last two texts published to the clipboard.
///
/// Only the transcription worker pushes; the hotkey handler reads.
/// Insertion order is preserved and the oldest entry is evicted first.
#[derive(Debug, Default)]
pub struct ClipboardHistory {
    entries: VecDeque<String>,
}

impl ClipboardHistory {
    pub fn new() -> Self {
        ClipboardHistory {
            entries: VecDeque::with_capacity(HISTORY_SLOTS),
        }
    }

    pub fn push(&mut self, text: String) {
        if self.entries.len() == HISTORY_SLOTS {
            self.entries.pop_front();
        }
        self.entries.push_back(text);
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Second-most-recent entry, used by the paste-previous hotkey.
    pub fn previous(&self) -> Option<&str> {
        if self.entries.len() < HISTORY_SLOTS {
            return None;
        }
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Put text on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to open system clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write to system clipboard")?;
    Ok(())
}

/// Read the current clipboard text, if any.
pub fn read_clipboard() -> Result<String> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to open system clipboard")?;
    clipboard
        .get_text()
        .context("Failed to read text from system clipboard")
}
