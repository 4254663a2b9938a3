use std::fs;
use std::path::{Path, PathBuf};

/// Removes a transient file when dropped, on every exit path.
///
/// The recording WAV and the per-chunk synthesis MP3 both live at fixed
/// paths and must never survive their operation, success or failure.
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: PathBuf) -> Self {
        TempFileGuard { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                eprintln!("⚠️  Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}
