//! Navigation seam.

use std::sync::Mutex;

/// Where the user currently is, and a way to send them elsewhere.
pub trait Navigator: Send + Sync + std::fmt::Debug + 'static {
    /// Current location path (may include query and fragment).
    fn current_path(&self) -> String;

    /// Move to `path`.
    fn navigate(&self, path: &str);
}

/// Navigator that only records where it was sent.
#[derive(Debug)]
pub struct RecordingNavigator {
    path: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Start at `path`.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every path navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Move without recording a navigation, as a user typing a URL would.
    pub fn visit(&self, path: impl Into<String>) {
        if let Ok(mut current) = self.path.lock() {
            *current = path.into();
        }
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        self.visit(path);
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
