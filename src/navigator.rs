//! Terminal navigator: reports redirects instead of following them.

use std::sync::Mutex;

use ecolearn_auth::Navigator;

use crate::output;

/// Navigator for a process with no browser location.
///
/// Starts at the path given on the command line and prints every
/// redirect the role router asks for.
#[derive(Debug)]
pub struct CliNavigator {
    path: Mutex<String>,
}

impl CliNavigator {
    /// Pretend the user is looking at `path`.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
        }
    }
}

impl Navigator for CliNavigator {
    fn current_path(&self) -> String {
        self.path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        if let Ok(mut current) = self.path.lock() {
            *current = path.to_string();
        }
        output::print_kv("Redirect", path);
    }
}
