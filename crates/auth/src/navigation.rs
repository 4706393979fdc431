//! Navigation seam.
//!
//! The session layer never touches a router directly; it asks an injected
//! [`Navigator`] to move the user somewhere.

use std::sync::Mutex;

/// A navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Destination path.
    pub path: String,
    /// Originally requested path, to resume after login.
    pub from: Option<String>,
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
}

impl Navigation {
    pub fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            from: None,
            replace: false,
        }
    }

    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            from: None,
            replace: true,
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

/// Navigator that records every request in order.
///
/// Serves headless clients (where "navigation" is just the current location)
/// and tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.lock().clone()
    }

    pub fn current(&self) -> Option<Navigation> {
        self.lock().last().cloned()
    }

    pub fn current_path(&self) -> Option<String> {
        self.current().map(|n| n.path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Navigation>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, to: Navigation) {
        tracing::debug!(path = %to.path, replace = to.replace, "navigate");
        self.lock().push(to);
    }
}
