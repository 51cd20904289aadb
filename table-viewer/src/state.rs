//! Shared application state
//!
//! The active connection config lives here instead of in a process-wide
//! static: the router owns one `AppState` and hands it to every handler.

use std::sync::{Arc, RwLock};

use crate::schema::ConnectionConfig;

/// State shared across request handlers
///
/// Holds the most recently submitted connection config, or `None` when no
/// connect has happened yet (or after a disconnect). There is at most one
/// active config; a connect overwrites it and a disconnect clears it. The
/// lock guards a plain read/overwrite only, so concurrent connect and
/// disconnect calls can interleave; the last write wins.
#[derive(Clone, Default)]
pub struct AppState {
    config: Arc<RwLock<Option<ConnectionConfig>>>,
}

impl AppState {
    /// Create a new state with no active connection config
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the active config, if any
    pub fn config(&self) -> Option<ConnectionConfig> {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the active config unconditionally
    pub fn set_config(&self, config: ConnectionConfig) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(config);
    }

    /// Clear the active config
    pub fn clear_config(&self) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ConnectionConfig {
        ConnectionConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "secret".to_string(),
            database: "demo".to_string(),
        }
    }

    #[test]
    fn test_config_lifecycle() {
        let state = AppState::new();
        assert!(state.config().is_none());

        state.set_config(sample_config());
        assert_eq!(state.config().map(|c| c.database), Some("demo".to_string()));

        state.clear_config();
        assert!(state.config().is_none());
    }
}
