use crate::domain::ports::SessionHandler;
use std::sync::Mutex;

/// Session kept in memory; enough for a single worker or for tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    locale: Mutex<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Mutex::new(Some(locale.into())),
        }
    }
}

impl SessionHandler for MemorySession {
    fn get(&self, default: &str) -> String {
        self.locale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .unwrap_or_else(|| default.to_string())
    }

    fn set(&self, locale: &str) {
        *self
            .locale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(locale.to_string());
    }
}
