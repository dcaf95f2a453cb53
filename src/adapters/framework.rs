use crate::domain::ports::FrameworkAdapter;
use std::path::PathBuf;
use std::sync::Mutex;

/// Adapter for hosts without their own localization state: remembers the
/// last locale it was given and reports a fixed application path.
#[derive(Debug)]
pub struct StaticAdapter {
    application_path: PathBuf,
    locale: Mutex<Option<String>>,
}

impl StaticAdapter {
    pub fn new(application_path: impl Into<PathBuf>) -> Self {
        Self {
            application_path: application_path.into(),
            locale: Mutex::new(None),
        }
    }

    pub fn current_locale(&self) -> Option<String> {
        self.locale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl FrameworkAdapter for StaticAdapter {
    fn set_locale(&self, locale: &str) {
        tracing::debug!("Framework locale set to {}", locale);
        *self
            .locale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(locale.to_string());
    }

    fn application_path(&self) -> PathBuf {
        self.application_path.clone()
    }
}
