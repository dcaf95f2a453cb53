use crate::domain::model::LocaleCategory;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persists the active locale between requests.
pub trait SessionHandler: Send + Sync {
    /// Stored locale, or `default` when the session holds none.
    fn get(&self, default: &str) -> String;
    fn set(&self, locale: &str);
}

/// Host framework hooks.
pub trait FrameworkAdapter: Send + Sync {
    /// Mirrors the resolved locale into the framework's own localization state.
    fn set_locale(&self, locale: &str);
    fn application_path(&self) -> PathBuf;
}

/// The gettext calls the binder needs.
///
/// The native implementation mutates process-wide state: one binder per
/// worker or process. Implementations that keep their state in `self` can be
/// used side by side.
pub trait TextDomainRuntime {
    /// Returns the locale now in effect, or `None` when it is unavailable.
    fn set_locale(&mut self, category: LocaleCategory, locale: &str) -> Option<String>;

    /// Returns the directory the domain is now bound to.
    fn bind_text_domain(&mut self, domain: &str, dir: &Path) -> Result<PathBuf>;

    /// Returns the codeset now in effect for the domain.
    fn bind_codeset(&mut self, domain: &str, codeset: &str) -> Result<Option<String>>;

    /// Makes `domain` the default and returns the default now in effect.
    fn text_domain(&mut self, domain: &str) -> Result<String>;

    fn gettext(&self, msgid: &str) -> String;

    fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u32) -> String;

    fn dgettext(&self, domain: &str, msgid: &str) -> String;
}

impl<T: SessionHandler + ?Sized> SessionHandler for Arc<T> {
    fn get(&self, default: &str) -> String {
        (**self).get(default)
    }

    fn set(&self, locale: &str) {
        (**self).set(locale)
    }
}

impl<T: FrameworkAdapter + ?Sized> FrameworkAdapter for Arc<T> {
    fn set_locale(&self, locale: &str) {
        (**self).set_locale(locale)
    }

    fn application_path(&self) -> PathBuf {
        (**self).application_path()
    }
}
