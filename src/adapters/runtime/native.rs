use crate::domain::model::LocaleCategory;
use crate::domain::ports::TextDomainRuntime;
use crate::utils::error::Result;
use gettextrs::LocaleCategory as NativeCategory;
use std::path::{Path, PathBuf};

/// The C library's gettext, through `gettext-rs`.
///
/// Every call changes process-wide state shared by all threads. Keep one
/// binder per worker or process.
#[derive(Debug, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn native_category(category: LocaleCategory) -> NativeCategory {
    match category {
        LocaleCategory::All => NativeCategory::LcAll,
        LocaleCategory::Collate => NativeCategory::LcCollate,
        LocaleCategory::CType => NativeCategory::LcCType,
        LocaleCategory::Monetary => NativeCategory::LcMonetary,
        LocaleCategory::Numeric => NativeCategory::LcNumeric,
        LocaleCategory::Time => NativeCategory::LcTime,
        LocaleCategory::Messages => NativeCategory::LcMessages,
    }
}

impl TextDomainRuntime for NativeRuntime {
    fn set_locale(&mut self, category: LocaleCategory, locale: &str) -> Option<String> {
        if category.affects_messages() {
            // LANGUAGE takes precedence over LC_MESSAGES during lookup
            std::env::set_var("LC_ALL", locale);
            std::env::set_var("LANGUAGE", locale);
        }

        gettextrs::setlocale(native_category(category), locale)
            .map(|applied| String::from_utf8_lossy(&applied).into_owned())
    }

    fn bind_text_domain(&mut self, domain: &str, dir: &Path) -> Result<PathBuf> {
        Ok(gettextrs::bindtextdomain(domain, dir.to_path_buf())?)
    }

    fn bind_codeset(&mut self, domain: &str, codeset: &str) -> Result<Option<String>> {
        Ok(gettextrs::bind_textdomain_codeset(domain, codeset)?)
    }

    fn text_domain(&mut self, domain: &str) -> Result<String> {
        let current = gettextrs::textdomain(domain)?;
        Ok(String::from_utf8_lossy(&current).into_owned())
    }

    fn gettext(&self, msgid: &str) -> String {
        gettextrs::gettext(msgid)
    }

    fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u32) -> String {
        gettextrs::ngettext(msgid, msgid_plural, n)
    }

    fn dgettext(&self, domain: &str, msgid: &str) -> String {
        gettextrs::dgettext(domain, msgid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_binds_domain_to_directory() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().canonicalize().unwrap();
        let mut runtime = NativeRuntime::new();

        let bound = runtime
            .bind_text_domain("gettext_binder_native_test", &real)
            .unwrap();
        assert_eq!(bound, real);

        let codeset = runtime
            .bind_codeset("gettext_binder_native_test", "UTF-8")
            .unwrap();
        assert_eq!(codeset.as_deref(), Some("UTF-8"));
    }

    #[test]
    #[serial]
    fn test_untranslated_lookup_returns_msgid() {
        let mut runtime = NativeRuntime::new();
        runtime.set_locale(LocaleCategory::Messages, "C");
        runtime.text_domain("gettext_binder_missing_domain").unwrap();

        assert_eq!(runtime.gettext("No catalog here"), "No catalog here");
        assert_eq!(runtime.ngettext("one", "many", 2), "many");
    }
}
