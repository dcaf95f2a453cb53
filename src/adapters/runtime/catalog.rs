use crate::core::catalog::MoCatalog;
use crate::domain::model::LocaleCategory;
use crate::domain::ports::TextDomainRuntime;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_DOMAIN: &str = "messages";

/// In-process gettext that reads compiled `.mo` files.
///
/// All state lives in the instance, so several binders with different
/// locales can coexist in one process. Catalogs are decoded as UTF-8 only.
#[derive(Debug)]
pub struct CatalogRuntime {
    categories: HashMap<LocaleCategory, String>,
    bindings: HashMap<String, PathBuf>,
    codesets: HashMap<String, String>,
    current: String,
    catalogs: HashMap<String, MoCatalog>,
}

impl Default for CatalogRuntime {
    fn default() -> Self {
        Self {
            categories: HashMap::new(),
            bindings: HashMap::new(),
            codesets: HashMap::new(),
            current: DEFAULT_DOMAIN.to_string(),
            catalogs: HashMap::new(),
        }
    }
}

impl CatalogRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(&self, category: LocaleCategory) -> Option<&str> {
        self.categories
            .get(&category)
            .or_else(|| self.categories.get(&LocaleCategory::All))
            .map(String::as_str)
    }

    pub fn bound_dir(&self, domain: &str) -> Option<&Path> {
        self.bindings.get(domain).map(PathBuf::as_path)
    }

    pub fn codeset(&self, domain: &str) -> Option<&str> {
        self.codesets.get(domain).map(String::as_str)
    }

    fn messages_locale(&self) -> Option<&str> {
        self.locale(LocaleCategory::Messages)
    }

    fn reload(&mut self, domain: &str) {
        self.catalogs.remove(domain);

        let (Some(dir), Some(locale)) = (
            self.bindings.get(domain).cloned(),
            self.messages_locale().map(String::from),
        ) else {
            return;
        };

        for candidate in locale_candidates(&locale) {
            let path = dir
                .join(&candidate)
                .join("LC_MESSAGES")
                .join(format!("{}.mo", domain));
            if !path.is_file() {
                continue;
            }

            match MoCatalog::from_file(&path) {
                Ok(catalog) => {
                    tracing::debug!(
                        "Loaded {} entries for domain {} from {}",
                        catalog.len(),
                        domain,
                        path.display()
                    );
                    self.catalogs.insert(domain.to_string(), catalog);
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable catalog {}: {}", path.display(), e);
                }
            }
            return;
        }

        tracing::debug!("No catalog for domain {} in locale {}", domain, locale);
    }

    fn reload_all(&mut self) {
        let domains: Vec<String> = self.bindings.keys().cloned().collect();
        for domain in domains {
            self.reload(&domain);
        }
    }

    fn lookup(&self, domain: &str, msgid: &str) -> Option<&str> {
        self.catalogs.get(domain).and_then(|c| c.get(msgid))
    }
}

/// Directory names tried for a locale, most specific first:
/// `es_AR.UTF-8`, `es_AR`, `es`.
pub fn locale_candidates(locale: &str) -> Vec<String> {
    let (base, modifier) = match locale.split_once('@') {
        Some((base, modifier)) => (base, Some(modifier)),
        None => (locale, None),
    };
    let without_codeset = base.split('.').next().unwrap_or(base);
    let language = without_codeset.split('_').next().unwrap_or(without_codeset);

    let with_modifier = |name: &str| match modifier {
        Some(m) => format!("{}@{}", name, m),
        None => name.to_string(),
    };

    let mut candidates = vec![locale.to_string()];
    for name in [
        with_modifier(without_codeset),
        without_codeset.to_string(),
        language.to_string(),
    ] {
        if !name.is_empty() && !candidates.contains(&name) {
            candidates.push(name);
        }
    }
    candidates
}

fn is_utf8(codeset: &str) -> bool {
    codeset.eq_ignore_ascii_case("UTF-8") || codeset.eq_ignore_ascii_case("utf8")
}

impl TextDomainRuntime for CatalogRuntime {
    fn set_locale(&mut self, category: LocaleCategory, locale: &str) -> Option<String> {
        self.categories.insert(category, locale.to_string());
        if category.affects_messages() {
            self.reload_all();
        }
        Some(locale.to_string())
    }

    fn bind_text_domain(&mut self, domain: &str, dir: &Path) -> Result<PathBuf> {
        self.bindings.insert(domain.to_string(), dir.to_path_buf());
        self.reload(domain);
        Ok(dir.to_path_buf())
    }

    fn bind_codeset(&mut self, domain: &str, codeset: &str) -> Result<Option<String>> {
        let applied = if is_utf8(codeset) {
            codeset.to_string()
        } else {
            tracing::warn!("Codeset {} is not supported, keeping UTF-8", codeset);
            "UTF-8".to_string()
        };
        self.codesets.insert(domain.to_string(), applied.clone());
        Ok(Some(applied))
    }

    fn text_domain(&mut self, domain: &str) -> Result<String> {
        if !domain.is_empty() {
            self.current = domain.to_string();
        }
        Ok(self.current.clone())
    }

    fn gettext(&self, msgid: &str) -> String {
        self.dgettext(&self.current, msgid)
    }

    fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u32) -> String {
        self.catalogs
            .get(&self.current)
            .and_then(|c| c.get_plural(msgid, n))
            .filter(|form| !form.is_empty())
            .map(String::from)
            .unwrap_or_else(|| {
                if n == 1 {
                    msgid.to_string()
                } else {
                    msgid_plural.to_string()
                }
            })
    }

    fn dgettext(&self, domain: &str, msgid: &str) -> String {
        self.lookup(domain, msgid)
            .filter(|text| !text.is_empty())
            .unwrap_or(msgid)
            .to_string()
    }
}
