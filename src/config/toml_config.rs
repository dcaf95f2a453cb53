use crate::domain::model::LocaleCategory;
use crate::utils::error::{GettextError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Package configuration, usually read from `gettext.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GettextConfig {
    /// Locale used when the session holds none.
    pub locale: String,
    pub fallback_locale: String,
    pub supported_locales: Vec<String>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Default domain name.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Relative to the application base path.
    #[serde(default = "default_translations_path")]
    pub translations_path: String,
    /// Compiled views are written under `<storage_path>/views`.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default)]
    pub custom_locale: bool,
    #[serde(default = "default_true")]
    pub sync_framework: bool,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_translator")]
    pub translator: String,
    #[serde(default = "default_keywords")]
    pub keywords_list: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<LocaleCategory>,
    /// Sources of the default domain.
    #[serde(default)]
    pub source_paths: Vec<String>,
    #[serde(default)]
    pub domains: Vec<DomainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainConfig {
    pub name: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_domain() -> String {
    "messages".to_string()
}

fn default_translations_path() -> String {
    "lang".to_string()
}

fn default_storage_path() -> String {
    "storage".to_string()
}

fn default_true() -> bool {
    true
}

fn default_project() -> String {
    "MultilanguageProject".to_string()
}

fn default_translator() -> String {
    "James Translator <james@translations.colm>".to_string()
}

fn default_keywords() -> Vec<String> {
    ["_", "__", "_i", "_n:1,2", "gettext", "ngettext:1,2", "dgettext:2"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_categories() -> Vec<LocaleCategory> {
    LocaleCategory::DEFAULTS.to_vec()
}

impl GettextConfig {
    /// Minimal configuration for the given locales; the first one is the default.
    pub fn new(supported_locales: &[&str]) -> Self {
        let supported_locales: Vec<String> =
            supported_locales.iter().map(|l| l.to_string()).collect();
        let locale = supported_locales.first().cloned().unwrap_or_default();

        Self {
            fallback_locale: locale.clone(),
            locale,
            supported_locales,
            encoding: default_encoding(),
            domain: default_domain(),
            translations_path: default_translations_path(),
            storage_path: default_storage_path(),
            custom_locale: false,
            sync_framework: true,
            project: default_project(),
            translator: default_translator(),
            keywords_list: default_keywords(),
            categories: default_categories(),
            source_paths: Vec::new(),
            domains: Vec::new(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GettextError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        re.replace_all(content, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Default domain first, then the declared ones in file order.
    pub fn all_domains(&self) -> Vec<&str> {
        std::iter::once(self.domain.as_str())
            .chain(self.domains.iter().map(|d| d.name.as_str()))
            .collect()
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.all_domains().contains(&domain)
    }

    /// Source paths of `domain`; empty for unknown domains.
    pub fn sources_from_domain(&self, domain: &str) -> &[String] {
        if domain == self.domain {
            return &self.source_paths;
        }

        self.domains
            .iter()
            .find(|d| d.name == domain)
            .map(|d| d.paths.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_locale_supported(&self, locale: &str) -> bool {
        !locale.is_empty() && self.supported_locales.iter().any(|l| l == locale)
    }

    pub fn with_translations_path(mut self, path: impl Into<String>) -> Self {
        self.translations_path = path.into();
        self
    }

    pub fn with_domain(mut self, name: impl Into<String>, paths: &[&str]) -> Self {
        self.domains.push(DomainConfig {
            name: name.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.supported_locales.is_empty() {
            return Err(GettextError::MissingConfigError {
                field: "supported_locales".to_string(),
            });
        }

        for locale in &self.supported_locales {
            validation::validate_identifier("supported_locales", locale)?;
        }
        validation::validate_unique(
            "supported_locales",
            self.supported_locales.iter().map(String::as_str),
        )?;

        validation::validate_member("locale", &self.locale, &self.supported_locales)?;
        validation::validate_member(
            "fallback_locale",
            &self.fallback_locale,
            &self.supported_locales,
        )?;

        validation::validate_non_empty_string("encoding", &self.encoding)?;
        validation::validate_path("translations_path", &self.translations_path)?;
        validation::validate_path("storage_path", &self.storage_path)?;

        for domain in self.all_domains() {
            validation::validate_identifier("domains", domain)?;
        }
        validation::validate_unique("domains", self.all_domains())?;

        Ok(())
    }
}

impl Validate for GettextConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
