use std::panic::Location;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GettextError {
    #[error("Locale {locale} is not supported")]
    LocaleNotSupported { locale: String },

    #[error("Domain '{domain}' is not registered")]
    UndefinedDomain { domain: String },

    #[error("Binding to domain {domain} at path {} has failed", path.display())]
    DomainBinding { domain: String, path: PathBuf },

    #[error("Specifying charset {encoding} for domain {domain} has failed")]
    DomainCharsetSpecification { domain: String, encoding: String },

    #[error("{location}: {source}")]
    Located {
        location: String,
        #[source]
        source: Box<GettextError>,
    },

    #[error("I can't find {}", path.display())]
    LocaleFileNotFound { path: PathBuf },

    #[error("Catalog parse error at line {line}: {message}")]
    CatalogParse { line: usize, message: String },

    #[error("Invalid MO file: {message}")]
    InvalidMoFile { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

impl GettextError {
    /// Wraps the error with the `file:line` of the caller.
    #[track_caller]
    pub fn located(self) -> Self {
        let caller = Location::caller();
        GettextError::Located {
            location: format!("{}:{}", caller.file(), caller.line()),
            source: Box::new(self),
        }
    }

    /// Like [`located`](Self::located), but keeps a location already recorded.
    #[track_caller]
    pub fn or_located(self) -> Self {
        match self {
            located @ GettextError::Located { .. } => located,
            other => other.located(),
        }
    }

    /// The innermost error, looking through `Located` wrappers.
    pub fn root(&self) -> &GettextError {
        match self {
            GettextError::Located { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            GettextError::LocaleNotSupported { .. } => {
                "Add the locale to supported_locales or pick one of the configured locales"
            }
            GettextError::UndefinedDomain { .. } => {
                "Declare the domain under [[domains]] in the configuration"
            }
            GettextError::DomainBinding { .. } => {
                "Run `generate` to create the locale tree, or check translations_path"
            }
            GettextError::DomainCharsetSpecification { .. } => {
                "Use an encoding supported by the system iconv, such as UTF-8"
            }
            GettextError::LocaleFileNotFound { .. } => {
                "Run `generate` first so the source catalog exists"
            }
            GettextError::CatalogParse { .. } | GettextError::InvalidMoFile { .. } => {
                "Fix or regenerate the catalog file"
            }
            GettextError::IoError(_) => "Check file permissions and that the paths exist",
            GettextError::ConfigError { .. }
            | GettextError::InvalidConfigValueError { .. }
            | GettextError::MissingConfigError { .. } => "Review the configuration file",
            GettextError::Located { .. } => unreachable!("root() never returns Located"),
        }
    }
}

pub type Result<T> = std::result::Result<T, GettextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_prefixes_file_and_line() {
        let err = GettextError::UndefinedDomain {
            domain: "wrong-domain".to_string(),
        }
        .located();

        let message = err.to_string();
        assert!(message.starts_with(file!()));
        assert!(message.ends_with("Domain 'wrong-domain' is not registered"));
        assert!(matches!(err.root(), GettextError::UndefinedDomain { .. }));
    }

    #[test]
    fn test_or_located_keeps_first_location() {
        let first = GettextError::InvalidMoFile {
            message: "bad".to_string(),
        }
        .located();
        let expected = first.to_string();

        assert_eq!(first.or_located().to_string(), expected);
        assert!(matches!(
            GettextError::ConfigError {
                message: "x".to_string()
            }
            .or_located(),
            GettextError::Located { .. }
        ));
    }

    #[test]
    fn test_binding_message_mentions_path() {
        let err = GettextError::DomainBinding {
            domain: "backend".to_string(),
            path: PathBuf::from("/tmp/i18n"),
        };
        assert_eq!(
            err.to_string(),
            "Binding to domain backend at path /tmp/i18n has failed"
        );
    }
}
