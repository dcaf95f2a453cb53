use crate::config::GettextConfig;
use crate::core::filesystem::FileSystem;
use crate::domain::ports::{FrameworkAdapter, SessionHandler, TextDomainRuntime};
use crate::utils::error::{GettextError, Result};
use std::fmt;
use std::path::Path;

/// Binds text domains for the active locale and keeps the session in sync.
///
/// With [`NativeRuntime`](crate::adapters::NativeRuntime) the bindings are
/// process-wide: keep a single binder per worker or process.
pub struct Gettext<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    config: GettextConfig,
    session: S,
    adapter: A,
    file_system: FileSystem,
    runtime: R,
    encoding: String,
    locale: String,
    domain: String,
    bound_domains: Vec<String>,
}

impl<S, A, R> Gettext<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    /// Applies the locale stored in the session, or the configured default.
    pub fn new(
        config: GettextConfig,
        session: S,
        adapter: A,
        file_system: FileSystem,
        runtime: R,
    ) -> Result<Self> {
        let locale = session.get(&config.locale);

        let mut gettext = Self {
            encoding: config.encoding.clone(),
            domain: config.domain.clone(),
            locale: config.fallback_locale.clone(),
            bound_domains: Vec::new(),
            config,
            session,
            adapter,
            file_system,
            runtime,
        };

        gettext.set_locale(&locale)?;
        Ok(gettext)
    }

    /// Switches every native category to `locale` and rebinds all domains.
    ///
    /// When a step fails the binder falls back to the configured fallback
    /// locale and the error comes back wrapped with the failing location.
    pub fn set_locale(&mut self, locale: &str) -> Result<String> {
        if !self.is_locale_supported(locale) {
            return Err(GettextError::LocaleNotSupported {
                locale: locale.to_string(),
            });
        }

        match self.apply_locale(locale) {
            Ok(()) => {
                tracing::info!("Locale set to {}", self.locale);
                Ok(self.locale.clone())
            }
            Err(e) => {
                self.locale = self.config.fallback_locale.clone();
                tracing::warn!(
                    "Setting locale {} failed, falling back to {}: {}",
                    locale,
                    self.locale,
                    e
                );
                Err(e)
            }
        }
    }

    fn apply_locale(&mut self, locale: &str) -> Result<()> {
        let native_locale = self.native_locale_name(locale);
        for category in self.config.categories.clone() {
            if self.runtime.set_locale(category, &native_locale).is_none() {
                tracing::warn!(
                    "Locale {} is not available on this system for {}",
                    native_locale,
                    category
                );
            }
        }

        self.locale = locale.to_string();
        self.session.set(locale);

        // bindings of the previous locale no longer apply
        self.bound_domains.clear();
        let domains: Vec<String> = self
            .config
            .all_domains()
            .into_iter()
            .map(String::from)
            .collect();
        for domain in &domains {
            self.add_domain(domain).map_err(|e| e.or_located())?;
        }

        let default_domain = self.domain.clone();
        self.with_default_domain(&default_domain)
            .map_err(|e| e.or_located())?;

        if self.config.sync_framework {
            self.adapter.set_locale(locale);
        }

        Ok(())
    }

    /// `es_AR.UTF-8`, or `C.UTF-8` in custom-locale mode.
    fn native_locale_name(&self, locale: &str) -> String {
        let name = if self.config.custom_locale { "C" } else { locale };
        format!("{}.{}", name, self.encoding)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn is_locale_supported(&self, locale: &str) -> bool {
        self.config.is_locale_supported(locale)
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Takes effect for domains bound from now on.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.encoding = encoding.into();
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn bound_domains(&self) -> &[String] {
        &self.bound_domains
    }

    pub fn config(&self) -> &GettextConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Binds `domain` for the current locale; a no-op when already bound.
    pub fn add_domain(&mut self, domain: &str) -> Result<&mut Self> {
        if self.bound_domains.iter().any(|bound| bound == domain) {
            return Ok(self);
        }

        if !self.config.has_domain(domain) {
            return Err(GettextError::UndefinedDomain {
                domain: domain.to_string(),
            });
        }

        let mut path = self.file_system.domain_path(None);
        if self.config.custom_locale {
            path.push(&self.locale);
        }

        let encoding = self.encoding.clone();
        let bound = self.bind_to_domain(domain, &encoding, &path)?;
        self.bound_domains.push(bound);
        Ok(self)
    }

    fn bind_to_domain(&mut self, domain: &str, encoding: &str, path: &Path) -> Result<String> {
        let binding_failed = || GettextError::DomainBinding {
            domain: domain.to_string(),
            path: path.to_path_buf(),
        };

        let resolved = match path.canonicalize() {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("Cannot resolve {}: {}", path.display(), e);
                return Err(binding_failed().located());
            }
        };

        match self.runtime.bind_text_domain(domain, &resolved) {
            Ok(bound) if bound == resolved => {}
            Ok(bound) => {
                tracing::debug!("Domain {} bound to {} instead", domain, bound.display());
                return Err(binding_failed().located());
            }
            Err(e) => {
                tracing::debug!("bindtextdomain({}) failed: {}", domain, e);
                return Err(binding_failed().located());
            }
        }

        let codeset = self.runtime.bind_codeset(domain, encoding).ok().flatten();
        if codeset.as_deref() != Some(encoding) {
            return Err(GettextError::DomainCharsetSpecification {
                domain: domain.to_string(),
                encoding: encoding.to_string(),
            }
            .located());
        }

        tracing::debug!("Bound domain {} to {}", domain, resolved.display());
        Ok(domain.to_string())
    }

    /// Binds `domain` if needed and makes it the default for lookups.
    pub fn with_default_domain(&mut self, domain: &str) -> Result<&mut Self> {
        self.add_domain(domain)?;
        self.domain = self
            .runtime
            .text_domain(domain)
            .map_err(|e| e.or_located())?;
        Ok(self)
    }

    pub fn translate(&self, msgid: &str) -> String {
        self.runtime.gettext(msgid)
    }

    pub fn translate_plural(&self, msgid: &str, msgid_plural: &str, n: u32) -> String {
        self.runtime.ngettext(msgid, msgid_plural, n)
    }

    pub fn translate_in(&self, domain: &str, msgid: &str) -> String {
        self.runtime.dgettext(domain, msgid)
    }
}

impl<S, A, R> fmt::Display for Gettext<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.locale)
    }
}

impl<S, A, R> fmt::Debug for Gettext<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gettext")
            .field("locale", &self.locale)
            .field("domain", &self.domain)
            .field("encoding", &self.encoding)
            .field("bound_domains", &self.bound_domains)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LocaleCategory;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSession {
        stored: Mutex<Option<String>>,
        writes: Mutex<Vec<String>>,
    }

    impl SessionHandler for RecordingSession {
        fn get(&self, default: &str) -> String {
            self.stored
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| default.to_string())
        }

        fn set(&self, locale: &str) {
            *self.stored.lock().unwrap() = Some(locale.to_string());
            self.writes.lock().unwrap().push(locale.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingAdapter {
        pushed: Mutex<Vec<String>>,
    }

    impl FrameworkAdapter for RecordingAdapter {
        fn set_locale(&self, locale: &str) {
            self.pushed.lock().unwrap().push(locale.to_string());
        }

        fn application_path(&self) -> PathBuf {
            PathBuf::from("/srv/app")
        }
    }

    /// Records native calls without touching process state.
    #[derive(Default)]
    struct FakeRuntime {
        locales: Vec<(LocaleCategory, String)>,
        binds: Vec<(String, PathBuf)>,
        bind_redirect: Option<PathBuf>,
        codeset_override: Option<String>,
        current: String,
    }

    impl TextDomainRuntime for FakeRuntime {
        fn set_locale(&mut self, category: LocaleCategory, locale: &str) -> Option<String> {
            self.locales.push((category, locale.to_string()));
            None
        }

        fn bind_text_domain(&mut self, domain: &str, dir: &Path) -> Result<PathBuf> {
            self.binds.push((domain.to_string(), dir.to_path_buf()));
            Ok(self
                .bind_redirect
                .clone()
                .unwrap_or_else(|| dir.to_path_buf()))
        }

        fn bind_codeset(&mut self, _domain: &str, codeset: &str) -> Result<Option<String>> {
            Ok(Some(
                self.codeset_override
                    .clone()
                    .unwrap_or_else(|| codeset.to_string()),
            ))
        }

        fn text_domain(&mut self, domain: &str) -> Result<String> {
            self.current = domain.to_string();
            Ok(self.current.clone())
        }

        fn gettext(&self, msgid: &str) -> String {
            format!("[{}] {}", self.current, msgid)
        }

        fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u32) -> String {
            if n == 1 { msgid } else { msgid_plural }.to_string()
        }

        fn dgettext(&self, domain: &str, msgid: &str) -> String {
            format!("[{}] {}", domain, msgid)
        }
    }

    type TestGettext = Gettext<Arc<RecordingSession>, Arc<RecordingAdapter>, FakeRuntime>;

    struct Fixture {
        _root: TempDir,
        session: Arc<RecordingSession>,
        adapter: Arc<RecordingAdapter>,
        config: GettextConfig,
        file_system: FileSystem,
    }

    fn fixture(custom_locale: bool) -> Fixture {
        let root = TempDir::new().unwrap();
        let mut config = GettextConfig::new(&["en_US", "es_AR", "it_IT"])
            .with_domain("frontend", &["controllers", "views/frontend"])
            .with_domain("backend", &["views/backend"]);
        config.locale = "es_AR".to_string();
        config.custom_locale = custom_locale;

        let file_system = FileSystem::new(config.clone(), root.path(), root.path().join("storage"));
        std::fs::create_dir_all(file_system.domain_path(None)).unwrap();
        for locale in &config.supported_locales {
            std::fs::create_dir_all(file_system.domain_path(Some(locale))).unwrap();
        }

        Fixture {
            _root: root,
            session: Arc::new(RecordingSession::default()),
            adapter: Arc::new(RecordingAdapter::default()),
            config,
            file_system,
        }
    }

    fn build(fixture: &Fixture, runtime: FakeRuntime) -> Result<TestGettext> {
        Gettext::new(
            fixture.config.clone(),
            fixture.session.clone(),
            fixture.adapter.clone(),
            fixture.file_system.clone(),
            runtime,
        )
    }

    #[test]
    fn test_boots_with_default_locale() {
        let fixture = fixture(false);
        let gettext = build(&fixture, FakeRuntime::default()).unwrap();

        assert_eq!(gettext.locale(), "es_AR");
        assert_eq!(gettext.to_string(), "es_AR");
        assert_eq!(gettext.domain(), "messages");
        assert_eq!(gettext.bound_domains(), ["messages", "frontend", "backend"]);
        assert_eq!(fixture.session.get("x"), "es_AR");
        assert_eq!(*fixture.adapter.pushed.lock().unwrap(), vec!["es_AR"]);

        let categories: Vec<LocaleCategory> =
            gettext.runtime().locales.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, LocaleCategory::DEFAULTS.to_vec());
        assert!(gettext
            .runtime()
            .locales
            .iter()
            .all(|(_, l)| l == "es_AR.UTF-8"));
    }

    #[test]
    fn test_boots_with_session_locale() {
        let fixture = fixture(false);
        fixture.session.set("it_IT");

        let gettext = build(&fixture, FakeRuntime::default()).unwrap();
        assert_eq!(gettext.locale(), "it_IT");
    }

    #[test]
    fn test_unsupported_locales_are_rejected() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();

        for locale in ["", "fr_FR", "es_ar", "es_AR.UTF-8"] {
            assert!(!gettext.is_locale_supported(locale));
            assert!(matches!(
                gettext.set_locale(locale),
                Err(GettextError::LocaleNotSupported { .. })
            ));
        }
        assert_eq!(gettext.locale(), "es_AR");
    }

    #[test]
    fn test_unsupported_session_locale_fails_construction() {
        let fixture = fixture(false);
        fixture.session.set("fr_FR");

        assert!(matches!(
            build(&fixture, FakeRuntime::default()),
            Err(GettextError::LocaleNotSupported { .. })
        ));
    }

    #[test]
    fn test_add_domain_is_idempotent() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();
        let binds_before = gettext.runtime().binds.len();

        gettext.add_domain("frontend").unwrap();
        gettext.add_domain("frontend").unwrap();

        assert_eq!(gettext.runtime().binds.len(), binds_before);
        assert_eq!(gettext.bound_domains().len(), 3);
    }

    #[test]
    fn test_undefined_domain() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();

        assert!(matches!(
            gettext.add_domain("wrong-domain"),
            Err(GettextError::UndefinedDomain { .. })
        ));
        assert!(matches!(
            gettext.with_default_domain("wrong-domain"),
            Err(GettextError::UndefinedDomain { .. })
        ));
        assert_eq!(gettext.domain(), "messages");
    }

    #[test]
    fn test_locale_change_rebinds_every_domain() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();
        gettext.with_default_domain("backend").unwrap();

        let binds_before = gettext.runtime().binds.len();
        assert_eq!(gettext.set_locale("en_US").unwrap(), "en_US");

        assert_eq!(gettext.runtime().binds.len(), binds_before + 3);
        assert_eq!(gettext.domain(), "backend");
        assert_eq!(gettext.translate("Hello"), "[backend] Hello");
        assert_eq!(gettext.translate_in("frontend", "Hello"), "[frontend] Hello");
        assert_eq!(
            *fixture.session.writes.lock().unwrap(),
            vec!["es_AR", "en_US"]
        );
    }

    #[test]
    fn test_custom_locale_mode() {
        let fixture = fixture(true);
        let gettext = build(&fixture, FakeRuntime::default()).unwrap();

        assert!(gettext
            .runtime()
            .locales
            .iter()
            .all(|(_, l)| l == "C.UTF-8"));

        let expected = fixture
            .file_system
            .domain_path(Some("es_AR"))
            .canonicalize()
            .unwrap();
        assert!(gettext.runtime().binds.iter().all(|(_, dir)| *dir == expected));
    }

    #[test]
    fn test_sync_disabled_leaves_framework_alone() {
        let mut fixture = fixture(false);
        fixture.config.sync_framework = false;

        build(&fixture, FakeRuntime::default()).unwrap();
        assert!(fixture.adapter.pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_charset_rejection_falls_back() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();
        gettext.set_locale("it_IT").unwrap();

        gettext.runtime.codeset_override = Some("ISO-8859-1".to_string());
        let err = gettext.set_locale("es_AR").unwrap_err();

        assert!(matches!(err, GettextError::Located { .. }));
        assert!(matches!(
            err.root(),
            GettextError::DomainCharsetSpecification { .. }
        ));
        assert!(err.to_string().contains("gettext.rs:"));
        assert_eq!(gettext.locale(), "en_US");
    }

    fn location(err: &GettextError) -> &str {
        match err {
            GettextError::Located { location, .. } => location,
            other => panic!("expected a located error, got {:?}", other),
        }
    }

    #[test]
    fn test_binding_elsewhere_falls_back() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();
        gettext.set_locale("it_IT").unwrap();

        gettext.runtime.bind_redirect = Some(PathBuf::from("/usr/share/locale"));
        let err = gettext.set_locale("es_AR").unwrap_err();

        assert!(matches!(err.root(), GettextError::DomainBinding { .. }));
        assert!(location(&err).contains("gettext.rs:"));
        assert_eq!(gettext.locale(), "en_US");
    }

    #[test]
    fn test_location_names_the_failing_step() {
        let fixture = fixture(false);

        let mut redirected = build(&fixture, FakeRuntime::default()).unwrap();
        redirected.runtime.bind_redirect = Some(PathBuf::from("/usr/share/locale"));
        let binding = redirected.set_locale("it_IT").unwrap_err();

        let mut rejected = build(&fixture, FakeRuntime::default()).unwrap();
        rejected.runtime.codeset_override = Some("ISO-8859-1".to_string());
        let charset = rejected.set_locale("it_IT").unwrap_err();

        assert!(matches!(charset.root(), GettextError::DomainCharsetSpecification { .. }));
        assert_ne!(location(&binding), location(&charset));
    }

    #[test]
    fn test_missing_directory_fails_binding() {
        let fixture = fixture(false);
        std::fs::remove_dir_all(fixture.file_system.domain_path(None)).unwrap();

        let err = build(&fixture, FakeRuntime::default()).unwrap_err();
        assert!(matches!(err.root(), GettextError::DomainBinding { .. }));
    }

    #[test]
    fn test_encoding_applies_to_new_bindings() {
        let fixture = fixture(false);
        let mut gettext = build(&fixture, FakeRuntime::default()).unwrap();

        gettext.set_encoding("ISO-8859-1");
        assert_eq!(gettext.encoding(), "ISO-8859-1");
        gettext.set_locale("it_IT").unwrap();
        assert!(gettext
            .runtime()
            .locales
            .iter()
            .any(|(_, l)| l == "it_IT.ISO-8859-1"));
    }
}
