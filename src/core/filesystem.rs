use crate::config::GettextConfig;
use crate::core::catalog::Catalog;
use crate::core::view_compiler::ViewCompiler;
use crate::domain::ports::FrameworkAdapter;
use crate::utils::error::{GettextError, Result};
use crate::utils::validation;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Marks generated locale trees.
pub const I18N_SEGMENT: &str = "i18n";

/// Locale directory name under which custom-locale mode keeps catalogs.
const CUSTOM_LOCALE_DIR: &str = "C";

const SEARCH_PATH_PREFIX: &str = "X-Poedit-SearchPath-";

/// Locale tree layout and scaffolding:
/// `<base>/<translations_path>/i18n/<locale>/LC_MESSAGES/<domain>.{po,mo}`.
#[derive(Debug, Clone)]
pub struct FileSystem {
    config: GettextConfig,
    base_path: PathBuf,
    storage_path: PathBuf,
}

impl FileSystem {
    pub fn new(
        config: GettextConfig,
        base_path: impl Into<PathBuf>,
        storage_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            base_path: base_path.into(),
            storage_path: storage_path.into(),
        }
    }

    /// Uses the host application path as base and the configured storage below it.
    pub fn from_adapter<A: FrameworkAdapter + ?Sized>(config: GettextConfig, adapter: &A) -> Self {
        let base_path = adapter.application_path();
        let storage_path = base_path.join(&config.storage_path);
        Self::new(config, base_path, storage_path)
    }

    pub fn config(&self) -> &GettextConfig {
        &self.config
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn domain_path(&self, locale: Option<&str>) -> PathBuf {
        let mut path = self
            .base_path
            .join(&self.config.translations_path)
            .join(I18N_SEGMENT);
        if let Some(locale) = locale {
            path.push(locale);
        }
        path
    }

    /// Directory holding the `.po`/`.mo` files of one locale.
    pub fn gettext_path(&self, locale_path: &Path) -> PathBuf {
        let mut path = locale_path.to_path_buf();
        if self.config.custom_locale {
            path.push(CUSTOM_LOCALE_DIR);
        }
        path.join("LC_MESSAGES")
    }

    /// Where compiled views of `domain` are written.
    pub fn storage_container(&self, domain: &str) -> PathBuf {
        self.storage_path.join("views").join(domain)
    }

    /// Compiles every file under `view_paths` into extractable text. View
    /// paths must be relative to the base path. Returns the number of files
    /// written.
    pub fn compile_views<P: AsRef<Path>>(&self, view_paths: &[P], domain: &str) -> Result<usize> {
        let compiler = ViewCompiler::new();
        let target = self.storage_container(domain);
        fs::create_dir_all(&target)?;

        let mut compiled = 0;
        for view_path in view_paths {
            let view_path = view_path.as_ref();
            validation::validate_relative_path("view_paths", &view_path.to_string_lossy())?;

            let root = self.base_path.join(view_path);
            if !root.is_dir() {
                tracing::error!("View path {} does not exist", root.display());
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("view path {} does not exist", root.display()),
                )
                .into());
            }

            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let source = fs::read_to_string(entry.path())?;
                let inner = entry.path().strip_prefix(&root).map_err(|_| {
                    GettextError::InvalidConfigValueError {
                        field: "view_paths".to_string(),
                        value: entry.path().display().to_string(),
                        reason: format!("not below {}", root.display()),
                    }
                })?;
                let mut output = target.join(view_path).join(inner).into_os_string();
                output.push(".txt");
                let output = PathBuf::from(output);

                if let Some(parent) = output.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output, compiler.compile(&source))?;
                tracing::debug!("Compiled {} -> {}", entry.path().display(), output.display());
                compiled += 1;
            }
        }

        tracing::info!("Compiled {} views for domain {}", compiled, domain);
        Ok(compiled)
    }

    /// Creates the tree for every supported locale that does not exist yet.
    /// Returns the default-domain catalog path of each generated locale.
    pub fn generate_locales(&self) -> Result<Vec<PathBuf>> {
        let domain_path = self.domain_path(None);
        fs::create_dir_all(&domain_path)?;

        let mut generated = Vec::new();
        for locale in &self.config.supported_locales {
            let locale_path = self.domain_path(Some(locale));
            if locale_path.exists() {
                tracing::debug!("Locale {} already exists, skipping", locale);
                continue;
            }

            generated.push(self.add_locale(&locale_path, locale)?);
        }

        tracing::info!(
            "Generated {} locales under {}",
            generated.len(),
            domain_path.display()
        );
        Ok(generated)
    }

    /// Seeds one locale with an empty catalog per domain.
    pub fn add_locale(&self, locale_path: &Path, locale: &str) -> Result<PathBuf> {
        let gettext_path = self.gettext_path(locale_path);
        fs::create_dir_all(&gettext_path)?;

        for domain in self.config.all_domains() {
            let po_path = gettext_path.join(format!("{}.po", domain));
            if !po_path.exists() {
                self.create_po_file(&po_path, locale, domain, locale_path)?;
            }
        }

        Ok(gettext_path.join(format!("{}.po", self.config.domain)))
    }

    pub fn create_po_file(
        &self,
        path: &Path,
        locale: &str,
        domain: &str,
        locale_path: &Path,
    ) -> Result<()> {
        let mut catalog = Catalog::default();
        catalog.set_headers(&self.po_header(locale, domain, locale_path));
        catalog.write_po(path)?;
        tracing::debug!("Created catalog {}", path.display());
        Ok(())
    }

    pub fn po_header(&self, locale: &str, domain: &str, locale_path: &Path) -> Vec<(String, String)> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M%z").to_string();
        let encoding = &self.config.encoding;
        let base_path = relative_path(&self.base_path, &self.gettext_path(locale_path));

        let mut header: Vec<(String, String)> = [
            ("Project-Id-Version", self.config.project.clone()),
            ("POT-Creation-Date", now.clone()),
            ("PO-Revision-Date", now),
            ("Last-Translator", self.config.translator.clone()),
            ("Language-Team", self.config.translator.clone()),
            ("Language", locale.to_string()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", format!("text/plain; charset={}", encoding)),
            ("Content-Transfer-Encoding", "8bit".to_string()),
            ("Plural-Forms", "nplurals=2; plural=(n != 1);".to_string()),
            ("X-Generator", env!("CARGO_PKG_NAME").to_string()),
            ("X-Poedit-KeywordsList", self.config.keywords_list.join(";")),
            ("X-Poedit-Basepath", base_path),
            ("X-Poedit-SourceCharset", encoding.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mut search_paths: Vec<String> = self.config.sources_from_domain(domain).to_vec();
        let compiled = self.storage_container(domain);
        if compiled.is_dir() {
            search_paths.push(relative_path(&compiled, &self.base_path));
        }
        for (index, search_path) in search_paths.into_iter().enumerate() {
            header.push((format!("{}{}", SEARCH_PATH_PREFIX, index), search_path));
        }

        header
    }

    /// Refreshes the header of one locale's `.po` and compiles its `.mo`.
    /// Returns the `.mo` path.
    pub fn update_locale(&self, locale_path: &Path, locale: &str, domain: &str) -> Result<PathBuf> {
        let gettext_path = self.gettext_path(locale_path);
        let po_path = gettext_path.join(format!("{}.po", domain));
        if !po_path.is_file() {
            return Err(GettextError::LocaleFileNotFound { path: po_path });
        }

        let mut catalog = Catalog::from_file(&po_path)?;
        let existing = catalog.headers();
        let kept = |key: &str| {
            existing
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        let mut header = self.po_header(locale, domain, locale_path);
        for (key, value) in header.iter_mut() {
            if matches!(
                key.as_str(),
                "POT-Creation-Date" | "Last-Translator" | "Language-Team" | "Plural-Forms"
            ) {
                if let Some(previous) = kept(key) {
                    *value = previous;
                }
            }
        }
        // fields added by editors survive the refresh
        for (key, value) in &existing {
            let known = header.iter().any(|(k, _)| k == key);
            if !known && !key.starts_with(SEARCH_PATH_PREFIX) {
                header.push((key.clone(), value.clone()));
            }
        }
        catalog.set_headers(&header);
        catalog.write_po(&po_path)?;

        let mo_path = gettext_path.join(format!("{}.mo", domain));
        catalog.write_mo(&mo_path)?;
        tracing::info!("Compiled {} ({} messages)", mo_path.display(), catalog.messages.len());

        Ok(mo_path)
    }

    /// Whether the domain path exists and is writable, and with
    /// `check_locales` whether every supported locale has its directory.
    pub fn check_directory_structure(&self, check_locales: bool) -> bool {
        let domain_path = self.domain_path(None);
        let writable = fs::metadata(&domain_path)
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false);
        if !writable {
            tracing::warn!("{} is missing or read-only", domain_path.display());
            return false;
        }

        if !check_locales {
            return true;
        }

        self.config.supported_locales.iter().all(|locale| {
            let path = self.gettext_path(&self.domain_path(Some(locale)));
            let exists = path.is_dir();
            if !exists {
                tracing::warn!("Missing locale directory {}", path.display());
            }
            exists
        })
    }
}

/// Path of `target` relative to `base`, `/`-separated. Directories (and
/// inputs written with a trailing separator) get a trailing `/`.
pub fn relative_path(target: &Path, base: &Path) -> String {
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base_parts.len() - common];
    parts.extend(
        target_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        return "./".to_string();
    }

    let mut relative = parts.join("/");
    let trailing = target.as_os_str().to_string_lossy().ends_with(['/', '\\']);
    if trailing || target.is_dir() {
        relative.push('/');
    }
    relative
}

/// Removes `path` and everything below it. Returns whether anything was removed.
pub fn clear_directory<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.exists() {
        return false;
    }

    match fs::remove_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not clear {}: {}", path.display(), e);
            false
        }
    }
}
