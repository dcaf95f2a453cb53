use anyhow::Context;
use clap::Parser;
use gettext_binder::config::{CliConfig, Command};
use gettext_binder::utils::logger::{self, LogFormat};
use gettext_binder::utils::validation::Validate;
use gettext_binder::{
    CatalogRuntime, FileSystem, Gettext, GettextConfig, MemorySession, StaticAdapter,
    TextDomainRuntime, Translator,
};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    if let Err(e) = logger::try_init_logger(format, cli.verbose) {
        eprintln!("❌ {}", e);
    }

    tracing::info!("Starting gettext-binder");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        tracing::error!("Argument validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let config = match GettextConfig::from_file(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let adapter = StaticAdapter::new(&cli.base_path);
    let file_system = FileSystem::from_adapter(config.clone(), &adapter);

    match cli.command {
        Command::Generate => {
            let generated = file_system.generate_locales()?;
            if generated.is_empty() {
                println!("Nothing to generate, every locale already exists");
            }
            for path in generated {
                println!("✅ Created {}", path.display());
            }
        }
        Command::Update { locale, domain } => {
            let locales = match locale {
                Some(locale) => vec![locale],
                None => config.supported_locales.clone(),
            };
            let domains: Vec<String> = match domain {
                Some(domain) => vec![domain],
                None => config.all_domains().into_iter().map(String::from).collect(),
            };

            for locale in &locales {
                let locale_path = file_system.domain_path(Some(locale));
                for domain in &domains {
                    let mo = file_system
                        .update_locale(&locale_path, locale, domain)
                        .with_context(|| format!("updating {} for {}", domain, locale))?;
                    println!("✅ Compiled {}", mo.display());
                }
            }
        }
        Command::CompileViews { domain, paths } => {
            let compiled = file_system.compile_views(&paths, &domain)?;
            println!(
                "✅ Compiled {} views into {}",
                compiled,
                file_system.storage_container(&domain).display()
            );
        }
        Command::Check => {
            if !file_system.check_directory_structure(true) {
                eprintln!(
                    "❌ Locale tree under {} is incomplete",
                    file_system.domain_path(None).display()
                );
                eprintln!("💡 Run the generate command first");
                std::process::exit(1);
            }
            println!("✅ Locale tree is complete");
        }
        Command::Translate {
            locale,
            domain,
            in_process,
            msgid,
        } => {
            let session = match locale {
                Some(locale) => MemorySession::with_locale(locale),
                None => MemorySession::new(),
            };

            let binder = Binder {
                config,
                session,
                adapter,
                file_system,
            };
            let domain = domain.as_deref();

            #[cfg(feature = "native")]
            let translated = if in_process {
                binder.translate(CatalogRuntime::new(), domain, &msgid)?
            } else {
                binder.translate(gettext_binder::NativeRuntime::new(), domain, &msgid)?
            };

            #[cfg(not(feature = "native"))]
            let translated = {
                if !in_process {
                    tracing::debug!("Built without native gettext, reading catalogs in-process");
                }
                binder.translate(CatalogRuntime::new(), domain, &msgid)?
            };

            println!("{}", translated);
        }
    }

    Ok(())
}

struct Binder {
    config: GettextConfig,
    session: MemorySession,
    adapter: StaticAdapter,
    file_system: FileSystem,
}

impl Binder {
    fn translate<R: TextDomainRuntime>(
        self,
        runtime: R,
        domain: Option<&str>,
        msgid: &str,
    ) -> anyhow::Result<String> {
        let gettext = Gettext::new(
            self.config,
            self.session,
            self.adapter,
            self.file_system,
            runtime,
        )?;
        let mut translator = Translator::new(gettext);
        if let Some(domain) = domain {
            translator.set_domain(domain)?;
        }
        tracing::debug!(
            "Translating in {} ({})",
            translator.locale(),
            translator.domain()
        );
        Ok(translator.translate(msgid))
    }
}
