use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "gettext-binder")]
#[command(about = "Scaffolds and compiles gettext locale trees")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "gettext.toml")]
    pub config: String,

    /// Application base path; translations_path is resolved against it
    #[arg(long, default_value = ".")]
    pub base_path: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the locale tree for every supported locale
    Generate,

    /// Refresh catalog headers and compile .mo files
    Update {
        /// Only this locale (default: all supported locales)
        #[arg(long)]
        locale: Option<String>,

        /// Only this domain (default: all domains)
        #[arg(long)]
        domain: Option<String>,
    },

    /// Compile view templates into extractable text
    CompileViews {
        #[arg(long)]
        domain: String,

        /// View directories, relative to the base path
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check that the locale tree exists
    Check,

    /// Translate one message
    Translate {
        #[arg(long)]
        locale: Option<String>,

        #[arg(long)]
        domain: Option<String>,

        /// Read compiled catalogs in-process instead of using the C library
        #[arg(long)]
        in_process: bool,

        msgid: String,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("config", &self.config)?;
        validation::validate_path("base_path", &self.base_path)?;

        match &self.command {
            Command::CompileViews { domain, paths } => {
                validation::validate_identifier("domain", domain)?;
                for path in paths {
                    validation::validate_relative_path("paths", path)?;
                }
            }
            Command::Update { locale, domain } => {
                if let Some(locale) = locale {
                    validation::validate_identifier("locale", locale)?;
                }
                if let Some(domain) = domain {
                    validation::validate_identifier("domain", domain)?;
                }
            }
            Command::Translate { msgid, .. } => {
                validation::validate_non_empty_string("msgid", msgid)?;
            }
            Command::Generate | Command::Check => {}
        }

        Ok(())
    }
}
