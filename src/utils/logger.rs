use crate::utils::error::{GettextError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per line, for hosts that ship logs to a collector.
    Json,
}

/// `RUST_LOG` when set, otherwise this crate at info (debug when verbose).
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "gettext_binder=debug,info"
        } else {
            "gettext_binder=info"
        })
    })
}

/// Installs the global subscriber.
///
/// Fails instead of panicking when the host application already installed
/// one, so embedding services keep their own logging setup.
pub fn try_init_logger(format: LogFormat, verbose: bool) -> Result<()> {
    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    let layer = match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(verbose))
        .try_init()
        .map_err(|e| GettextError::ConfigError {
            message: format!("cannot install logger: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_logger_is_refused() {
        let _ = try_init_logger(LogFormat::Json, false);
        assert!(matches!(
            try_init_logger(LogFormat::Compact, true),
            Err(GettextError::ConfigError { .. })
        ));
    }
}
