//! Log setup for the `lumen` binary.
//!
//! The library only emits `tracing` events (target `sema`); installing a
//! subscriber is the binary's job.

use clap::ValueEnum;

/// `EnvFilter` directive read when no `--log-level` is given, e.g. `sema=trace`
pub const FILTER_ENV: &str = "LUMEN_LOG";
/// `text` or `json`, overridden by `--log-format`
pub const FORMAT_ENV: &str = "LUMEN_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// What the subscriber is built from once CLI flags and the environment
/// are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    /// `None` defers to `LUMEN_LOG`, falling back to `warn`
    pub level: Option<LogLevel>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: None,
        }
    }
}

impl LogOptions {
    pub fn resolve(format: Option<LogFormat>, level: Option<LogLevel>) -> Self {
        let env_format = std::env::var(FORMAT_ENV).ok();
        Self::merge(env_format.as_deref(), format, level)
    }

    fn merge(env_format: Option<&str>, format: Option<LogFormat>, level: Option<LogLevel>) -> Self {
        let env_format = env_format.and_then(|value| LogFormat::from_str(value, true).ok());
        Self {
            format: format.or(env_format).unwrap_or(LogFormat::Text),
            level,
        }
    }

    fn filter(&self) -> tracing_subscriber::EnvFilter {
        use tracing_subscriber::EnvFilter;

        match self.level {
            Some(level) => EnvFilter::new(level.directive()),
            None => EnvFilter::try_from_env(FILTER_ENV)
                .unwrap_or_else(|_| EnvFilter::new(LogLevel::Warn.directive())),
        }
    }
}

/// Install the global subscriber on stderr. Only the first call has an effect.
pub fn init_logging(options: &LogOptions) {
    use std::io::IsTerminal;
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(options.filter())
            .with_writer(std::io::stderr)
            .with_target(true);
        let installed = match options.format {
            LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
            LogFormat::Text => {
                let ansi =
                    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
                tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
            }
        };
        if installed.is_err() {
            tracing::debug!(target: "sema", "a global subscriber was already installed");
        }
    });
}
