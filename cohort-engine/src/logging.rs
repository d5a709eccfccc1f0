//! Logging configuration for the cohort engine.
//!
//! Loading and filtering are instrumented with `tracing`. [`LogConfig`]
//! decides which of the chattier events are emitted; [`setup`] installs a
//! subscriber for binaries.

use tracing::Level;

/// Controls which engine events are logged.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for engine components
    pub base_level: Level,
    /// Whether to log each filter narrowing step
    pub log_filter_details: bool,
    /// Whether to log dataset load and swap operations
    pub log_data_operations: bool,
    /// Whether to log metric computations
    pub log_metrics: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LogConfig {
    pub const DEFAULT: LogConfig = LogConfig {
        base_level: Level::INFO,
        log_filter_details: false,
        log_data_operations: true,
        log_metrics: false,
        max_field_length: 256,
    };

    /// Everything on, for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_filter_details: true,
            log_data_operations: true,
            log_metrics: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_filter_details: false,
            log_data_operations: false,
            log_metrics: false,
            max_field_length: 128,
        }
    }

    /// `value` cut to `max_field_length` for inclusion in a log event.
    pub fn field(&self, value: &str) -> String {
        truncate_field(value, self.max_field_length)
    }
}

/// Logs a filter step when filter details are enabled.
#[macro_export]
macro_rules! log_filter {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_filter_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a data operation when data operation logging is enabled.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Logs a metric computation when metric logging is enabled.
#[macro_export]
macro_rules! log_metric {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_metrics {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, respecting char
/// boundaries.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries.
pub mod setup {
    use tracing::Level;

    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside the engine
        pub level: Level,
        /// Log level for `cohort_engine` targets
        pub engine_level: Level,
        /// Whether to emit JSON lines
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                engine_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                engine_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn structured() -> Self {
            Self {
                level: Level::INFO,
                engine_level: Level::DEBUG,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_engine_level(mut self, level: Level) -> Self {
            self.engine_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive string.
        pub fn env_filter(&self) -> String {
            match self.env_filter {
                Some(ref filter) => filter.clone(),
                None => format!(
                    "{},cohort_engine={}",
                    self.level.as_str().to_lowercase(),
                    self.engine_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    ///
    /// ```rust,no_run
    /// use cohort_engine::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
