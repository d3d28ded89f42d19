use serde_json::{json, Value};
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingFormat {
    Json,
    Pretty,
    Compact,
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Fallback level when no filter is given (e.g. "info")
    pub level: String,
    pub format: LoggingFormat,
    pub include_location: bool,
    /// Directive string such as "switchyard=debug,switchyard::dispatch=trace"
    pub env_filter: Option<String>,
    /// Fields reported once when logging starts
    pub global_fields: serde_json::Map<String, Value>,
    pub service_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LoggingFormat::Pretty,
            include_location: false,
            env_filter: None,
            global_fields: serde_json::Map::new(),
            service_name: None,
        }
    }
}

impl LoggingConfig {
    /// JSON lines, registration and failures only
    pub fn production() -> Self {
        Self {
            format: LoggingFormat::Json,
            env_filter: Some("switchyard=info".to_string()),
            ..Self::default()
        }
        .with_global_field("env", "production")
    }

    /// Pretty output including every dispatch decision
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            include_location: true,
            env_filter: Some("switchyard=debug".to_string()),
            ..Self::default()
        }
        .with_global_field("env", "development")
    }

    /// Errors only
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            format: LoggingFormat::Compact,
            env_filter: Some("switchyard=error".to_string()),
            ..Self::default()
        }
        .with_global_field("env", "test")
    }

    pub fn with_global_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.global_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directives in effect when `RUST_LOG` is unset
    pub fn directives(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Install a global subscriber.
///
/// `RUST_LOG` takes precedence over the configured directives. Fails if a
/// global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directives()))?;

    let layer = Layer::new()
        .with_writer(io::stdout)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LoggingFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?,
        LoggingFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init()?,
        LoggingFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()?,
    }

    let mut started = json!({
        "level": config.level,
        "format": format!("{:?}", config.format),
    });
    if let Some(name) = &config.service_name {
        started["service_name"] = json!(name);
    }
    for (key, value) in config.global_fields {
        started[key] = value;
    }
    tracing::info!(target: "switchyard::logging", config = %started, "Logging initialized");

    Ok(())
}
