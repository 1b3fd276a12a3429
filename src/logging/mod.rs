//! Logging infrastructure - structured tracing for bridge operations
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable level, format and destination
//! - Environment overrides (`JNI_BRIDGE_LOG_*`)
//! - Non-blocking writers with daily file rotation
//! - One event per failed resolution, so diagnostics can be counted

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use tracing::{debug, error, info, trace, warn};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Flush guard for the non-blocking writer; lives as long as the process
static WRITER_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// File with daily rotation
    File { directory: String, prefix: String },
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum log level
    #[serde(with = "level_name")]
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit span enter/close events
    pub span_events: bool,
    /// Extra filter directives, e.g. "jni_bridge::interop=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        // JNI_BRIDGE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level) = std::env::var("JNI_BRIDGE_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.level = level;
            }
        }

        // JNI_BRIDGE_LOG_FILE: directory for rotated log files
        if let Ok(directory) = std::env::var("JNI_BRIDGE_LOG_FILE") {
            self.output = LogOutput::File {
                directory,
                prefix: "jni_bridge".to_string(),
            };
        }

        if std::env::var("JNI_BRIDGE_LOG_JSON").is_ok() {
            self.format = LogFormat::Json;
        }

        if std::env::var("JNI_BRIDGE_LOG_SPANS").is_ok() {
            self.span_events = true;
        }

        self
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Verbose console logging for debugging bindings
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            span_events: true,
            filter: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

mod level_name {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&level.as_str().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Level, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Initialize logging from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration. Later calls are no-ops.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let (layer, guard) = build_layer(&config);
        *WRITER_GUARD.lock() = Some(guard);

        // Another subscriber may already be installed by the host process
        let _ = tracing_subscriber::registry()
            .with(layer.with_filter(build_filter(&config)))
            .try_init();
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn build_layer(config: &LogConfig) -> (BoxedLayer, WorkerGuard) {
    let (writer, guard) = match &config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => {
            tracing_appender::non_blocking(rolling::daily(directory, prefix))
        }
    };

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(writer)
        .with_span_events(span_events)
        .with_target(true)
        .with_thread_ids(cfg!(debug_assertions));

    let layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().boxed(),
    };

    (layer, guard)
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let level = LevelFilter::from_level(config.level);
    let base = EnvFilter::try_from_env("JNI_BRIDGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("jni_bridge={}", level)));

    match &config.filter {
        Some(directives) => directives
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .fold(base, |filter, directive| match directive.trim().parse() {
                Ok(directive) => filter.add_directive(directive),
                Err(_) => filter,
            }),
        None => base,
    }
}

// ============================================================================
// Bridge-specific events
// ============================================================================

/// A class, method or field could not be resolved. Emitted exactly once per
/// failed operation.
pub fn log_resolution_failure(
    function: &str,
    target: *const (),
    name: &str,
    signature: &str,
    reason: &str,
) {
    error!(
        event = "resolution_failure",
        function = function,
        handle = ?target,
        member = name,
        signature = signature,
        reason = reason,
        "{}: {} for {:p}",
        function,
        reason,
        target
    );
}

/// Method dispatched through the table
#[inline]
pub fn log_call(function: &str, name: &str, kind: impl std::fmt::Debug, arg_count: usize) {
    trace!(
        event = "jni_call",
        function = function,
        method = name,
        returns = ?kind,
        args = arg_count,
        "dispatching call"
    );
}

#[inline]
pub fn log_string_pin(string: *const (), utf16: bool) {
    trace!(event = "string_pin", string = ?string, utf16 = utf16, "string characters pinned");
}

#[inline]
pub fn log_string_release(string: *const (), utf16: bool) {
    trace!(event = "string_release", string = ?string, utf16 = utf16, "string characters released");
}

pub fn log_vm_set(vm: *const ()) {
    info!(event = "vm_set", vm = ?vm, "Java VM registered");
}

pub fn log_attach_failed(code: i32) {
    error!(event = "attach_failed", code = code, "AttachCurrentThread failed, returned {}", code);
}
