//! Logging setup and helpers
//!
//! Installs the process-wide `tracing` subscriber and provides small helpers
//! for timing operations and scrubbing secrets from text before it is logged.

use std::time::{Duration, Instant};

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{Result, ToolingError};

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line records
    #[default]
    Compact,
    /// Multi-line, human oriented records
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ToolingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ToolingError::General(format!(
                "Unknown log format: {}",
                other
            ))),
        }
    }
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over `level` when set. Records go to stderr so stdout
/// stays free for command output. Calling this twice returns an error rather
/// than replacing the first subscriber.
pub fn init_subscriber(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ToolingError::General(format!("Invalid log filter '{}': {}", level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(|e| ToolingError::General(format!("Failed to install subscriber: {}", e)))
}

/// Await `future` and log how long it took at debug level
///
/// ```rust,ignore
/// let reply = timed("gemini.generate", client.generate(&request)).await;
/// ```
pub async fn timed<F, T>(name: &str, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = future.await;
    debug!(
        operation = name,
        elapsed = %format_duration(start.elapsed()),
        "Completed"
    );
    result
}

/// Logs scope entry on creation and exit with elapsed time on drop
///
/// ```rust
/// use tooling::logging::LogGuard;
///
/// fn render_chart() {
///     let _guard = LogGuard::new("render_chart");
/// }
/// ```
pub struct LogGuard {
    name: String,
    start: Instant,
}

impl LogGuard {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("Entering: {}", name);
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Time since the guard was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        debug!(
            "Exiting: {} (elapsed: {})",
            self.name,
            format_duration(self.start.elapsed())
        );
    }
}

/// Format duration in human-readable form
///
/// ```rust
/// use tooling::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}

/// Redact credentials from text before logging it
///
/// Covers `api key: ...` style pairs, bearer tokens and `key=` query
/// parameters as they appear in request URLs.
///
/// ```rust
/// use tooling::logging::sanitize_for_logging;
///
/// let url = "https://host/v1beta/models/m:generateContent?key=AIzaSecret";
/// let sanitized = sanitize_for_logging(url);
/// assert!(sanitized.contains("[REDACTED]"));
/// assert!(!sanitized.contains("AIzaSecret"));
/// ```
pub fn sanitize_for_logging(input: &str) -> String {
    let mut result = input.to_string();

    let patterns = [
        (r"(?i)([?&]key=)[^&\s]+", "${1}[REDACTED]"),
        (r"(?i)(api[\s_-]?key|apikey)\s*[:=]\s*\S+", "$1: [REDACTED]"),
        (r"(?i)(password|passwd|pwd)\s*[:=]\s*\S+", "$1: [REDACTED]"),
        (r"(?i)(token|secret)\s*[:=]\s*\S+", "$1: [REDACTED]"),
        (
            r"(?i)(authorization|auth)\s*:\s*bearer\s+\S+",
            "$1: Bearer [REDACTED]",
        ),
    ];

    for (pattern, replacement) in &patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            result = re.replace_all(&result, *replacement).to_string();
        }
    }

    result
}
