/// Structured logging for the pond monitoring service
///
/// Provides context-rich logging with data-source and path identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for daemon operations.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The hosted realtime database (live readings, settings, schedules).
    Rtdb,
    /// The pond device itself (heartbeat, signal strength).
    Device,
    /// The local Postgres mirror used for dev-mode replay.
    Database,
    /// The service's own lifecycle.
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Rtdb => write!(f, "RTDB"),
            DataSource::Device => write!(f, "DEVICE"),
            DataSource::Database => write!(f, "DB"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - path may be empty for a freshly provisioned account
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: &DataSource, path: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        // Format the log entry
        let path_part = path.map(|p| format!(" [{}]", p)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, path_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, path_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, path_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, path: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &source, path, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, path: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &source, path, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, path: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &source, path, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, path: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &source, path, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an RTDB fetch failure based on the error message
pub fn classify_rtdb_failure(_path: &str, error_message: &str) -> FailureType {
    // A missing or empty path is normal for a freshly provisioned account
    // (no settings saved yet, no schedules created yet).
    if error_message.contains("Path not found") || error_message.contains("No data available") {
        FailureType::Expected
    }
    // HTTP errors might indicate rule changes, auth expiry, or outage
    else if error_message.contains("HTTP error") {
        FailureType::Unexpected
    }
    // Parse errors suggest a payload-shape change or a firmware bug
    else if error_message.contains("Parse error") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log an RTDB failure with automatic classification
pub fn log_rtdb_failure(path: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_rtdb_failure(path, &error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::Rtdb, Some(path), &message),
        FailureType::Unexpected => error(DataSource::Rtdb, Some(path), &message),
        FailureType::Unknown => warn(DataSource::Rtdb, Some(path), &message),
    }
}

/// Log a blocked schedule write (conflict or capacity rejection). These are
/// operator-visible rejections, so they are always recorded at warning level
/// with the candidate time for the audit trail.
pub fn log_schedule_rejection(candidate: &str, reason: &str) {
    warn(
        DataSource::Rtdb,
        Some("timers"),
        &format!("schedule write for {} rejected: {}", candidate, reason),
    );
}

// ---------------------------------------------------------------------------
// Poll Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one evaluation cycle
pub fn log_cycle_summary(metrics_evaluated: usize, alerts_raised: usize, failures: usize) {
    let message = format!(
        "Cycle complete: {} metrics evaluated, {} alerts, {} failures",
        metrics_evaluated, alerts_raised, failures
    );

    if failures > 0 {
        warn(DataSource::System, None, &message);
    } else if alerts_raised > 0 {
        info(DataSource::System, None, &message);
    } else {
        debug(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let missing_path = "Path not found: BANGUS/op-1/settings";
        let result = classify_rtdb_failure("settings", missing_path);
        assert_eq!(result, FailureType::Expected);

        let http_error = "HTTP error: 401";
        let result = classify_rtdb_failure("real-time", http_error);
        assert_eq!(result, FailureType::Unexpected);

        let parse_error = "Parse error: invalid type: string";
        let result = classify_rtdb_failure("deviceStatus", parse_error);
        assert_eq!(result, FailureType::Unexpected);

        let result = classify_rtdb_failure("timers", "connection reset");
        assert_eq!(result, FailureType::Unknown);
    }
}
