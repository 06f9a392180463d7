/// Core data types for the bangus pond monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no logic beyond trivial accessors — only types.

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// A water-quality metric reported by the pond sensor array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Ph,
    Temperature,
    Turbidity,
    Conductivity,
    TotalDissolvedSolids,
}

/// All monitored metrics, in dashboard display order.
pub const ALL_METRICS: [Metric; 5] = [
    Metric::Ph,
    Metric::Temperature,
    Metric::Turbidity,
    Metric::Conductivity,
    Metric::TotalDissolvedSolids,
];

impl Metric {
    /// Field name used by the device in the live-readings payload.
    pub fn reading_key(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Temperature => "temperature",
            Metric::Turbidity => "turbidity",
            Metric::Conductivity => "EC",
            Metric::TotalDissolvedSolids => "TDS",
        }
    }

    /// Key used in the persisted threshold settings payload.
    pub fn settings_key(&self) -> &'static str {
        match self {
            Metric::Ph => "ph",
            Metric::Temperature => "temperature",
            Metric::Turbidity => "turbidity",
            Metric::Conductivity => "ec",
            Metric::TotalDissolvedSolids => "tds",
        }
    }

    /// Looks up a metric from a live-readings field name. Returns `None`
    /// for unrecognized fields (e.g. the payload's `timestamp`).
    pub fn from_reading_key(key: &str) -> Option<Metric> {
        ALL_METRICS.iter().copied().find(|m| m.reading_key() == key)
    }

    /// Measurement unit, as shown on the dashboard.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Ph => "",
            Metric::Temperature => "°C",
            Metric::Turbidity => "NTU",
            Metric::Conductivity => "µS/cm",
            Metric::TotalDissolvedSolids => "ppm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Ph => "pH Level",
            Metric::Temperature => "Temperature",
            Metric::Turbidity => "Turbidity",
            Metric::Conductivity => "EC Level",
            Metric::TotalDissolvedSolids => "TDS",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reading_key())
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single measurement from the pond sensor array.
///
/// Produced by `ingest::rtdb::parse_snapshot` from the device's live-readings
/// payload. Missing or non-numeric fields are normalized to `0.0` at the
/// ingest boundary, so `value` is always finite by the time it reaches
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub metric: Metric,
    pub value: f64,
    pub observed_at: String, // as sent by the device; empty if not reported
}

/// The latest reading for each metric, grouped for convenient access.
///
/// Produced by `analysis::groupings::latest_per_metric` from a flat list of
/// `SensorReading`s. Any field may be `None` if the device did not report
/// that metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    pub ph: Option<SensorReading>,
    pub temperature: Option<SensorReading>,
    pub turbidity: Option<SensorReading>,
    pub conductivity: Option<SensorReading>,
    pub total_dissolved_solids: Option<SensorReading>,
}

impl SensorSnapshot {
    pub fn reading(&self, metric: Metric) -> Option<&SensorReading> {
        match metric {
            Metric::Ph => self.ph.as_ref(),
            Metric::Temperature => self.temperature.as_ref(),
            Metric::Turbidity => self.turbidity.as_ref(),
            Metric::Conductivity => self.conductivity.as_ref(),
            Metric::TotalDissolvedSolids => self.total_dissolved_solids.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Acceptable [min, max] range for one monitored metric.
///
/// Invariant: `min <= max`. Bands are validated once at the settings-adapter
/// boundary (`ingest::rtdb::parse_threshold_config`); domain code may assume
/// the invariant holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    pub min: f64,
    pub max: f64,
}

/// One threshold band per monitored metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub ph: ThresholdBand,
    pub temperature: ThresholdBand,
    pub turbidity: ThresholdBand,
    pub conductivity: ThresholdBand,
    pub total_dissolved_solids: ThresholdBand,
}

impl ThresholdConfig {
    pub fn band(&self, metric: Metric) -> ThresholdBand {
        match metric {
            Metric::Ph => self.ph,
            Metric::Temperature => self.temperature,
            Metric::Turbidity => self.turbidity,
            Metric::Conductivity => self.conductivity,
            Metric::TotalDissolvedSolids => self.total_dissolved_solids,
        }
    }
}

// ---------------------------------------------------------------------------
// Device status
// ---------------------------------------------------------------------------

/// Heartbeat data reported by the pond device.
///
/// The online/offline state is derived from `last_seen_epoch` by
/// `alert::liveness`, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    /// Unix timestamp (seconds) of the device's last heartbeat.
    pub last_seen_epoch: i64,
    /// WiFi received signal strength in dBm, if the device reports it.
    pub rssi_dbm: Option<i64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the pure evaluator functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// An input violated a contract (time-of-day out of range, zero
    /// feeding sessions, malformed wall-clock string).
    InvalidArgument(String),
    /// The schedule set is already at the life stage's session cap.
    CapacityExceeded { count: usize, cap: usize },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            EvalError::CapacityExceeded { count, cap } => {
                write!(f, "Schedule capacity exceeded: {} of {} sessions", count, cap)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Errors that can arise when fetching or processing realtime-database data.
#[derive(Debug, PartialEq)]
pub enum RtdbError {
    /// The request never produced a response (DNS, TLS, timeout).
    RequestFailed(String),
    /// Non-2xx HTTP response from the RTDB REST API.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The requested path does not exist (the RTDB returns a `null` body).
    PathNotFound(String),
    /// The path exists but contained no usable values.
    NoDataAvailable(String),
}

impl std::fmt::Display for RtdbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RtdbError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            RtdbError::HttpError(code) => write!(f, "HTTP error: {}", code),
            RtdbError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            RtdbError::PathNotFound(path) => write!(f, "Path not found: {}", path),
            RtdbError::NoDataAvailable(path) => write!(f, "No data available at path: {}", path),
        }
    }
}

impl std::error::Error for RtdbError {}
