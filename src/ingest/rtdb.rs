/// Realtime-database REST adapter.
///
/// The pond device and the dashboard share a Firebase-style realtime
/// database; every node is readable and writable as JSON over REST by
/// appending `.json` to its path. This module owns all of that I/O: it
/// fetches live readings, heartbeat, schedules and settings, performs
/// validated schedule writes, and pushes notification records.
///
/// Payloads arriving here are loosely typed (the dashboard historically
/// wrote numbers as strings, and settings may be partially filled in).
/// Coercion and validation happen ONCE in the `parse_*` functions below;
/// domain code only ever sees the typed model.
///
/// Data layout under `{root}/{uid}/`:
///   real-time     — latest sensor values, one field per metric
///   deviceStatus  — { lastSeen: unix secs, rssi: dBm }
///   timers        — { timerN: { start: "HH:MM" } }
///   settings      — { <metric>: { Minimum, Maximum } }
///   feedNow       — manual feed command consumed by the firmware
///   notifications — alert records displayed by the dashboard

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;

use crate::alert::thresholds::default_config;
use crate::config::RtdbConfig;
use crate::feed::FeedCommand;
use crate::logging;
use crate::model::{
    DeviceStatus, Metric, RtdbError, SensorReading, ThresholdBand, ThresholdConfig, ALL_METRICS,
};
use crate::schedule::{
    ensure_capacity, find_conflict, format_time_of_day, next_timer_id, parse_time_of_day,
    FeedSchedule,
};

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct TimerEntry {
    start: String,
}

#[derive(Debug, Serialize)]
struct FeedNowPayload<'a> {
    active: bool,
    #[serde(rename = "lifeStage")]
    life_stage: &'a str,
    population: u32,
    duration: u32,
}

/// An alert record as stored for the dashboard's notification center.
#[derive(Debug, Serialize)]
pub struct NotificationRecord<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub message: &'a str,
    pub details: Value,
    /// Unix milliseconds; the dashboard sorts newest first on this.
    pub timestamp: i64,
    pub read: bool,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct RtdbClient {
    http: reqwest::blocking::Client,
    base_url: String,
    root: String,
    uid: String,
    auth_token: Option<String>,
}

impl RtdbClient {
    pub fn new(config: &RtdbConfig) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(RtdbClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            root: config.root.clone(),
            uid: config.uid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// REST URL for a node under this operator's subtree.
    fn url(&self, path: &str) -> String {
        let mut url = format!("{}/{}/{}/{}.json", self.base_url, self.root, self.uid, path);
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    fn get_value(&self, path: &str) -> Result<Value, RtdbError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .map_err(|e| RtdbError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RtdbError::HttpError(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| RtdbError::RequestFailed(e.to_string()))?;
        if body.trim() == "null" {
            return Err(RtdbError::PathNotFound(path.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| RtdbError::ParseError(e.to_string()))
    }

    fn put_value<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), RtdbError> {
        let response = self
            .http
            .put(self.url(path))
            .json(payload)
            .send()
            .map_err(|e| RtdbError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RtdbError::HttpError(status.as_u16()));
        }
        Ok(())
    }

    fn post_value<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), RtdbError> {
        let response = self
            .http
            .post(self.url(path))
            .json(payload)
            .send()
            .map_err(|e| RtdbError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RtdbError::HttpError(status.as_u16()));
        }
        Ok(())
    }

    fn delete_value(&self, path: &str) -> Result<(), RtdbError> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .map_err(|e| RtdbError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RtdbError::HttpError(status.as_u16()));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetches a node as raw JSON. Used by the verification framework to
    /// inspect payload shapes; the monitoring loop uses the typed fetchers.
    pub fn fetch_raw(&self, path: &str) -> Result<Value, RtdbError> {
        self.get_value(path)
    }

    /// Fetches the device's latest sensor values.
    pub fn fetch_snapshot(&self) -> Result<Vec<SensorReading>, RtdbError> {
        let value = self.get_value("real-time")?;
        if !value.is_object() {
            return Err(RtdbError::NoDataAvailable("real-time".to_string()));
        }
        Ok(parse_snapshot(&value))
    }

    /// Fetches the device heartbeat.
    pub fn fetch_device_status(&self) -> Result<DeviceStatus, RtdbError> {
        let value = self.get_value("deviceStatus")?;
        parse_device_status(&value)
    }

    /// Fetches the configured feeding schedules, sorted by time of day.
    pub fn fetch_schedules(&self) -> Result<Vec<FeedSchedule>, RtdbError> {
        let value = self.get_value("timers")?;
        parse_timers(&value)
    }

    /// Fetches the operator's threshold settings, coerced and validated into
    /// typed bands. A missing settings node yields the recommended defaults.
    pub fn fetch_threshold_config(&self) -> Result<ThresholdConfig, RtdbError> {
        match self.get_value("settings") {
            Ok(value) => Ok(parse_threshold_config(&value)),
            Err(RtdbError::PathNotFound(_)) => Ok(default_config()),
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Schedule writes
    // -----------------------------------------------------------------------

    /// Validates and creates a feeding schedule from a dashboard wall-clock
    /// string. Rejections (conflict or capacity) are logged for the audit
    /// trail and returned as errors for the caller to surface.
    pub fn add_schedule_checked(
        &self,
        time: &str,
        min_separation: u16,
        cap: usize,
    ) -> Result<String, Box<dyn Error>> {
        let candidate = parse_time_of_day(time)?;
        let existing = self.existing_schedules()?;

        if let Err(e) = ensure_capacity(existing.len(), cap) {
            logging::log_schedule_rejection(time, &e.to_string());
            return Err(Box::new(e));
        }
        if let Some(conflict) = find_conflict(candidate, &existing, None, min_separation)? {
            let reason = format!(
                "within {} minutes of {} at {}",
                min_separation,
                conflict.id,
                format_time_of_day(conflict.minutes)
            );
            logging::log_schedule_rejection(time, &reason);
            return Err(reason.into());
        }

        let id = next_timer_id(existing.iter().map(|s| s.id.as_str()));
        let entry = TimerEntry {
            start: format_time_of_day(candidate),
        };
        self.put_value(&format!("timers/{}", id), &entry)?;
        logging::info(
            logging::DataSource::Rtdb,
            Some("timers"),
            &format!("created schedule {} at {}", id, entry.start),
        );
        Ok(id)
    }

    /// Validates and rewrites an existing schedule in place. The entry being
    /// edited is excluded from conflict checking so an unchanged time always
    /// saves cleanly.
    pub fn update_schedule_checked(
        &self,
        id: &str,
        time: &str,
        min_separation: u16,
    ) -> Result<(), Box<dyn Error>> {
        let candidate = parse_time_of_day(time)?;
        let existing = self.existing_schedules()?;

        if let Some(conflict) = find_conflict(candidate, &existing, Some(id), min_separation)? {
            let reason = format!(
                "within {} minutes of {} at {}",
                min_separation,
                conflict.id,
                format_time_of_day(conflict.minutes)
            );
            logging::log_schedule_rejection(time, &reason);
            return Err(reason.into());
        }

        let entry = TimerEntry {
            start: format_time_of_day(candidate),
        };
        self.put_value(&format!("timers/{}", id), &entry)?;
        logging::info(
            logging::DataSource::Rtdb,
            Some("timers"),
            &format!("updated schedule {} to {}", id, entry.start),
        );
        Ok(())
    }

    pub fn delete_schedule(&self, id: &str) -> Result<(), RtdbError> {
        self.delete_value(&format!("timers/{}", id))
    }

    fn existing_schedules(&self) -> Result<Vec<FeedSchedule>, RtdbError> {
        match self.fetch_schedules() {
            Ok(schedules) => Ok(schedules),
            // No timers node yet — the first schedule is being created.
            Err(RtdbError::PathNotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Commands and notifications
    // -----------------------------------------------------------------------

    /// Writes a manual feed command for the firmware to pick up. Send a
    /// command with `active: false` to reset after the feed duration.
    pub fn send_feed_command(&self, command: &FeedCommand) -> Result<(), RtdbError> {
        let payload = FeedNowPayload {
            active: command.active,
            life_stage: command.life_stage.id(),
            population: command.population,
            duration: command.duration_secs,
        };
        self.put_value("feedNow", &payload)
    }

    /// Appends an alert record to the operator's notification feed.
    pub fn push_notification(
        &self,
        kind: &str,
        message: &str,
        details: Value,
    ) -> Result<(), RtdbError> {
        let record = NotificationRecord {
            kind,
            message,
            details,
            timestamp: Utc::now().timestamp_millis(),
            read: false,
        };
        self.post_value("notifications", &record)
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

/// Extracts a numeric field that may arrive as a JSON number or a numeric
/// string. Non-finite values are rejected along with everything else.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parses the live-readings node into one reading per metric.
///
/// Missing or non-numeric fields become `0.0` — the dashboard has always
/// rendered absent sensors as zero, and classification relies on never
/// seeing a non-finite value.
pub fn parse_snapshot(value: &Value) -> Vec<SensorReading> {
    let observed_at = match value.get("timestamp") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    ALL_METRICS
        .iter()
        .map(|&metric| SensorReading {
            metric,
            value: coerce_number(value.get(metric.reading_key())).unwrap_or(0.0),
            observed_at: observed_at.clone(),
        })
        .collect()
}

/// Parses the heartbeat node. `lastSeen` is required; `rssi` is optional.
pub fn parse_device_status(value: &Value) -> Result<DeviceStatus, RtdbError> {
    let last_seen = coerce_number(value.get("lastSeen"))
        .ok_or_else(|| RtdbError::NoDataAvailable("deviceStatus/lastSeen".to_string()))?;

    Ok(DeviceStatus {
        last_seen_epoch: last_seen as i64,
        rssi_dbm: coerce_number(value.get("rssi")).map(|v| v as i64),
    })
}

/// Parses the timers node into schedules, sorted by time of day the way the
/// dashboard lists them. A malformed entry fails the whole parse — a timer
/// the checker cannot see is a timer the feeder will still fire.
pub fn parse_timers(value: &Value) -> Result<Vec<FeedSchedule>, RtdbError> {
    let entries = value
        .as_object()
        .ok_or_else(|| RtdbError::ParseError("timers node is not an object".to_string()))?;

    let mut schedules = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let start = entry
            .get("start")
            .and_then(Value::as_str)
            .ok_or_else(|| RtdbError::ParseError(format!("timer '{}' has no start time", id)))?;
        let minutes = parse_time_of_day(start)
            .map_err(|e| RtdbError::ParseError(format!("timer '{}': {}", id, e)))?;
        schedules.push(FeedSchedule {
            id: id.clone(),
            minutes,
        });
    }

    schedules.sort_by_key(|s| s.minutes);
    Ok(schedules)
}

/// Coerces and validates the settings node into typed threshold bands.
///
/// Each metric's band falls back to the recommended default when absent,
/// non-numeric, or inverted (min > max). This is the only place the loose
/// settings shape is interpreted.
pub fn parse_threshold_config(value: &Value) -> ThresholdConfig {
    let defaults = default_config();
    ThresholdConfig {
        ph: band_from_settings(value, Metric::Ph, defaults.ph),
        temperature: band_from_settings(value, Metric::Temperature, defaults.temperature),
        turbidity: band_from_settings(value, Metric::Turbidity, defaults.turbidity),
        conductivity: band_from_settings(value, Metric::Conductivity, defaults.conductivity),
        total_dissolved_solids: band_from_settings(
            value,
            Metric::TotalDissolvedSolids,
            defaults.total_dissolved_solids,
        ),
    }
}

fn band_from_settings(settings: &Value, metric: Metric, default: ThresholdBand) -> ThresholdBand {
    let entry = match settings.get(metric.settings_key()) {
        Some(entry) => entry,
        None => return default,
    };

    match (
        coerce_number(entry.get("Minimum")),
        coerce_number(entry.get("Maximum")),
    ) {
        (Some(min), Some(max)) if min <= max => ThresholdBand { min, max },
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
