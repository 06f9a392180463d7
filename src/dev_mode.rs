/// Development mode utilities for working with historical data
///
/// When the live pond feed is unavailable (device powered down, no network
/// path to the backend), use this module to replay archived readings from
/// the local Postgres mirror for testing and development.

use chrono::{DateTime, Duration, Utc};
use postgres::Client;

use crate::model::{Metric, SensorReading};

/// Configuration for development mode data replay
pub struct DevMode {
    /// Simulate data as if it's this many days in the past
    pub days_offset: i64,
    /// Device upload interval in seconds (default: 300 = 5 minutes)
    pub update_interval_secs: i64,
}

impl DevMode {
    /// Create a new dev mode configuration
    ///
    /// # Arguments
    /// * `days_offset` - Replay data from this many days ago
    pub fn new(days_offset: i64) -> Self {
        Self {
            days_offset,
            update_interval_secs: 300, // 5 minutes
        }
    }

    /// Fetch historical readings as if they were current
    ///
    /// Returns the most recent archived reading per metric from `days_offset`
    /// days ago, simulating a live snapshot. Metrics not present in the
    /// archive window are simply absent, exactly as with a live device that
    /// has a dead probe.
    pub fn fetch_simulated_current_readings(
        &self,
        client: &mut Client,
        device_uid: &str,
    ) -> Result<Vec<SensorReading>, postgres::Error> {
        let simulated_now = Utc::now() - Duration::days(self.days_offset);
        let window_start = simulated_now - Duration::seconds(self.update_interval_secs * 2);

        let query = "
            SELECT DISTINCT ON (metric)
                metric,
                value,
                observed_at
            FROM aquamon_raw.sensor_readings
            WHERE device_uid = $1
              AND observed_at >= $2
              AND observed_at <= $3
            ORDER BY metric, observed_at DESC
        ";

        let rows = client.query(query, &[&device_uid, &window_start, &simulated_now])?;

        let mut readings = Vec::new();
        for row in rows {
            let metric_key: String = row.get(0);
            // Rows from decommissioned sensors are skipped, not fatal.
            let Some(metric) = Metric::from_reading_key(&metric_key) else {
                continue;
            };
            readings.push(SensorReading {
                metric,
                value: row.get(1),
                observed_at: row.get::<_, DateTime<Utc>>(2).to_rfc3339(),
            });
        }

        Ok(readings)
    }

    /// Get available archive date range for a device
    pub fn get_data_range(
        client: &mut Client,
        device_uid: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, postgres::Error> {
        let row = client.query_one(
            "SELECT MIN(observed_at), MAX(observed_at)
             FROM aquamon_raw.sensor_readings
             WHERE device_uid = $1",
            &[&device_uid],
        )?;

        let min: Option<DateTime<Utc>> = row.get(0);
        let max: Option<DateTime<Utc>> = row.get(1);

        match (min, max) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            _ => Ok(None),
        }
    }
}
