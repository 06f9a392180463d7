//! Water-quality threshold checking.
//!
//! Every metric carries an operator-configured [min, max] band. A reading
//! below the band stresses the stock one way (e.g. acidic water), above it
//! another (e.g. overheating), so the dashboard renders three states and the
//! alerting layer notifies when a metric leaves or re-enters its band.
//!
//! Classification is a pure function; the `StatusTracker` holds the small
//! amount of state needed to make notifications edge-triggered rather than
//! repeating on every poll.

use std::collections::HashMap;

use crate::model::{Metric, SensorReading, ThresholdBand, ThresholdConfig};

// ---------------------------------------------------------------------------
// Default bands
// ---------------------------------------------------------------------------

/// Recommended bands for brackish-water milkfish grow-out. Used whenever the
/// operator has not saved a value for a metric, and as the fallback when a
/// persisted band fails validation.
pub fn default_config() -> ThresholdConfig {
    ThresholdConfig {
        ph: ThresholdBand { min: 6.5, max: 8.5 },
        temperature: ThresholdBand { min: 25.0, max: 32.0 },
        turbidity: ThresholdBand { min: 5.0, max: 25.0 },
        conductivity: ThresholdBand { min: 500.0, max: 1500.0 },
        total_dissolved_solids: ThresholdBand { min: 250.0, max: 750.0 },
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Position of a reading relative to its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdStatus {
    Below,
    Optimal,
    Above,
}

impl std::fmt::Display for ThresholdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdStatus::Below => write!(f, "below"),
            ThresholdStatus::Optimal => write!(f, "optimal"),
            ThresholdStatus::Above => write!(f, "above"),
        }
    }
}

/// Classifies a reading value against a band. Band edges are optimal.
pub fn classify(value: f64, band: ThresholdBand) -> ThresholdStatus {
    if value < band.min {
        ThresholdStatus::Below
    } else if value > band.max {
        ThresholdStatus::Above
    } else {
        ThresholdStatus::Optimal
    }
}

/// An out-of-band reading, ready for notification dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdAlert {
    pub metric: Metric,
    pub status: ThresholdStatus,
    pub value: f64,
    pub band: ThresholdBand,
    pub message: String,
}

/// Checks one reading against its band. Returns `None` when the reading is
/// inside the band.
pub fn check_reading(reading: &SensorReading, band: ThresholdBand) -> Option<ThresholdAlert> {
    let status = classify(reading.value, band);
    if status == ThresholdStatus::Optimal {
        return None;
    }

    let bound = match status {
        ThresholdStatus::Below => format!("minimum {}", band.min),
        ThresholdStatus::Above => format!("maximum {}", band.max),
        ThresholdStatus::Optimal => unreachable!(),
    };
    let unit = reading.metric.unit();
    let message = if unit.is_empty() {
        format!("{} at {} is {} the {}", reading.metric.label(), reading.value, status, bound)
    } else {
        format!(
            "{} at {} {} is {} the {} {}",
            reading.metric.label(),
            reading.value,
            unit,
            status,
            bound,
            unit
        )
    };

    Some(ThresholdAlert {
        metric: reading.metric,
        status,
        value: reading.value,
        band,
        message,
    })
}

// ---------------------------------------------------------------------------
// Transition tracking
// ---------------------------------------------------------------------------

/// A metric moving between statuses across two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub metric: Metric,
    pub from: Option<ThresholdStatus>,
    pub to: ThresholdStatus,
}

/// Remembers the last observed status per metric so callers can notify only
/// on transitions. The first observation of a metric is reported as a change
/// (from `None`) so an already-breached band alerts on startup.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last: HashMap<Metric, ThresholdStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the status seen this poll. Returns the transition if the
    /// status differs from the previous poll, `None` when unchanged.
    pub fn observe(&mut self, metric: Metric, status: ThresholdStatus) -> Option<StatusChange> {
        let previous = self.last.insert(metric, status);
        if previous == Some(status) {
            None
        } else {
            Some(StatusChange {
                metric,
                from: previous,
                to: status,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn band(min: f64, max: f64) -> ThresholdBand {
        ThresholdBand { min, max }
    }

    fn reading(metric: Metric, value: f64) -> SensorReading {
        SensorReading {
            metric,
            value,
            observed_at: "2025-03-10T06:00:00Z".to_string(),
        }
    }

    // --- Classification -----------------------------------------------------

    #[test]
    fn test_classify_three_way_split() {
        let b = band(6.5, 8.5);
        assert_eq!(classify(6.0, b), ThresholdStatus::Below);
        assert_eq!(classify(7.2, b), ThresholdStatus::Optimal);
        assert_eq!(classify(9.1, b), ThresholdStatus::Above);
    }

    #[test]
    fn test_classify_band_edges_are_optimal() {
        // Bounds are inclusive: sitting exactly on min or max is fine.
        let b = band(25.0, 32.0);
        assert_eq!(classify(25.0, b), ThresholdStatus::Optimal);
        assert_eq!(classify(32.0, b), ThresholdStatus::Optimal);
    }

    #[test]
    fn test_classify_degenerate_band() {
        // min == max is a valid band with a single optimal point.
        let b = band(7.0, 7.0);
        assert_eq!(classify(7.0, b), ThresholdStatus::Optimal);
        assert_eq!(classify(6.999, b), ThresholdStatus::Below);
        assert_eq!(classify(7.001, b), ThresholdStatus::Above);
    }

    #[test]
    fn test_default_bands_are_well_formed() {
        let config = default_config();
        for metric in crate::model::ALL_METRICS {
            let b = config.band(metric);
            assert!(b.min <= b.max, "default band for {} is inverted", metric);
        }
    }

    // --- Alert construction -------------------------------------------------

    #[test]
    fn test_check_reading_optimal_is_quiet() {
        assert_eq!(check_reading(&reading(Metric::Ph, 7.0), band(6.5, 8.5)), None);
    }

    #[test]
    fn test_check_reading_below_mentions_minimum() {
        let alert = check_reading(&reading(Metric::Temperature, 21.0), band(25.0, 32.0))
            .expect("21 °C is below the band");
        assert_eq!(alert.status, ThresholdStatus::Below);
        assert!(alert.message.contains("below"));
        assert!(alert.message.contains("25"));
        assert!(alert.message.contains("°C"));
    }

    #[test]
    fn test_check_reading_above_mentions_maximum() {
        let alert = check_reading(&reading(Metric::TotalDissolvedSolids, 900.0), band(250.0, 750.0))
            .expect("900 ppm is above the band");
        assert_eq!(alert.status, ThresholdStatus::Above);
        assert!(alert.message.contains("above"));
        assert!(alert.message.contains("750"));
    }

    #[test]
    fn test_unitless_metric_message_has_no_dangling_unit() {
        let alert = check_reading(&reading(Metric::Ph, 5.0), band(6.5, 8.5))
            .expect("5.0 is below the band");
        assert!(!alert.message.contains("  "), "message: '{}'", alert.message);
    }

    // --- Transition tracking ------------------------------------------------

    #[test]
    fn test_tracker_reports_first_observation() {
        let mut tracker = StatusTracker::new();
        let change = tracker
            .observe(Metric::Ph, ThresholdStatus::Above)
            .expect("first observation is a change");
        assert_eq!(change.from, None);
        assert_eq!(change.to, ThresholdStatus::Above);
    }

    #[test]
    fn test_tracker_is_quiet_while_status_holds() {
        let mut tracker = StatusTracker::new();
        tracker.observe(Metric::Ph, ThresholdStatus::Above);
        assert_eq!(tracker.observe(Metric::Ph, ThresholdStatus::Above), None);
        assert_eq!(tracker.observe(Metric::Ph, ThresholdStatus::Above), None);
    }

    #[test]
    fn test_tracker_reports_recovery() {
        let mut tracker = StatusTracker::new();
        tracker.observe(Metric::Turbidity, ThresholdStatus::Above);
        let change = tracker
            .observe(Metric::Turbidity, ThresholdStatus::Optimal)
            .expect("returning to band is a change");
        assert_eq!(change.from, Some(ThresholdStatus::Above));
        assert_eq!(change.to, ThresholdStatus::Optimal);
    }

    #[test]
    fn test_tracker_keeps_metrics_independent() {
        let mut tracker = StatusTracker::new();
        tracker.observe(Metric::Ph, ThresholdStatus::Optimal);
        let change = tracker
            .observe(Metric::Conductivity, ThresholdStatus::Below)
            .expect("a different metric tracks separately");
        assert_eq!(change.metric, Metric::Conductivity);
        assert_eq!(tracker.observe(Metric::Ph, ThresholdStatus::Optimal), None);
    }
}
