/// Grouping of flat reading lists into per-metric structures.
///
/// Ingest and dev-mode replay both produce a flat `Vec<SensorReading>`; the
/// evaluation loop wants one current value per metric. Input order is the
/// feed's delivery order (oldest first), so the last reading per metric wins.

use crate::model::{Metric, SensorReading, SensorSnapshot};

/// Collapses a batch of readings into the latest reading per metric.
///
/// Metrics absent from the batch stay `None` in the snapshot.
pub fn latest_per_metric(readings: &[SensorReading]) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot::default();
    for reading in readings {
        let slot = match reading.metric {
            Metric::Ph => &mut snapshot.ph,
            Metric::Temperature => &mut snapshot.temperature,
            Metric::Turbidity => &mut snapshot.turbidity,
            Metric::Conductivity => &mut snapshot.conductivity,
            Metric::TotalDissolvedSolids => &mut snapshot.total_dissolved_solids,
        };
        *slot = Some(reading.clone());
    }
    snapshot
}
