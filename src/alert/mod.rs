/// Alerting logic for the pond monitoring service.
///
/// Submodules:
/// - `thresholds` — classifies readings against configured bands and tracks
///   status transitions so notifications fire only on a change.
/// - `liveness` — derives online/offline from the device heartbeat and
///   tracks the link state machine.

pub mod liveness;
pub mod thresholds;
