/// Device liveness detection.
///
/// The pond device heartbeats into the backend on every upload cycle. A
/// stalled heartbeat usually means a power or WiFi outage at the pond — and
/// an unattended feeder. This module derives online/offline from the
/// last-seen timestamp and tracks the transition so the caller notifies once
/// per outage, not once per poll.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This makes liveness purely deterministic in
/// tests without mocking or time manipulation.

use chrono::{DateTime, TimeZone, Utc};

/// Heartbeat gap after which the device is considered offline.
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 5;

// ---------------------------------------------------------------------------
// Liveness check
// ---------------------------------------------------------------------------

/// Returns `true` while the gap since the last heartbeat is within
/// `stale_after_minutes`.
///
/// The boundary is inclusive:
///   gap == stale_after_minutes  →  online
///   gap >  stale_after_minutes  →  offline
///
/// A heartbeat from the future (device clock skew) counts as online.
pub fn is_online_at(
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
    stale_after_minutes: i64,
) -> bool {
    let age_ms = now.signed_duration_since(last_seen).num_milliseconds();
    age_ms <= stale_after_minutes * 60_000
}

/// Converts the backend's unix-seconds heartbeat field to a timestamp.
/// Returns an error for values outside chrono's representable range.
pub fn last_seen_from_epoch(epoch_secs: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_opt(epoch_secs, 0)
        .single()
        .ok_or_else(|| format!("unrepresentable heartbeat timestamp {}", epoch_secs))
}

// ---------------------------------------------------------------------------
// Link state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Online,
    Offline,
}

/// Emitted when the link crosses the staleness boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    WentOnline,
    WentOffline,
}

/// Two-state tracker over the staleness boundary.
///
/// Starts in `Online` — the dashboard has always assumed a live device until
/// proven otherwise, so a service restart during an outage emits one
/// `WentOffline` rather than staying silent.
#[derive(Debug)]
pub struct LinkMonitor {
    state: LinkState,
}

impl LinkMonitor {
    pub fn new() -> Self {
        LinkMonitor {
            state: LinkState::Online,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Evaluates the heartbeat against `now`. Returns an event only when the
    /// derived state differs from the previous observation.
    pub fn observe_at(
        &mut self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        stale_after_minutes: i64,
    ) -> Option<LinkEvent> {
        let new_state = if is_online_at(last_seen, now, stale_after_minutes) {
            LinkState::Online
        } else {
            LinkState::Offline
        };

        match (self.state, new_state) {
            (LinkState::Online, LinkState::Offline) => {
                self.state = new_state;
                Some(LinkEvent::WentOffline)
            }
            (LinkState::Offline, LinkState::Online) => {
                self.state = new_state;
                Some(LinkEvent::WentOnline)
            }
            _ => None,
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Presentation helpers
// ---------------------------------------------------------------------------

/// Human-readable heartbeat age, matching the dashboard's "Last Seen" field.
pub fn describe_last_seen(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(last_seen).num_minutes();

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes == 1 {
        return "1 minute ago".to_string();
    }
    if minutes < 60 {
        return format!("{} minutes ago", minutes);
    }

    let hours = minutes / 60;
    if hours == 1 {
        return "1 hour ago".to_string();
    }
    if hours < 24 {
        return format!("{} hours ago", hours);
    }

    let days = hours / 24;
    if days == 1 {
        return "1 day ago".to_string();
    }
    format!("{} days ago", days)
}

/// Grades WiFi received signal strength.
///
/// The device reports RSSI in dBm (negative, closer to zero is stronger).
/// An earlier dashboard revision graded `>= 50` as excellent, which no dBm
/// radio ever reports; the scale here uses the conventional dBm breakpoints.
pub fn describe_signal(rssi_dbm: i64) -> &'static str {
    if rssi_dbm >= -50 {
        "Excellent"
    } else if rssi_dbm >= -60 {
        "Good"
    } else if rssi_dbm >= -70 {
        "Fair"
    } else {
        "Poor"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
