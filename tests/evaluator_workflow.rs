//! Cross-module evaluator tests.
//!
//! Exercises the domain modules together the way the daemon loop uses them:
//! payload parsing → grouping → classification → transition tracking, and
//! the schedule add/edit flow against the stage registry. Everything here is
//! pure and clock-injected; no network or database is touched.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use aquamon_service::alert::liveness::{is_online_at, LinkEvent, LinkMonitor};
use aquamon_service::alert::thresholds::{classify, default_config, StatusTracker, ThresholdStatus};
use aquamon_service::analysis::groupings::latest_per_metric;
use aquamon_service::feed::{estimate_feed_mass, estimate_with_recommended};
use aquamon_service::ingest::rtdb::{parse_snapshot, parse_threshold_config, parse_timers};
use aquamon_service::model::{EvalError, Metric, ALL_METRICS};
use aquamon_service::schedule::{
    ensure_capacity, find_conflict, next_timer_id, parse_time_of_day,
};
use aquamon_service::stages::{profile_for, LifeStage};

// ---------------------------------------------------------------------------
// Readings: payload → snapshot → classification → transitions
// ---------------------------------------------------------------------------

#[test]
fn test_payload_to_alert_pipeline() {
    // A live payload with one metric out of band (TDS above 750).
    let payload = json!({
        "pH": 7.2,
        "temperature": 28.5,
        "turbidity": 12.0,
        "EC": 820,
        "TDS": 910,
        "timestamp": "2025-03-10T06:00:00Z",
    });

    let readings = parse_snapshot(&payload);
    let snapshot = latest_per_metric(&readings);
    let bands = default_config();

    let mut statuses = Vec::new();
    for metric in ALL_METRICS {
        let reading = snapshot.reading(metric).expect("full payload");
        statuses.push((metric, classify(reading.value, bands.band(metric))));
    }

    let out_of_band: Vec<_> = statuses
        .iter()
        .filter(|(_, s)| *s != ThresholdStatus::Optimal)
        .collect();
    assert_eq!(out_of_band.len(), 1);
    assert_eq!(out_of_band[0].0, Metric::TotalDissolvedSolids);
    assert_eq!(out_of_band[0].1, ThresholdStatus::Above);
}

#[test]
fn test_tracker_notifies_once_per_excursion() {
    // Three polls: breach, still breached, recovered. Exactly two
    // transitions should surface.
    let bands = default_config();
    let mut tracker = StatusTracker::new();
    let mut notifications = 0;

    for tds in [910.0, 905.0, 600.0] {
        let payload = json!({ "TDS": tds });
        let snapshot = latest_per_metric(&parse_snapshot(&payload));
        let reading = snapshot
            .reading(Metric::TotalDissolvedSolids)
            .expect("TDS present");
        let status = classify(reading.value, bands.band(Metric::TotalDissolvedSolids));
        if tracker.observe(Metric::TotalDissolvedSolids, status).is_some() {
            notifications += 1;
        }
    }

    assert_eq!(notifications, 2, "one alert on breach, one on recovery");
}

#[test]
fn test_operator_settings_override_classification() {
    // An operator running a hard-water pond widens the TDS band; the same
    // reading that alerts under defaults is optimal under their settings.
    let settings = json!({
        "tds": { "Minimum": "300", "Maximum": "1000" },
    });
    let bands = parse_threshold_config(&settings);

    let status = classify(910.0, bands.band(Metric::TotalDissolvedSolids));
    assert_eq!(status, ThresholdStatus::Optimal);

    let default_status = classify(910.0, default_config().band(Metric::TotalDissolvedSolids));
    assert_eq!(default_status, ThresholdStatus::Above);
}

// ---------------------------------------------------------------------------
// Schedules: stored timers → conflict and capacity checks → id allocation
// ---------------------------------------------------------------------------

#[test]
fn test_schedule_add_flow_for_fingerling_pond() {
    let profile = profile_for(LifeStage::Fingerling);
    let cap = profile.recommended_sessions as usize;

    // Stored timers as the backend returns them.
    let stored = json!({
        "timer0": { "start": "06:00" },
        "timer1": { "start": "11:30" },
        "timer2": { "start": "17:00" },
    });
    let existing = parse_timers(&stored).expect("well-formed timers");

    // Room for one more session under the fingerling cap of 4.
    assert!(ensure_capacity(existing.len(), cap).is_ok());

    // 11:32 collides with the 11:30 session.
    let candidate = parse_time_of_day("11:32").expect("valid time");
    let conflict = find_conflict(candidate, &existing, None, 5)
        .expect("in-range candidate")
        .expect("should collide with timer1");
    assert_eq!(conflict.id, "timer1");

    // 21:00 is clear, and the allocator fills the next dense slot.
    let candidate = parse_time_of_day("21:00").expect("valid time");
    assert!(find_conflict(candidate, &existing, None, 5)
        .expect("in-range candidate")
        .is_none());
    assert_eq!(next_timer_id(existing.iter().map(|s| s.id.as_str())), "timer3");
}

#[test]
fn test_schedule_cap_blocks_fourth_session_for_juvenile() {
    let profile = profile_for(LifeStage::Juvenile);
    let cap = profile.recommended_sessions as usize;
    assert_eq!(cap, 3);

    let stored = json!({
        "timer0": { "start": "06:00" },
        "timer1": { "start": "12:00" },
        "timer2": { "start": "18:00" },
    });
    let existing = parse_timers(&stored).expect("well-formed timers");

    assert_eq!(
        ensure_capacity(existing.len(), cap),
        Err(EvalError::CapacityExceeded { count: 3, cap: 3 })
    );
}

#[test]
fn test_editing_a_session_keeps_its_own_slot() {
    let stored = json!({
        "timer0": { "start": "06:00" },
        "timer1": { "start": "18:00" },
    });
    let existing = parse_timers(&stored).expect("well-formed timers");

    // Nudging timer0 by two minutes only has to clear timer1.
    let candidate = parse_time_of_day("06:02").expect("valid time");
    let conflict = find_conflict(candidate, &existing, Some("timer0"), 5)
        .expect("in-range candidate");
    assert!(conflict.is_none());
}

// ---------------------------------------------------------------------------
// Feed estimation against the registry
// ---------------------------------------------------------------------------

#[test]
fn test_feed_plan_for_a_stocked_pond() {
    // 2000 fingerlings at the registry ration: ((5+70)/2) * 2000 * 0.10.
    let profile = profile_for(LifeStage::Fingerling);
    let estimate = estimate_with_recommended(2000, profile).expect("valid inputs");

    assert_eq!(estimate.total_grams, 7500.0);
    assert_eq!(estimate.per_session_grams, 1875.0);

    // Feeding the same ration over fewer sessions increases the per-session
    // mass but not the daily total.
    let two_sessions = estimate_feed_mass(2000, profile, 2).expect("valid inputs");
    assert_eq!(two_sessions.total_grams, estimate.total_grams);
    assert_eq!(two_sessions.per_session_grams, 3750.0);
}

// ---------------------------------------------------------------------------
// Liveness over a simulated outage
// ---------------------------------------------------------------------------

#[test]
fn test_link_monitor_over_an_outage() {
    let mut monitor = LinkMonitor::new();
    let heartbeat = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();

    // Polls at +1, +4, +6, +9 minutes with a frozen heartbeat: the device
    // drops out between the second and third poll.
    let mut events = Vec::new();
    for minutes in [1, 4, 6, 9] {
        let now = heartbeat + Duration::minutes(minutes);
        if let Some(event) = monitor.observe_at(heartbeat, now, 5) {
            events.push((minutes, event));
        }
    }
    assert_eq!(events, vec![(6, LinkEvent::WentOffline)]);

    // The heartbeat resumes; the next poll reports recovery exactly once.
    let fresh = heartbeat + Duration::minutes(10);
    let now = heartbeat + Duration::minutes(10);
    assert_eq!(monitor.observe_at(fresh, now, 5), Some(LinkEvent::WentOnline));
    assert_eq!(monitor.observe_at(fresh, now, 5), None);
}

#[test]
fn test_is_online_agrees_with_monitor_boundary() {
    let heartbeat = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();
    assert!(is_online_at(heartbeat, heartbeat + Duration::minutes(4), 5));
    assert!(!is_online_at(heartbeat, heartbeat + Duration::minutes(6), 5));
}
