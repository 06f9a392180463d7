//! Data Source Verification Module
//!
//! Framework for testing a configured realtime-database subtree against the
//! live API to determine which nodes are present and returning data.
//!
//! Use this when onboarding a new pond device or after changing database
//! rules, before trusting the monitoring loop.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::config::ServiceConfig;
use crate::ingest::rtdb::RtdbClient;
use crate::model::ALL_METRICS;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub node_results: Vec<NodeVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub nodes_total: usize,
    pub nodes_working: usize,
    pub nodes_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeVerification {
    pub path: String,
    pub label: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub fields_available: Vec<String>,
    pub fields_expected: Vec<String>,
    pub fields_missing: Vec<String>,
    pub entry_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Node Verification
// ============================================================================

/// Probes one node of the operator's subtree and compares the fields it
/// returns against the fields the monitoring loop expects.
pub fn verify_node(
    client: &RtdbClient,
    path: &str,
    label: &str,
    expected_fields: &[&str],
) -> NodeVerification {
    let mut result = NodeVerification {
        path: path.to_string(),
        label: label.to_string(),
        status: VerificationStatus::Failed,
        reachable: false,
        fields_available: Vec::new(),
        fields_expected: expected_fields.iter().map(|s| s.to_string()).collect(),
        fields_missing: Vec::new(),
        entry_count: 0,
        error_message: None,
    };

    match client.fetch_raw(path) {
        Ok(value) => {
            result.reachable = true;
            if let Some(object) = value.as_object() {
                result.entry_count = object.len();
                result.fields_available = object.keys().cloned().collect();
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    }

    for expected in &result.fields_expected {
        if !result.fields_available.contains(expected) {
            result.fields_missing.push(expected.clone());
        }
    }

    if result.entry_count > 0 {
        if result.fields_missing.is_empty() {
            result.status = VerificationStatus::Success;
        } else {
            result.status = VerificationStatus::PartialSuccess;
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

/// The nodes the monitoring loop depends on, with the fields each is
/// expected to carry.
fn nodes_under_test() -> Vec<(&'static str, &'static str, Vec<&'static str>)> {
    let mut reading_fields: Vec<&'static str> =
        ALL_METRICS.iter().map(|m| m.reading_key()).collect();
    reading_fields.push("timestamp");

    vec![
        ("real-time", "Live sensor readings", reading_fields),
        ("deviceStatus", "Device heartbeat", vec!["lastSeen", "rssi"]),
        ("timers", "Feeding schedules", vec![]),
        (
            "settings",
            "Threshold settings",
            ALL_METRICS.iter().map(|m| m.settings_key()).collect(),
        ),
    ]
}

pub fn run_full_verification(config: &ServiceConfig) -> Result<VerificationReport, Box<dyn Error>> {
    let client = RtdbClient::new(&config.rtdb)?;

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        node_results: Vec::new(),
        summary: VerificationSummary {
            nodes_total: 0,
            nodes_working: 0,
            nodes_failed: 0,
        },
    };

    println!("🔍 Verifying realtime-database nodes...");
    let nodes = nodes_under_test();
    report.summary.nodes_total = nodes.len();

    for (path, label, expected_fields) in nodes {
        print!("  {} ... ", path);
        let result = verify_node(&client, path, label, &expected_fields);

        match result.status {
            VerificationStatus::Success => {
                println!("✓ OK ({} fields)", result.entry_count);
                report.summary.nodes_working += 1;
            }
            VerificationStatus::PartialSuccess => {
                println!("⚠ Partial (missing: {:?})", result.fields_missing);
                report.summary.nodes_working += 1;
            }
            VerificationStatus::Failed => {
                println!(
                    "✗ FAILED: {}",
                    result.error_message.as_deref().unwrap_or("Unknown")
                );
                report.summary.nodes_failed += 1;
            }
        }

        report.node_results.push(result);
    }

    Ok(report)
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "Database nodes:   {}/{} working  ({} failed)",
        report.summary.nodes_working, report.summary.nodes_total, report.summary.nodes_failed
    );
    println!();

    let success_rate = if report.summary.nodes_total > 0 {
        (report.summary.nodes_working as f64 / report.summary.nodes_total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.nodes_working, report.summary.nodes_total
    );
    println!("═══════════════════════════════════════════════════════════");
}
