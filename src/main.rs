//! Pond monitoring daemon.
//!
//! Polls the realtime database on a fixed interval, classifies the latest
//! readings against the operator's threshold bands, watches the device
//! heartbeat, and pushes notification records on transitions. `--verify`
//! probes the configured database subtree instead; `--dev-mode N` replays
//! archived readings from Postgres as if they were live.

use std::error::Error;
use std::process;

use chrono::Utc;
use postgres::NoTls;
use serde_json::json;

use aquamon_service::alert::liveness::{
    describe_last_seen, describe_signal, last_seen_from_epoch, LinkEvent, LinkMonitor,
};
use aquamon_service::alert::thresholds::{
    check_reading, classify, default_config, StatusTracker, ThresholdStatus,
};
use aquamon_service::analysis::groupings::latest_per_metric;
use aquamon_service::config::{load_config, ServiceConfig};
use aquamon_service::dev_mode::DevMode;
use aquamon_service::ingest::rtdb::RtdbClient;
use aquamon_service::logging::{self, DataSource, LogLevel};
use aquamon_service::model::{SensorReading, ALL_METRICS};
use aquamon_service::verify;

struct CliOptions {
    config_path: String,
    log_file: Option<String>,
    verbose: bool,
    verify: bool,
    once: bool,
    dev_mode_days: Option<i64>,
}

fn print_usage() {
    println!("Usage: aquamon_service [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <path>    Configuration file (default: aquamon.toml)");
    println!("  --log-file <path>  Append log entries to a file");
    println!("  --verbose          Log at debug level");
    println!("  --verify           Probe the configured database nodes and exit");
    println!("  --once             Run a single evaluation cycle and exit");
    println!("  --dev-mode <days>  Replay archived readings from <days> ago");
    println!("                     (requires DATABASE_URL)");
}

fn parse_args() -> Result<CliOptions, String> {
    let mut options = CliOptions {
        config_path: "aquamon.toml".to_string(),
        log_file: None,
        verbose: false,
        verify: false,
        once: false,
        dev_mode_days: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path = args.next().ok_or("--config requires a path")?;
            }
            "--log-file" => {
                options.log_file = Some(args.next().ok_or("--log-file requires a path")?);
            }
            "--verbose" => options.verbose = true,
            "--verify" => options.verify = true,
            "--once" => options.once = true,
            "--dev-mode" => {
                let days = args.next().ok_or("--dev-mode requires a day count")?;
                let days: i64 = days
                    .parse()
                    .map_err(|_| format!("invalid --dev-mode day count '{}'", days))?;
                options.dev_mode_days = Some(days);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let min_level = if options.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    logging::init_logger(min_level, options.log_file.as_deref(), true);

    let config = load_config(&options.config_path)?;

    if options.verify {
        let report = verify::run_full_verification(&config)?;
        verify::print_summary(&report);
        return Ok(());
    }

    let client = RtdbClient::new(&config.rtdb)?;
    let mut tracker = StatusTracker::new();
    let mut link_monitor = LinkMonitor::new();

    let mut replay = match options.dev_mode_days {
        Some(days) => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| "--dev-mode requires DATABASE_URL to be set")?;
            let pg = postgres::Client::connect(&database_url, NoTls)?;
            logging::info(
                DataSource::System,
                None,
                &format!("dev mode: replaying archive from {} days ago", days),
            );
            Some((DevMode::new(days), pg))
        }
        None => None,
    };

    logging::info(
        DataSource::System,
        None,
        &format!(
            "pond monitor started for {}/{} (poll every {}s)",
            config.rtdb.root, config.rtdb.uid, config.monitor.poll_interval_secs
        ),
    );

    loop {
        run_cycle(&client, &config, &mut tracker, &mut link_monitor, &mut replay);

        if options.once {
            break;
        }
        std::thread::sleep(std::time::Duration::from_secs(
            config.monitor.poll_interval_secs,
        ));
    }

    Ok(())
}

/// One evaluation pass: readings → classification → transitions →
/// notifications, then the heartbeat check.
fn run_cycle(
    client: &RtdbClient,
    config: &ServiceConfig,
    tracker: &mut StatusTracker,
    link_monitor: &mut LinkMonitor,
    replay: &mut Option<(DevMode, postgres::Client)>,
) {
    let mut evaluated = 0;
    let mut alerts = 0;
    let mut failures = 0;

    let bands = match client.fetch_threshold_config() {
        Ok(bands) => bands,
        Err(e) => {
            logging::log_rtdb_failure("settings", "threshold fetch", &e);
            failures += 1;
            default_config()
        }
    };

    let readings: Vec<SensorReading> = match replay {
        Some((dev, pg)) => match dev.fetch_simulated_current_readings(pg, &config.rtdb.uid) {
            Ok(readings) => readings,
            Err(e) => {
                logging::error(
                    DataSource::Database,
                    None,
                    &format!("archive replay failed: {}", e),
                );
                failures += 1;
                Vec::new()
            }
        },
        None => match client.fetch_snapshot() {
            Ok(readings) => readings,
            Err(e) => {
                logging::log_rtdb_failure("real-time", "snapshot fetch", &e);
                failures += 1;
                Vec::new()
            }
        },
    };

    let snapshot = latest_per_metric(&readings);

    for metric in ALL_METRICS {
        let Some(reading) = snapshot.reading(metric) else {
            continue;
        };
        evaluated += 1;

        let status = classify(reading.value, bands.band(metric));
        let Some(change) = tracker.observe(metric, status) else {
            continue;
        };

        if change.to == ThresholdStatus::Optimal {
            logging::info(
                DataSource::Device,
                Some(metric.reading_key()),
                &format!("{} back in band at {}", metric.label(), reading.value),
            );
            continue;
        }

        if let Some(alert) = check_reading(reading, bands.band(metric)) {
            alerts += 1;
            logging::warn(DataSource::Device, Some(metric.reading_key()), &alert.message);

            let details = json!({
                "metric": metric.reading_key(),
                "value": alert.value,
                "status": alert.status.to_string(),
                "min": alert.band.min,
                "max": alert.band.max,
            });
            if let Err(e) = client.push_notification("threshold", &alert.message, details) {
                logging::log_rtdb_failure("notifications", "threshold notification", &e);
                failures += 1;
            }
        }
    }

    // Heartbeat is meaningless while replaying the archive.
    if replay.is_none() {
        failures += check_device_link(client, config, link_monitor);
    }

    logging::log_cycle_summary(evaluated, alerts, failures);
}

/// Evaluates the heartbeat and notifies on link transitions. Returns the
/// number of failures encountered.
fn check_device_link(
    client: &RtdbClient,
    config: &ServiceConfig,
    link_monitor: &mut LinkMonitor,
) -> usize {
    let status = match client.fetch_device_status() {
        Ok(status) => status,
        Err(e) => {
            logging::log_rtdb_failure("deviceStatus", "heartbeat fetch", &e);
            return 1;
        }
    };

    let last_seen = match last_seen_from_epoch(status.last_seen_epoch) {
        Ok(last_seen) => last_seen,
        Err(e) => {
            logging::error(DataSource::Device, Some("deviceStatus"), &e);
            return 1;
        }
    };

    let now = Utc::now();
    if let Some(rssi) = status.rssi_dbm {
        logging::debug(
            DataSource::Device,
            Some("deviceStatus"),
            &format!("signal {} ({} dBm)", describe_signal(rssi), rssi),
        );
    }

    match link_monitor.observe_at(last_seen, now, config.monitor.stale_after_minutes) {
        Some(LinkEvent::WentOffline) => {
            let message = "Device connection lost";
            logging::warn(
                DataSource::Device,
                Some("deviceStatus"),
                &format!("{} (last seen {})", message, describe_last_seen(last_seen, now)),
            );
            let details = json!({
                "status": "offline",
                "lastSeen": status.last_seen_epoch,
            });
            if let Err(e) = client.push_notification("device_status", message, details) {
                logging::log_rtdb_failure("notifications", "device notification", &e);
                return 1;
            }
        }
        Some(LinkEvent::WentOnline) => {
            logging::info(
                DataSource::Device,
                Some("deviceStatus"),
                "Device connection restored",
            );
        }
        None => {}
    }

    0
}
