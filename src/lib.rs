//! Monitoring service for a remote bangus (milkfish) aquaculture device.
//!
//! The pond device streams water-quality readings and a heartbeat into a
//! hosted realtime database; operators configure threshold bands and feeding
//! schedules through the same backend. This crate evaluates that data:
//! classification against bands, feeding-schedule validation, feed-mass
//! estimation, and device liveness, with notification records written back
//! for the dashboard.
//!
//! The domain logic (`schedule`, `feed`, `alert`, `analysis`) is pure and
//! clock-injected; all I/O lives in the adapters (`ingest`, `dev_mode`) and
//! the daemon loop in `main.rs`.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod feed;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod stages;
pub mod verify;
