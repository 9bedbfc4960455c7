//! # simview telemetry
//!
//! Crate for logging and metrics shared by the replay core and the CLI.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
