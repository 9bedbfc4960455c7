//! ## simview-telemetry::logging
//! **Structured logging with tracing**
//!
//! `RUST_LOG` always wins over the level coming from configuration, so a user
//! can turn on `trace` for a single run and see every decoded row.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. Returns `false` when one is
    /// already installed (e.g. by a test harness).
    pub fn try_init(level: &str) -> bool {
        fmt()
            .with_env_filter(Self::filter(level))
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    }

    fn filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    /// Logs the end of a playback session with its summary fields.
    pub fn log_session_end(pulls: u64, buffered: usize, last_tick: Option<u64>) {
        let span = tracing::info_span!("playback_session");
        let _enter = span.enter();
        tracing::info!(pulls, buffered, ?last_tick, "Playback session finished");
    }
}
