//! ## simview-telemetry::metrics
//! **Prometheus counters for the replay pipeline**
//!
//! Counters are cheap `Arc` handles, so the recorder is cloned into the
//! decoder thread and the playback loop alike.

use prometheus::{IntCounter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub rows_decoded: IntCounter,
    pub fields_defaulted: IntCounter,
    pub unknown_actions: IntCounter,
    pub stream_pulls: IntCounter,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let rows_decoded =
            IntCounter::new("simview_rows_decoded_total", "Rows decoded from the event log")?;
        let fields_defaulted = IntCounter::new(
            "simview_fields_defaulted_total",
            "Numeric columns that failed to parse and fell back to zero",
        )?;
        let unknown_actions = IntCounter::new(
            "simview_unknown_actions_total",
            "Rows whose action column was neither ADD nor DELETE",
        )?;
        let stream_pulls = IntCounter::new(
            "simview_stream_pulls_total",
            "Events pulled from the event stream into the tick buffer",
        )?;

        registry.register(Box::new(rows_decoded.clone()))?;
        registry.register(Box::new(fields_defaulted.clone()))?;
        registry.register(Box::new(unknown_actions.clone()))?;
        registry.register(Box::new(stream_pulls.clone()))?;

        Ok(Self {
            registry,
            rows_decoded,
            fields_defaulted,
            unknown_actions,
            stream_pulls,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
