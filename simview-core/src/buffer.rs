//! ## simview-core::buffer
//! **Tick-indexed replay buffer over a forward-only source**
//!
//! Events are pulled only when a seek goes past the last pulled tick, and
//! are kept for the whole session. Backward seeks are served from memory.
//! Ticks may have gaps; a gap is simply absent from the buffer.

use std::collections::BTreeMap;

use simview_telemetry::MetricsRecorder;
use tracing::debug;

use crate::error::ReplayError;
use crate::events::Event;
use crate::stream::EventSource;

pub struct TickBuffer<S> {
    source: S,
    events: BTreeMap<u64, Event>,
    last_pulled: Option<u64>,
    exhausted: bool,
    pulls: u64,
    metrics: Option<MetricsRecorder>,
}

impl<S: EventSource> TickBuffer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            events: BTreeMap::new(),
            last_pulled: None,
            exhausted: false,
            pulls: 0,
            metrics: None,
        }
    }

    /// Counts pulls in `metrics` as well as locally.
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Startup fill: pulls the first event so there is something to show.
    pub fn prime(&mut self) -> Result<usize, ReplayError> {
        self.fill_up_to(0)
    }

    /// Pulls until the last pulled event's tick is at least `target` or the
    /// source is exhausted. Each event is stored under its own tick; a later
    /// event at the same tick replaces the earlier one.
    ///
    /// Returns the number of events pulled by this call. A fresh buffer always
    /// pulls at least once.
    pub fn fill_up_to(&mut self, target: u64) -> Result<usize, ReplayError> {
        let mut pulled = 0;

        while !self.exhausted && self.last_pulled.map_or(true, |tick| tick < target) {
            let Some(event) = self.source.pull()? else {
                self.exhausted = true;
                debug!(buffered = self.events.len(), "Event source exhausted");
                break;
            };

            self.pulls += 1;
            pulled += 1;
            if let Some(metrics) = &self.metrics {
                metrics.stream_pulls.inc();
            }

            self.last_pulled = Some(event.tick);
            self.events.insert(event.tick, event);
        }

        Ok(pulled)
    }

    /// The event recorded at exactly `tick`, if any.
    pub fn at(&self, tick: u64) -> Option<&Event> {
        self.events.get(&tick)
    }

    pub fn contains(&self, tick: u64) -> bool {
        self.events.contains_key(&tick)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events pulled from the source over the buffer's lifetime.
    pub fn pulls(&self) -> u64 {
        self.pulls
    }

    pub fn last_pulled_tick(&self) -> Option<u64> {
        self.last_pulled
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Buffered ticks in ascending order.
    pub fn ticks(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.keys().copied()
    }
}
