//! ## simview-core::stream
//! **Bounded event stream between the decoder thread and playback**
//!
//! The decoder runs on its own thread and pushes into a bounded channel. A
//! full channel blocks the decoder, so it never gets more than `capacity`
//! events ahead of the consumer. End of input closes the channel; a fatal
//! decode error closes it too and is handed to the consumer on its next pull.
//! If the consumer is dropped, the decoder's next send fails and it exits.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use simview_telemetry::MetricsRecorder;
use tracing::{debug, error, info};

use crate::decoder::LogDecoder;
use crate::error::ReplayError;
use crate::events::Event;

/// Channel capacity matching a 60 fps target frame rate.
pub const DEFAULT_STREAM_CAPACITY: usize = 60;

/// A forward-only supply of events.
pub trait EventSource {
    /// Returns the next event, `Ok(None)` once the source is exhausted.
    fn pull(&mut self) -> Result<Option<Event>, ReplayError>;
}

/// In-memory [`EventSource`] over any iterator of events.
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = Event>> IterSource<I> {
    pub fn new<T>(events: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: events.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Event>> EventSource for IterSource<I> {
    fn pull(&mut self) -> Result<Option<Event>, ReplayError> {
        Ok(self.iter.next())
    }
}

/// Consumer end of the decoder channel.
pub struct EventStream {
    receiver: Receiver<Event>,
    producer: Option<JoinHandle<Result<u64, ReplayError>>>,
}

impl EventStream {
    /// Moves `decoder` onto a producer thread feeding a channel of `capacity`.
    pub fn spawn(
        decoder: LogDecoder,
        capacity: usize,
        metrics: Option<MetricsRecorder>,
    ) -> Result<Self, ReplayError> {
        let (sender, receiver) = bounded(capacity);
        let producer = thread::Builder::new()
            .name("simview-decoder".into())
            .spawn(move || produce(decoder, sender, metrics))
            .map_err(ReplayError::Spawn)?;

        info!(capacity, "Started decoder thread");
        Ok(Self {
            receiver,
            producer: Some(producer),
        })
    }

    /// `true` once the channel has been observed closed.
    pub fn is_closed(&self) -> bool {
        self.producer.is_none()
    }

    fn finish(&mut self) -> Result<Option<Event>, ReplayError> {
        let Some(producer) = self.producer.take() else {
            return Ok(None);
        };

        match producer.join() {
            Ok(Ok(sent)) => {
                debug!(sent, "Event stream closed");
                Ok(None)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ReplayError::ProducerPanicked),
        }
    }
}

impl EventSource for EventStream {
    /// Blocks until the decoder delivers an event or closes the channel.
    fn pull(&mut self) -> Result<Option<Event>, ReplayError> {
        if self.producer.is_none() {
            return Ok(None);
        }

        match self.receiver.recv() {
            Ok(event) => Ok(Some(event)),
            Err(_) => self.finish(),
        }
    }
}

fn produce(
    decoder: LogDecoder,
    sender: Sender<Event>,
    metrics: Option<MetricsRecorder>,
) -> Result<u64, ReplayError> {
    let mut sent = 0u64;

    for row in decoder {
        let row = row.inspect_err(|err| error!(%err, sent, "Event log decoding failed"))?;

        if let Some(metrics) = &metrics {
            metrics.rows_decoded.inc();
            metrics.fields_defaulted.inc_by(row.defaulted_fields as u64);
            if !row.event.action.is_known() {
                metrics.unknown_actions.inc();
            }
        }

        if sender.send(row.event).is_err() {
            debug!(sent, "Playback dropped the stream, stopping decoder");
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
