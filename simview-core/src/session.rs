//! ## simview-core::session
//! **Per-frame playback contract for frontends**
//!
//! A frontend calls [`PlaybackSession::frame`] once per display frame with
//! the keys held during that frame. The session moves the cursor one tick per
//! held key, fills the buffer up to the cursor and returns what to draw.

use tracing::trace;

use crate::buffer::TickBuffer;
use crate::cursor::PlaybackCursor;
use crate::error::ReplayError;
use crate::events::Event;
use crate::stream::EventSource;

/// Seek keys held during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub forward: bool,
    pub backward: bool,
}

impl FrameInput {
    pub const IDLE: Self = Self {
        forward: false,
        backward: false,
    };
    pub const FORWARD: Self = Self {
        forward: true,
        backward: false,
    };
    pub const BACKWARD: Self = Self {
        forward: false,
        backward: true,
    };
}

/// What a frontend draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub event: Option<Event>,
}

impl Frame {
    /// Frame counter text, e.g. `Tick: 12`.
    pub fn tick_label(&self) -> String {
        format!("Tick: {}", self.tick)
    }

    /// Event text, absent when nothing happened at this tick.
    pub fn event_label(&self) -> Option<String> {
        self.event.as_ref().map(Event::label)
    }
}

pub struct PlaybackSession<S> {
    buffer: TickBuffer<S>,
    cursor: PlaybackCursor,
    started: bool,
}

impl<S: EventSource> PlaybackSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_buffer(TickBuffer::new(source))
    }

    pub fn with_buffer(buffer: TickBuffer<S>) -> Self {
        Self {
            buffer,
            cursor: PlaybackCursor::new(),
            started: false,
        }
    }

    /// Seeds the buffer with the first event. Blocks until the source has
    /// produced it. Called implicitly by the first [`frame`](Self::frame).
    pub fn start(&mut self) -> Result<usize, ReplayError> {
        if self.started {
            return Ok(0);
        }
        self.started = true;
        self.buffer.prime()
    }

    /// Runs one frame: apply input, fill up to the cursor, look up the tick.
    /// Holding both keys moves forward then back, netting zero.
    pub fn frame(&mut self, input: FrameInput) -> Result<Frame, ReplayError> {
        self.start()?;

        if input.forward {
            self.cursor.advance(1);
        }
        if input.backward {
            self.cursor.advance(-1);
        }

        self.current()
    }

    /// Jumps straight to `tick` and returns the resulting frame.
    pub fn seek(&mut self, tick: u64) -> Result<Frame, ReplayError> {
        self.start()?;
        self.cursor.seek(tick);
        self.current()
    }

    fn current(&mut self) -> Result<Frame, ReplayError> {
        let tick = self.cursor.tick();
        let pulled = self.buffer.fill_up_to(tick)?;
        if pulled > 0 {
            trace!(tick, pulled, "Filled tick buffer");
        }

        Ok(Frame {
            tick,
            event: self.buffer.at(tick).cloned(),
        })
    }

    /// `true` once the source is drained and the cursor is beyond every
    /// buffered tick, i.e. nothing further will ever be shown going forward.
    pub fn is_past_end(&self) -> bool {
        self.buffer.is_exhausted()
            && self
                .buffer
                .last_pulled_tick()
                .map_or(true, |last| self.cursor.tick() > last)
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn buffer(&self) -> &TickBuffer<S> {
        &self.buffer
    }
}
