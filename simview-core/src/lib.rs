//! # simview-core
//!
//! Ingestion and replay layer for cache simulation event logs.
//!
//! A log is a CSV file (optionally gzip-compressed) of cache `ADD`/`DELETE`
//! events ordered by tick. It can only be read forward, while a viewer wants
//! to scrub back and forth, so the pieces are:
//!
//! - `decoder`: opens the log, drops the header, turns rows into [`Event`]s
//! - `stream`: a bounded channel fed by a decoder thread, so decoding runs
//!   ahead of playback but never more than one channel's worth
//! - `buffer`: accumulates pulled events by tick and only pulls when a seek
//!   goes past what has been seen
//! - `cursor` / `session`: the per-frame contract a frontend drives
//!
//! Data flow: decoder → stream → tick buffer ← session (once per frame).

pub mod buffer;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod events;
pub mod session;
pub mod stream;

pub mod prelude {
    pub use crate::buffer::*;
    pub use crate::cursor::*;
    pub use crate::decoder::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::session::*;
    pub use crate::stream::*;
}

pub use buffer::TickBuffer;
pub use cursor::PlaybackCursor;
pub use decoder::{parse_record, DecodedRow, LogDecoder};
pub use error::ReplayError;
pub use events::{Action, CacheOccupancy, Event, Schema, SchemaChoice};
pub use session::{Frame, FrameInput, PlaybackSession};
pub use stream::{EventSource, EventStream, IterSource, DEFAULT_STREAM_CAPACITY};
