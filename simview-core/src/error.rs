use std::path::PathBuf;

use thiserror::Error;

use crate::events::Schema;

/// Everything that can stop a replay. All variants are fatal: the log is read
/// once, front to back, and there is nothing to retry.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to open event log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start gzip decompression for {}: {source}", .path.display())]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Event log is empty, expected a header line")]
    MissingHeader,

    #[error("Failed to read event log header: {0}")]
    Header(#[source] csv::Error),

    #[error("Header has {0} columns, expected 6 (basic) or 8 (extended)")]
    UnknownSchema(usize),

    #[error("The {expected} schema has {} columns but the header has {found}", .expected.columns())]
    SchemaMismatch { expected: Schema, found: usize },

    #[error("Malformed row in event log: {0}")]
    Read(#[from] csv::Error),

    #[error("Failed to spawn decoder thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Decoder thread panicked")]
    ProducerPanicked,
}
