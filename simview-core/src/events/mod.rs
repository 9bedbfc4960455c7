//! ## simview-core::events
//! **Typed cache simulation events**
//!
//! One [`Event`] per data row of the log. Rows from the extended layout also
//! carry the cache occupancy at the time of the event.

use std::fmt;

mod schema;

pub use schema::{Schema, SchemaChoice};

/// What happened to the object at this tick.
///
/// Labels other than `ADD` and `DELETE` are kept verbatim in `Other` rather
/// than rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Delete,
    Other(String),
}

impl Action {
    pub fn from_label(label: &str) -> Self {
        match label {
            "ADD" => Action::Add,
            "DELETE" => Action::Delete,
            other => Action::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Add => "ADD",
            Action::Delete => "DELETE",
            Action::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Action::Other(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache fill level reported by the extended log layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheOccupancy {
    pub size: f64,
    pub capacity: f64,
}

/// A single simulated cache occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub tick: u64,
    pub action: Action,
    pub file_id: i64,
    pub size: f64,
    pub num_requests: i64,
    pub delta_t: i64,
    /// Only present for rows decoded with [`Schema::Extended`].
    pub occupancy: Option<CacheOccupancy>,
}

impl Event {
    /// Text a viewer shows for this event, e.g. `ADD -> 42`.
    pub fn label(&self) -> String {
        format!("{} -> {}", self.action, self.file_id)
    }
}
