//! Event stream and playback pacing.

use serde::{Deserialize, Serialize};
use simview_core::DEFAULT_STREAM_CAPACITY;
use validator::{self, Validate};

/// Bounded channel between the decoder thread and playback.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StreamConfig {
    /// How many decoded events may wait in the channel. Defaults to the
    /// target frame rate so the decoder runs at most one second ahead.
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_STREAM_CAPACITY
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Frame pacing for the playback loop.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PlaybackConfig {
    /// Target frames per second.
    #[serde(default = "default_fps")]
    #[validate(range(min = 1, max = 1000))]
    pub fps: u32,
}

fn default_fps() -> u32 {
    60
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl PlaybackConfig {
    /// Wall-clock budget of one frame.
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}
