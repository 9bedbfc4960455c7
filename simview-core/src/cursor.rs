/// Current playback tick. Never goes below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    tick: u64,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Moves by `delta` ticks, clamping at zero.
    #[inline]
    pub fn advance(&mut self, delta: i64) -> u64 {
        self.tick = self.tick.saturating_add_signed(delta);
        self.tick
    }

    pub fn seek(&mut self, tick: u64) {
        self.tick = tick;
    }
}
