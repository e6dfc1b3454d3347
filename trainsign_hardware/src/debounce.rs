//! Stable-sample debouncing for active-low push buttons.

/// Tracks one input line and reports a press once the line has read low for
/// `samples` consecutive polls.
#[derive(Debug, Clone)]
pub struct Debouncer {
    samples: u8,
    stable_high: bool,
    count: u8,
}

impl Debouncer {
    /// `samples` is clamped to at least 1. The line starts released (high).
    pub fn new(samples: u8) -> Self {
        Self {
            samples: samples.max(1),
            stable_high: true,
            count: 0,
        }
    }

    /// Feed one raw level; returns `true` on the poll where a debounced
    /// high-to-low transition completes.
    pub fn update(&mut self, level_high: bool) -> bool {
        if level_high == self.stable_high {
            self.count = 0;
            return false;
        }
        self.count = self.count.saturating_add(1);
        if self.count < self.samples {
            return false;
        }
        self.count = 0;
        self.stable_high = level_high;
        !level_high
    }

    pub fn is_pressed(&self) -> bool {
        !self.stable_high
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(3)
    }
}
