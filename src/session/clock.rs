//! Night countdown

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightClock {
    length: f32,
    elapsed: f32,
}

impl NightClock {
    pub fn new(length: f32) -> Self {
        Self {
            length: length.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Advance; returns true on the tick the sun comes up
    pub fn advance(&mut self, dt: f32) -> bool {
        let was_night = !self.is_sunrise();
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.length);
        was_night && self.is_sunrise()
    }

    pub fn remaining(&self) -> f32 {
        self.length - self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_sunrise(&self) -> bool {
        self.elapsed >= self.length
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
