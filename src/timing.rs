//! Frame timing.

use std::collections::VecDeque;

use crate::constants::{FPS_HIGH, FPS_HISTORY_LEN, FPS_LOW, MAX_FRAME_DELTA};

/// Per-frame clock state. Timestamps are milliseconds, derived values seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInfo {
    pub start_ms: f64,
    pub prev_ms: f64,
    pub delta: f64,
    pub elapsed: f64,
}

impl TimeInfo {
    #[must_use]
    pub fn start(now_ms: f64) -> Self {
        Self { start_ms: now_ms, prev_ms: now_ms, delta: 0.0, elapsed: 0.0 }
    }

    /// Record a new frame. `delta` is clamped to `[0, MAX_FRAME_DELTA]` so a clock
    /// stepping backwards never runs the simulation in reverse.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let raw = (now_ms - self.prev_ms) / 1000.0;
        self.delta = if raw.is_finite() { raw.clamp(0.0, MAX_FRAME_DELTA) } else { 0.0 };
        self.elapsed = ((now_ms - self.start_ms) / 1000.0).max(self.elapsed);
        self.prev_ms = self.prev_ms.max(now_ms);
        self.delta
    }
}

/// What the frame monitor suggests doing with the particle budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityHint {
    Reduce,
    Hold,
    Increase,
}

/// Rolling FPS measurement, sampled once per second.
#[derive(Debug, Clone, Default)]
pub struct FrameMonitor {
    frames: u32,
    window_start_ms: Option<f64>,
    fps: u32,
    history: VecDeque<u32>,
}

impl FrameMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns a hint once per completed one-second window.
    pub fn record(&mut self, now_ms: f64) -> Option<QualityHint> {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        let span = now_ms - start;
        if span < 1000.0 {
            return None;
        }

        self.fps = (f64::from(self.frames) * 1000.0 / span).round() as u32;
        self.history.push_back(self.fps);
        if self.history.len() > FPS_HISTORY_LEN {
            self.history.pop_front();
        }
        self.frames = 0;
        self.window_start_ms = Some(now_ms);

        let avg = self.history.iter().map(|&f| f64::from(f)).sum::<f64>() / self.history.len() as f64;
        Some(if avg < FPS_LOW {
            QualityHint::Reduce
        } else if avg > FPS_HIGH {
            QualityHint::Increase
        } else {
            QualityHint::Hold
        })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}
