//! Per-frame driver for the particle layers.
//!
//! The loop itself never schedules anything: the platform calls
//! [`AnimationLoop::frame`] once per display refresh and re-arms only while
//! the loop reports it is still running. Stopping is therefore immediate and
//! leaves no pending callback behind.

use crate::error::EffectError;
use crate::particles::{ParticleField, Surface};
use crate::timing::{FrameMonitor, TimeInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// A particle field bound to the surface it draws on.
pub struct Layer {
    pub field: ParticleField,
    pub surface: Box<dyn Surface>,
}

impl Layer {
    pub fn new(field: ParticleField, surface: Box<dyn Surface>) -> Self {
        Self { field, surface }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface.resize(width, height);
        self.field.configure(width, height);
    }
}

pub struct AnimationLoop {
    state: LoopState,
    time: Option<TimeInfo>,
    frames: u64,
    monitor: FrameMonitor,
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLoop {
    #[must_use]
    pub fn new() -> Self {
        Self { state: LoopState::Stopped, time: None, frames: 0, monitor: FrameMonitor::new() }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn time(&self) -> Option<TimeInfo> {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.monitor.fps()
    }

    /// Enter `Running`. With no drawable layer the loop stays stopped.
    pub fn start(&mut self, now_ms: f64, layers: &[Layer]) -> Result<(), EffectError> {
        if layers.is_empty() {
            self.state = LoopState::Stopped;
            return Err(EffectError::GraphicsUnavailable("no drawing surface".into()));
        }
        if self.state == LoopState::Stopped {
            self.time = Some(TimeInfo::start(now_ms));
            self.state = LoopState::Running;
            log::info!("animation loop started with {} layer(s)", layers.len());
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::info!("animation loop stopped after {} frames", self.frames);
        }
        self.state = LoopState::Stopped;
    }

    /// Run one iteration. Returns whether another frame should be requested.
    pub fn frame(&mut self, now_ms: f64, layers: &mut [Layer]) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        let time = self.time.get_or_insert_with(|| TimeInfo::start(now_ms));
        let delta = time.advance(now_ms);
        self.frames += 1;

        if let Some(hint) = self.monitor.record(now_ms) {
            for layer in layers.iter_mut() {
                if layer.field.apply_quality(hint) {
                    log::debug!("particle budget now {} at {} fps", layer.field.budget(), self.monitor.fps());
                }
            }
        }

        for layer in layers.iter_mut() {
            layer.field.step(delta);
            layer.field.render(layer.surface.as_mut());
        }
        true
    }
}
