//! Loading splash with simulated progress.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::{SPLASH_HIDE_DELAY_MS, SPLASH_MAX_STEP, SPLASH_TICK_MS};
use crate::events::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};

pub trait SplashSink {
    /// Progress bar width, 0 to 100.
    fn progress(&mut self, percent: f64);
    /// Remove the splash and unlock page scrolling.
    fn hide(&mut self);
}

pub struct LoadingSplash {
    progress: f64,
    rng: SmallRng,
    ticker: Option<TimerHandle>,
    hider: Option<TimerHandle>,
    hidden: bool,
}

impl LoadingSplash {
    pub fn start(seed: u64, scheduler: &dyn Scheduler) -> Self {
        Self {
            progress: 0.0,
            rng: SmallRng::seed_from_u64(seed),
            ticker: Some(scheduler.every(SPLASH_TICK_MS, TimerEvent::SplashTick)),
            hider: None,
            hidden: false,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn halt(&mut self) {
        self.ticker = None;
        self.hider = None;
    }

    pub fn tick(&mut self, sink: &mut dyn SplashSink, scheduler: &dyn Scheduler) {
        if self.ticker.is_none() {
            return;
        }
        self.progress = (self.progress + self.rng.random::<f64>() * SPLASH_MAX_STEP).min(100.0);
        sink.progress(self.progress);
        if self.progress >= 100.0 {
            if let Some(ticker) = self.ticker.take() {
                ticker.cancel();
            }
            self.hider = Some(scheduler.after(SPLASH_HIDE_DELAY_MS, TimerEvent::SplashHide));
        }
    }

    pub fn hide(&mut self, sink: &mut dyn SplashSink) {
        if self.hidden {
            return;
        }
        self.hider = None;
        self.hidden = true;
        sink.hide();
    }
}
