//! Scroll- and visibility-driven styling.
//!
//! [`scroll_style`] is a pure function of the scroll offset and theme, so it
//! can be recomputed on every scroll event. Visibility reveals and the stat
//! counters are fed from a [`VisibilityTracker`] that reports upward crossings.

use std::collections::HashMap;

use crate::constants::{
    COUNTER_DURATION_MS, COUNTER_TICK_MS, HINT_FADE_THRESHOLD, NAV_SCROLL_THRESHOLD,
    REVEAL_THRESHOLD, STATS_THRESHOLD, VISIBILITY_TOLERANCE,
};
use crate::events::{Region, TimerEvent};
use crate::theme::ThemeMode;
use crate::timer::{Scheduler, TimerHandle};

/// Inline styles for the fixed navigation bar and the floating controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeStyle {
    pub nav_background: &'static str,
    pub nav_border: &'static str,
    pub blur_px: u32,
    pub control_background: &'static str,
    pub control_border: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStyle {
    pub scrolled: bool,
    pub chrome: ChromeStyle,
    pub hint_opacity: f64,
}

const DARK_BORDER: &str = "1px solid rgba(255, 255, 255, 0.2)";
const LIGHT_BORDER: &str = "1px solid rgba(0, 0, 0, 0.1)";

#[must_use]
pub fn chrome_style(scrolled: bool, mode: ThemeMode) -> ChromeStyle {
    match (mode, scrolled) {
        (ThemeMode::Dark, false) => ChromeStyle {
            nav_background: "rgba(255, 255, 255, 0.25)",
            nav_border: DARK_BORDER,
            blur_px: 20,
            control_background: "rgba(255, 255, 255, 0.15)",
            control_border: "1px solid rgba(255, 255, 255, 0.25)",
        },
        (ThemeMode::Dark, true) => ChromeStyle {
            nav_background: "rgba(26, 26, 46, 0.95)",
            nav_border: DARK_BORDER,
            blur_px: 20,
            control_background: "rgba(26, 26, 46, 0.9)",
            control_border: "1px solid rgba(255, 255, 255, 0.25)",
        },
        (ThemeMode::Light, false) => ChromeStyle {
            nav_background: "rgba(255, 255, 255, 0.9)",
            nav_border: LIGHT_BORDER,
            blur_px: 20,
            control_background: "rgba(255, 255, 255, 0.9)",
            control_border: LIGHT_BORDER,
        },
        (ThemeMode::Light, true) => ChromeStyle {
            nav_background: "rgba(255, 255, 255, 0.95)",
            nav_border: LIGHT_BORDER,
            blur_px: 20,
            control_background: "rgba(255, 255, 255, 0.95)",
            control_border: LIGHT_BORDER,
        },
    }
}

#[must_use]
pub fn scroll_style(offset: f64, mode: ThemeMode) -> ScrollStyle {
    let scrolled = offset > NAV_SCROLL_THRESHOLD;
    ScrollStyle {
        scrolled,
        chrome: chrome_style(scrolled, mode),
        hint_opacity: if offset > HINT_FADE_THRESHOLD { 0.0 } else { 1.0 },
    }
}

/// Where scroll styling lands in the page.
pub trait ChromeSink {
    fn apply(&mut self, style: &ScrollStyle);
    /// Fade/slide a watched section title into place.
    fn reveal(&mut self, index: usize);
    /// Show focus outlines while navigating by keyboard.
    fn keyboard_nav(&mut self, enabled: bool);
}

/// Remembers which watched regions are currently past their threshold.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    thresholds: HashMap<Region, f64>,
    visible: HashMap<Region, bool>,
}

impl VisibilityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, region: Region, threshold: f64) {
        self.thresholds.insert(region, threshold);
        self.visible.insert(region, false);
    }

    /// Threshold the platform observer should be configured with.
    pub fn threshold(region: Region) -> f64 {
        match region {
            Region::Reveal(_) => REVEAL_THRESHOLD,
            Region::Stats => STATS_THRESHOLD,
        }
    }

    /// Feed an observed visible fraction. True when the region just crossed
    /// its threshold going up; unwatched regions never fire.
    pub fn observe(&mut self, region: Region, ratio: f64) -> bool {
        let Some(&threshold) = self.thresholds.get(&region) else {
            return false;
        };
        let now = ratio > 0.0 && ratio + VISIBILITY_TOLERANCE >= threshold;
        let was = self.visible.insert(region, now).unwrap_or(false);
        now && !was
    }
}

/// One animated figure, shown as `value` followed by its suffix (`+`, `%`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCounter {
    target: u64,
    suffix: String,
    value: u64,
}

impl StatCounter {
    pub fn new(target: u64, suffix: impl Into<String>) -> Self {
        Self { target, suffix: suffix.into(), value: 0 }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn text(&self) -> String {
        format!("{}{}", self.value, self.suffix)
    }

    /// Linear count-up; exact target once `elapsed_ms` reaches `duration_ms`.
    fn seek(&mut self, elapsed_ms: f64, duration_ms: f64) {
        self.value = if elapsed_ms >= duration_ms || duration_ms <= 0.0 {
            self.target
        } else {
            (self.target as f64 * elapsed_ms / duration_ms).floor() as u64
        };
    }
}

/// Displays counter text.
pub trait CounterSink {
    fn show(&mut self, index: usize, text: &str);
}

/// The statistics section: counts every counter up once, the first time the
/// section becomes visible.
#[derive(Debug)]
pub struct StatBoard {
    counters: Vec<StatCounter>,
    started: bool,
    elapsed_ms: f64,
    duration_ms: f64,
    timer: Option<TimerHandle>,
}

impl StatBoard {
    pub fn new(counters: Vec<StatCounter>) -> Self {
        Self {
            counters,
            started: false,
            elapsed_ms: 0.0,
            duration_ms: COUNTER_DURATION_MS,
            timer: None,
        }
    }

    pub fn counters(&self) -> &[StatCounter] {
        &self.counters
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start counting. Later calls are ignored for the rest of the session.
    pub fn trigger(&mut self, scheduler: &dyn Scheduler) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        if !self.counters.is_empty() {
            self.timer = Some(scheduler.every(COUNTER_TICK_MS, TimerEvent::CounterTick));
        }
        true
    }

    /// Drop the tick timer without finishing the count.
    pub fn halt(&mut self) {
        self.timer = None;
    }

    /// Advance one tick, pushing new text to `sink`. Stops the timer once
    /// every counter shows its target.
    pub fn tick(&mut self, sink: &mut dyn CounterSink) {
        if self.timer.is_none() {
            return;
        }
        self.elapsed_ms += f64::from(COUNTER_TICK_MS);
        for (index, counter) in self.counters.iter_mut().enumerate() {
            counter.seek(self.elapsed_ms, self.duration_ms);
            sink.show(index, &counter.text());
        }
        if self.elapsed_ms >= self.duration_ms {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
        }
    }
}
