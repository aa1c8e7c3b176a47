//! Recording sinks shared by the host tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sakura_wasm::audio::{AudioSink, VolumeIcon};
use sakura_wasm::effects::address::{AddressFetcher, AddressProvider};
use sakura_wasm::effects::confetti::{Burst, ConfettiSink};
use sakura_wasm::effects::splash::SplashSink;
use sakura_wasm::effects::TextSink;
use sakura_wasm::events::Event;
use sakura_wasm::particles::{Rgba, Surface};
use sakura_wasm::scroll::{ChromeSink, CounterSink, ScrollStyle};
use sakura_wasm::timer::ManualScheduler;
use sakura_wasm::App;

/// Shared, cloneable call log.
pub struct Log<T>(Rc<RefCell<Vec<T>>>);

impl<T> Clone for Log<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Default for Log<T> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }
}

impl<T: Clone> Log<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: T) {
        self.0.borrow_mut().push(item);
    }

    pub fn calls(&self) -> Vec<T> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.0.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl TextSink for Log<String> {
    fn set_text(&mut self, text: &str) {
        self.push(text.to_owned());
    }
}

impl CounterSink for Log<(usize, String)> {
    fn show(&mut self, index: usize, text: &str) {
        self.push((index, text.to_owned()));
    }
}

impl AddressFetcher for Log<AddressProvider> {
    fn fetch(&mut self, provider: AddressProvider) {
        self.push(provider);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Start,
    Pause,
    Volume(f64),
    Icon(VolumeIcon),
}

impl AudioSink for Log<AudioCall> {
    fn start(&mut self) {
        self.push(AudioCall::Start);
    }
    fn pause(&mut self) {
        self.push(AudioCall::Pause);
    }
    fn set_volume(&mut self, volume: f64) {
        self.push(AudioCall::Volume(volume));
    }
    fn show_icon(&mut self, icon: VolumeIcon) {
        self.push(AudioCall::Icon(icon));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChromeCall {
    Apply(ScrollStyle),
    Reveal(usize),
    KeyboardNav(bool),
}

impl ChromeSink for Log<ChromeCall> {
    fn apply(&mut self, style: &ScrollStyle) {
        self.push(ChromeCall::Apply(*style));
    }
    fn reveal(&mut self, index: usize) {
        self.push(ChromeCall::Reveal(index));
    }
    fn keyboard_nav(&mut self, enabled: bool) {
        self.push(ChromeCall::KeyboardNav(enabled));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    Resize(f64, f64),
    Begin(f64, f64),
    Point { x: f64, y: f64, radius: f64, color: Rgba },
    End,
}

impl Surface for Log<Draw> {
    fn resize(&mut self, width: f64, height: f64) {
        self.push(Draw::Resize(width, height));
    }
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.push(Draw::Begin(width, height));
    }
    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.push(Draw::Point { x, y, radius, color });
    }
    fn end_frame(&mut self) {
        self.push(Draw::End);
    }
}

impl Log<Draw> {
    /// Points drawn in the most recent frame.
    pub fn last_frame(&self) -> Vec<Draw> {
        let calls = self.calls();
        let start = calls.iter().rposition(|d| matches!(d, Draw::Begin(..))).map_or(0, |i| i + 1);
        calls[start..].iter().copied().filter(|d| matches!(d, Draw::Point { .. })).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfettiCall {
    Spawn { id: u64, pieces: usize },
    Remove(u64),
}

impl ConfettiSink for Log<ConfettiCall> {
    fn spawn(&mut self, burst: &Burst) {
        self.push(ConfettiCall::Spawn { id: burst.id, pieces: burst.pieces.len() });
    }
    fn remove(&mut self, id: u64) {
        self.push(ConfettiCall::Remove(id));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplashCall {
    Progress(f64),
    Hide,
}

impl SplashSink for Log<SplashCall> {
    fn progress(&mut self, percent: f64) {
        self.push(SplashCall::Progress(percent));
    }
    fn hide(&mut self) {
        self.push(SplashCall::Hide);
    }
}

/// Run virtual time forward in frame-sized steps, delivering every timer.
pub fn drive(app: &mut App, scheduler: &ManualScheduler, ms: f64) {
    let mut left = ms;
    while left > 0.0 {
        let step = left.min(16.0);
        for event in scheduler.advance(step) {
            app.handle(Event::Timer(event));
        }
        app.pump();
        left -= step;
    }
}
