//! Application context.
//!
//! [`App`] owns every controller and the handles the page lends it. There are
//! no globals: the browser glue builds a [`Capabilities`] from whatever
//! elements exist, hands it over once, and from then on only feeds events.
//! A capability left as `None` switches its effect off.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::anim::{AnimationLoop, Layer};
use crate::audio::{AudioController, AudioSink};
use crate::config::SiteConfig;
use crate::effects::address::{AddressFetcher, AddressLookup, AddressProvider, LookupState};
use crate::effects::confetti::{ConfettiSink, EasterEgg};
use crate::effects::keys::{KeyPress, Shortcut};
use crate::effects::splash::{LoadingSplash, SplashSink};
use crate::effects::TextSink;
use crate::error::EffectError;
use crate::events::{ClickTarget, Event, EventBus, Region, TimerEvent};
use crate::particles::{FieldMode, ParticleField, Surface};
use crate::scroll::{scroll_style, ChromeSink, CounterSink, StatBoard, StatCounter, VisibilityTracker};
use crate::theme::{KeyValueStore, PreferenceStore, ThemeController, ThemeListener, ThemeMode};
use crate::timer::Scheduler;

/// Page handles lent to the app at construction.
pub struct Capabilities {
    /// Queue the page callbacks post into.
    pub bus: EventBus,
    pub scheduler: Box<dyn Scheduler>,
    pub store: Option<Box<dyn KeyValueStore>>,
    /// Extra theme listeners (icon, document attribute, WebGL clear colour).
    pub theme_listeners: Vec<Box<dyn ThemeListener>>,
    pub chrome: Option<Box<dyn ChromeSink>>,
    /// Number of section titles that fade in.
    pub reveals: usize,
    pub audio: Option<Box<dyn AudioSink>>,
    pub flat_surface: Option<Box<dyn Surface>>,
    pub volume_surface: Option<Box<dyn Surface>>,
    pub counters: Option<(Vec<StatCounter>, Box<dyn CounterSink>)>,
    pub address: Option<(Box<dyn AddressFetcher>, Box<dyn TextSink>)>,
    pub confetti: Option<Box<dyn ConfettiSink>>,
    pub splash: Option<Box<dyn SplashSink>>,
}

impl Capabilities {
    /// Nothing but a scheduler; every effect that needs a page handle is off.
    pub fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            bus: EventBus::new(),
            scheduler,
            store: None,
            theme_listeners: Vec::new(),
            chrome: None,
            reveals: 0,
            audio: None,
            flat_surface: None,
            volume_surface: None,
            counters: None,
            address: None,
            confetti: None,
            splash: None,
        }
    }
}

struct Stats {
    board: StatBoard,
    sink: Box<dyn CounterSink>,
}

struct Address {
    lookup: AddressLookup,
    fetcher: Box<dyn AddressFetcher>,
    sink: Box<dyn TextSink>,
}

struct Splash {
    splash: Option<LoadingSplash>,
    sink: Box<dyn SplashSink>,
}

pub struct App {
    bus: EventBus,
    scheduler: Box<dyn Scheduler>,
    seed: u64,
    theme: ThemeController,
    chrome: Option<Rc<RefCell<Box<dyn ChromeSink>>>>,
    scroll_offset: Rc<Cell<f64>>,
    visibility: VisibilityTracker,
    audio: Option<AudioController>,
    stats: Option<Stats>,
    layers: Vec<Layer>,
    animation: AnimationLoop,
    address: Option<Address>,
    egg: EasterEgg,
    confetti: Option<Box<dyn ConfettiSink>>,
    splash: Option<Splash>,
}

impl App {
    pub fn new(config: &SiteConfig, caps: Capabilities, seed: u64) -> Self {
        let seed = config.seed.unwrap_or(seed);
        let mut theme = ThemeController::new(PreferenceStore::new(caps.store), config.default_theme);

        let scroll_offset = Rc::new(Cell::new(0.0));
        let chrome = caps.chrome.map(|c| Rc::new(RefCell::new(c)));
        if let Some(chrome) = &chrome {
            let (chrome, offset) = (Rc::clone(chrome), Rc::clone(&scroll_offset));
            theme.subscribe(Box::new(move |mode: ThemeMode| {
                chrome.borrow_mut().apply(&scroll_style(offset.get(), mode));
            }));
        }
        for listener in caps.theme_listeners {
            theme.subscribe(listener);
        }

        let mut visibility = VisibilityTracker::new();
        for index in 0..caps.reveals {
            let region = Region::Reveal(index);
            visibility.watch(region, VisibilityTracker::threshold(region));
        }
        let stats = caps.counters.map(|(counters, sink)| {
            visibility.watch(Region::Stats, VisibilityTracker::threshold(Region::Stats));
            Stats { board: StatBoard::new(counters), sink }
        });

        let mut layers = Vec::new();
        if let Some(surface) = caps.flat_surface.filter(|_| config.flat_particles) {
            layers.push(Layer::new(ParticleField::new(FieldMode::Flat, seed), surface));
        }
        if let Some(surface) = caps.volume_surface.filter(|_| config.volume_particles) {
            layers.push(Layer::new(ParticleField::new(FieldMode::Volume, seed.wrapping_add(1)), surface));
        }

        Self {
            bus: caps.bus,
            scheduler: caps.scheduler,
            seed,
            theme,
            chrome,
            scroll_offset,
            visibility,
            audio: caps.audio.map(|sink| AudioController::new(sink, config.default_volume)),
            stats,
            layers,
            animation: AnimationLoop::new(),
            address: caps.address.map(|(fetcher, sink)| Address { lookup: AddressLookup::new(), fetcher, sink }),
            egg: EasterEgg::new(seed.wrapping_add(2)),
            confetti: caps.confetti,
            splash: caps.splash.map(|sink| Splash { splash: None, sink }),
        }
    }

    /// Kick off the one-time effects and the animation loop.
    pub fn start(&mut self, now_ms: f64) -> Result<(), EffectError> {
        if let Some(splash) = self.splash.as_mut() {
            if splash.splash.is_none() {
                splash.splash = Some(LoadingSplash::start(self.seed.wrapping_add(3), self.scheduler.as_ref()));
            }
        }
        if let Some(address) = self.address.as_mut() {
            address.lookup.begin(address.fetcher.as_mut());
        }
        self.animation.start(now_ms, &self.layers).inspect_err(|err| log::warn!("{err}; particles disabled"))
    }

    /// Stop the loop and cancel every pending timer.
    pub fn shutdown(&mut self) {
        self.animation.stop();
        if let Some(stats) = self.stats.as_mut() {
            stats.board.halt();
        }
        if let Some(address) = self.address.as_mut() {
            address.lookup.halt();
        }
        if let Some(splash) = self.splash.as_mut().and_then(|s| s.splash.as_mut()) {
            splash.halt();
        }
        let leftover = self.egg.clear();
        if let Some(sink) = self.confetti.as_mut() {
            for id in leftover {
                sink.remove(id);
            }
        }
    }

    /// Handle for queueing events from callbacks.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Handle queued events until the queue is empty.
    pub fn pump(&mut self) {
        while let Some(event) = self.bus.pop() {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Resize { width, height } => {
                for layer in &mut self.layers {
                    layer.resize(width, height);
                }
            }
            Event::Scroll { offset } => {
                self.scroll_offset.set(offset);
                if let Some(chrome) = &self.chrome {
                    chrome.borrow_mut().apply(&scroll_style(offset, self.theme.current_mode()));
                }
            }
            Event::Visibility { region, ratio } => self.on_visibility(region, ratio),
            Event::Frame { now_ms } => {
                self.animation.frame(now_ms, &mut self.layers);
            }
            Event::Click { target, x, y } => self.on_click(target, (x, y)),
            Event::PointerDown => self.keyboard_nav(false),
            Event::Volume(volume) => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.set_volume(volume);
                }
            }
            Event::Key(press) => self.on_key(&press),
            Event::PlaybackSettled(result) => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.playback_settled(result);
                }
            }
            Event::AddressFetched { provider, body } => self.on_address(provider, body),
            Event::Timer(timer) => self.on_timer(timer),
        }
    }

    fn on_visibility(&mut self, region: Region, ratio: f64) {
        if !self.visibility.observe(region, ratio) {
            return;
        }
        match region {
            Region::Reveal(index) => {
                if let Some(chrome) = &self.chrome {
                    chrome.borrow_mut().reveal(index);
                }
            }
            Region::Stats => {
                if let Some(stats) = self.stats.as_mut() {
                    if stats.board.trigger(self.scheduler.as_ref()) {
                        log::debug!("stat counters started");
                    }
                }
            }
        }
    }

    fn on_click(&mut self, target: ClickTarget, origin: (f64, f64)) {
        if let Some(audio) = self.audio.as_mut() {
            if target == ClickTarget::AudioToggle {
                audio.toggle();
            } else {
                audio.first_interaction();
            }
        }
        match target {
            ClickTarget::ThemeToggle => {
                self.theme.toggle();
            }
            ClickTarget::Logo => {
                if let Some(burst) = self.egg.click(origin, self.scheduler.as_ref()) {
                    match self.confetti.as_mut() {
                        Some(sink) => sink.spawn(&burst),
                        None => {
                            self.egg.expire(burst.id);
                        }
                    }
                }
            }
            ClickTarget::AudioToggle | ClickTarget::Page => {}
        }
    }

    fn on_key(&mut self, press: &KeyPress) {
        match Shortcut::from_key(press) {
            Some(Shortcut::ToggleTheme) => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.first_interaction();
                }
                self.theme.toggle();
            }
            Some(Shortcut::ToggleAudio) => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.toggle();
                }
            }
            Some(Shortcut::KeyboardNav) => self.keyboard_nav(true),
            None => {}
        }
    }

    fn keyboard_nav(&mut self, enabled: bool) {
        if let Some(chrome) = &self.chrome {
            chrome.borrow_mut().keyboard_nav(enabled);
        }
    }

    fn on_address(&mut self, provider: AddressProvider, body: Result<String, EffectError>) {
        if let Some(address) = self.address.as_mut() {
            address.lookup.on_fetched(
                provider,
                body,
                address.fetcher.as_mut(),
                address.sink.as_mut(),
                self.scheduler.as_ref(),
            );
        }
    }

    fn on_timer(&mut self, timer: TimerEvent) {
        match timer {
            TimerEvent::SplashTick => {
                if let Some(Splash { splash: Some(splash), sink }) = self.splash.as_mut() {
                    splash.tick(sink.as_mut(), self.scheduler.as_ref());
                }
            }
            TimerEvent::SplashHide => {
                if let Some(Splash { splash: Some(splash), sink }) = self.splash.as_mut() {
                    splash.hide(sink.as_mut());
                }
            }
            TimerEvent::TypewriterTick => {
                if let Some(address) = self.address.as_mut() {
                    address.lookup.on_tick(address.sink.as_mut());
                }
            }
            TimerEvent::CounterTick => {
                if let Some(stats) = self.stats.as_mut() {
                    stats.board.tick(stats.sink.as_mut());
                }
            }
            TimerEvent::ConfettiExpired(id) => {
                if self.egg.expire(id) {
                    if let Some(sink) = self.confetti.as_mut() {
                        sink.remove(id);
                    }
                }
            }
        }
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.current_mode()
    }

    pub fn audio(&self) -> Option<&AudioController> {
        self.audio.as_ref()
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn stats(&self) -> Option<&StatBoard> {
        self.stats.as_ref().map(|s| &s.board)
    }

    pub fn address_state(&self) -> Option<&LookupState> {
        self.address.as_ref().map(|a| a.lookup.state())
    }

    pub fn easter_egg(&self) -> &EasterEgg {
        &self.egg
    }

    pub fn splash(&self) -> Option<&LoadingSplash> {
        self.splash.as_ref().and_then(|s| s.splash.as_ref())
    }
}
