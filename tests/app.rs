mod common;

use common::{drive, AudioCall, ChromeCall, ConfettiCall, Draw, Log, SplashCall};
use sakura_wasm::effects::address::{AddressProvider, LookupState};
use sakura_wasm::effects::keys::KeyPress;
use sakura_wasm::error::EffectError;
use sakura_wasm::events::{ClickTarget, Event, Region};
use sakura_wasm::scroll::{scroll_style, StatCounter};
use sakura_wasm::theme::{KeyValueStore, MemoryStore, ThemeMode};
use sakura_wasm::timer::ManualScheduler;
use sakura_wasm::{App, Capabilities, SiteConfig};

#[derive(Default)]
struct Page {
    sched: ManualScheduler,
    store: MemoryStore,
    chrome: Log<ChromeCall>,
    audio: Log<AudioCall>,
    flat: Log<Draw>,
    counters: Log<(usize, String)>,
    fetcher: Log<AddressProvider>,
    text: Log<String>,
    confetti: Log<ConfettiCall>,
    splash: Log<SplashCall>,
}

impl Page {
    fn app(&self, config: &SiteConfig) -> App {
        let mut caps = Capabilities::new(Box::new(self.sched.clone()));
        caps.store = Some(Box::new(self.store.clone()));
        caps.chrome = Some(Box::new(self.chrome.clone()));
        caps.reveals = 2;
        caps.audio = Some(Box::new(self.audio.clone()));
        caps.flat_surface = Some(Box::new(self.flat.clone()));
        caps.counters = Some((
            vec![StatCounter::new(120, "+"), StatCounter::new(99, "%")],
            Box::new(self.counters.clone()),
        ));
        caps.address = Some((Box::new(self.fetcher.clone()), Box::new(self.text.clone())));
        caps.confetti = Some(Box::new(self.confetti.clone()));
        caps.splash = Some(Box::new(self.splash.clone()));
        App::new(config, caps, 42)
    }
}

fn click(target: ClickTarget) -> Event {
    Event::Click { target, x: 100.0, y: 50.0 }
}

fn starts(log: &Log<AudioCall>) -> usize {
    log.calls().iter().filter(|c| **c == AudioCall::Start).count()
}

#[test]
fn loop_stays_stopped_without_a_surface() {
    let sched = ManualScheduler::new();
    let mut app = App::new(&SiteConfig::default(), Capabilities::new(Box::new(sched)), 1);
    assert!(matches!(app.start(0.0), Err(EffectError::GraphicsUnavailable(_))));
    assert!(!app.animation().is_running());
    app.handle(Event::Frame { now_ms: 16.0 });
    assert_eq!(app.animation().frames(), 0);
}

#[test]
fn frames_step_and_draw_until_shutdown() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Resize { width: 1200.0, height: 800.0 });
    assert_eq!(app.layers().len(), 1);
    assert_eq!(app.layers()[0].field.len(), 64);
    assert_eq!(page.flat.calls().first(), Some(&Draw::Resize(1200.0, 800.0)));

    app.start(0.0).expect("flat surface present");
    app.handle(Event::Frame { now_ms: 16.0 });
    app.handle(Event::Frame { now_ms: 32.0 });
    assert_eq!(app.animation().frames(), 2);
    let time = app.animation().time().expect("clock started");
    assert_eq!((time.start_ms, time.prev_ms), (0.0, 32.0));
    assert_eq!((time.delta, time.elapsed), (0.016, 0.032));
    assert_eq!(page.flat.last_frame().len(), 64);

    app.shutdown();
    assert!(!app.animation().is_running());
    app.handle(Event::Frame { now_ms: 48.0 });
    assert_eq!(app.animation().frames(), 2);
}

#[test]
fn every_resize_rebuilds_the_field() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Resize { width: 1200.0, height: 800.0 });
    assert_eq!(app.layers()[0].field.len(), 64);

    app.start(0.0).expect("flat surface present");
    app.handle(Event::Frame { now_ms: 16.0 });
    app.handle(Event::Resize { width: 600.0, height: 400.0 });
    assert_eq!(app.layers()[0].field.len(), 16);
    app.handle(Event::Frame { now_ms: 32.0 });
    assert_eq!(page.flat.last_frame().len(), 16);

    let resizes: Vec<Draw> = page.flat.calls().into_iter().filter(|d| matches!(d, Draw::Resize(..))).collect();
    assert_eq!(resizes, vec![Draw::Resize(1200.0, 800.0), Draw::Resize(600.0, 400.0)]);
}

#[test]
fn config_switches_layers_off() {
    let page = Page::default();
    let config = SiteConfig { flat_particles: false, ..SiteConfig::default() };
    let mut app = page.app(&config);
    assert!(app.layers().is_empty());
    assert!(app.start(0.0).is_err());
}

#[test]
fn config_seed_fixes_the_field() {
    let config = SiteConfig { seed: Some(5), ..SiteConfig::default() };
    let (a, b) = (Page::default(), Page::default());
    let mut first = a.app(&config);
    let mut second = App::new(&config, {
        let mut caps = Capabilities::new(Box::new(b.sched.clone()));
        caps.flat_surface = Some(Box::new(b.flat.clone()));
        caps
    }, 999);
    let resize = Event::Resize { width: 800.0, height: 600.0 };
    first.handle(resize.clone());
    second.handle(resize);
    assert_eq!(first.layers()[0].field.particles(), second.layers()[0].field.particles());
}

#[test]
fn theme_follows_click_and_shortcut() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    assert_eq!(app.theme_mode(), ThemeMode::Dark);
    assert_eq!(page.chrome.last(), Some(ChromeCall::Apply(scroll_style(0.0, ThemeMode::Dark))));

    app.handle(click(ClickTarget::ThemeToggle));
    assert_eq!(app.theme_mode(), ThemeMode::Light);
    assert_eq!(page.store.get("theme").as_deref(), Some("light"));
    assert_eq!(page.chrome.last(), Some(ChromeCall::Apply(scroll_style(0.0, ThemeMode::Light))));

    app.handle(Event::Scroll { offset: 150.0 });
    app.handle(Event::Key(KeyPress::new("k").with_ctrl()));
    assert_eq!(app.theme_mode(), ThemeMode::Dark);
    assert_eq!(page.chrome.last(), Some(ChromeCall::Apply(scroll_style(150.0, ThemeMode::Dark))));

    // A reload restores the stored choice.
    app.handle(click(ClickTarget::ThemeToggle));
    assert_eq!(page.app(&SiteConfig::default()).theme_mode(), ThemeMode::Light);
}

#[test]
fn first_click_anywhere_unlocks_audio_once() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(click(ClickTarget::Page));
    app.handle(click(ClickTarget::Page));
    assert_eq!(starts(&page.audio), 1);

    app.handle(Event::PlaybackSettled(Ok(())));
    assert!(app.audio().is_some_and(|a| a.state().playing));

    app.handle(click(ClickTarget::AudioToggle));
    assert!(!app.audio().is_some_and(|a| a.state().playing));
    assert_eq!(page.audio.calls().iter().filter(|c| **c == AudioCall::Pause).count(), 1);

    app.handle(Event::Key(KeyPress::new("m").with_meta()));
    assert_eq!(starts(&page.audio), 2);
    app.handle(Event::PlaybackSettled(Err(EffectError::PlaybackRejected("NotAllowedError".into()))));
    assert!(!app.audio().is_some_and(|a| a.state().playing));
}

#[test]
fn theme_shortcut_counts_as_first_interaction() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Key(KeyPress::new("k").with_ctrl()));
    assert_eq!(app.theme_mode(), ThemeMode::Light);
    assert_eq!(starts(&page.audio), 1);

    app.handle(Event::PlaybackSettled(Err(EffectError::PlaybackRejected("blocked".into()))));
    app.handle(Event::Key(KeyPress::new("k").with_ctrl()));
    app.handle(click(ClickTarget::Page));
    assert_eq!(starts(&page.audio), 1, "unlock is attempted once");
}

#[test]
fn volume_slider_reaches_the_sink() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Volume(0.2));
    assert!(page.audio.calls().contains(&AudioCall::Volume(0.2)));
    assert_eq!(app.audio().map(|a| a.state().volume), Some(0.2));
}

#[test]
fn keyboard_navigation_styling() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Key(KeyPress::new("Tab")));
    assert_eq!(page.chrome.last(), Some(ChromeCall::KeyboardNav(true)));
    app.handle(Event::PointerDown);
    assert_eq!(page.chrome.last(), Some(ChromeCall::KeyboardNav(false)));
}

#[test]
fn reveals_fire_once_per_crossing() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    page.chrome.clear();
    app.handle(Event::Visibility { region: Region::Reveal(1), ratio: 0.05 });
    app.handle(Event::Visibility { region: Region::Reveal(1), ratio: 0.2 });
    app.handle(Event::Visibility { region: Region::Reveal(1), ratio: 0.6 });
    app.handle(Event::Visibility { region: Region::Reveal(7), ratio: 1.0 });
    assert_eq!(page.chrome.calls(), vec![ChromeCall::Reveal(1)]);
}

#[test]
fn counters_run_when_stats_scroll_into_view() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.handle(Event::Visibility { region: Region::Stats, ratio: 0.4 });
    assert!(!app.stats().is_some_and(|s| s.is_started()));
    app.handle(Event::Visibility { region: Region::Stats, ratio: 0.6 });
    assert!(app.stats().is_some_and(|s| s.is_running()));

    drive(&mut app, &page.sched, 2_100.0);
    assert_eq!(page.counters.last(), Some((1, "99%".to_owned())));
    let shown = page.counters.len();

    // Scrolling away and back does not restart the count.
    app.handle(Event::Visibility { region: Region::Stats, ratio: 0.0 });
    app.handle(Event::Visibility { region: Region::Stats, ratio: 0.9 });
    drive(&mut app, &page.sched, 2_100.0);
    assert_eq!(page.counters.len(), shown);
}

#[test]
fn address_lookup_falls_back_and_types_out() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.start(0.0).expect("flat surface present");
    assert_eq!(page.fetcher.calls(), [AddressProvider::Ipify]);

    app.handle(Event::AddressFetched {
        provider: AddressProvider::Ipify,
        body: Err(EffectError::LookupFailed("timeout".into())),
    });
    assert_eq!(page.fetcher.calls(), [AddressProvider::Ipify, AddressProvider::SohuCityJson]);

    app.handle(Event::AddressFetched {
        provider: AddressProvider::SohuCityJson,
        body: Ok(r#"var returnCitySN = {"cip": "198.51.100.7"};"#.into()),
    });
    assert_eq!(app.address_state(), Some(&LookupState::Revealing("198.51.100.7".into())));
    drive(&mut app, &page.sched, 2_000.0);
    assert_eq!(page.text.last().as_deref(), Some("198.51.100.7"));
}

#[test]
fn fifth_logo_click_throws_and_clears_confetti() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    for _ in 0..4 {
        app.handle(click(ClickTarget::Logo));
    }
    assert!(page.confetti.calls().is_empty());
    app.handle(click(ClickTarget::Logo));
    assert_eq!(page.confetti.calls(), vec![ConfettiCall::Spawn { id: 0, pieces: 50 }]);
    assert_eq!(app.easter_egg().clicks(), 0);

    drive(&mut app, &page.sched, 1_000.0);
    assert_eq!(page.confetti.last(), Some(ConfettiCall::Remove(0)));
    assert_eq!(app.easter_egg().live(), 0);
}

#[test]
fn splash_hides_after_loading() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.start(0.0).expect("flat surface present");
    for _ in 0..100 {
        drive(&mut app, &page.sched, 1_000.0);
        if app.splash().is_some_and(|s| s.is_hidden()) {
            break;
        }
    }
    assert_eq!(page.splash.last(), Some(SplashCall::Hide));
    assert_eq!(page.splash.calls().iter().filter(|c| **c == SplashCall::Hide).count(), 1);
}

#[test]
fn shutdown_cancels_every_timer() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    app.start(0.0).expect("flat surface present");
    app.handle(Event::Visibility { region: Region::Stats, ratio: 1.0 });
    for _ in 0..5 {
        app.handle(click(ClickTarget::Logo));
    }
    app.handle(Event::AddressFetched {
        provider: AddressProvider::Ipify,
        body: Ok(r#"{"ip":"203.0.113.5"}"#.into()),
    });
    assert!(page.sched.pending() >= 4);

    app.shutdown();
    assert_eq!(page.sched.pending(), 0);
    assert_eq!(page.confetti.last(), Some(ConfettiCall::Remove(0)));
    assert!(page.sched.advance(10_000.0).is_empty());
}

#[test]
fn events_queue_through_the_bus() {
    let page = Page::default();
    let mut app = page.app(&SiteConfig::default());
    let bus = app.bus();
    bus.emit(Event::Scroll { offset: 300.0 });
    bus.emit(click(ClickTarget::ThemeToggle));
    assert_eq!(bus.len(), 2);
    app.pump();
    assert!(bus.is_empty());
    assert_eq!(app.theme_mode(), ThemeMode::Light);
    assert_eq!(page.chrome.last(), Some(ChromeCall::Apply(scroll_style(300.0, ThemeMode::Light))));
}
