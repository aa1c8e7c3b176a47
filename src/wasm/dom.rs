//! Page wiring.
//!
//! Looks up the elements each effect needs, wraps whatever exists as a
//! capability, and turns DOM callbacks into [`Event`]s. A missing element
//! simply leaves its effect switched off.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, EventTarget, HtmlAudioElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent,
    ScrollBehavior, ScrollToOptions, Window,
};

use super::net::HttpFetcher;
use super::platform::{describe, BrowserScheduler, LocalStore, Poster};
use super::render::{self, CanvasSurface, GlSurface};
use crate::audio::{AudioSink, VolumeIcon};
use crate::config::SiteConfig;
use crate::constants::{REVEAL_THRESHOLD, STATS_THRESHOLD};
use crate::effects::confetti::{Burst, ConfettiSink};
use crate::effects::keys::{KeyPress, Shortcut};
use crate::effects::splash::SplashSink;
use crate::effects::TextSink;
use crate::error::EffectError;
use crate::events::{ClickTarget, Event, EventBus, Region};
use crate::particles::{Rgba, Surface};
use crate::scroll::{ChromeSink, CounterSink, ScrollStyle, StatCounter};
use crate::theme::{ThemeListener, ThemeMode};
use crate::{App, Capabilities};

const REVEAL_SELECTOR: &str = ".section-title, .stat-card";
const REVEAL_INDEX_ATTR: &str = "data-reveal-index";

/// Build the app from the page and start it.
pub fn mount(window: &Window, document: &Document) -> Result<(), JsValue> {
    let config = read_config(document);
    let seed = config.seed.unwrap_or_else(|| (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64);

    let bus = EventBus::new();
    let backdrop = Rc::new(Cell::new(config.default_theme.clear_color()));
    let reveals = query_all(document, REVEAL_SELECTOR);

    let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
        let poster = Poster::new(bus.clone(), weak.clone());
        let caps = capabilities(window, document, &bus, &poster, &backdrop, &reveals);
        RefCell::new(App::new(&config, caps, seed))
    });
    let poster = Poster::new(bus, Rc::downgrade(&app));

    listen_page(window, document, &poster)?;
    observe_reveals(&reveals, &poster)?;
    observe_stats(document, &poster)?;
    wire_mobile_menu(document)?;
    fill_year(document);

    poster.post(viewport(window));
    poster.post(Event::Scroll { offset: window.scroll_y().unwrap_or(0.0) });
    let now = now_ms(window);
    {
        let mut app = app.borrow_mut();
        if let Err(err) = app.start(now) {
            log::info!("running without particles: {err}");
        }
        app.pump();
    }
    log::info!("page effects mounted (seed {seed})");
    render::run(window.clone(), app)
}

fn read_config(document: &Document) -> SiteConfig {
    match document.get_element_by_id("site-config").and_then(|el| el.text_content()) {
        Some(raw) if !raw.trim().is_empty() => SiteConfig::from_json(&raw),
        _ => SiteConfig::default(),
    }
}

fn capabilities(
    window: &Window,
    document: &Document,
    bus: &EventBus,
    poster: &Poster,
    backdrop: &Rc<Cell<Rgba>>,
    reveals: &[HtmlElement],
) -> Capabilities {
    let mut caps = Capabilities::new(Box::new(BrowserScheduler::new(poster.clone())));
    caps.bus = bus.clone();
    caps.store = LocalStore::open(window).map(|s| Box::new(s) as _);
    caps.theme_listeners = theme_listeners(document, backdrop);

    caps.chrome = Some(Box::new(PageChrome {
        nav: query(document, "nav"),
        controls: [".audio-controls", ".theme-toggle"].into_iter().filter_map(|s| query(document, s)).collect(),
        hint: query(document, ".scroll-indicator"),
        reveals: reveals.to_vec(),
        body: document.body(),
    }));
    for (index, el) in reveals.iter().enumerate() {
        if let Err(err) = el.set_attribute(REVEAL_INDEX_ATTR, &index.to_string()) {
            log::debug!("reveal index: {}", describe(&err));
        }
        set_style(el, "opacity", "0");
        set_style(el, "transform", "translateY(30px)");
        set_style(el, "transition", "opacity 0.6s ease, transform 0.6s ease");
    }
    caps.reveals = reveals.len();

    caps.audio = audio_sink(document, poster).map(|s| Box::new(s) as _);
    caps.flat_surface = required::<HtmlCanvasElement>(document, "particleCanvas")
        .and_then(|canvas| surface(CanvasSurface::new(canvas)));
    caps.volume_surface = required::<HtmlCanvasElement>(document, "sakura")
        .and_then(|canvas| surface(GlSurface::new(canvas, Rc::clone(backdrop))));

    let stats = query_all(document, ".stat-value");
    if !stats.is_empty() {
        let counters = stats.iter().map(stat_counter).collect();
        caps.counters = Some((counters, Box::new(Counters { elements: stats })));
    }
    caps.address = required::<Element>(document, "userIP")
        .map(|el| (Box::new(HttpFetcher::new(poster.clone())) as _, Box::new(Text(el)) as _));
    caps.confetti = document.body().map(|body| {
        Box::new(Confetti { document: document.clone(), body, live: HashMap::new() }) as _
    });
    caps.splash = required::<HtmlElement>(document, "loadingScreen").map(|screen| {
        Box::new(Splash { screen, bar: query(document, ".loading-progress"), body: document.body() }) as _
    });
    caps
}

fn surface<S: Surface + 'static>(result: Result<S, EffectError>) -> Option<Box<dyn Surface>> {
    match result {
        Ok(surface) => Some(Box::new(surface)),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    }
}

fn theme_listeners(document: &Document, backdrop: &Rc<Cell<Rgba>>) -> Vec<Box<dyn ThemeListener>> {
    let mut listeners: Vec<Box<dyn ThemeListener>> = Vec::new();
    if let Some(root) = document.document_element() {
        listeners.push(Box::new(move |mode: ThemeMode| {
            if let Err(err) = root.set_attribute("data-theme", mode.as_str()) {
                log::debug!("data-theme: {}", describe(&err));
            }
        }));
    }
    if let Some(icon) = document.get_element_by_id("themeIcon") {
        listeners.push(Box::new(move |mode: ThemeMode| icon.set_class_name(mode.icon_class())));
    }
    let backdrop = Rc::clone(backdrop);
    listeners.push(Box::new(move |mode: ThemeMode| backdrop.set(mode.clear_color())));
    listeners
}

fn stat_counter(el: &HtmlElement) -> StatCounter {
    let target = el.get_attribute("data-count").and_then(|v| v.trim().parse().ok()).unwrap_or(0);
    let suffix = el.get_attribute("data-suffix").unwrap_or_else(|| "+".into());
    StatCounter::new(target, suffix)
}

fn audio_sink(document: &Document, poster: &Poster) -> Option<PageAudio> {
    let audio = by_id::<HtmlAudioElement>(document, "bgAudio")
        .or_else(|| required(document, "playAudio"))?;
    Some(PageAudio { audio, icon: document.get_element_by_id("audioIcon"), poster: poster.clone() })
}

/// Window and document listeners. They live as long as the page.
fn listen_page(window: &Window, document: &Document, poster: &Poster) -> Result<(), JsValue> {
    let p = poster.clone();
    let win = window.clone();
    listen(window, "resize", move |_| {
        if let Some(root) = win.document().and_then(|d| d.document_element()) {
            set_root_vh(&root, &win);
        }
        p.post(viewport(&win));
    })?;

    let p = poster.clone();
    let win = window.clone();
    listen(window, "scroll", move |_| {
        p.post(Event::Scroll { offset: win.scroll_y().unwrap_or(0.0) });
    })?;

    let p = poster.clone();
    listen(document, "click", move |event| {
        let (x, y) = match event.dyn_ref::<MouseEvent>() {
            Some(mouse) => (f64::from(mouse.client_x()), f64::from(mouse.client_y())),
            None => (0.0, 0.0),
        };
        let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
        p.post(Event::Click { target: classify(target.as_ref()), x, y });
    })?;

    let p = poster.clone();
    listen(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
        let mut press = KeyPress::new(key.key());
        press.ctrl = key.ctrl_key();
        press.meta = key.meta_key();
        if Shortcut::from_key(&press).is_some_and(Shortcut::overrides_browser) {
            event.prevent_default();
        }
        p.post(Event::Key(press));
    })?;

    let p = poster.clone();
    listen(document, "mousedown", move |_| p.post(Event::PointerDown))?;

    if let Some(slider) = by_id::<HtmlInputElement>(document, "volumeSlider") {
        let p = poster.clone();
        let input = slider.clone();
        listen(&slider, "input", move |_| {
            if let Ok(value) = input.value().parse::<f64>() {
                // The slider runs 0..100.
                p.post(Event::Volume(value / 100.0));
            }
        })?;
    }

    if let Some(hint) = query(document, ".scroll-indicator") {
        let win = window.clone();
        listen(&hint, "click", move |_| {
            let opts = ScrollToOptions::new();
            opts.set_top(dimension(win.inner_height()));
            opts.set_behavior(ScrollBehavior::Smooth);
            win.scroll_to_with_scroll_to_options(&opts);
        })?;
    }

    if let Some(root) = document.document_element() {
        set_root_vh(&root, window);
    }
    Ok(())
}

fn classify(target: Option<&Element>) -> ClickTarget {
    let Some(el) = target else { return ClickTarget::Page };
    let within = |selector: &str| matches!(el.closest(selector), Ok(Some(_)));
    if within("#audioToggle") {
        ClickTarget::AudioToggle
    } else if within("#themeToggle") {
        ClickTarget::ThemeToggle
    } else if within(".logo") {
        ClickTarget::Logo
    } else {
        ClickTarget::Page
    }
}

fn observe_reveals(reveals: &[HtmlElement], poster: &Poster) -> Result<(), JsValue> {
    if reveals.is_empty() {
        return Ok(());
    }
    let p = poster.clone();
    let observer = observer(REVEAL_THRESHOLD, "0px 0px -50px 0px", move |target, ratio| {
        let index = target.get_attribute(REVEAL_INDEX_ATTR).and_then(|v| v.parse().ok());
        if let Some(index) = index {
            p.post(Event::Visibility { region: Region::Reveal(index), ratio });
        }
    })?;
    for el in reveals {
        observer.observe(el);
    }
    Ok(())
}

fn observe_stats(document: &Document, poster: &Poster) -> Result<(), JsValue> {
    let Some(section) = query(document, ".stats") else { return Ok(()) };
    let p = poster.clone();
    let observer = observer(STATS_THRESHOLD, "0px", move |_, ratio| {
        p.post(Event::Visibility { region: Region::Stats, ratio });
    })?;
    observer.observe(&section);
    Ok(())
}

fn observer(
    threshold: f64,
    root_margin: &str,
    mut on_entry: impl FnMut(&Element, f64) + 'static,
) -> Result<IntersectionObserver, JsValue> {
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, _: IntersectionObserver| {
            for entry in entries.iter().filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok()) {
                let ratio = if entry.is_intersecting() { entry.intersection_ratio() } else { 0.0 };
                on_entry(&entry.target(), ratio);
            }
        },
    );
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from(threshold));
    init.set_root_margin(root_margin);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();
    Ok(observer)
}

fn wire_mobile_menu(document: &Document) -> Result<(), JsValue> {
    let (Some(button), Some(links)) = (query(document, ".mobile-menu-btn"), query(document, ".nav-links")) else {
        return Ok(());
    };
    {
        let (btn, links) = (button.clone(), links.clone());
        listen(&button, "click", move |_| {
            toggle_class(&links, "active", !links.class_list().contains("active"));
            toggle_class(&btn, "active", !btn.class_list().contains("active"));
        })?;
    }
    listen(document, "click", move |event| {
        let inside = event.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok()).is_some_and(|node| {
            button.contains(Some(&node)) || links.contains(Some(&node))
        });
        if !inside {
            toggle_class(&links, "active", false);
            toggle_class(&button, "active", false);
        }
    })
}

fn fill_year(document: &Document) {
    if let Some(el) = document.get_element_by_id("currentYear") {
        el.set_text_content(Some(&js_sys::Date::new_0().get_full_year().to_string()));
    }
}

fn listen(target: &EventTarget, kind: &str, handler: impl FnMut(web_sys::Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// `innerWidth` / `innerHeight` as a number; 0 when unavailable.
fn dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn viewport(window: &Window) -> Event {
    Event::Resize { width: dimension(window.inner_width()), height: dimension(window.inner_height()) }
}

fn set_root_vh(root: &Element, window: &Window) {
    let height = dimension(window.inner_height());
    if let Some(root) = root.dyn_ref::<HtmlElement>() {
        set_style(root, "--vh", &format!("{}px", height * 0.01));
    }
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map_or_else(js_sys::Date::now, |p| p.now())
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

/// Like [`by_id`], but an absent element is logged as the effect switching off.
fn required<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    match EffectError::require(by_id(document, id), &format!("#{id}")) {
        Ok(el) => Some(el),
        Err(err) => {
            log::debug!("{err}; effect disabled");
            None
        }
    }
}

fn query(document: &Document, selector: &str) -> Option<HtmlElement> {
    document.query_selector(selector).ok().flatten()?.dyn_into().ok()
}

fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = document.query_selector_all(selector) else { return Vec::new() };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into().ok())
        .collect()
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = el.style().set_property(property, value) {
        log::debug!("style {property}: {}", describe(&err));
    }
}

fn toggle_class(el: &HtmlElement, class: &str, on: bool) {
    let classes = el.class_list();
    let result = if on { classes.add_1(class) } else { classes.remove_1(class) };
    if let Err(err) = result {
        log::debug!("class {class}: {}", describe(&err));
    }
}

struct PageChrome {
    nav: Option<HtmlElement>,
    controls: Vec<HtmlElement>,
    hint: Option<HtmlElement>,
    reveals: Vec<HtmlElement>,
    body: Option<HtmlElement>,
}

impl ChromeSink for PageChrome {
    fn apply(&mut self, style: &ScrollStyle) {
        let chrome = &style.chrome;
        if let Some(nav) = &self.nav {
            set_style(nav, "background", chrome.nav_background);
            set_style(nav, "backdrop-filter", &format!("blur({}px)", chrome.blur_px));
            set_style(nav, "border-bottom", chrome.nav_border);
            toggle_class(nav, "scrolled", style.scrolled);
        }
        for control in &self.controls {
            set_style(control, "background", chrome.control_background);
            set_style(control, "border", chrome.control_border);
        }
        if let Some(hint) = &self.hint {
            set_style(hint, "opacity", &style.hint_opacity.to_string());
        }
    }

    fn reveal(&mut self, index: usize) {
        if let Some(el) = self.reveals.get(index) {
            set_style(el, "opacity", "1");
            set_style(el, "transform", "translateY(0)");
        }
    }

    fn keyboard_nav(&mut self, enabled: bool) {
        if let Some(body) = &self.body {
            toggle_class(body, "keyboard-nav", enabled);
        }
    }
}

struct PageAudio {
    audio: HtmlAudioElement,
    icon: Option<Element>,
    poster: Poster,
}

impl AudioSink for PageAudio {
    fn start(&mut self) {
        let poster = self.poster.clone();
        match self.audio.play() {
            Ok(promise) => spawn_local(async move {
                let result = JsFuture::from(promise)
                    .await
                    .map(drop)
                    .map_err(|err| EffectError::PlaybackRejected(describe(&err)));
                poster.post(Event::PlaybackSettled(result));
            }),
            Err(err) => poster.post(Event::PlaybackSettled(Err(EffectError::PlaybackRejected(describe(&err))))),
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.audio.pause() {
            log::debug!("pause: {}", describe(&err));
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
    }

    fn show_icon(&mut self, icon: VolumeIcon) {
        if let Some(el) = &self.icon {
            el.set_class_name(icon.class());
        }
    }
}

struct Counters {
    elements: Vec<HtmlElement>,
}

impl CounterSink for Counters {
    fn show(&mut self, index: usize, text: &str) {
        if let Some(el) = self.elements.get(index) {
            el.set_text_content(Some(text));
        }
    }
}

struct Text(Element);

impl TextSink for Text {
    fn set_text(&mut self, text: &str) {
        self.0.set_text_content(Some(text));
    }
}

struct Confetti {
    document: Document,
    body: HtmlElement,
    live: HashMap<u64, (Vec<HtmlElement>, Timeout)>,
}

impl ConfettiSink for Confetti {
    fn spawn(&mut self, burst: &Burst) {
        let (ox, oy) = burst.origin;
        let mut pieces = Vec::with_capacity(burst.pieces.len());
        for piece in &burst.pieces {
            let Ok(el) = self.document.create_element("div") else { continue };
            let Ok(el) = el.dyn_into::<HtmlElement>() else { continue };
            el.style().set_css_text(&format!(
                "position:fixed;left:{ox}px;top:{oy}px;width:10px;height:10px;background:{};\
                 border-radius:50%;pointer-events:none;z-index:9999;\
                 transition:all 1s ease-out;",
                piece.color
            ));
            if let Err(err) = self.body.append_child(&el) {
                log::debug!("confetti: {}", describe(&err));
                continue;
            }
            pieces.push(el);
        }

        // Give the pieces one paint at the origin so the transition runs.
        let moving = pieces.clone();
        let offsets: Vec<(f64, f64)> = burst.pieces.iter().map(|p| (p.dx, p.dy)).collect();
        let launch = Timeout::new(10, move || {
            for (el, (dx, dy)) in moving.iter().zip(offsets) {
                set_style(el, "transform", &format!("translate({dx}px, {dy}px)"));
                set_style(el, "opacity", "0");
            }
        });
        self.live.insert(burst.id, (pieces, launch));
    }

    fn remove(&mut self, id: u64) {
        if let Some((pieces, _)) = self.live.remove(&id) {
            for el in pieces {
                el.remove();
            }
        }
    }
}

struct Splash {
    screen: HtmlElement,
    bar: Option<HtmlElement>,
    body: Option<HtmlElement>,
}

impl SplashSink for Splash {
    fn progress(&mut self, percent: f64) {
        if let Some(bar) = &self.bar {
            set_style(bar, "width", &format!("{percent}%"));
        }
    }

    fn hide(&mut self) {
        toggle_class(&self.screen, "hidden", true);
        if let Some(body) = &self.body {
            toggle_class(body, "is-preload", false);
        }
    }
}
