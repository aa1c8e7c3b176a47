//! Browser-backed timer, storage and event posting.

use std::cell::RefCell;
use std::rc::Weak;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::error::EffectError;
use crate::events::{Event, EventBus, TimerEvent};
use crate::theme::KeyValueStore;
use crate::timer::{Scheduler, TimerHandle};
use crate::App;

/// Queues an event and drains the app unless a drain is already running
/// further up the stack, in which case that drain picks the event up.
#[derive(Clone)]
pub struct Poster {
    bus: EventBus,
    app: Weak<RefCell<App>>,
}

impl Poster {
    pub fn new(bus: EventBus, app: Weak<RefCell<App>>) -> Self {
        Self { bus, app }
    }

    pub fn post(&self, event: Event) {
        self.bus.emit(event);
        if let Some(app) = self.app.upgrade() {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.pump();
            }
        }
    }
}

pub struct BrowserScheduler {
    poster: Poster,
}

impl BrowserScheduler {
    pub fn new(poster: Poster) -> Self {
        Self { poster }
    }
}

impl Scheduler for BrowserScheduler {
    fn after(&self, delay_ms: u32, event: TimerEvent) -> TimerHandle {
        let poster = self.poster.clone();
        let timeout = Timeout::new(delay_ms, move || poster.post(Event::Timer(event)));
        TimerHandle::new(move || drop(timeout))
    }

    fn every(&self, period_ms: u32, event: TimerEvent) -> TimerHandle {
        let poster = self.poster.clone();
        let interval = Interval::new(period_ms.max(1), move || poster.post(Event::Timer(event)));
        TimerHandle::new(move || drop(interval))
    }
}

/// `window.localStorage`
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn open(window: &web_sys::Window) -> Option<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(err) => {
                log::warn!("local storage blocked: {}", describe(&err));
                None
            }
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("storage read {key}: {}", describe(&err));
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EffectError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| EffectError::StorageUnavailable(format!("write {key}: {}", describe(&err))))
    }
}

/// Readable text for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
