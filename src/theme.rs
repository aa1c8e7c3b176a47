//! Theme mode, its persisted preference, and the controller that toggles it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;

use crate::constants::THEME_STORAGE_KEY;
use crate::error::EffectError;
use crate::particles::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Anything other than the two known names is treated as absent.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Icon shown on the toggle: the mode a click would switch to.
    #[must_use]
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Dark => "fas fa-sun",
            Self::Light => "fas fa-moon",
        }
    }

    /// Background the WebGL layer clears to.
    #[must_use]
    pub fn clear_color(self) -> Rgba {
        match self {
            Self::Dark => Rgba::new(0.1, 0.1, 0.18, 1.0),
            Self::Light => Rgba::new(0.98, 0.98, 1.0, 1.0),
        }
    }
}

/// Durable string key-value storage (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), EffectError>;
}

/// In-memory store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EffectError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// The single persisted theme preference.
///
/// Without a backing store every read is absent and every write is dropped,
/// which leaves the theme session-scoped.
pub struct PreferenceStore {
    backend: Option<Box<dyn KeyValueStore>>,
}

impl PreferenceStore {
    pub fn new(backend: Option<Box<dyn KeyValueStore>>) -> Self {
        Self { backend }
    }

    pub fn load(&self) -> Option<ThemeMode> {
        let raw = self.backend.as_ref()?.get(THEME_STORAGE_KEY)?;
        let mode = ThemeMode::parse(&raw);
        if mode.is_none() {
            log::debug!("ignoring stored theme {raw:?}");
        }
        mode
    }

    pub fn save(&mut self, mode: ThemeMode) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(err) = backend.set(THEME_STORAGE_KEY, mode.as_str()) {
            log::warn!("theme preference not saved: {err}");
        }
    }
}

/// Notified synchronously, in registration order, after every theme change.
pub trait ThemeListener {
    fn theme_changed(&mut self, mode: ThemeMode);
}

impl<F: FnMut(ThemeMode)> ThemeListener for F {
    fn theme_changed(&mut self, mode: ThemeMode) {
        self(mode);
    }
}

pub struct ThemeController {
    mode: ThemeMode,
    store: PreferenceStore,
    listeners: Vec<Box<dyn ThemeListener>>,
}

impl ThemeController {
    /// Restore the stored mode, or start in `fallback` when none is stored.
    pub fn new(store: PreferenceStore, fallback: ThemeMode) -> Self {
        let mode = store.load().unwrap_or(fallback);
        Self { mode, store, listeners: Vec::new() }
    }

    pub fn current_mode(&self) -> ThemeMode {
        self.mode
    }

    /// Register a listener and bring it up to date with the current mode.
    pub fn subscribe(&mut self, mut listener: Box<dyn ThemeListener>) {
        listener.theme_changed(self.mode);
        self.listeners.push(listener);
    }

    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.toggled();
        self.store.save(self.mode);
        log::debug!("theme switched to {}", self.mode.as_str());
        for listener in &mut self.listeners {
            listener.theme_changed(self.mode);
        }
        self.mode
    }
}
