//! Keyboard shortcuts.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// `KeyboardEvent.key`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ctrl: false, meta: false }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd + K
    ToggleTheme,
    /// Ctrl/Cmd + M
    ToggleAudio,
    /// Tab: show focus rings until the next mouse press.
    KeyboardNav,
}

impl Shortcut {
    #[must_use]
    pub fn from_key(press: &KeyPress) -> Option<Self> {
        let command = press.ctrl || press.meta;
        match press.key.as_str() {
            "k" | "K" if command => Some(Self::ToggleTheme),
            "m" | "M" if command => Some(Self::ToggleAudio),
            "Tab" => Some(Self::KeyboardNav),
            _ => None,
        }
    }

    /// Whether the browser's own binding for the key must be suppressed.
    #[must_use]
    pub fn overrides_browser(self) -> bool {
        !matches!(self, Self::KeyboardNav)
    }
}
