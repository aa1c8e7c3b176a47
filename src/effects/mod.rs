//! Independent cosmetic effects: address reveal, confetti, shortcuts, splash.

pub mod address;
pub mod confetti;
pub mod keys;
pub mod splash;

/// A text node the page lets an effect write into.
pub trait TextSink {
    fn set_text(&mut self, text: &str);
}
