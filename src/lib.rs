//! Landing-page effects compiled to WebAssembly.
//!
//! Everything outside [`wasm`] is plain Rust with no browser dependency, so it
//! builds and tests on the host. The `wasm` module (wasm32 only) finds the
//! page elements, wraps them as capabilities, and forwards DOM callbacks into
//! the [`app::App`] event queue.
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Application context and event routing |
//! | [`theme`] | Dark/light mode, persisted preference |
//! | [`audio`] | Background music toggle and volume |
//! | [`scroll`] | Scroll chrome, visibility reveals, stat counters |
//! | [`particles`] | Rising motes and blossom volume |
//! | [`anim`] | Per-frame loop over particle layers |
//! | [`effects`] | Address reveal, confetti, shortcuts, loading splash |
//! | [`events`] / [`timer`] | Event queue and cancelable timers |

pub mod anim;
pub mod app;
pub mod audio;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod events;
pub mod math;
pub mod particles;
pub mod scroll;
pub mod theme;
pub mod timer;
pub mod timing;

pub use app::{App, Capabilities};
pub use config::SiteConfig;
pub use error::EffectError;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod dom;
    mod net;
    mod platform;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {err}").into());
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        dom::mount(&window, &document)?;
        Ok(())
    }
}
