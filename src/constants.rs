//! Page-wide constants.
//!
//! Thresholds and timings come straight from the landing page's behaviour;
//! class names match the icon font used by `static/index.html`.

// ── Persistence ─────────────────────────────────────────────────

pub const THEME_STORAGE_KEY: &str = "theme";

// ── Flat (2D) particle layer ────────────────────────────────────

/// Viewport area, in square CSS pixels, covered by one rising mote.
pub const FLAT_AREA_PER_PARTICLE: f64 = 15_000.0;
pub const FLAT_MAX_PARTICLES: usize = 400;
/// Motes respawn this far below the bottom edge and recycle this far above the top.
pub const FLAT_EDGE_MARGIN: f64 = 10.0;
/// The rising speeds below are per-frame values at this refresh rate.
pub const REFERENCE_FPS: f64 = 60.0;

// ── Volume (WebGL) particle layer ───────────────────────────────

pub const VOLUME_AREA_PER_PARTICLE: f64 = 3_000.0;
/// Ceiling for both the area-derived count and the frame-rate budget.
pub const VOLUME_MAX_PARTICLES: usize = 800;
pub const VOLUME_MIN_BUDGET: usize = 200;
/// Half-extent of the simulation volume on the y and z axes; x scales with aspect.
pub const VOLUME_HALF_EXTENT: f64 = 20.0;

// Camera
pub const FOV_DEGREES: f64 = 45.0;
pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 200.0;
pub const CAMERA_DISTANCE: f64 = 50.0;
/// Point radius per unit particle size, as a fraction of viewport height.
pub const POINT_SCALE: f64 = 0.015;

// ── Frames ──────────────────────────────────────────────────────

/// Longest step the simulation will take; larger gaps (a backgrounded tab) are clipped.
pub const MAX_FRAME_DELTA: f64 = 0.25;
pub const FPS_HISTORY_LEN: usize = 60;
pub const FPS_LOW: f64 = 30.0;
pub const FPS_HIGH: f64 = 55.0;

// ── Scroll ──────────────────────────────────────────────────────

pub const NAV_SCROLL_THRESHOLD: f64 = 100.0;
pub const HINT_FADE_THRESHOLD: f64 = 200.0;
pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const STATS_THRESHOLD: f64 = 0.5;
/// Observers report ratios a rounding step under the threshold they fired for.
pub const VISIBILITY_TOLERANCE: f64 = 1e-3;
pub const COUNTER_TICK_MS: u32 = 16;
pub const COUNTER_DURATION_MS: f64 = 2_000.0;

// ── Audio ───────────────────────────────────────────────────────

pub const DEFAULT_VOLUME: f64 = 0.5;
pub const LOW_VOLUME_THRESHOLD: f64 = 0.5;

// ── Misc effects ────────────────────────────────────────────────

pub const TYPEWRITER_INTERVAL_MS: u32 = 100;
pub const ADDRESS_UNAVAILABLE: &str = "Unavailable";
pub const CONFETTI_CLICKS: u32 = 5;
pub const CONFETTI_COUNT: usize = 50;
pub const CONFETTI_LIFETIME_MS: u32 = 1_000;
pub const CONFETTI_COLORS: [&str; 4] = ["#ff6b9d", "#c96dd8", "#4d9cff", "#ffd93d"];
pub const SPLASH_TICK_MS: u32 = 200;
pub const SPLASH_MAX_STEP: f64 = 15.0;
pub const SPLASH_HIDE_DELAY_MS: u32 = 500;
