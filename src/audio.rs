//! Background music control.
//!
//! Starting playback is asynchronous in the browser and may be refused by
//! autoplay policy, so a play request and its outcome are two separate steps:
//! [`AudioController::toggle`] asks the sink to start, and the platform later
//! reports back through [`AudioController::playback_settled`].

use crate::constants::LOW_VOLUME_THRESHOLD;
use crate::error::EffectError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioState {
    pub playing: bool,
    /// Always within `[0, 1]`.
    pub volume: f64,
}

/// Three-way speaker indicator derived from playback state and volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    Full,
}

impl VolumeIcon {
    #[must_use]
    pub fn for_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            Self::Muted
        } else if volume < LOW_VOLUME_THRESHOLD {
            Self::Low
        } else {
            Self::Full
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Muted => "fas fa-volume-mute",
            Self::Low => "fas fa-volume-down",
            Self::Full => "fas fa-volume-up",
        }
    }
}

/// The streaming audio element.
pub trait AudioSink {
    /// Begin playback. The result arrives later as a settle notification.
    fn start(&mut self);
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f64);
    /// Reflect the derived indicator into the page.
    fn show_icon(&mut self, icon: VolumeIcon);
}

pub struct AudioController {
    sink: Box<dyn AudioSink>,
    state: AudioState,
    pending: bool,
    unlocked: bool,
}

impl AudioController {
    pub fn new(mut sink: Box<dyn AudioSink>, volume: f64) -> Self {
        let volume = clamp_volume(volume);
        sink.set_volume(volume);
        sink.show_icon(VolumeIcon::Muted);
        Self {
            sink,
            state: AudioState { playing: false, volume },
            pending: false,
            unlocked: false,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    /// A start request is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn icon(&self) -> VolumeIcon {
        if self.state.playing {
            VolumeIcon::for_volume(self.state.volume)
        } else {
            VolumeIcon::Muted
        }
    }

    pub fn toggle(&mut self) -> AudioState {
        self.unlocked = true;
        if self.state.playing {
            self.sink.pause();
            self.state.playing = false;
            self.sink.show_icon(self.icon());
        } else {
            self.request_start();
        }
        self.state
    }

    /// First click anywhere on the page: one playback attempt, never repeated.
    pub fn first_interaction(&mut self) {
        if self.unlocked {
            return;
        }
        self.unlocked = true;
        if !self.state.playing {
            self.request_start();
        }
    }

    /// Outcome of the most recent start request. A rejection is logged and
    /// leaves playback paused; the user can try again with the toggle.
    pub fn playback_settled(&mut self, result: Result<(), EffectError>) -> AudioState {
        self.pending = false;
        match result {
            Ok(()) => self.state.playing = true,
            Err(err) => {
                log::warn!("{err}");
                self.state.playing = false;
            }
        }
        self.sink.show_icon(self.icon());
        self.state
    }

    pub fn set_volume(&mut self, volume: f64) -> VolumeIcon {
        self.state.volume = clamp_volume(volume);
        self.sink.set_volume(self.state.volume);
        let icon = VolumeIcon::for_volume(self.state.volume);
        self.sink.show_icon(if self.state.playing { icon } else { VolumeIcon::Muted });
        icon
    }

    fn request_start(&mut self) {
        if self.pending {
            return;
        }
        self.pending = true;
        self.sink.start();
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
