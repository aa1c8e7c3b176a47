//! Logo easter egg: every fifth click throws a ring of confetti.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::{CONFETTI_CLICKS, CONFETTI_COLORS, CONFETTI_COUNT, CONFETTI_LIFETIME_MS};
use crate::events::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfettiPiece {
    /// Final offset from the origin, in pixels.
    pub dx: f64,
    pub dy: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub id: u64,
    pub origin: (f64, f64),
    pub pieces: Vec<ConfettiPiece>,
}

/// Creates and later removes the confetti elements.
pub trait ConfettiSink {
    fn spawn(&mut self, burst: &Burst);
    fn remove(&mut self, id: u64);
}

pub struct EasterEgg {
    clicks: u32,
    next_id: u64,
    rng: SmallRng,
    live: HashMap<u64, TimerHandle>,
}

impl EasterEgg {
    pub fn new(seed: u64) -> Self {
        Self { clicks: 0, next_id: 0, rng: SmallRng::seed_from_u64(seed), live: HashMap::new() }
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Bursts still on screen.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Count a click at `origin`. The fifth returns a burst, schedules its
    /// removal, and resets the count.
    pub fn click(&mut self, origin: (f64, f64), scheduler: &dyn Scheduler) -> Option<Burst> {
        self.clicks += 1;
        if self.clicks < CONFETTI_CLICKS {
            return None;
        }
        self.clicks = 0;

        let id = self.next_id;
        self.next_id += 1;
        let pieces = (0..CONFETTI_COUNT)
            .map(|i| {
                let angle = TAU * i as f64 / CONFETTI_COUNT as f64;
                let speed = 200.0 + self.rng.random::<f64>() * 200.0;
                let color = CONFETTI_COLORS[self.rng.random_range(0..CONFETTI_COLORS.len())];
                ConfettiPiece { dx: angle.cos() * speed, dy: angle.sin() * speed, color }
            })
            .collect();
        let timer = scheduler.after(CONFETTI_LIFETIME_MS, TimerEvent::ConfettiExpired(id));
        self.live.insert(id, timer);
        Some(Burst { id, origin, pieces })
    }

    /// Cancel every pending removal, returning the ids still on screen.
    pub fn clear(&mut self) -> Vec<u64> {
        self.live.drain().map(|(id, _)| id).collect()
    }

    /// Forget an expired burst. False if it was already gone.
    pub fn expire(&mut self, id: u64) -> bool {
        self.live.remove(&id).is_some()
    }
}
