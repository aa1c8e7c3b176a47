//! Particle field: the rising motes and the drifting blossoms.
//!
//! Both layers share one simulation loop and differ only in what happens at
//! the edge. [`FieldMode::Flat`] lives in canvas pixels and recycles motes
//! that float off the top back to the bottom. [`FieldMode::Volume`] lives in
//! a world-space box and teleports particles to the opposite face, velocity
//! untouched. Particles are never freed, only repositioned.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;
use crate::math::{Mat4, Vec3};
use crate::timing::QualityHint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLOSSOM: Self = Self::new(1.0, 0.72, 0.8, 1.0);

    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(..)` string with 8-bit channels.
    #[must_use]
    pub fn css(self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// Boundary policy and coordinate space of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Canvas pixels; motes rise and respawn below the bottom edge.
    Flat,
    /// World units centred on the origin; wraparound on every axis.
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Units per second.
    pub velocity: Vec3,
    /// Radius in pixels (flat) or world-scale point size (volume).
    pub size: f64,
    pub opacity: f64,
}

/// A drawing target for one frame of particles.
pub trait Surface {
    /// Match the backing store to a new viewport.
    fn resize(&mut self, _width: f64, _height: f64) {}
    fn begin_frame(&mut self, width: f64, height: f64);
    /// Filled circle centred at `(x, y)` in surface pixels.
    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Rgba);
    fn end_frame(&mut self) {}
}

pub struct ParticleField {
    mode: FieldMode,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    half_extent: Vec3,
    budget: usize,
    view_proj: Mat4,
    rng: SmallRng,
}

impl ParticleField {
    pub fn new(mode: FieldMode, seed: u64) -> Self {
        Self {
            mode,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            half_extent: Vec3::ZERO,
            budget: VOLUME_MAX_PARTICLES,
            view_proj: Mat4::identity(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Particle count for a viewport.
    #[must_use]
    pub fn target_count(mode: FieldMode, width: f64, height: f64, budget: usize) -> usize {
        let area = (width * height).max(0.0);
        match mode {
            FieldMode::Flat => ((area / FLAT_AREA_PER_PARTICLE).floor() as usize).min(FLAT_MAX_PARTICLES),
            FieldMode::Volume => ((area / VOLUME_AREA_PER_PARTICLE).floor() as usize)
                .min(VOLUME_MAX_PARTICLES)
                .min(budget),
        }
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn half_extent(&self) -> Vec3 {
        self.half_extent
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Resize to a new viewport and rebuild every particle from scratch.
    pub fn configure(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let aspect = if self.height > 0.0 { self.width / self.height } else { 1.0 };

        self.half_extent = Vec3::new(VOLUME_HALF_EXTENT * aspect, VOLUME_HALF_EXTENT, VOLUME_HALF_EXTENT);
        let projection = Mat4::perspective(aspect, FOV_DEGREES, NEAR_PLANE, FAR_PLANE);
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
        );
        self.view_proj = projection.multiply(&view);

        let count = Self::target_count(self.mode, self.width, self.height, self.budget);
        let (rng, mode, half) = (&mut self.rng, self.mode, self.half_extent);
        let (w, h) = (self.width, self.height);
        self.particles = (0..count)
            .map(|_| match mode {
                FieldMode::Flat => spawn_mote(rng, w, h, true),
                FieldMode::Volume => spawn_blossom(rng, half),
            })
            .collect();
        log::debug!("{mode:?} field rebuilt with {count} particles for {w}x{h}");
    }

    /// Scale the volume budget from a frame-rate hint. Takes effect at the next
    /// [`configure`](Self::configure). Returns true if the budget moved.
    pub fn apply_quality(&mut self, hint: QualityHint) -> bool {
        if self.mode != FieldMode::Volume {
            return false;
        }
        let before = self.budget;
        self.budget = match hint {
            QualityHint::Reduce => ((before as f64 * 0.8) as usize).max(VOLUME_MIN_BUDGET),
            QualityHint::Increase => ((before as f64 * 1.1) as usize).min(VOLUME_MAX_PARTICLES),
            QualityHint::Hold => before,
        };
        self.budget != before
    }

    /// Advance every particle by `velocity * delta`, then apply the boundary policy.
    pub fn step(&mut self, delta: f64) {
        let delta = delta.max(0.0);
        let (w, h, half) = (self.width, self.height, self.half_extent);
        for p in &mut self.particles {
            p.position = p.position + p.velocity * delta;
            match self.mode {
                FieldMode::Flat => {
                    if p.position.y < -FLAT_EDGE_MARGIN {
                        *p = spawn_mote(&mut self.rng, w, h, false);
                    }
                }
                FieldMode::Volume => wrap(&mut p.position, half),
            }
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.begin_frame(self.width, self.height);
        match self.mode {
            FieldMode::Flat => {
                for p in &self.particles {
                    surface.draw_point(p.position.x, p.position.y, p.size, Rgba::WHITE.with_alpha(p.opacity));
                }
            }
            FieldMode::Volume => {
                for p in &self.particles {
                    if let Some((x, y, radius)) = self.project(p) {
                        surface.draw_point(x, y, radius, Rgba::BLOSSOM.with_alpha(p.opacity));
                    }
                }
            }
        }
        surface.end_frame();
    }

    /// Screen position and radius of a volume particle; `None` when behind the camera.
    fn project(&self, p: &Particle) -> Option<(f64, f64, f64)> {
        let [cx, cy, _, cw] = self.view_proj.transform_point(p.position);
        if cw <= NEAR_PLANE {
            return None;
        }
        let (nx, ny) = (cx / cw, cy / cw);
        let x = (nx + 1.0) * 0.5 * self.width;
        let y = (1.0 - ny) * 0.5 * self.height;
        let radius = p.size * self.height * POINT_SCALE * CAMERA_DISTANCE / cw;
        Some((x, y, radius))
    }
}

/// Teleport to the opposite face on every axis that left the box.
fn wrap(position: &mut Vec3, half: Vec3) {
    for axis in 0..3 {
        let limit = half.get(axis);
        let v = position.get(axis);
        if v.abs() > limit {
            position.set(axis, if v > 0.0 { -limit } else { limit });
        }
    }
}

/// A rising mote. Fresh fields scatter motes over the whole canvas; recycled
/// ones re-enter just below the bottom edge.
fn spawn_mote(rng: &mut SmallRng, width: f64, height: f64, scatter: bool) -> Particle {
    let x = rng.random::<f64>() * width;
    let y = if scatter {
        rng.random::<f64>() * (height + FLAT_EDGE_MARGIN)
    } else {
        height + FLAT_EDGE_MARGIN
    };
    let rise = rng.random::<f64>() * 2.0 + 1.0;
    let size = rng.random::<f64>() * 2.0 + 1.0;
    let opacity = rng.random::<f64>() * 0.5 + 0.2;
    let drift = rng.random::<f64>() * 0.5 - 0.25;
    Particle {
        position: Vec3::new(x, y, 0.0),
        velocity: Vec3::new(drift * REFERENCE_FPS, -rise * REFERENCE_FPS, 0.0),
        size,
        opacity,
    }
}

fn spawn_blossom(rng: &mut SmallRng, half: Vec3) -> Particle {
    let mut unit = || rng.random::<f64>() - 0.5;
    let position = Vec3::new(unit() * 2.0 * half.x, unit() * 2.0 * half.y, unit() * 2.0 * half.z);
    let velocity = Vec3::new(unit() * 2.0, -(unit() + 0.5) * 2.0 - 1.0, unit() * 2.0);
    Particle {
        position,
        velocity,
        size: 0.5 + (unit() + 0.5) * 0.5,
        opacity: unit() + 0.5,
    }
}
