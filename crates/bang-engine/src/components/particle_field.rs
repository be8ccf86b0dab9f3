//! Expanding particle cloud.
//!
//! Positions and velocities live in two parallel flat buffers whose length is
//! fixed at construction. The position buffer is what the renderer uploads.

use std::f64::consts::TAU;

use glam::Vec3;

use crate::core::rng::Rng;

/// Default particle count for the main cloud.
pub const DEFAULT_PARTICLE_COUNT: usize = 20_000;

/// Upper bound on the main cloud. Keeps the frame buffer within what a
/// wasm32 heap can hold.
pub const MAX_PARTICLE_COUNT: usize = 1_000_000;

/// Default bounds for the per-particle speed magnitude.
pub const DEFAULT_SPEED_RANGE: (f64, f64) = (0.5, 1.0);

/// Fixed-size set of particles moving radially away from the origin.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
}

impl ParticleField {
    /// Create `count` particles at the origin with isotropic velocities.
    ///
    /// Directions are uniform over the unit sphere (`phi = acos(u)`, `u ~ U(-1, 1)`),
    /// speeds uniform in `speed_range`.
    pub fn new(count: usize, speed_range: (f64, f64), rng: &mut Rng) -> Self {
        let velocities = (0..count)
            .map(|_| {
                let theta = rng.range(0.0, TAU);
                let phi = rng.range(-1.0, 1.0).acos();
                let speed = rng.range(speed_range.0, speed_range.1);
                let dir = Vec3::new(
                    (phi.sin() * theta.cos()) as f32,
                    (phi.sin() * theta.sin()) as f32,
                    phi.cos() as f32,
                );
                dir * speed as f32
            })
            .collect();
        Self::from_velocities(velocities)
    }

    /// Create particles at the origin with explicit velocities.
    pub fn from_velocities(velocities: Vec<Vec3>) -> Self {
        Self {
            positions: vec![Vec3::ZERO; velocities.len()],
            velocities,
        }
    }

    /// Move every particle along its velocity: `position += velocity * speed_scale * delta`.
    #[inline]
    pub fn advance(&mut self, delta: f64, speed_scale: f64) {
        let step = (speed_scale * delta) as f32;
        if step == 0.0 {
            return;
        }
        for (pos, vel) in self.positions.iter_mut().zip(&self.velocities) {
            *pos += *vel * step;
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Positions as a flat `[x, y, z, x, y, z, ...]` slice for GPU upload.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
