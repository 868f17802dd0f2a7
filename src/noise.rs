//! Noise generation for seed-site drift.
//!
//! Using OpenSimplex noise for smooth, artifact-free wander. The generator is
//! immutable once built and handed to whoever needs it.

use noise::{NoiseFn, OpenSimplex};

/// Noise generator for site drift
#[derive(Clone)]
pub struct NoiseGenerator {
    simplex: OpenSimplex,
}

impl NoiseGenerator {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Sample 3D simplex noise at position
    ///
    /// Returns value in range [-1, 1]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f32 {
        (self.simplex.get([x, y, z]) as f32).clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseGenerator").finish_non_exhaustive()
    }
}
