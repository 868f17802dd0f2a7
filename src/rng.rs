//! Random source helpers.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Build the master generator, returning the seed actually used
///
/// With no seed a fresh one is drawn so the run can still be replayed
/// by passing the logged value back in.
pub fn seeded_rng(seed: Option<u64>) -> (SmallRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (SmallRng::seed_from_u64(seed), seed)
}

/// Uniform sample in `[lo, hi)`; returns `lo` when the range is empty
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform sample in `(-half_width, half_width)`
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half_width
}
