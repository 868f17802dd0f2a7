//! Territory layout and seed-site drift parameters.

use crate::error::ArcfieldError;

/// Noise-field drift applied to every seed site
///
/// A site's position is `base + amplitude * noise(base * scale, time * drift_speed + warp)`
/// per axis, where `warp = bass * bass_warp + treble * treble_warp`.
#[derive(Debug, Clone)]
pub struct DriftParams {
    /// Simplex noise seed
    pub noise_seed: u32,

    /// Spatial frequency applied to the base position (cycles per world unit)
    pub scale: f32,

    /// Noise-time advance per second of installation time
    pub drift_speed: f32,

    /// Maximum drift per axis in world units (noise output is in [-1, 1])
    pub amplitude: f32,

    /// Offset along the time axis for the y sample, decorrelates the axes
    pub axis_offset: f32,

    /// Noise-time warp per unit of bass energy
    pub bass_warp: f32,

    /// Noise-time warp per unit of treble energy
    pub treble_warp: f32,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            noise_seed: 12345,
            scale: 0.05,
            drift_speed: 0.3, // slow wander: one noise unit every ~3s
            amplitude: 20.0,
            axis_offset: 100.0,
            bass_warp: 0.2,
            treble_warp: 0.1,
        }
    }
}

impl DriftParams {
    /// No motion at all (sites sit on their base positions)
    pub fn still() -> Self {
        Self {
            amplitude: 0.0,
            ..Self::default()
        }
    }
}

/// Seed-site bootstrap parameters
#[derive(Debug, Clone)]
pub struct TerritoryConfig {
    /// Number of seed sites (one growth unit each)
    pub site_count: usize,

    /// World width in world units (sites spawn in [-w/2, w/2])
    pub world_width: f32,

    /// World height in world units (sites spawn in [-h/2, h/2])
    pub world_height: f32,

    /// Base weight range, half-open
    pub weight_range: (f32, f32),

    /// Reactivity range (weight gained per unit of band energy), half-open
    pub reactivity_range: (f32, f32),

    /// Site motion
    pub drift: DriftParams,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            site_count: 25,
            world_width: 100.0 * 16.0 / 9.0,
            world_height: 100.0,
            weight_range: (1.0, 4.0),
            reactivity_range: (5.0, 15.0),
            drift: DriftParams::default(),
        }
    }
}

impl TerritoryConfig {
    /// Validate configuration (non-empty, finite bounds, weights >= 1)
    pub fn validate(&self) -> Result<(), ArcfieldError> {
        if self.site_count == 0 {
            return Err(ArcfieldError::EmptyTerritory);
        }
        validate_extent(self.world_width, self.world_height)?;
        if !(self.weight_range.0 >= 1.0 && self.weight_range.0 < self.weight_range.1) {
            return Err(ArcfieldError::InvalidConfig(format!(
                "Weight range must start at >= 1 and be non-empty, got {:?}",
                self.weight_range
            )));
        }
        if !(self.reactivity_range.0 >= 0.0 && self.reactivity_range.0 < self.reactivity_range.1)
        {
            return Err(ArcfieldError::InvalidConfig(format!(
                "Reactivity range must be non-negative and non-empty, got {:?}",
                self.reactivity_range
            )));
        }
        Ok(())
    }
}

/// Check a world rectangle is finite and non-negative
pub(crate) fn validate_extent(width: f32, height: f32) -> Result<(), ArcfieldError> {
    if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
        return Err(ArcfieldError::InvalidConfig(format!(
            "World extent must be finite and non-negative, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
