//! Growth-unit profiles: skeleton generation, audio shaping, and flash lifecycle.
//!
//! The installation runs two flavours of unit that differ only in tuning:
//! `spectrum` units react to the whole band mix, `voice` units listen to
//! mids through a hard breath gate and can be faded in and out as a group.

use crate::audio::Band;
use crate::error::ArcfieldError;

/// Which built-in profile a unit was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Spectrum,
    Voice,
}

/// One value per audio band
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandWeights {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl BandWeights {
    pub const ZERO: Self = Self {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
    };

    pub fn new(bass: f32, mid: f32, treble: f32) -> Self {
        Self { bass, mid, treble }
    }

    pub fn get(&self, band: Band) -> f32 {
        match band {
            Band::Bass => self.bass,
            Band::Mid => self.mid,
            Band::Treble => self.treble,
        }
    }
}

/// Noise gate + weighting that turns band energies into a trigger energy
///
/// Formula: `energy = gain * (sum_b weight_b * gate(e_b, floor_b)) ^ power`
/// where `gate(e, f) = 0 if e < f else e`.
#[derive(Debug, Clone)]
pub struct EnergyGate {
    /// Per-band noise floor; energies below it count as silence
    pub floors: BandWeights,

    /// Per-band contribution to the weighted sum
    pub weights: BandWeights,

    /// Nonlinear boost exponent (1 = linear, 2 = square)
    pub boost_power: i32,

    /// Multiplier applied after the boost
    pub boost_gain: f32,
}

/// Audio-driven stretch and jitter of the projected skeleton
#[derive(Debug, Clone)]
pub struct MotionShaping {
    /// Band that lengthens every segment
    pub stretch_band: Band,

    /// Stretch gate floor
    pub stretch_floor: f32,

    /// Fractional length gained per unit of gated energy
    /// Formula: length * (1 + gated * stretch_gain)
    pub stretch_gain: f32,

    /// Band that shakes segment endpoints
    pub jitter_band: Band,

    /// Jitter gate floor; below it the shape is perfectly still
    pub jitter_floor: f32,

    /// Jitter amplitude once the gate is open (world units)
    pub jitter_base: f32,

    /// Jitter amplitude per unit of gated energy (world units)
    pub jitter_gain: f32,

    /// Extra random amplitude drawn once per frame, [0, jitter_random)
    pub jitter_random: f32,
}

/// Procedural skeleton generation rules
#[derive(Debug, Clone)]
pub struct GrowthParams {
    /// Segment capacity per unit (buffers hold 2 points per segment)
    pub max_segments: usize,

    /// Branch depth limit; segments never reach this depth
    pub max_depth: u32,

    /// Per-unit scale, drawn once at construction, half-open
    pub scale_range: (f32, f32),

    /// Per-strike scale multiplier, half-open
    pub strike_scale_range: (f32, f32),

    /// Trunks per strike, inclusive
    pub trunk_count: (u32, u32),

    /// Trunk length before scaling (world units)
    pub trunk_length_base: f32,

    /// Random extra trunk length, [0, spread) before scaling
    pub trunk_length_spread: f32,

    /// Target length of one zig-zag step (world units)
    pub segment_size: f32,

    /// Maximum per-step direction kink (radians, ±)
    pub kink_rad: f32,

    /// Early termination is only rolled for depth > this
    pub early_stop_min_depth: u32,

    /// Early termination probability per depth level
    pub early_stop_per_depth: f32,

    /// Child spread at depth 0 (radians, full width)
    pub base_spread_rad: f32,

    /// Spread lost per depth level (radians)
    pub spread_decrement_rad: f32,

    /// Child length as a fraction of the parent branch, half-open
    pub length_decay: (f32, f32),

    /// Children of a trunk, inclusive
    pub root_children: (u32, u32),

    /// Cumulative odds for 1 and 2 children on deeper branches (else 3)
    pub branch_odds: (f32, f32),

    /// Trunk color lightness offset (±, HSL lightness units)
    pub lightness_jitter: f32,

    /// White blend at max depth: c + depth / max_depth * tip_glow
    pub tip_glow: f32,
}

/// Flash lifecycle timings and thresholds
#[derive(Debug, Clone)]
pub struct LifecycleParams {
    /// Trigger threshold per unit, drawn once, half-open (equal bounds = fixed)
    pub threshold_range: (f32, f32),

    /// Threshold wobble per check, uniform in (-jitter, jitter)
    pub threshold_jitter: f32,

    /// Flash opacity lost per second
    pub decay_rate: f32,

    /// Cooldown after a flash (seconds), half-open
    pub cooldown_range: (f32, f32),

    /// Initial cooldown upper bound (seconds), staggers the first ignitions
    pub initial_cooldown_max: f32,

    /// Whether the unit has a user-controlled master fade
    pub master_toggle: bool,

    /// Master alpha easing factor per tick
    pub master_fade_rate: f32,

    /// Opacity below which the unit is treated as invisible
    pub visibility_epsilon: f32,
}

/// Complete configuration of one growth unit
#[derive(Debug, Clone)]
pub struct UnitProfile {
    pub kind: UnitKind,
    pub growth: GrowthParams,
    pub gate: EnergyGate,
    pub motion: MotionShaping,
    pub lifecycle: LifecycleParams,
    /// Base colors (linear RGB, 0..1), one picked per trunk
    pub palette: Vec<[f32; 3]>,
}

/// Convert 0xRRGGBB to RGB floats
pub(crate) fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

impl GrowthParams {
    fn common() -> Self {
        Self {
            max_segments: 12_000,
            max_depth: 6,
            scale_range: (0.7, 1.5),
            strike_scale_range: (0.8, 1.2),
            trunk_count: (2, 4),
            trunk_length_base: 15.0,
            trunk_length_spread: 10.0,
            segment_size: 2.0,
            kink_rad: 0.4,
            early_stop_min_depth: 1,
            early_stop_per_depth: 0.12,
            base_spread_rad: 1.6,
            spread_decrement_rad: 0.2,
            length_decay: (0.6, 0.9),
            root_children: (2, 4),
            branch_odds: (0.3, 0.8),
            lightness_jitter: 0.05,
            tip_glow: 0.8,
        }
    }
}

impl LifecycleParams {
    fn common() -> Self {
        Self {
            threshold_range: (0.15, 0.40),
            threshold_jitter: 0.075,
            decay_rate: 2.5,
            cooldown_range: (0.2, 1.7),
            initial_cooldown_max: 2.0,
            master_toggle: false,
            master_fade_rate: 0.05,
            visibility_epsilon: 0.01,
        }
    }
}

impl UnitProfile {
    /// Full-spectrum lightning: bright mixed palette, treble-heavy trigger
    pub fn spectrum() -> Self {
        Self {
            kind: UnitKind::Spectrum,
            growth: GrowthParams::common(),
            gate: EnergyGate {
                floors: BandWeights::ZERO,
                weights: BandWeights::new(0.6, 0.8, 1.5),
                boost_power: 1,
                boost_gain: 1.0,
            },
            motion: MotionShaping {
                stretch_band: Band::Bass,
                stretch_floor: 0.0,
                stretch_gain: 0.15,
                jitter_band: Band::Treble,
                jitter_floor: 0.05,
                jitter_base: 0.1,
                jitter_gain: 4.0,
                jitter_random: 0.3,
            },
            lifecycle: LifecycleParams::common(),
            palette: vec![rgb(0xFF0044), rgb(0x00AAFF), rgb(0xAA00FF), rgb(0xFFFFFF)],
        }
    }

    /// Voice lightning: red palette, larger trees, mids only through a breath gate
    pub fn voice() -> Self {
        Self {
            kind: UnitKind::Voice,
            growth: GrowthParams {
                max_segments: 15_000,
                max_depth: 7,
                scale_range: (1.0, 1.8),
                trunk_count: (2, 3),
                trunk_length_base: 30.0,
                trunk_length_spread: 15.0,
                early_stop_min_depth: 2,
                early_stop_per_depth: 0.1,
                ..GrowthParams::common()
            },
            gate: EnergyGate {
                floors: BandWeights::new(0.0, 0.35, 0.0),
                weights: BandWeights::new(0.0, 1.0, 0.0),
                boost_power: 2,
                boost_gain: 3.0,
            },
            motion: MotionShaping {
                stretch_band: Band::Bass,
                stretch_floor: 0.2,
                stretch_gain: 0.15,
                jitter_band: Band::Mid,
                jitter_floor: 0.3,
                jitter_base: 0.0,
                jitter_gain: 2.0,
                jitter_random: 0.0,
            },
            lifecycle: LifecycleParams {
                threshold_range: (0.3, 0.3),
                threshold_jitter: 0.0,
                master_toggle: true,
                ..LifecycleParams::common()
            },
            palette: vec![rgb(0xFF0000), rgb(0xCC0000), rgb(0xFF4444), rgb(0x880000)],
        }
    }

    /// Validate configuration (capacities, ranges, palette)
    pub fn validate(&self) -> Result<(), ArcfieldError> {
        let g = &self.growth;
        let l = &self.lifecycle;

        let check = |ok: bool, what: &str| -> Result<(), ArcfieldError> {
            if ok {
                Ok(())
            } else {
                Err(ArcfieldError::InvalidConfig(format!(
                    "{:?} profile: {}",
                    self.kind, what
                )))
            }
        };

        check(g.max_segments > 0, "max_segments must be > 0")?;
        check(g.max_depth > 0, "max_depth must be > 0")?;
        check(g.segment_size > 0.0, "segment_size must be > 0")?;
        check(
            g.trunk_count.0 <= g.trunk_count.1,
            "trunk_count range is inverted",
        )?;
        check(
            g.root_children.0 <= g.root_children.1,
            "root_children range is inverted",
        )?;
        check(
            g.length_decay.0 > 0.0 && g.length_decay.0 <= g.length_decay.1 && g.length_decay.1 <= 1.0,
            "length_decay must lie in (0, 1]",
        )?;
        check(
            g.scale_range.0 > 0.0 && g.scale_range.0 <= g.scale_range.1,
            "scale_range must be positive",
        )?;
        check(g.trunk_length_base > 0.0, "trunk_length_base must be > 0")?;
        check(!self.palette.is_empty(), "palette must not be empty")?;
        check(self.gate.boost_power >= 1, "boost_power must be >= 1")?;
        check(l.decay_rate > 0.0, "decay_rate must be > 0")?;
        check(
            l.cooldown_range.0 >= 0.0 && l.cooldown_range.0 <= l.cooldown_range.1,
            "cooldown_range must be non-negative",
        )?;
        check(
            l.threshold_range.0 <= l.threshold_range.1,
            "threshold_range is inverted",
        )?;
        check(
            l.master_fade_rate > 0.0 && l.master_fade_rate <= 1.0,
            "master_fade_rate must lie in (0, 1]",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        assert!(UnitProfile::spectrum().validate().is_ok());
        assert!(UnitProfile::voice().validate().is_ok());
    }

    #[test]
    fn test_voice_profile_listens_to_mids() {
        let voice = UnitProfile::voice();
        assert_eq!(voice.gate.weights.get(Band::Mid), 1.0);
        assert_eq!(voice.gate.weights.get(Band::Bass), 0.0);
        assert!(voice.lifecycle.master_toggle);
        assert!(!UnitProfile::spectrum().lifecycle.master_toggle);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
        assert_eq!(rgb(0xFFFFFF), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut profile = UnitProfile::spectrum();
        profile.palette.clear();
        assert!(profile.validate().is_err());
    }
}
