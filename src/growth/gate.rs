//! Noise gates and audio shaping of growth units.

use rand::Rng;

use crate::audio::{AudioBands, Band};
use crate::params::{EnergyGate, MotionShaping};

/// Hard noise gate: values below `floor` are silence
pub fn gate(value: f32, floor: f32) -> f32 {
    if value < floor {
        0.0
    } else {
        value
    }
}

impl EnergyGate {
    /// Weighted, gated, boosted energy used against a unit's threshold
    pub fn trigger_energy(&self, audio: &AudioBands) -> f32 {
        let sum: f32 = Band::ALL
            .iter()
            .map(|&band| self.weights.get(band) * gate(audio.energy(band), self.floors.get(band)))
            .sum();
        self.boost_gain * sum.powi(self.boost_power)
    }
}

impl MotionShaping {
    /// Segment length multiplier for this frame (1 when the gate is closed)
    pub fn stretch_factor(&self, audio: &AudioBands) -> f32 {
        1.0 + gate(audio.energy(self.stretch_band), self.stretch_floor) * self.stretch_gain
    }

    /// Endpoint jitter amplitude for this frame, 0 when the gate is closed
    ///
    /// The random term is drawn only when the gate is open so a quiet
    /// frame consumes no randomness.
    pub fn jitter_strength<R: Rng + ?Sized>(&self, audio: &AudioBands, rng: &mut R) -> f32 {
        let energy = audio.energy(self.jitter_band);
        if energy < self.jitter_floor {
            return 0.0;
        }
        self.jitter_base + energy * self.jitter_gain + rng.gen::<f32>() * self.jitter_random
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UnitProfile;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_gate() {
        assert_eq!(gate(0.2, 0.35), 0.0);
        assert_eq!(gate(0.35, 0.35), 0.35);
        assert_eq!(gate(0.9, 0.0), 0.9);
    }

    #[test]
    fn test_spectrum_energy_is_linear_weighted_sum() {
        let gate = UnitProfile::spectrum().gate;
        let energy = gate.trigger_energy(&AudioBands::new(0.5, 0.5, 0.2));
        let expected = 0.6 * 0.5 + 0.8 * 0.5 + 1.5 * 0.2;
        assert!((energy - expected).abs() < 1e-5);
    }

    #[test]
    fn test_voice_breath_gate() {
        let gate = UnitProfile::voice().gate;

        // Below the mid floor: silent no matter how loud the rest is
        assert_eq!(gate.trigger_energy(&AudioBands::new(1.0, 0.3, 1.0)), 0.0);

        // 3 * 0.5^2 = 0.75
        let energy = gate.trigger_energy(&AudioBands::new(0.0, 0.5, 0.0));
        assert!((energy - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_stretch_factor() {
        let motion = UnitProfile::voice().motion;
        assert_eq!(motion.stretch_factor(&AudioBands::new(0.1, 0.0, 0.0)), 1.0);
        let stretched = motion.stretch_factor(&AudioBands::new(1.0, 0.0, 0.0));
        assert!((stretched - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_jitter_closed_gate_is_still() {
        let mut rng = SmallRng::seed_from_u64(1);
        let spectrum = UnitProfile::spectrum().motion;
        let voice = UnitProfile::voice().motion;

        assert_eq!(spectrum.jitter_strength(&AudioBands::new(1.0, 1.0, 0.01), &mut rng), 0.0);
        assert_eq!(voice.jitter_strength(&AudioBands::new(1.0, 0.2, 1.0), &mut rng), 0.0);
    }

    #[test]
    fn test_jitter_open_gate_bounds() {
        let mut rng = SmallRng::seed_from_u64(2);
        let spectrum = UnitProfile::spectrum().motion;
        for _ in 0..100 {
            let j = spectrum.jitter_strength(&AudioBands::new(0.0, 0.0, 0.5), &mut rng);
            assert!(j >= 0.1 + 0.5 * 4.0);
            assert!(j < 0.1 + 0.5 * 4.0 + 0.3 + 1e-6);
        }
        let voice = UnitProfile::voice().motion;
        let j = voice.jitter_strength(&AudioBands::new(0.0, 0.5, 0.0), &mut rng);
        assert!((j - 1.0).abs() < 1e-6);
    }
}
