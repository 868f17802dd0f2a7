//! Audio capture, synthesis, and FFT band analysis.
//!
//! The analysis thread publishes an [`AudioBands`] record; everything
//! downstream consumes it through [`AudioBands::sanitize`], the one place
//! where missing or malformed input is turned into usable numbers.

mod fft;
mod synthesis;
mod system;

// Re-export public types
pub use fft::{hann_window, BandAnalyzer};
pub use system::{AudioSource, AudioSystem};

/// Frequency band a seed site or shaping rule listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Bass,
    Mid,
    Treble,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Bass, Band::Mid, Band::Treble];
}

/// Normalized band energies in [0, 1] (shared between audio and render threads)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl AudioBands {
    pub fn new(bass: f32, mid: f32, treble: f32) -> Self {
        Self { bass, mid, treble }
    }

    /// Energy of a single band
    pub fn energy(&self, band: Band) -> f32 {
        match band {
            Band::Bass => self.bass,
            Band::Mid => self.mid,
            Band::Treble => self.treble,
        }
    }

    /// Turn a possibly missing or degenerate frame into a clean record
    ///
    /// `None` (analyser not started yet) becomes silence, non-finite
    /// fields become 0, everything else is clamped to [0, 1].
    pub fn sanitize(frame: Option<AudioBands>) -> AudioBands {
        let Some(frame) = frame else {
            return AudioBands::default();
        };
        let clean = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        AudioBands {
            bass: clean(frame.bass),
            mid: clean(frame.mid),
            treble: clean(frame.treble),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_frame_is_silence() {
        assert_eq!(AudioBands::sanitize(None), AudioBands::default());
    }

    #[test]
    fn test_degenerate_fields_are_cleaned() {
        let frame = AudioBands::new(f32::NAN, f32::INFINITY, -0.5);
        assert_eq!(AudioBands::sanitize(Some(frame)), AudioBands::default());

        let loud = AudioBands::new(3.0, 0.5, 1.0);
        assert_eq!(
            AudioBands::sanitize(Some(loud)),
            AudioBands::new(1.0, 0.5, 1.0)
        );
    }

    #[test]
    fn test_energy_by_band() {
        let bands = AudioBands::new(0.1, 0.2, 0.3);
        assert_eq!(bands.energy(Band::Bass), 0.1);
        assert_eq!(bands.energy(Band::Mid), 0.2);
        assert_eq!(bands.energy(Band::Treble), 0.3);
    }
}
