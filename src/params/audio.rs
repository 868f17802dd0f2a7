//! Audio analysis configuration and constants.

use std::ops::Range;

use crate::error::ArcfieldError;

/// FFT analysis configuration with frequency band mappings
#[derive(Debug, Clone)]
pub struct FFTConfig {
    /// Audio sample rate (Hz), overwritten with the device rate at startup
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    /// 512 gives 256 usable bins, ~86 Hz each at 44.1 kHz
    pub fft_size: usize,

    /// FFT update interval (milliseconds)
    pub update_interval_ms: u64,

    /// Bass frequency range (Hz), bins 0..10 at 44.1 kHz / 512
    pub bass_range_hz: (f32, f32),

    /// Mid frequency range (Hz), bins 10..100
    pub mid_range_hz: (f32, f32),

    /// Treble frequency range (Hz), bins 100..200
    pub treble_range_hz: (f32, f32),

    /// Magnitude mapped to 0.0 (decibels)
    pub min_db: f32,

    /// Magnitude mapped to 1.0 (decibels)
    pub max_db: f32,

    /// Per-bin temporal smoothing in [0, 1): 0 = none, 0.8 = heavy
    pub smoothing: f32,
}

impl Default for FFTConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 512,
            update_interval_ms: 16,
            bass_range_hz: (0.0, 870.0),
            mid_range_hz: (870.0, 8620.0),
            treble_range_hz: (8620.0, 17230.0),
            min_db: -100.0,
            max_db: -30.0,
            smoothing: 0.8,
        }
    }
}

impl FFTConfig {
    /// Convert frequency (Hz) to FFT bin index
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        ((hz * self.fft_size as f32) / self.sample_rate_hz as f32) as usize
    }

    /// Number of usable (non-mirrored) bins
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn bins(&self, range_hz: (f32, f32)) -> Range<usize> {
        let end = self.hz_to_bin(range_hz.1).min(self.bin_count());
        let start = self.hz_to_bin(range_hz.0).min(end);
        start..end
    }

    /// Get FFT bin range for bass frequencies
    pub fn bass_bins(&self) -> Range<usize> {
        self.bins(self.bass_range_hz)
    }

    /// Get FFT bin range for mid frequencies
    pub fn mid_bins(&self) -> Range<usize> {
        self.bins(self.mid_range_hz)
    }

    /// Get FFT bin range for treble frequencies
    pub fn treble_bins(&self) -> Range<usize> {
        self.bins(self.treble_range_hz)
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ArcfieldError> {
        if !self.fft_size.is_power_of_two() {
            return Err(ArcfieldError::InvalidConfig(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(ArcfieldError::InvalidConfig(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.min_db >= self.max_db {
            return Err(ArcfieldError::InvalidConfig(format!(
                "Decibel window is empty: {} .. {}",
                self.min_db, self.max_db
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ArcfieldError::InvalidConfig(format!(
                "Smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;
}
