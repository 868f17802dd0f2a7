//! FFT analysis thread and utilities.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::AudioBands;
use crate::params::FFTConfig;

/// Samples kept in the shared buffer before old ones are dropped
const MAX_BACKLOG_WINDOWS: usize = 4;

/// Windowed FFT that reduces a block of samples to normalized band energies
///
/// Magnitudes are smoothed over time, converted to decibels and mapped
/// linearly from `[min_db, max_db]` onto `[0, 1]`, then averaged per band.
pub struct BandAnalyzer {
    config: FFTConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    levels: Vec<f32>,
}

impl BandAnalyzer {
    pub fn new(config: FFTConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();
        let bins = config.bin_count();

        Self {
            scratch: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; bins],
            levels: vec![0.0; bins],
            config,
            fft,
            window,
        }
    }

    pub fn config(&self) -> &FFTConfig {
        &self.config
    }

    /// Analyse the first `fft_size` samples (missing samples count as silence)
    pub fn analyze(&mut self, samples: &[f32]) -> AudioBands {
        let n = self.config.fft_size;

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let smoothing = self.config.smoothing;
        let db_span = self.config.max_db - self.config.min_db;
        for bin in 0..self.config.bin_count() {
            let magnitude = self.scratch[bin].norm() / n as f32;
            let smoothed = smoothing * self.smoothed[bin] + (1.0 - smoothing) * magnitude;
            self.smoothed[bin] = smoothed;

            self.levels[bin] = if smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                ((db - self.config.min_db) / db_span).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        AudioBands {
            bass: self.band_level(self.config.bass_bins()),
            mid: self.band_level(self.config.mid_bins()),
            treble: self.band_level(self.config.treble_bins()),
        }
    }

    fn band_level(&self, bins: Range<usize>) -> f32 {
        if bins.is_empty() {
            return 0.0;
        }
        let len = bins.len() as f32;
        self.levels[bins].iter().sum::<f32>() / len
    }
}

/// Spawn FFT analysis thread
///
/// Consumes `fft_buffer` with 50% overlap and publishes into `audio_bands`.
/// The thread exits if either lock is poisoned.
pub fn spawn_fft_thread(
    config: FFTConfig,
    fft_buffer: Arc<Mutex<Vec<f32>>>,
    audio_bands: Arc<Mutex<AudioBands>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let fft_size = config.fft_size;
        let interval = Duration::from_millis(config.update_interval_ms);
        let mut analyzer = BandAnalyzer::new(config);

        loop {
            thread::sleep(interval);

            let bands = {
                let Ok(mut fft_buf) = fft_buffer.lock() else {
                    log::error!("FFT buffer lock poisoned, stopping analysis");
                    return;
                };

                // Capture can outrun analysis; stay close to real time
                let backlog = fft_size * MAX_BACKLOG_WINDOWS;
                if fft_buf.len() > backlog {
                    let excess = fft_buf.len() - backlog;
                    fft_buf.drain(0..excess);
                }

                if fft_buf.len() < fft_size {
                    continue;
                }

                let bands = analyzer.analyze(&fft_buf[..fft_size]);

                // 50% overlap (drain half the buffer)
                fft_buf.drain(0..fft_size / 2);
                bands
            };

            match audio_bands.lock() {
                Ok(mut shared) => *shared = bands,
                Err(_) => {
                    log::error!("Audio band lock poisoned, stopping analysis");
                    return;
                }
            }
        }
    })
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
