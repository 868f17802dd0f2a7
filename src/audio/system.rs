//! Audio system managing capture or synthesis plus FFT analysis.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use glicol::Engine;
use std::fs::File;
use std::io::BufWriter;
use std::sync::{Arc, Mutex};
use std::thread;

use super::fft::spawn_fft_thread;
use super::synthesis::GLICOL_COMPOSITION;
use super::AudioBands;
use crate::error::ArcfieldError;
use crate::params::{audio_constants::BLOCK_SIZE, FFTConfig, RecordingConfig};

type SharedWavWriter = Arc<Mutex<hound::WavWriter<BufWriter<File>>>>;

/// Where the analysed signal comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    /// Default input device (microphone or loopback)
    Mic,
    /// Procedural Glicol composition on the default output device
    Synth,
    /// No device at all; bands stay at zero
    Silent,
}

/// Audio system managing capture/synthesis and FFT analysis
pub struct AudioSystem {
    /// Shared FFT frequency bands (thread-safe)
    audio_bands: Arc<Mutex<AudioBands>>,

    /// Which source is actually running
    source: AudioSource,

    /// Audio stream (kept alive)
    _stream: Option<cpal::Stream>,

    /// FFT analysis thread handle
    _fft_thread: Option<thread::JoinHandle<()>>,
}

impl AudioSystem {
    /// Create and start audio system with specified configuration
    pub fn new(
        source: AudioSource,
        fft_config: FFTConfig,
        recording_config: Option<&RecordingConfig>,
    ) -> Result<Self, ArcfieldError> {
        let fft_buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
        let host = cpal::default_host();

        let (stream, sample_rate) = match source {
            AudioSource::Mic => build_capture(&host, Arc::clone(&fft_buffer), recording_config)?,
            AudioSource::Synth => build_synth(&host, Arc::clone(&fft_buffer), recording_config)?,
            AudioSource::Silent => {
                log::info!("Audio: silent (no device opened)");
                return Ok(Self::silent());
            }
        };

        let fft_config = FFTConfig {
            sample_rate_hz: sample_rate as usize,
            ..fft_config
        };
        fft_config.validate()?;

        stream
            .play()
            .map_err(|e| ArcfieldError::Audio(format!("Failed to start audio stream: {}", e)))?;

        // Start FFT analysis thread
        let audio_bands = Arc::new(Mutex::new(AudioBands::default()));
        let fft_thread = spawn_fft_thread(fft_config, fft_buffer, Arc::clone(&audio_bands));

        Ok(Self {
            audio_bands,
            source,
            _stream: Some(stream),
            _fft_thread: Some(fft_thread),
        })
    }

    /// Audio system that never produces energy
    pub fn silent() -> Self {
        Self {
            audio_bands: Arc::new(Mutex::new(AudioBands::default())),
            source: AudioSource::Silent,
            _stream: None,
            _fft_thread: None,
        }
    }

    pub fn source(&self) -> AudioSource {
        self.source
    }

    /// Get current audio frequency bands (thread-safe)
    ///
    /// `None` when the analysis side is gone (poisoned lock).
    pub fn get_bands(&self) -> Option<AudioBands> {
        self.audio_bands.lock().ok().map(|bands| *bands)
    }
}

fn create_wav_writer(
    recording_config: Option<&RecordingConfig>,
    channels: u16,
    sample_rate: u32,
) -> Result<Option<SharedWavWriter>, ArcfieldError> {
    let Some(config) = recording_config else {
        return Ok(None);
    };
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let writer = hound::WavWriter::create(config.audio_path(), spec)
        .map_err(|e| ArcfieldError::Audio(format!("Failed to create WAV writer: {}", e)))?;
    Ok(Some(Arc::new(Mutex::new(writer))))
}

/// Open the default input device and feed its first channel to the FFT buffer
fn build_capture(
    host: &cpal::Host,
    fft_buffer: Arc<Mutex<Vec<f32>>>,
    recording_config: Option<&RecordingConfig>,
) -> Result<(cpal::Stream, u32), ArcfieldError> {
    let device = host
        .default_input_device()
        .ok_or_else(|| ArcfieldError::Audio("No audio input device found".to_string()))?;

    let config = device
        .default_input_config()
        .map_err(|e| ArcfieldError::Audio(format!("Failed to get input config: {}", e)))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    log::info!(
        "Audio input: {} @ {}Hz, {} channel(s), {:?}",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate,
        channels,
        config.sample_format()
    );

    let wav_writer = create_wav_writer(recording_config, 1, sample_rate)?;
    let stream_config: cpal::StreamConfig = config.clone().into();

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            capture_stream::<f32>(&device, &stream_config, channels, fft_buffer, wav_writer)
        }
        cpal::SampleFormat::I16 => {
            capture_stream::<i16>(&device, &stream_config, channels, fft_buffer, wav_writer)
        }
        cpal::SampleFormat::U16 => {
            capture_stream::<u16>(&device, &stream_config, channels, fft_buffer, wav_writer)
        }
        other => {
            return Err(ArcfieldError::Audio(format!(
                "Unsupported input sample format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| ArcfieldError::Audio(format!("Failed to build input stream: {}", e)))?;

    Ok((stream, sample_rate))
}

fn capture_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    fft_buffer: Arc<Mutex<Vec<f32>>>,
    wav_writer: Option<SharedWavWriter>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let Ok(mut fft_buf) = fft_buffer.lock() else {
                return;
            };
            let mut writer = wav_writer.as_ref().and_then(|w| w.lock().ok());

            for frame in data.chunks(channels) {
                let sample = f32::from_sample(frame[0]);
                fft_buf.push(sample);

                if let Some(ref mut w) = writer {
                    let _ = w.write_sample(sample);
                }
            }
        },
        |err| log::warn!("Audio input stream error: {}", err),
        None,
    )
}

/// Start the Glicol engine on the default output device
fn build_synth(
    host: &cpal::Host,
    fft_buffer: Arc<Mutex<Vec<f32>>>,
    recording_config: Option<&RecordingConfig>,
) -> Result<(cpal::Stream, u32), ArcfieldError> {
    let device = host
        .default_output_device()
        .ok_or_else(|| ArcfieldError::Audio("No audio output device found".to_string()))?;

    let config = device
        .default_output_config()
        .map_err(|e| ArcfieldError::Audio(format!("Failed to get audio config: {}", e)))?;

    let sample_rate = config.sample_rate().0;
    let channels = (config.channels() as usize).max(1);

    log::info!(
        "Audio synth: {} @ {}Hz",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate
    );

    let wav_writer = create_wav_writer(recording_config, 2, sample_rate)?;

    // Create Glicol engine
    let mut engine = Engine::<BLOCK_SIZE>::new();
    engine.set_sr(sample_rate as usize);
    engine.update_with_code(GLICOL_COMPOSITION);
    engine
        .update()
        .map_err(|e| ArcfieldError::Audio(format!("Glicol engine init failed: {:?}", e)))?;

    let engine = Arc::new(Mutex::new(engine));

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let (Ok(mut engine), Ok(mut fft_buf)) = (engine.lock(), fft_buffer.lock()) else {
                    data.fill(0.0);
                    return;
                };
                let mut writer = wav_writer.as_ref().and_then(|w| w.lock().ok());

                let frames_needed = data.len() / channels;
                let mut frame_idx = 0;

                // Generate multiple blocks if needed to fill the entire buffer
                while frame_idx < frames_needed {
                    let (buffers, _) = engine.next_block(vec![]);

                    let samples_to_copy = (frames_needed - frame_idx).min(BLOCK_SIZE);

                    for i in 0..samples_to_copy {
                        // Safety limiter: hard clip to ±0.5 to prevent ear damage
                        let left = buffers[0][i].clamp(-0.5, 0.5);
                        let right = buffers[1][i].clamp(-0.5, 0.5);

                        let out_idx = (frame_idx + i) * channels;
                        data[out_idx] = left;
                        for c in 1..channels {
                            data[out_idx + c] = right;
                        }

                        fft_buf.push(left); // Accumulate for FFT analysis

                        if let Some(ref mut w) = writer {
                            let _ = w.write_sample(left);
                            let _ = w.write_sample(right);
                        }
                    }

                    frame_idx += samples_to_copy;
                }
            },
            |err| log::warn!("Audio output stream error: {}", err),
            None,
        )
        .map_err(|e| ArcfieldError::Audio(format!("Failed to build audio stream: {}", e)))?;

    Ok((stream, sample_rate))
}
