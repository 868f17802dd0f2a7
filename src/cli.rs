//! Command-line argument parsing.

use clap::Parser;

use crate::audio::AudioSource;
use crate::error::ArcfieldError;
use crate::growth::AnchorPoint;
use crate::params::{InstallationConfig, RecordingConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "arcfield")]
#[command(about = "Audio-reactive lightning over a drifting territory map", long_about = None)]
pub struct Args {
    /// Number of seed sites (one lightning unit each)
    #[arg(long, value_name = "COUNT", default_value = "25")]
    pub sites: usize,

    /// Master random seed (omit for a fresh one, logged at startup)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Audio source: mic (default), synth, silent
    #[arg(long, value_name = "SOURCE", default_value = "mic")]
    pub source: String,

    /// Every n-th site gets a voice unit, toggled with V (0 = none)
    #[arg(long, value_name = "N", default_value = "0")]
    pub voice_every: usize,

    /// Site position units grow from: current (drifting) or base (fixed origin)
    #[arg(long, value_name = "ANCHOR", default_value = "current")]
    pub anchor: String,

    /// Record to PNG frames + WAV (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Parse audio source from command-line arguments
    pub fn parse_source(&self) -> AudioSource {
        match self.source.to_lowercase().as_str() {
            "mic" => AudioSource::Mic,
            "synth" => AudioSource::Synth,
            "silent" => AudioSource::Silent,
            other => {
                log::warn!("Unknown audio source '{}', using mic", other);
                AudioSource::Mic
            }
        }
    }

    /// Parse anchor point from command-line arguments
    pub fn parse_anchor(&self) -> AnchorPoint {
        match self.anchor.to_lowercase().as_str() {
            "current" => AnchorPoint::Current,
            "base" => AnchorPoint::Base,
            other => {
                log::warn!("Unknown anchor '{}', using current", other);
                AnchorPoint::Current
            }
        }
    }

    /// Installation configuration with command-line overrides applied
    ///
    /// Sites are spread over the camera's view so every part of the screen
    /// belongs to some site.
    pub fn installation_config(&self, render: &RenderConfig) -> InstallationConfig {
        let mut config = InstallationConfig {
            voice_every: self.voice_every,
            anchor: self.parse_anchor(),
            ..InstallationConfig::default()
        };
        let (width, height) = render.world_extent();
        config.territory.site_count = self.sites;
        config.territory.world_width = width;
        config.territory.world_height = height;
        config
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> Result<Option<RecordingConfig>, ArcfieldError> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        if !(duration > 0.0) {
            return Err(ArcfieldError::InvalidConfig(format!(
                "record duration must be > 0, got {}",
                duration
            )));
        }

        let config = RecordingConfig::new(duration);

        // Create output directories
        std::fs::create_dir_all(config.frames_dir())?;

        Ok(Some(config))
    }
}
