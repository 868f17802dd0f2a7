//! The whole piece: one territory, one growth unit per seed site.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::audio::AudioBands;
use crate::error::ArcfieldError;
use crate::growth::GrowthUnit;
use crate::params::{InstallationConfig, UnitKind};
use crate::rng::seeded_rng;
use crate::territory::TerritoryPartition;

/// Territory plus units, advanced once per rendered frame
#[derive(Debug)]
pub struct Installation {
    partition: TerritoryPartition,
    units: Vec<GrowthUnit>,
    max_dt_s: f32,
    seed: u64,
}

impl Installation {
    /// Build sites, partition, and one unit per site
    ///
    /// With `seed` the whole layout and every unit's randomness is
    /// reproducible; without it a fresh seed is drawn and logged.
    pub fn new(config: &InstallationConfig, seed: Option<u64>) -> Result<Self, ArcfieldError> {
        config.validate()?;

        let (mut rng, seed) = seeded_rng(seed);
        let partition = TerritoryPartition::from_config(&config.territory, &mut rng)?;

        let units = partition
            .sites()
            .iter()
            .enumerate()
            .map(|(index, site)| {
                let unit_rng = SmallRng::seed_from_u64(rng.gen());
                GrowthUnit::new(site.id(), config.profile_for(index), unit_rng)
                    .map(|unit| unit.with_anchor(config.anchor))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let voice = units.iter().filter(|u| u.kind() == UnitKind::Voice).count();
        log::info!(
            "Installation ready: {} units ({} voice), seed {}",
            units.len(),
            voice,
            seed
        );

        Ok(Self {
            partition,
            units,
            max_dt_s: config.max_dt_s,
            seed,
        })
    }

    /// Advance one frame
    ///
    /// The partition moves first so every unit checks ownership against
    /// this frame's site positions. `dt` is clamped to `[0, max_dt_s]`.
    pub fn update(&mut self, time: f32, dt: f32, audio: Option<AudioBands>) {
        let audio = AudioBands::sanitize(audio);
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.max_dt_s)
        } else {
            0.0
        };

        self.partition.update(time, &audio);
        for unit in &mut self.units {
            unit.update(&self.partition, &audio, dt);
        }
    }

    /// Fade every voice unit in or out
    pub fn set_voice_active(&mut self, active: bool) {
        for unit in &mut self.units {
            if unit.kind() == UnitKind::Voice {
                unit.set_active(active);
            }
        }
    }

    /// Whether any voice unit is currently switched on
    pub fn voice_active(&self) -> bool {
        self.units
            .iter()
            .any(|u| u.kind() == UnitKind::Voice && u.is_active())
    }

    pub fn units(&self) -> &[GrowthUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [GrowthUnit] {
        &mut self.units
    }

    pub fn partition(&self) -> &TerritoryPartition {
        &self.partition
    }

    /// Master seed in use
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
