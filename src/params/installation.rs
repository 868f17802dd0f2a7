//! Top-level installation configuration.

use super::growth::UnitProfile;
use super::territory::TerritoryConfig;
use crate::error::ArcfieldError;
use crate::growth::AnchorPoint;

/// Everything needed to build an [`Installation`](crate::installation::Installation)
#[derive(Debug, Clone)]
pub struct InstallationConfig {
    /// Seed sites and their drift
    pub territory: TerritoryConfig,

    /// Profile for ordinary units
    pub spectrum: UnitProfile,

    /// Profile for voice units
    pub voice: UnitProfile,

    /// Every n-th site gets a voice unit instead of a spectrum unit (0 = none)
    pub voice_every: usize,

    /// Site position every unit grows from
    pub anchor: AnchorPoint,

    /// Largest time step fed to the units (seconds), absorbs frame hitches
    pub max_dt_s: f32,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        Self {
            territory: TerritoryConfig::default(),
            spectrum: UnitProfile::spectrum(),
            voice: UnitProfile::voice(),
            voice_every: 0,
            anchor: AnchorPoint::Current,
            max_dt_s: 0.1,
        }
    }
}

impl InstallationConfig {
    /// Validate every nested configuration
    pub fn validate(&self) -> Result<(), ArcfieldError> {
        self.territory.validate()?;
        self.spectrum.validate()?;
        if self.voice_every > 0 {
            self.voice.validate()?;
        }
        if !(self.max_dt_s > 0.0) {
            return Err(ArcfieldError::InvalidConfig(format!(
                "max_dt_s must be > 0, got {}",
                self.max_dt_s
            )));
        }
        Ok(())
    }

    /// Profile assigned to the site at `index`
    pub fn profile_for(&self, index: usize) -> &UnitProfile {
        if self.voice_every > 0 && index % self.voice_every == self.voice_every - 1 {
            &self.voice
        } else {
            &self.spectrum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UnitKind;

    #[test]
    fn test_profile_assignment() {
        let config = InstallationConfig {
            voice_every: 3,
            ..InstallationConfig::default()
        };

        let kinds: Vec<UnitKind> = (0..6).map(|i| config.profile_for(i).kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Spectrum,
                UnitKind::Spectrum,
                UnitKind::Voice,
                UnitKind::Spectrum,
                UnitKind::Spectrum,
                UnitKind::Voice,
            ]
        );
    }

    #[test]
    fn test_no_voice_units_by_default() {
        let config = InstallationConfig::default();
        assert!((0..25).all(|i| config.profile_for(i).kind == UnitKind::Spectrum));
    }
}
