//! Weighted nearest-site ownership with noise-field drift.

use glam::Vec2;
use rand::Rng;

use super::site::{create_sites_from, SeedSite, SiteId};
use crate::audio::AudioBands;
use crate::error::ArcfieldError;
use crate::noise::NoiseGenerator;
use crate::params::{DriftParams, TerritoryConfig};

/// Owns every seed site and answers "who owns this point"
#[derive(Debug, Clone)]
pub struct TerritoryPartition {
    sites: Vec<SeedSite>,
    drift: DriftParams,
    noise: NoiseGenerator,
}

impl TerritoryPartition {
    /// Build a partition over existing sites
    ///
    /// Fails with [`ArcfieldError::EmptyTerritory`] for an empty list, which
    /// keeps [`owner`](Self::owner) total.
    pub fn new(sites: Vec<SeedSite>, drift: DriftParams) -> Result<Self, ArcfieldError> {
        if sites.is_empty() {
            return Err(ArcfieldError::EmptyTerritory);
        }
        let noise = NoiseGenerator::new(drift.noise_seed);
        Ok(Self {
            sites,
            drift,
            noise,
        })
    }

    /// Create random sites from `config` and wrap them in a partition
    pub fn from_config<R: Rng + ?Sized>(
        config: &TerritoryConfig,
        rng: &mut R,
    ) -> Result<Self, ArcfieldError> {
        let sites = create_sites_from(config, rng)?;
        log::info!(
            "Territory: {} sites over {:.1}x{:.1}",
            sites.len(),
            config.world_width,
            config.world_height
        );
        Self::new(sites, config.drift.clone())
    }

    /// Recompute every site's position and weight for this frame
    ///
    /// Position depends only on the base position, `time`, and `audio`,
    /// never on previous frames: the same inputs always give the same layout.
    pub fn update(&mut self, time: f32, audio: &AudioBands) {
        let d = &self.drift;
        let warp = audio.bass * d.bass_warp + audio.treble * d.treble_warp;
        let z = (time * d.drift_speed + warp) as f64;

        for site in &mut self.sites {
            let sx = (site.base_position().x * d.scale) as f64;
            let sy = (site.base_position().y * d.scale) as f64;

            let nx = self.noise.sample_3d(sx, sy, z);
            let ny = self.noise.sample_3d(sx, sy, z + d.axis_offset as f64);

            site.current_position = site.base_position() + Vec2::new(nx, ny) * d.amplitude;
            site.current_weight =
                site.base_weight() + audio.energy(site.band()) * site.reactivity();
        }
    }

    /// Site owning `point`: smallest `distance / weight`, first one wins ties
    pub fn owner(&self, point: Vec2) -> SiteId {
        let mut best = &self.sites[0];
        let mut best_distance = best.weighted_distance(point);

        for site in &self.sites[1..] {
            let distance = site.weighted_distance(point);
            if distance < best_distance {
                best = site;
                best_distance = distance;
            }
        }

        best.id()
    }

    /// Whether `id` owns `point`
    pub fn owns(&self, id: SiteId, point: Vec2) -> bool {
        self.owner(point) == id
    }

    pub fn sites(&self) -> &[SeedSite] {
        &self.sites
    }

    /// Look up a site; ids created by [`create_sites`](super::create_sites) match their index
    pub fn site(&self, id: SiteId) -> Option<&SeedSite> {
        match self.sites.get(id.0 as usize) {
            Some(site) if site.id() == id => Some(site),
            _ => self.sites.iter().find(|s| s.id() == id),
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always false: construction rejects empty site lists
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn drift(&self) -> &DriftParams {
        &self.drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Band;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cross(west_weight: f32) -> TerritoryPartition {
        let sites = vec![
            SeedSite::pinned(SiteId(0), Vec2::new(-10.0, 0.0), west_weight, Band::Bass, 0.0),
            SeedSite::pinned(SiteId(1), Vec2::new(10.0, 0.0), 1.0, Band::Bass, 0.0),
            SeedSite::pinned(SiteId(2), Vec2::new(0.0, -10.0), 1.0, Band::Mid, 0.0),
            SeedSite::pinned(SiteId(3), Vec2::new(0.0, 10.0), 1.0, Band::Treble, 0.0),
        ];
        TerritoryPartition::new(sites, DriftParams::still()).unwrap()
    }

    fn sample_points() -> Vec<Vec2> {
        let mut points = Vec::new();
        for ix in -20..=20 {
            for iy in -20..=20 {
                points.push(Vec2::new(ix as f32 * 1.5, iy as f32 * 1.5));
            }
        }
        points
    }

    #[test]
    fn test_empty_partition_rejected() {
        assert!(matches!(
            TerritoryPartition::new(Vec::new(), DriftParams::default()),
            Err(ArcfieldError::EmptyTerritory)
        ));
    }

    #[test]
    fn test_four_site_cross() {
        let partition = cross(1.0);
        assert_eq!(partition.owner(Vec2::new(-5.0, 0.0)), SiteId(0));
        assert_eq!(partition.owner(Vec2::new(5.0, 0.0)), SiteId(1));

        // 15 / 4 = 3.75 beats 5 / 1
        let heavy = cross(4.0);
        assert_eq!(heavy.owner(Vec2::new(5.0, 0.0)), SiteId(0));
    }

    #[test]
    fn test_owner_total_and_deterministic() {
        let mut rng = SmallRng::seed_from_u64(11);
        let config = TerritoryConfig::default();
        let mut partition = TerritoryPartition::from_config(&config, &mut rng).unwrap();
        partition.update(4.2, &AudioBands::new(0.3, 0.6, 0.1));

        for point in sample_points() {
            let first = partition.owner(point);
            assert!(partition.site(first).is_some());
            assert_eq!(partition.owner(point), first);
        }
    }

    #[test]
    fn test_tie_goes_to_first_site() {
        let partition = cross(1.0);
        // Equidistant from all four sites
        assert_eq!(partition.owner(Vec2::ZERO), SiteId(0));

        let reversed = TerritoryPartition::new(
            partition.sites().iter().rev().cloned().collect(),
            DriftParams::still(),
        )
        .unwrap();
        assert_eq!(reversed.owner(Vec2::ZERO), SiteId(3));
    }

    #[test]
    fn test_heavier_site_never_loses_ground() {
        let points = sample_points();
        let mut previous: Option<Vec<bool>> = None;

        for weight in [1.0, 1.5, 2.0, 3.0, 4.0, 8.0] {
            let partition = cross(weight);
            let owned: Vec<bool> = points
                .iter()
                .map(|p| partition.owns(SiteId(0), *p))
                .collect();

            if let Some(prev) = &previous {
                for (before, now) in prev.iter().zip(&owned) {
                    assert!(!before || *now, "site lost a point when its weight grew");
                }
            }
            previous = Some(owned);
        }
    }

    #[test]
    fn test_weight_follows_assigned_band() {
        let sites = vec![
            SeedSite::pinned(SiteId(0), Vec2::ZERO, 2.0, Band::Bass, 10.0),
            SeedSite::pinned(SiteId(1), Vec2::ONE, 1.0, Band::Treble, 5.0),
        ];
        let mut partition = TerritoryPartition::new(sites, DriftParams::still()).unwrap();
        partition.update(0.0, &AudioBands::new(0.5, 1.0, 0.2));

        assert!((partition.sites()[0].current_weight() - 7.0).abs() < 1e-5);
        assert!((partition.sites()[1].current_weight() - 2.0).abs() < 1e-5);

        partition.update(1.0, &AudioBands::default());
        assert_eq!(partition.sites()[0].current_weight(), 2.0);
    }

    #[test]
    fn test_drift_is_bounded_and_stateless() {
        let mut rng = SmallRng::seed_from_u64(5);
        let config = TerritoryConfig::default();
        let mut a = TerritoryPartition::from_config(&config, &mut rng).unwrap();
        let mut b = a.clone();
        let audio = AudioBands::new(0.8, 0.2, 0.4);

        a.update(12.5, &audio);
        b.update(3.0, &AudioBands::default());
        b.update(12.5, &audio);

        assert_eq!(a.drift().amplitude, config.drift.amplitude);
        let amplitude = a.drift().amplitude;
        for (sa, sb) in a.sites().iter().zip(b.sites()) {
            assert_eq!(sa.current_position(), sb.current_position());
            let offset = sa.current_position() - sa.base_position();
            assert!(offset.x.abs() <= amplitude + 1e-3);
            assert!(offset.y.abs() <= amplitude + 1e-3);
        }
    }

    #[test]
    fn test_drift_moves_sites_over_time() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut partition =
            TerritoryPartition::from_config(&TerritoryConfig::default(), &mut rng).unwrap();

        partition.update(0.0, &AudioBands::default());
        let before: Vec<Vec2> = partition.sites().iter().map(|s| s.current_position()).collect();
        partition.update(10.0, &AudioBands::default());

        let moved = partition
            .sites()
            .iter()
            .zip(&before)
            .any(|(s, p)| s.current_position() != *p);
        assert!(moved);
    }

    #[test]
    fn test_still_drift_keeps_base_positions() {
        let mut partition = cross(1.0);
        assert_eq!(partition.drift().amplitude, 0.0);
        partition.update(99.0, &AudioBands::new(1.0, 1.0, 1.0));
        for site in partition.sites() {
            assert_eq!(site.current_position(), site.base_position());
        }
    }
}
