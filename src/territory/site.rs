//! Seed sites and their random bootstrap.

use glam::Vec2;
use rand::Rng;

use crate::audio::Band;
use crate::error::ArcfieldError;
use crate::params::TerritoryConfig;
use crate::rng::uniform;

/// Stable identifier of a seed site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

/// A moving, weighted point that owns one cell of the territory
#[derive(Debug, Clone)]
pub struct SeedSite {
    id: SiteId,
    base_position: Vec2,
    base_weight: f32,
    band: Band,
    reactivity: f32,
    pub(super) current_position: Vec2,
    pub(super) current_weight: f32,
}

impl SeedSite {
    /// Site with explicit values, resting on its base position
    ///
    /// `base_weight` must be positive; the partition divides by it.
    pub fn pinned(id: SiteId, position: Vec2, base_weight: f32, band: Band, reactivity: f32) -> Self {
        debug_assert!(base_weight > 0.0, "site weight must be positive");
        Self {
            id,
            base_position: position,
            base_weight,
            band,
            reactivity,
            current_position: position,
            current_weight: base_weight,
        }
    }

    pub fn id(&self) -> SiteId {
        self.id
    }

    pub fn base_position(&self) -> Vec2 {
        self.base_position
    }

    pub fn current_position(&self) -> Vec2 {
        self.current_position
    }

    pub fn base_weight(&self) -> f32 {
        self.base_weight
    }

    pub fn current_weight(&self) -> f32 {
        self.current_weight
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn reactivity(&self) -> f32 {
        self.reactivity
    }

    /// Weighted distance used for ownership
    pub fn weighted_distance(&self, point: Vec2) -> f32 {
        point.distance(self.current_position) / self.current_weight
    }
}

/// Create `count` sites spread uniformly over a `width` x `height` rectangle
/// centred on the origin, with the default weight and reactivity ranges
pub fn create_sites<R: Rng + ?Sized>(
    count: usize,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Result<Vec<SeedSite>, ArcfieldError> {
    let config = TerritoryConfig {
        site_count: count,
        world_width: width,
        world_height: height,
        ..TerritoryConfig::default()
    };
    create_sites_from(&config, rng)
}

/// Create sites from a full territory configuration
pub fn create_sites_from<R: Rng + ?Sized>(
    config: &TerritoryConfig,
    rng: &mut R,
) -> Result<Vec<SeedSite>, ArcfieldError> {
    config.validate()?;

    let mut sites = Vec::with_capacity(config.site_count);
    for i in 0..config.site_count {
        let x = (rng.gen::<f32>() - 0.5) * config.world_width;
        let y = (rng.gen::<f32>() - 0.5) * config.world_height;
        let base_weight = uniform(rng, config.weight_range);
        let band = Band::ALL[rng.gen_range(0..Band::ALL.len())];
        let reactivity = uniform(rng, config.reactivity_range);

        sites.push(SeedSite::pinned(
            SiteId(i as u32),
            Vec2::new(x, y),
            base_weight,
            band,
            reactivity,
        ));
    }

    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_sites_ranges() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sites = create_sites(200, 160.0, 90.0, &mut rng).unwrap();

        assert_eq!(sites.len(), 200);
        for (i, site) in sites.iter().enumerate() {
            assert_eq!(site.id(), SiteId(i as u32));
            let p = site.base_position();
            assert!(p.x >= -80.0 && p.x < 80.0);
            assert!(p.y >= -45.0 && p.y < 45.0);
            assert!(site.base_weight() >= 1.0 && site.base_weight() < 4.0);
            assert!(site.reactivity() >= 5.0 && site.reactivity() < 15.0);
            assert_eq!(site.current_position(), p);
            assert_eq!(site.current_weight(), site.base_weight());
        }
    }

    #[test]
    fn test_create_sites_uses_every_band() {
        let mut rng = SmallRng::seed_from_u64(3);
        let sites = create_sites(100, 10.0, 10.0, &mut rng).unwrap();
        for band in Band::ALL {
            assert!(sites.iter().any(|s| s.band() == band));
        }
    }

    #[test]
    fn test_zero_sites_fail_fast() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            create_sites(0, 100.0, 100.0, &mut rng),
            Err(ArcfieldError::EmptyTerritory)
        ));
    }

    #[test]
    fn test_weighted_distance() {
        let site = SeedSite::pinned(SiteId(0), Vec2::new(-10.0, 0.0), 4.0, Band::Bass, 0.0);
        assert!((site.weighted_distance(Vec2::new(5.0, 0.0)) - 3.75).abs() < 1e-6);
    }
}
