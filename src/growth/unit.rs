//! One lightning unit bound to a seed site.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use super::buffers::{LineBuffers, TipTable};
use super::skeleton::{SegmentParent, Skeleton};
use crate::audio::AudioBands;
use crate::error::ArcfieldError;
use crate::params::{UnitKind, UnitProfile};
use crate::rng::{symmetric, uniform};
use crate::territory::{SiteId, TerritoryPartition};

/// A clipped segment is retried at this fraction of its length before being cut
const CLIP_RETRY_FRACTION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Dark, counting down the cooldown or waiting for a trigger
    Idle,
    /// Visible, opacity decaying
    Flashing,
}

/// Which site position a unit grows from and checks ownership of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorPoint {
    /// The site's drifting position
    #[default]
    Current,
    /// The site's fixed origin; the unit goes dark whenever a drifting
    /// border passes over it
    Base,
}

/// Audio-triggered lightning owned by one seed site
#[derive(Debug)]
pub struct GrowthUnit {
    site: SiteId,
    profile: UnitProfile,
    anchor: AnchorPoint,

    // Drawn once at construction
    scale: f32,
    threshold: f32,

    state: LifecycleState,
    flash_opacity: f32,
    cooldown_remaining: f32,

    // Master overlay (units without a master toggle stay at 1)
    active: bool,
    master_alpha: f32,

    skeleton: Skeleton,
    buffers: LineBuffers,
    tips: TipTable,
    rng: SmallRng,
}

impl GrowthUnit {
    /// Create a unit for `site` and generate its first skeleton
    pub fn new(site: SiteId, profile: &UnitProfile, mut rng: SmallRng) -> Result<Self, ArcfieldError> {
        profile.validate()?;

        let scale = uniform(&mut rng, profile.growth.scale_range);
        let threshold = uniform(&mut rng, profile.lifecycle.threshold_range);
        let cooldown_remaining = rng.gen::<f32>() * profile.lifecycle.initial_cooldown_max;
        let has_master = profile.lifecycle.master_toggle;
        let capacity = profile.growth.max_segments;

        let mut unit = Self {
            site,
            profile: profile.clone(),
            anchor: AnchorPoint::default(),
            scale,
            threshold,
            state: LifecycleState::Idle,
            flash_opacity: 0.0,
            cooldown_remaining,
            active: !has_master,
            master_alpha: if has_master { 0.0 } else { 1.0 },
            skeleton: Skeleton::new(),
            buffers: LineBuffers::new(capacity),
            tips: TipTable::new(capacity),
            rng,
        };
        unit.regenerate();
        Ok(unit)
    }

    /// Grow from a different site position
    pub fn with_anchor(mut self, anchor: AnchorPoint) -> Self {
        self.anchor = anchor;
        self
    }

    /// Advance one frame: master fade, territory check, lifecycle, geometry
    ///
    /// `partition` must already be updated for this frame.
    pub fn update(&mut self, partition: &TerritoryPartition, audio: &AudioBands, dt: f32) {
        let lifecycle = &self.profile.lifecycle;

        if lifecycle.master_toggle {
            let target = if self.active { 1.0 } else { 0.0 };
            self.master_alpha += (target - self.master_alpha) * lifecycle.master_fade_rate;
            if !self.active && self.master_alpha < lifecycle.visibility_epsilon {
                return;
            }
        }

        let Some(anchor) = self.anchor_position(partition) else {
            self.go_dark();
            return;
        };
        if !partition.owns(self.site, anchor) {
            self.go_dark();
            return;
        }

        self.step_lifecycle(audio, dt);

        if self.opacity() < self.profile.lifecycle.visibility_epsilon {
            return;
        }
        self.project(partition, audio, anchor);
    }

    fn anchor_position(&self, partition: &TerritoryPartition) -> Option<Vec2> {
        let site = partition.site(self.site)?;
        Some(match self.anchor {
            AnchorPoint::Current => site.current_position(),
            AnchorPoint::Base => site.base_position(),
        })
    }

    /// Out of territory: invisible, keeps the cached skeleton
    fn go_dark(&mut self) {
        self.flash_opacity = 0.0;
        self.state = LifecycleState::Idle;
    }

    fn step_lifecycle(&mut self, audio: &AudioBands, dt: f32) {
        match self.state {
            LifecycleState::Flashing => {
                self.flash_opacity -= self.profile.lifecycle.decay_rate * dt;
                if self.flash_opacity <= 0.0 {
                    self.flash_opacity = 0.0;
                    self.state = LifecycleState::Idle;
                    self.cooldown_remaining =
                        uniform(&mut self.rng, self.profile.lifecycle.cooldown_range);
                    log::debug!(
                        "Unit {:?} cooling down for {:.2}s",
                        self.site,
                        self.cooldown_remaining
                    );
                }
            }
            LifecycleState::Idle if self.cooldown_remaining > 0.0 => {
                self.cooldown_remaining -= dt;
            }
            LifecycleState::Idle => {
                let energy = self.profile.gate.trigger_energy(audio);
                let jitter = symmetric(&mut self.rng, self.profile.lifecycle.threshold_jitter);
                if energy > self.threshold + jitter {
                    self.ignite();
                    log::debug!(
                        "Unit {:?} ignited at energy {:.3} ({} segments)",
                        self.site,
                        energy,
                        self.skeleton.len()
                    );
                }
            }
        }
    }

    fn ignite(&mut self) {
        self.state = LifecycleState::Flashing;
        self.flash_opacity = 1.0;
        self.regenerate();
    }

    /// Replace the skeleton with a fresh random one and refresh its colors
    pub fn regenerate(&mut self) {
        let growth = &self.profile.growth;
        self.skeleton = Skeleton::generate(growth, self.scale, &self.profile.palette, &mut self.rng);
        self.buffers
            .write_colors(self.skeleton.render_colors(growth.max_depth, growth.tip_glow));
    }

    /// Write this frame's line geometry, clipped to the unit's territory
    ///
    /// Segments are visited parent-first. A segment whose end leaves the
    /// territory is retried at a tenth of its length; if that also leaves,
    /// it and its whole subtree collapse to zero-length entries.
    pub fn project(&mut self, partition: &TerritoryPartition, audio: &AudioBands, anchor: Vec2) {
        let stretch = self.profile.motion.stretch_factor(audio);
        let jitter = self.profile.motion.jitter_strength(audio, &mut self.rng);

        self.tips.next_pass();
        self.buffers.begin();

        for segment in self.skeleton.segments() {
            let start = match segment.parent {
                SegmentParent::Root => Some(anchor),
                SegmentParent::Segment(parent) => self.tips.get(parent.index()),
            };
            let Some(start) = start else {
                self.buffers.write_degenerate();
                continue;
            };

            let length = segment.length * stretch;
            let mut end = start + segment.direction * length;
            if jitter > 0.0 {
                end += Vec2::new(
                    symmetric(&mut self.rng, jitter / 2.0),
                    symmetric(&mut self.rng, jitter / 2.0),
                );
            }

            if !partition.owns(self.site, end) {
                end = start + segment.direction * (length * CLIP_RETRY_FRACTION);
                if !partition.owns(self.site, end) {
                    self.buffers.write_degenerate();
                    continue;
                }
            }

            self.tips.insert(segment.id.index(), end);
            self.buffers.write_segment(start, end);
        }

        self.buffers.finish();
    }

    /// Fade the unit in or out (units with a master toggle only)
    ///
    /// Turning on also ignites a fresh flash.
    pub fn set_active(&mut self, active: bool) {
        if !self.profile.lifecycle.master_toggle || self.active == active {
            return;
        }
        self.active = active;
        log::info!(
            "{:?} unit {:?} fading {}",
            self.profile.kind,
            self.site,
            if active { "in" } else { "out" }
        );
        if active {
            self.ignite();
        }
    }

    /// Override the remaining cooldown (scripted sequences, tests)
    pub fn set_cooldown(&mut self, seconds: f32) {
        self.cooldown_remaining = seconds;
    }

    /// Final opacity handed to the renderer
    pub fn opacity(&self) -> f32 {
        self.flash_opacity * self.master_alpha
    }

    pub fn is_visible(&self) -> bool {
        self.opacity() >= self.profile.lifecycle.visibility_epsilon
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn kind(&self) -> UnitKind {
        self.profile.kind
    }

    pub fn anchor(&self) -> AnchorPoint {
        self.anchor
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn flash_opacity(&self) -> f32 {
        self.flash_opacity
    }

    pub fn master_alpha(&self) -> f32 {
        self.master_alpha
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn buffers(&self) -> &LineBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut LineBuffers {
        &mut self.buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Band;
    use crate::params::DriftParams;
    use crate::territory::SeedSite;
    use rand::SeedableRng;

    const DT: f32 = 0.016;

    fn loud() -> AudioBands {
        AudioBands::new(1.0, 1.0, 1.0)
    }

    fn quiet() -> AudioBands {
        AudioBands::default()
    }

    fn lone_site() -> TerritoryPartition {
        let site = SeedSite::pinned(SiteId(0), Vec2::ZERO, 1.0, Band::Bass, 0.0);
        TerritoryPartition::new(vec![site], DriftParams::still()).unwrap()
    }

    fn small_profile(max_segments: usize) -> UnitProfile {
        let mut profile = UnitProfile::spectrum();
        profile.growth.max_segments = max_segments;
        profile
    }

    fn unit(site: u32, profile: &UnitProfile, seed: u64) -> GrowthUnit {
        GrowthUnit::new(SiteId(site), profile, SmallRng::seed_from_u64(seed)).unwrap()
    }

    fn is_degenerate(positions: &[[f32; 3]], segment: usize) -> bool {
        positions[segment * 2] == [0.0; 3] && positions[segment * 2 + 1] == [0.0; 3]
    }

    #[test]
    fn test_construction_draws_from_profile_ranges() {
        let profile = UnitProfile::spectrum();
        for seed in 0..20 {
            let u = unit(0, &profile, seed);
            assert!(u.scale() >= 0.7 && u.scale() < 1.5);
            assert!(u.threshold() >= 0.15 && u.threshold() < 0.40);
            assert!(u.cooldown_remaining() >= 0.0 && u.cooldown_remaining() < 2.0);
            assert_eq!(u.state(), LifecycleState::Idle);
            assert!(!u.skeleton().is_empty());
            assert_eq!(u.buffers().positions().len(), 2 * profile.growth.max_segments);
        }
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut profile = UnitProfile::spectrum();
        profile.growth.max_segments = 0;
        assert!(GrowthUnit::new(SiteId(0), &profile, SmallRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_lifecycle_ignite_decay_cooldown() {
        let partition = lone_site();
        let mut u = unit(0, &UnitProfile::spectrum(), 3);
        u.set_cooldown(0.0);

        u.update(&partition, &loud(), DT);
        assert_eq!(u.state(), LifecycleState::Flashing);
        assert_eq!(u.flash_opacity(), 1.0);

        let mut previous = u.flash_opacity();
        let mut ticks = 0;
        while u.state() == LifecycleState::Flashing {
            u.update(&partition, &loud(), DT);
            let opacity = u.flash_opacity();
            assert!(opacity < previous);
            if u.state() == LifecycleState::Flashing {
                assert!((previous - opacity - 2.5 * DT).abs() < 1e-4);
            }
            previous = opacity;
            ticks += 1;
            assert!(ticks < 100, "flash never ended");
        }

        assert_eq!(u.flash_opacity(), 0.0);
        assert!(u.cooldown_remaining() >= 0.2 && u.cooldown_remaining() < 1.7);
    }

    #[test]
    fn test_cooldown_blocks_trigger() {
        let partition = lone_site();
        let mut u = unit(0, &UnitProfile::spectrum(), 4);
        u.set_cooldown(0.5);

        u.update(&partition, &loud(), DT);
        assert_eq!(u.state(), LifecycleState::Idle);
        assert!((u.cooldown_remaining() - (0.5 - DT)).abs() < 1e-6);
    }

    #[test]
    fn test_silence_never_ignites() {
        let partition = lone_site();
        for profile in [UnitProfile::spectrum(), UnitProfile::voice()] {
            let mut u = unit(0, &profile, 5);
            for _ in 0..1000 {
                u.update(&partition, &quiet(), DT);
                assert_eq!(u.state(), LifecycleState::Idle);
            }
        }
    }

    #[test]
    fn test_out_of_territory_forces_dark() {
        let alone = lone_site();
        let mut u = unit(0, &UnitProfile::spectrum(), 6);
        u.set_cooldown(0.0);
        u.update(&alone, &loud(), DT);
        assert!(u.is_visible());

        // A coincident site listed first wins every tie, including our own position
        let shadowed = TerritoryPartition::new(
            vec![
                SeedSite::pinned(SiteId(1), Vec2::ZERO, 1.0, Band::Bass, 0.0),
                SeedSite::pinned(SiteId(0), Vec2::ZERO, 1.0, Band::Bass, 0.0),
            ],
            DriftParams::still(),
        )
        .unwrap();

        u.update(&shadowed, &loud(), DT);
        assert_eq!(u.opacity(), 0.0);
        assert_eq!(u.state(), LifecycleState::Idle);
        assert!(!u.skeleton().is_empty());

        u.set_cooldown(0.0);
        for _ in 0..10 {
            u.update(&shadowed, &loud(), DT);
            assert_eq!(u.opacity(), 0.0);
        }
    }

    #[test]
    fn test_missing_site_is_dark() {
        let partition = lone_site();
        let mut u = unit(7, &UnitProfile::spectrum(), 7);
        u.set_cooldown(0.0);
        u.update(&partition, &loud(), DT);
        assert_eq!(u.opacity(), 0.0);
    }

    #[test]
    fn test_base_anchor_follows_drifting_borders() {
        let drift = DriftParams::default();
        let sites = vec![
            SeedSite::pinned(SiteId(0), Vec2::new(-10.0, 0.0), 1.0, Band::Bass, 0.0),
            SeedSite::pinned(SiteId(1), Vec2::new(10.0, 0.0), 1.0, Band::Bass, 100.0),
        ];
        let mut partition = TerritoryPartition::new(sites, drift).unwrap();
        let audio = AudioBands::new(1.0, 0.0, 0.0);

        // Find a moment where the drifting neighbour covers site 0's origin
        let shadowed_time = (0..200).map(|i| i as f32 * 0.25).find(|&t| {
            partition.update(t, &audio);
            !partition.owns(SiteId(0), Vec2::new(-10.0, 0.0))
        });
        let time = shadowed_time.expect("heavy neighbour never covered the origin");
        partition.update(time, &audio);

        let profile = UnitProfile::spectrum();
        let mut current = unit(0, &profile, 8);
        let mut base = unit(0, &profile, 8).with_anchor(AnchorPoint::Base);
        current.set_cooldown(0.0);
        base.set_cooldown(0.0);

        current.update(&partition, &loud(), DT);
        base.update(&partition, &loud(), DT);

        assert_eq!(current.state(), LifecycleState::Flashing);
        assert_eq!(base.opacity(), 0.0);
    }

    #[test]
    fn test_shrinking_skeleton_leaves_zero_tail() {
        let partition = lone_site();
        let mut u = unit(0, &small_profile(3000), 9);

        u.regenerate();
        let first = u.skeleton().len();
        u.project(&partition, &quiet(), Vec2::ZERO);

        let mut attempts = 0;
        while u.skeleton().len() >= first {
            u.regenerate();
            attempts += 1;
            assert!(attempts < 200, "never drew a smaller skeleton");
        }
        u.project(&partition, &quiet(), Vec2::ZERO);

        let live = u.skeleton().len();
        assert!(u.buffers().positions()[live * 2..]
            .iter()
            .all(|p| *p == [0.0; 3]));
    }

    #[test]
    fn test_projection_stays_in_territory() {
        let partition = TerritoryPartition::new(
            vec![
                SeedSite::pinned(SiteId(0), Vec2::new(-4.0, 0.0), 1.0, Band::Bass, 0.0),
                SeedSite::pinned(SiteId(1), Vec2::new(4.0, 0.0), 1.0, Band::Bass, 0.0),
            ],
            DriftParams::still(),
        )
        .unwrap();

        let mut clipped = 0;
        for seed in 0..10 {
            let mut u = unit(0, &small_profile(2000), seed);
            u.project(&partition, &loud(), Vec2::new(-4.0, 0.0));

            let positions = u.buffers().positions();
            for (i, segment) in u.skeleton().segments().iter().enumerate() {
                if is_degenerate(positions, i) {
                    clipped += 1;
                    continue;
                }
                let end = Vec2::new(positions[i * 2 + 1][0], positions[i * 2 + 1][1]);
                assert!(partition.owns(SiteId(0), end));

                // A drawn segment always hangs off a drawn parent
                if let SegmentParent::Segment(parent) = segment.parent {
                    assert!(!is_degenerate(positions, parent.index()));
                }
            }
        }
        // The border at x = 0 is close enough that something gets cut
        assert!(clipped > 0);
    }

    #[test]
    fn test_quiet_projection_is_still() {
        let partition = lone_site();
        let mut u = unit(0, &small_profile(500), 10);

        u.project(&partition, &quiet(), Vec2::ZERO);
        let first = u.buffers().positions().to_vec();
        u.project(&partition, &quiet(), Vec2::ZERO);
        assert_eq!(first, u.buffers().positions());
    }

    #[test]
    fn test_colors_follow_skeleton() {
        let mut u = unit(0, &small_profile(800), 11);
        u.regenerate();

        let growth = &UnitProfile::spectrum().growth;
        let expected: Vec<[f32; 3]> = u
            .skeleton()
            .render_colors(growth.max_depth, growth.tip_glow)
            .collect();
        for (i, color) in expected.iter().enumerate() {
            assert_eq!(u.buffers().colors()[i * 2], *color);
            assert_eq!(u.buffers().colors()[i * 2 + 1], *color);
        }
    }

    #[test]
    fn test_voice_master_fade() {
        let partition = lone_site();
        let mut u = unit(0, &UnitProfile::voice(), 12);
        assert_eq!(u.master_alpha(), 0.0);
        assert!(!u.is_active());

        // Inactive and faded out: nothing happens, even when loud
        u.set_cooldown(0.0);
        u.update(&partition, &AudioBands::new(0.0, 1.0, 0.0), DT);
        assert_eq!(u.state(), LifecycleState::Idle);

        u.set_active(true);
        assert_eq!(u.state(), LifecycleState::Flashing);
        let mut previous = u.master_alpha();
        for _ in 0..60 {
            u.update(&partition, &quiet(), DT);
            assert!(u.master_alpha() > previous);
            previous = u.master_alpha();
        }
        assert!(previous > 0.9);

        u.set_active(false);
        for _ in 0..200 {
            u.update(&partition, &quiet(), DT);
            assert!(u.master_alpha() <= previous);
            previous = u.master_alpha();
        }
        assert!(previous < 0.01);
        assert!(!u.is_visible());
    }

    #[test]
    fn test_set_active_ignored_without_master_toggle() {
        let mut u = unit(0, &UnitProfile::spectrum(), 13);
        u.set_active(false);
        assert!(u.is_active());
        assert_eq!(u.master_alpha(), 1.0);
    }
}
