//! Recursive lightning skeleton generation.
//!
//! A skeleton is a flat, append-only list of segments. Each segment knows
//! its parent, which is either the unit's anchor or an earlier segment, so
//! the list is always a forest in parent-before-child order.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::color::{offset_lightness, tip_glow};
use crate::params::GrowthParams;
use crate::rng::{symmetric, uniform};

/// Index of a segment inside its skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

impl SegmentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a segment starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentParent {
    /// The unit's anchor point
    Root,
    /// The end of an earlier segment
    Segment(SegmentId),
}

/// One straight piece of a branch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub parent: SegmentParent,
    pub depth: u32,
    /// Unit direction
    pub direction: Vec2,
    pub length: f32,
    pub color: [f32; 3],
}

/// Remaining segment capacity, threaded through the recursion
#[derive(Debug)]
pub struct SegmentBudget {
    remaining: usize,
}

impl SegmentBudget {
    pub fn new(capacity: usize) -> Self {
        Self {
            remaining: capacity,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Claim one segment; false once the cap is reached
    pub fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Generated branching structure of one strike
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    segments: Vec<Segment>,
}

impl Skeleton {
    /// Empty skeleton (nothing to draw)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh random skeleton for one strike
    ///
    /// `unit_scale` is the unit's fixed size; each strike varies it by
    /// `strike_scale_range`. Generation stops silently at `max_segments`.
    pub fn generate<R: Rng + ?Sized>(
        params: &GrowthParams,
        unit_scale: f32,
        palette: &[[f32; 3]],
        rng: &mut R,
    ) -> Self {
        let mut skeleton = Self::new();
        let mut budget = SegmentBudget::new(params.max_segments);

        let strike_scale = unit_scale * uniform(rng, params.strike_scale_range);
        let trunks = rng.gen_range(params.trunk_count.0..=params.trunk_count.1);

        for _ in 0..trunks {
            let direction = Vec2::from_angle(rng.gen::<f32>() * TAU);
            let length = (params.trunk_length_base + rng.gen::<f32>() * params.trunk_length_spread)
                * strike_scale;

            let base = if palette.is_empty() {
                [1.0; 3]
            } else {
                palette[rng.gen_range(0..palette.len())]
            };
            let color = offset_lightness(base, symmetric(rng, params.lightness_jitter));

            skeleton.grow_branch(
                params,
                &mut budget,
                rng,
                SegmentParent::Root,
                direction,
                0,
                color,
                length,
            );
        }

        skeleton
    }

    #[allow(clippy::too_many_arguments)]
    fn grow_branch<R: Rng + ?Sized>(
        &mut self,
        params: &GrowthParams,
        budget: &mut SegmentBudget,
        rng: &mut R,
        parent: SegmentParent,
        direction: Vec2,
        depth: u32,
        color: [f32; 3],
        length: f32,
    ) {
        if budget.is_exhausted() || depth >= params.max_depth {
            return;
        }
        if depth > params.early_stop_min_depth
            && rng.gen::<f32>() < depth as f32 * params.early_stop_per_depth
        {
            return;
        }

        // Zig-zag: split the branch into short kinked steps
        let steps = ((length / params.segment_size).floor() as usize).max(2);
        let step_length = length / steps as f32;

        let mut tip = parent;
        for _ in 0..steps {
            if !budget.take() {
                break;
            }
            let kink = symmetric(rng, params.kink_rad);
            let id = SegmentId(self.segments.len() as u32);

            self.segments.push(Segment {
                id,
                parent: tip,
                depth,
                direction: Vec2::from_angle(kink).rotate(direction),
                length: step_length,
                color,
            });
            tip = SegmentParent::Segment(id);
        }

        let children = if depth == 0 {
            rng.gen_range(params.root_children.0..=params.root_children.1)
        } else {
            let roll = rng.gen::<f32>();
            if roll < params.branch_odds.0 {
                1
            } else if roll < params.branch_odds.1 {
                2
            } else {
                3
            }
        };

        let spread = (params.base_spread_rad - depth as f32 * params.spread_decrement_rad).max(0.0);
        for _ in 0..children {
            let offset = symmetric(rng, spread / 2.0);
            let child_direction = Vec2::from_angle(offset).rotate(direction);
            let child_length = length * uniform(rng, params.length_decay);

            self.grow_branch(
                params,
                budget,
                rng,
                tip,
                child_direction,
                depth + 1,
                color,
                child_length,
            );
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Deepest segment depth, `None` when empty
    pub fn max_depth(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.depth).max()
    }

    /// Render color of every segment: base color blended toward white at the tips
    pub fn render_colors(&self, max_depth: u32, glow: f32) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.segments
            .iter()
            .map(move |s| tip_glow(s.color, s.depth, max_depth, glow))
    }
}
