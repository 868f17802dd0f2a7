//! Lightning growth units: skeleton generation, audio gating, flash
//! lifecycle, and per-frame territory-clipped geometry.

mod buffers;
mod color;
mod gate;
mod skeleton;
mod unit;

pub use buffers::{LineBuffers, TipTable};
pub use color::{offset_lightness, tip_glow};
pub use gate::gate;
pub use skeleton::{Segment, SegmentBudget, SegmentId, SegmentParent, Skeleton};
pub use unit::{AnchorPoint, GrowthUnit, LifecycleState};
