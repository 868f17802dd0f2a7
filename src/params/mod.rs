//! Parameter definitions with units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (world units, seconds, Hz, radians)
//! - Documented ranges and meanings
//! - A `validate()` wherever a value has a precondition

mod audio;
mod growth;
mod installation;
mod render;
mod territory;

// Re-export all types
pub use audio::{audio_constants, FFTConfig};
pub use growth::{
    BandWeights, EnergyGate, GrowthParams, LifecycleParams, MotionShaping, UnitKind, UnitProfile,
};
pub use installation::InstallationConfig;
pub use render::{RecordingConfig, RenderConfig};
pub use territory::{DriftParams, TerritoryConfig};
