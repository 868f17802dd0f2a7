//! Crate-wide error type.

/// Errors raised while building or starting the installation.
///
/// The per-frame loop never produces these: degraded input is clamped or
/// gated instead. They only surface from constructors and device setup.
#[derive(Debug, thiserror::Error)]
pub enum ArcfieldError {
    #[error("Territory needs at least one seed site")]
    EmptyTerritory,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Audio error: {0}")]
    Audio(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
