//! Demo composition played when no live input is wanted.

/// Glicol composition (procedural music code)
///
/// A low saw hit on the downbeat feeds the bass-weighted sites; the
/// bursts between sit around 1-2 kHz so the mid band crosses the voice
/// gate while they ring.
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 4.0 >> seq 48 _84 _88 91 _ _96 84 _
~amp: ~gate >> envperc 0.005 0.2
~pit: ~gate >> mul 261.63
~mod: sin 0.25 >> mul 1500 >> add 3000
o: saw ~pit >> mul ~amp >> lpf ~mod 2.0 >> mul 0.3 >> plate 0.1
"#;
