//! Color helpers for trunk colors and glowing tips.

use palette::{FromColor, Hsl, Srgb};

/// Shift the HSL lightness of an RGB color, keeping hue and saturation
pub fn offset_lightness([r, g, b]: [f32; 3], delta: f32) -> [f32; 3] {
    let mut hsl: Hsl = Hsl::from_color(Srgb::new(r, g, b));
    hsl.lightness = (hsl.lightness + delta).clamp(0.0, 1.0);
    let c: Srgb = Srgb::from_color(hsl);
    [c.red, c.green, c.blue]
}

/// Blend toward white with depth: `min(1, c + depth / max_depth * glow)`
pub fn tip_glow(color: [f32; 3], depth: u32, max_depth: u32, glow: f32) -> [f32; 3] {
    let lift = depth as f32 / max_depth.max(1) as f32 * glow;
    color.map(|c| (c + lift).min(1.0))
}
