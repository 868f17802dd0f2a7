//! Orthographic top-down camera over the z = 0 drawing plane.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Fixed camera looking down -z, framing `frustum_height` world units vertically
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    half_width: f32,
    half_height: f32,
    eye_z: f32,
    near: f32,
    far: f32,
}

impl OrthoCamera {
    pub fn new(config: &RenderConfig) -> Self {
        let (width, height) = config.world_extent();
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
            eye_z: config.camera_z,
            near: config.near_plane,
            far: config.far_plane,
        }
    }

    /// Refit the frustum after a window resize (height stays fixed)
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        self.half_width = self.half_height * aspect;
    }

    /// Visible world rectangle (width, height)
    pub fn extent(&self) -> (f32, f32) {
        (self.half_width * 2.0, self.half_height * 2.0)
    }

    /// View-projection matrix for the line shader
    pub fn view_proj(&self) -> Mat4 {
        let eye = Vec3::new(0.0, 0.0, self.eye_z);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(
            -self.half_width,
            self.half_width,
            -self.half_height,
            self.half_height,
            self.near,
            self.far,
        );
        proj * view
    }
}
