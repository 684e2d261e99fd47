use glam::{Mat4, Vec3};

use crate::config::CameraOptions;

/// Perspective camera looking at `target`.
///
/// The projection matrix is cached; anything that changes `fov_deg`, `aspect`,
/// `near` or `far` must go through a setter or call
/// [`update_projection_matrix`](Self::update_projection_matrix).
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov_deg,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn from_options(o: &CameraOptions, aspect: f32) -> Self {
        let mut cam = Self::new(o.fov_deg, aspect, o.near, o.far);
        cam.position = o.position;
        cam
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far);
        self.projection_dirty = false;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_change_marks_projection_dirty() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 2000.0);
        assert!(!cam.projection_dirty());
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert!(cam.projection_dirty());
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert!(!cam.projection_dirty());
        assert_ne!(cam.projection_matrix(), before);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 2000.0);
        cam.position = Vec3::new(0.0, 0.0, 4.0);
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }
}
