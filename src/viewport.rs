//! Window size tracking.

use crate::scene::PerspectiveCamera;

/// CSS-pixel size of the drawing area plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height <= 0.0 {
            return 1.0;
        }
        (self.width / self.height) as f32
    }

    /// Backing-store size in device pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let r = self.device_pixel_ratio.max(1.0);
        (
            (self.width * r).floor() as u32,
            (self.height * r).floor() as u32,
        )
    }
}

/// Anything whose output size follows the viewport.
pub trait RenderTarget {
    fn set_pixel_ratio(&mut self, ratio: f64);
    /// Sets the CSS size; the backing store becomes `size * pixel ratio`.
    fn set_size(&mut self, width: f64, height: f64);
}

/// Camera aspect follows the new size and the projection is rebuilt.
pub fn resize_camera(camera: &mut PerspectiveCamera, viewport: &Viewport) {
    camera.set_aspect(viewport.aspect());
    camera.update_projection_matrix();
}

pub fn resize_target<T: RenderTarget + ?Sized>(target: &mut T, viewport: &Viewport) {
    target.set_size(viewport.width, viewport.height);
    target.set_pixel_ratio(viewport.device_pixel_ratio);
}

pub fn apply_resize<T: RenderTarget + ?Sized>(
    camera: &mut PerspectiveCamera,
    target: &mut T,
    viewport: &Viewport,
) {
    resize_camera(camera, viewport);
    resize_target(target, viewport);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeTarget {
        css: (f64, f64),
        ratio: f64,
    }

    impl FakeTarget {
        fn buffer(&self) -> (u32, u32) {
            Viewport::new(self.css.0, self.css.1, self.ratio).drawing_buffer_size()
        }
    }

    impl RenderTarget for FakeTarget {
        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.ratio = ratio;
        }
        fn set_size(&mut self, width: f64, height: f64) {
            self.css = (width, height);
        }
    }

    #[test]
    fn resize_updates_camera_and_target() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 2000.0);
        let mut target = FakeTarget::default();

        let vp = Viewport::new(1280.0, 720.0, 2.0);
        apply_resize(&mut cam, &mut target, &vp);
        assert!((cam.aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert!(!cam.projection_dirty());
        assert_eq!(target.css, (1280.0, 720.0));
        assert_eq!(target.buffer(), (2560, 1440));

        let vp = Viewport::new(500.0, 1000.0, 1.0);
        apply_resize(&mut cam, &mut target, &vp);
        assert!((cam.aspect - 0.5).abs() < 1e-6);
        assert_eq!(target.buffer(), (500, 1000));
    }

    #[test]
    fn degenerate_height_keeps_square_aspect() {
        assert_eq!(Viewport::new(100.0, 0.0, 1.0).aspect(), 1.0);
    }
}
