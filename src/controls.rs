//! Mouse-drag orbit controls.
//!
//! Input handlers only accumulate deltas; [`OrbitControls::update`] applies
//! them to the camera once per frame. With damping on, each update applies a
//! fraction of the pending delta and decays the rest, so the camera eases to a
//! stop after the pointer is released.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Radius, polar angle from +Y, azimuth around +Y measured from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta: Spherical,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: false,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta: Spherical::default(),
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new(enable_damping: bool) -> Self {
        Self {
            enable_damping,
            ..Self::default()
        }
    }

    /// Pending rotation not yet applied to the camera.
    pub fn pending(&self) -> (f32, f32) {
        (self.delta.theta, self.delta.phi)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// A drag of `dx, dy` pixels over an element `element_height` pixels tall.
    /// Dragging the full height turns the camera once around.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, element_height: f32) {
        if !self.enabled || element_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * dx / element_height * self.rotate_speed);
        self.rotate_up(TAU * dy / element_height * self.rotate_speed);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Wheel input: negative `delta_y` moves the camera closer.
    pub fn dolly(&mut self, delta_y: f32) {
        if !self.enabled {
            return;
        }
        if delta_y < 0.0 {
            self.scale *= self.zoom_scale();
        } else if delta_y > 0.0 {
            self.scale /= self.zoom_scale();
        }
    }

    /// Applies pending input to `camera` and points it at the target.
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut s = Spherical::from_vec3(offset);

        if self.enable_damping {
            s.theta += self.delta.theta * self.damping_factor;
            s.phi += self.delta.phi * self.damping_factor;
        } else {
            s.theta += self.delta.theta;
            s.phi += self.delta.phi;
        }

        s.phi = s
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        s.radius = (s.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let before = camera.position;
        camera.position = self.target + s.to_vec3();
        camera.target = self.target;

        if self.enable_damping {
            self.delta.theta *= 1.0 - self.damping_factor;
            self.delta.phi *= 1.0 - self.damping_factor;
        } else {
            self.delta = Spherical::default();
        }
        self.scale = 1.0;

        before.distance_squared(camera.position) > EPS
    }
}
