use glam::Vec3;

use crate::config::SpotLightOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Cone light aimed at `target` from its node position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Range beyond which the light contributes nothing; 0 means unlimited.
    pub distance: f32,
    /// Half-angle of the cone in radians.
    pub angle: f32,
    /// Fraction of the cone softened at the rim, 0..1.
    pub penumbra: f32,
    pub decay: f32,
    pub target: Vec3,
}

impl From<&SpotLightOptions> for SpotLight {
    fn from(o: &SpotLightOptions) -> Self {
        Self {
            color: o.color,
            intensity: o.intensity,
            distance: o.distance,
            angle: o.angle,
            penumbra: o.penumbra,
            decay: o.decay,
            target: Vec3::ZERO,
        }
    }
}

impl SpotLight {
    /// Cosines of the outer cone edge and of where the penumbra ends.
    pub fn cone_cos(&self) -> (f32, f32) {
        (self.angle.cos(), (self.angle * (1.0 - self.penumbra)).cos())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Spot(SpotLight),
}
