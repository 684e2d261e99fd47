//! Fixed scene parameters.
//!
//! The page takes no flags or environment, so everything tunable lives here with
//! `Default` holding the values the scene ships with.

use glam::Vec3;

/// Extrusion parameters for the 3D text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometryOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.05,
            curve_segments: 20,
            bevel_enabled: true,
            bevel_thickness: 0.1,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusOptions {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self {
            radius: 0.1,
            tube: 0.05,
            radial_segments: 10,
            tubular_segments: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 2000.0,
            position: Vec3::new(0.0, 0.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLightOptions {
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vec3,
}

impl Default for SpotLightOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 10000.0,
            distance: 8.0,
            angle: 0.5,
            penumbra: 1.0,
            decay: 2.0,
            position: Vec3::new(0.0, 0.0, 5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Id of the `<canvas>` element the renderer draws into.
    pub canvas_id: String,
    pub camera: CameraOptions,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub spot: SpotLightOptions,
    /// Group spin in radians per wall-clock second.
    pub rotation_speed: f64,
    pub text: String,
    pub text_geometry: TextGeometryOptions,
    pub font_url: String,
    pub env_map_urls: [String; 6],
    pub alpha_map_url: String,
    pub material_color: String,
    pub metalness: f32,
    pub roughness: f32,
    pub env_map_intensity: f32,
    pub atom_size: f32,
    pub atom_offset_y: f32,
    pub torus: TorusOptions,
    pub torus_count: usize,
    /// Tori positions are drawn from `[-extent, extent)` on each axis.
    pub scatter_extent: f32,
    /// Tori rotations are drawn from `[-extent, extent)` radians on each axis.
    pub rotation_extent: f32,
    pub enable_damping: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let face = "/textures/donuts.png".to_string();
        Self {
            canvas_id: "root".into(),
            camera: CameraOptions::default(),
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            spot: SpotLightOptions::default(),
            rotation_speed: 0.3,
            text: "Helium".into(),
            text_geometry: TextGeometryOptions::default(),
            font_url: "/fonts/Quitador-Italic.json".into(),
            env_map_urls: std::array::from_fn(|_| face.clone()),
            alpha_map_url: "/textures/Helium Logo Alpha.png".into(),
            material_color: "#7833ff".into(),
            metalness: 1.0,
            roughness: 0.0,
            env_map_intensity: 1.0,
            atom_size: 1.25,
            atom_offset_y: 1.5,
            torus: TorusOptions::default(),
            torus_count: 200,
            scatter_extent: 5.0,
            rotation_extent: 2.5,
            enable_damping: true,
        }
    }
}
