//! Decorative content that depends on the font: the extruded text, the atom
//! sprite above it, and a cloud of tori, all under the rotatable group.

use glam::Vec3;

use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::font::Font;
use crate::geometry::{self, Geometry};
use crate::random::RandomSource;
use crate::scene::material::parse_hex_color;
use crate::scene::{
    Material, Node, NodeId, NormalMaterial, Scene, Side, StandardMaterial, TextureId, Transform,
};

/// Textures requested before the content is built; their pixels may still be
/// in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTextures {
    pub env_map: Option<TextureId>,
    pub alpha_map: Option<TextureId>,
}

/// Uniform in `[-extent, extent)`.
fn sample_axis(rng: &mut impl RandomSource, extent: f32) -> f32 {
    let v = rng.range(-f64::from(extent), f64::from(extent)) as f32;
    // Narrowing to f32 can round onto the open upper bound.
    if v >= extent {
        extent - extent * f32::EPSILON
    } else {
        v
    }
}

/// Nodes added by a successful build.
#[derive(Debug, Clone)]
pub struct BuiltContent {
    /// `None` when the text could not be tessellated.
    pub text: Option<NodeId>,
    pub atom: NodeId,
    pub tori: Vec<NodeId>,
}

impl BuiltContent {
    pub fn mesh_count(&self) -> usize {
        usize::from(self.text.is_some()) + 1 + self.tori.len()
    }
}

/// Builds the font-dependent content at most once.
#[derive(Debug)]
pub struct ContentBuilder {
    config: SceneConfig,
    built: bool,
}

impl ContentBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            built: false,
        }
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    fn text_geometry(&self, font: &Font) -> Result<Geometry> {
        let opts = &self.config.text_geometry;
        let shapes = font.generate_shapes(&self.config.text, opts.size, opts.curve_segments)?;
        let mut g = geometry::extrude(&shapes, opts)?;
        if g.indices.is_empty() {
            return Err(Error::Tessellation("no drawable glyphs".into()));
        }
        g.center();
        Ok(g)
    }

    /// Adds the text, the atom and the tori to `group`, then attaches `group`
    /// to the scene root. A second call adds nothing and returns
    /// [`Error::ContentAlreadyBuilt`].
    pub fn build(
        &mut self,
        scene: &mut Scene,
        group: NodeId,
        font: &Font,
        textures: ContentTextures,
        rng: &mut impl RandomSource,
    ) -> Result<BuiltContent> {
        if self.built {
            return Err(Error::ContentAlreadyBuilt);
        }
        self.built = true;

        let cfg = &self.config;
        let color = parse_hex_color(&cfg.material_color).unwrap_or_else(|| {
            log::warn!("bad material color {:?}, using white", cfg.material_color);
            [1.0; 3]
        });

        let text = match self.text_geometry(font) {
            Ok(g) => {
                let geometry = scene.add_geometry(g);
                let material = scene.add_material(Material::Standard(StandardMaterial {
                    color,
                    metalness: cfg.metalness,
                    roughness: cfg.roughness,
                    env_map: textures.env_map,
                    env_map_intensity: cfg.env_map_intensity,
                    ..Default::default()
                }));
                Some(scene.add(group, Node::mesh("text", geometry, material)))
            }
            Err(e) => {
                log::error!("text {:?} left out: {e}", cfg.text);
                None
            }
        };

        let atom_geometry = scene.add_geometry(geometry::plane(cfg.atom_size, cfg.atom_size));
        let atom_material = scene.add_material(Material::Standard(StandardMaterial {
            color,
            metalness: cfg.metalness,
            roughness: cfg.roughness,
            transparent: true,
            alpha_map: textures.alpha_map,
            env_map: textures.env_map,
            side: Side::Double,
            ..Default::default()
        }));
        let atom = scene.add(
            group,
            Node::mesh("atom", atom_geometry, atom_material).with_transform(
                Transform::from_position(Vec3::new(0.0, cfg.atom_offset_y, 0.0)),
            ),
        );

        let torus_geometry = scene.add_geometry(geometry::torus(&cfg.torus));
        let normal_material = scene.add_material(Material::Normal(NormalMaterial::default()));
        let (p, r) = (cfg.scatter_extent, cfg.rotation_extent);
        let mut sample = |extent: f32| {
            Vec3::new(
                sample_axis(&mut *rng, extent),
                sample_axis(&mut *rng, extent),
                sample_axis(&mut *rng, extent),
            )
        };
        let tori = (0..cfg.torus_count)
            .map(|i| {
                let transform = Transform {
                    position: sample(p),
                    rotation: sample(r),
                    ..Default::default()
                };
                scene.add(
                    group,
                    Node::mesh(format!("torus-{i}"), torus_geometry, normal_material)
                        .with_transform(transform),
                )
            })
            .collect();

        scene.attach(scene.root(), group);

        let built = BuiltContent { text, atom, tori };
        log::info!("scene content built: {} meshes", built.mesh_count());
        Ok(built)
    }
}
