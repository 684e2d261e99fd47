//! Scene graph.
//!
//! Nodes live in an arena owned by [`Scene`] and are addressed by [`NodeId`];
//! node 0 is the root. A node may be created detached and attached later, which
//! is how the rotatable group exists from startup but only joins the scene once
//! its content is built.
//!
//! Geometries, materials and textures are registered once and referenced by id,
//! so any number of meshes can share them.

pub mod camera;
pub mod light;
pub mod material;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::SceneConfig;
use crate::geometry::Geometry;
use crate::viewport::Viewport;

pub use camera::PerspectiveCamera;
pub use light::{AmbientLight, Light, SpotLight};
pub use material::{Material, NormalMaterial, Side, StandardMaterial};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

/// Where a texture's pixels come from. Decoding is left to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Image { url: String },
    Cube { urls: [String; 6] },
}

impl TextureSource {
    /// Whether rows must be flipped on upload. Images store their top row
    /// first while uv `v = 1` is the top edge; cube faces are sampled by
    /// direction and keep the image order.
    pub fn flip_y(&self) -> bool {
        matches!(self, TextureSource::Image { .. })
    }
}

/// Position, XYZ Euler rotation in radians, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    Light(Light),
    Camera,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: GeometryId, material: MaterialId) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A mesh reachable from the root, ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct MeshDraw {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// A light reachable from the root, with its world-space position.
#[derive(Debug, Clone, Copy)]
pub struct LightDraw {
    pub light: Light,
    pub position: Vec3,
}

#[derive(Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    textures: Vec<TextureSource>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("scene", NodeKind::Group)],
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Nodes in the arena, attached or not, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing but the root has been created.
    pub fn has_only_root(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Inserts a node without a parent.
    pub fn create(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_group(&mut self, name: impl Into<String>) -> NodeId {
        self.create(Node::new(name, NodeKind::Group))
    }

    /// Inserts `node` as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.create(node);
        self.attach(parent, id);
        id
    }

    /// Re-parents `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        assert_ne!(parent, child, "a node cannot be its own parent");
        debug_assert!(
            !self.ancestors(parent).any(|a| a == child),
            "attaching would create a cycle"
        );
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Moves `node` to where `camera` is. Run after anything moves the camera.
    pub fn follow_camera(&mut self, node: NodeId, camera: &PerspectiveCamera) {
        self.nodes[node.0].transform.position = camera.position;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |p| self.nodes[p.0].parent)
    }

    /// True when `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let local = self.nodes[id.0].transform.matrix();
        match self.nodes[id.0].parent {
            Some(p) => self.world_matrix(p) * local,
            None => local,
        }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn add_texture(&mut self, source: TextureSource) -> TextureId {
        self.textures.push(source);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> &TextureSource {
        &self.textures[id.0]
    }

    /// Depth-first walk from the root, calling `f` with each node's world matrix.
    pub fn traverse(&self, mut f: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.matrix();
            f(id, node, world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    pub fn meshes(&self) -> Vec<MeshDraw> {
        let mut out = Vec::new();
        self.traverse(|id, node, world| {
            if let NodeKind::Mesh { geometry, material } = node.kind {
                out.push(MeshDraw {
                    node: id,
                    world,
                    geometry,
                    material,
                });
            }
        });
        out
    }

    pub fn lights(&self) -> Vec<LightDraw> {
        let mut out = Vec::new();
        self.traverse(|_, node, world| {
            if let NodeKind::Light(light) = node.kind {
                out.push(LightDraw {
                    light,
                    position: world.transform_point3(Vec3::ZERO),
                });
            }
        });
        out
    }
}

/// The part of the scene that exists before any asset has loaded.
#[derive(Debug)]
pub struct StaticScene {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    /// Holds all decorative meshes; detached until content is built.
    pub group: NodeId,
    /// Mirrors `camera` in the graph; see [`Scene::follow_camera`].
    pub camera_node: NodeId,
}

/// Builds camera, lights and the empty root once, synchronously.
pub struct SceneBuilder<'a> {
    config: &'a SceneConfig,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a SceneConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, viewport: &Viewport) -> StaticScene {
        let cfg = self.config;
        let mut scene = Scene::new();
        let root = scene.root();

        let camera = PerspectiveCamera::from_options(&cfg.camera, viewport.aspect());

        scene.add(
            root,
            Node::new(
                "ambient",
                NodeKind::Light(Light::Ambient(AmbientLight {
                    color: cfg.ambient_color,
                    intensity: cfg.ambient_intensity,
                })),
            ),
        );
        scene.add(
            root,
            Node::new("spot", NodeKind::Light(Light::Spot(SpotLight::from(&cfg.spot))))
                .with_transform(Transform::from_position(cfg.spot.position)),
        );
        let camera_node = scene.add(root, Node::new("camera", NodeKind::Camera));
        scene.follow_camera(camera_node, &camera);

        let group = scene.create_group("text-group");
        log::debug!("static scene built: {} nodes", scene.node_count());

        StaticScene {
            scene,
            camera,
            group,
            camera_node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_group_is_not_drawn_until_attached() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(Geometry::default());
        let mat = scene.add_material(Material::Normal(NormalMaterial::default()));
        let group = scene.create_group("g");
        scene.add(group, Node::mesh("m", geo, mat));
        assert!(!scene.is_attached(group));
        assert!(scene.meshes().is_empty());

        scene.attach(scene.root(), group);
        assert!(scene.is_attached(group));
        assert_eq!(scene.meshes().len(), 1);
    }

    #[test]
    fn reattach_moves_child() {
        let mut scene = Scene::new();
        let a = scene.add(scene.root(), Node::new("a", NodeKind::Group));
        let b = scene.add(scene.root(), Node::new("b", NodeKind::Group));
        let c = scene.add(a, Node::new("c", NodeKind::Group));
        scene.attach(b, c);
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[c]);
        assert_eq!(scene.node(c).parent(), Some(b));
    }

    #[test]
    fn world_matrix_composes_parent_rotation() {
        let mut scene = Scene::new();
        let group = scene.add(scene.root(), Node::new("g", NodeKind::Group));
        let child = scene.add(
            group,
            Node::new("c", NodeKind::Group)
                .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        scene.node_mut(group).transform.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

        let mut seen = None;
        scene.traverse(|id, _, world| {
            if id == child {
                seen = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        assert!((seen.unwrap() - p).length() < 1e-6);
    }

    #[test]
    fn builder_creates_camera_lights_and_detached_group() {
        let cfg = SceneConfig::default();
        let viewport = Viewport::new(1600.0, 900.0, 1.0);
        let s = SceneBuilder::new(&cfg).build(&viewport);

        assert!((s.camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(s.camera.fov_deg, 75.0);
        assert_eq!(s.camera.position, Vec3::new(0.0, 0.0, 4.0));

        let lights = s.scene.lights();
        assert_eq!(lights.len(), 2);
        assert!(matches!(lights[0].light, Light::Ambient(_)));
        assert!(matches!(lights[1].light, Light::Spot(_)));
        assert_eq!(lights[1].position, Vec3::new(0.0, 0.0, 5.0));

        assert!(!s.scene.is_attached(s.group));
        assert!(s.scene.children(s.group).is_empty());
        assert_eq!(s.scene.node(s.camera_node).kind, NodeKind::Camera);
        assert_eq!(
            s.scene.world_matrix(s.camera_node).transform_point3(Vec3::ZERO),
            s.camera.position
        );
    }

    #[test]
    fn only_flat_images_are_flipped_on_upload() {
        let mut scene = Scene::new();
        let alpha = scene.add_texture(TextureSource::Image {
            url: "alpha.png".into(),
        });
        let env = scene.add_texture(TextureSource::Cube {
            urls: std::array::from_fn(|i| format!("face{i}.png")),
        });
        assert!(scene.texture(alpha).flip_y());
        assert!(!scene.texture(env).flip_y());

        // With the flip, the first image row lands at v = 1, the plane's top edge.
        let quad = crate::geometry::plane(1.25, 1.25);
        for (p, uv) in quad.positions.iter().zip(&quad.uvs) {
            assert_eq!(uv[1], if p[1] > 0.0 { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn fresh_scene_holds_only_the_root() {
        let mut scene = Scene::new();
        assert!(scene.has_only_root());
        assert_eq!(scene.node_count(), 1);
        scene.create_group("g");
        assert!(!scene.has_only_root());
        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn camera_node_tracks_orbiting_camera() {
        let cfg = SceneConfig::default();
        let mut s = SceneBuilder::new(&cfg).build(&Viewport::new(800.0, 600.0, 1.0));
        let mut controls = crate::controls::OrbitControls::new(false);
        controls.rotate_left(std::f32::consts::FRAC_PI_2);
        assert!(controls.update(&mut s.camera));

        s.scene.follow_camera(s.camera_node, &s.camera);
        let p = s.scene.world_matrix(s.camera_node).transform_point3(Vec3::ZERO);
        assert!((p - s.camera.position).length() < 1e-6);
        assert!((p - Vec3::new(-4.0, 0.0, 0.0)).length() < 1e-4);
    }
}
