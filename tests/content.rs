use glam::Vec3;
use helium_scene::content::{ContentBuilder, ContentTextures};
use helium_scene::font::Font;
use helium_scene::random::Lcg;
use helium_scene::scene::{Material, NodeKind, Scene, SceneBuilder, Side, TextureSource};
use helium_scene::viewport::Viewport;
use helium_scene::{Error, SceneConfig};

const FONT: &str = include_str!("fixtures/font.json");

struct Fixture {
    scene: Scene,
    group: helium_scene::scene::NodeId,
    builder: ContentBuilder,
    textures: ContentTextures,
    font: Font,
}

fn fixture() -> Fixture {
    let config = SceneConfig::default();
    let built = SceneBuilder::new(&config).build(&Viewport::new(800.0, 600.0, 1.0));
    let mut scene = built.scene;
    let env_map = scene.add_texture(TextureSource::Cube {
        urls: config.env_map_urls.clone(),
    });
    let alpha_map = scene.add_texture(TextureSource::Image {
        url: config.alpha_map_url.clone(),
    });
    Fixture {
        scene,
        group: built.group,
        builder: ContentBuilder::new(config),
        textures: ContentTextures {
            env_map: Some(env_map),
            alpha_map: Some(alpha_map),
        },
        font: Font::from_json(FONT).unwrap(),
    }
}

#[test]
fn group_is_detached_until_the_font_arrives() {
    let f = fixture();
    assert!(!f.scene.is_attached(f.group));
    assert!(f.scene.children(f.group).is_empty());
    assert!(f.scene.meshes().is_empty());
}

#[test]
fn builds_text_atom_and_two_hundred_tori() {
    let mut f = fixture();
    let built = f
        .builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut Lcg::new(1))
        .unwrap();

    assert!(built.text.is_some());
    assert_eq!(built.tori.len(), 200);
    assert_eq!(built.mesh_count(), 202);
    assert_eq!(f.scene.children(f.group).len(), 202);
    assert!(f.scene.is_attached(f.group));
    assert_eq!(f.scene.meshes().len(), 202);
    assert!(f.builder.is_built());
}

#[test]
fn second_build_adds_nothing() {
    let mut f = fixture();
    let mut rng = Lcg::new(2);
    f.builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut rng)
        .unwrap();
    let nodes = f.scene.node_count();

    let again = f
        .builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut rng);
    assert!(matches!(again, Err(Error::ContentAlreadyBuilt)));
    assert_eq!(f.scene.node_count(), nodes);
    assert_eq!(f.scene.children(f.group).len(), 202);
}

#[test]
fn text_is_centered_on_the_origin() {
    let mut f = fixture();
    let built = f
        .builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut Lcg::new(3))
        .unwrap();
    let text = f.scene.node(built.text.unwrap());
    let NodeKind::Mesh { geometry, material } = text.kind else {
        panic!("text is not a mesh");
    };
    let bb = f.scene.geometry(geometry).bounding_box().unwrap();
    assert!(bb.center().length() < 1e-4);
    assert!(bb.size().x > bb.size().y);

    match f.scene.material(material) {
        Material::Standard(m) => {
            assert_eq!(m.env_map, f.textures.env_map);
            assert_eq!(m.metalness, 1.0);
            assert_eq!(m.roughness, 0.0);
            assert!(!m.transparent);
        }
        other => panic!("unexpected text material {other:?}"),
    }
}

#[test]
fn atom_floats_above_the_text() {
    let mut f = fixture();
    let built = f
        .builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut Lcg::new(4))
        .unwrap();
    let atom = f.scene.node(built.atom);
    assert_eq!(atom.transform.position, Vec3::new(0.0, 1.5, 0.0));
    let NodeKind::Mesh { geometry, material } = atom.kind else {
        panic!("atom is not a mesh");
    };
    let size = f.scene.geometry(geometry).bounding_box().unwrap().size();
    assert!((size.x - 1.25).abs() < 1e-6 && (size.y - 1.25).abs() < 1e-6);
    match f.scene.material(material) {
        Material::Standard(m) => {
            assert!(m.transparent);
            assert_eq!(m.side, Side::Double);
            assert_eq!(m.alpha_map, f.textures.alpha_map);
        }
        other => panic!("unexpected atom material {other:?}"),
    }
}

#[test]
fn tori_share_geometry_and_stay_in_range() {
    let mut f = fixture();
    let built = f
        .builder
        .build(&mut f.scene, f.group, &f.font, f.textures, &mut Lcg::new(5))
        .unwrap();

    let first = f.scene.node(built.tori[0]).kind.clone();
    for &id in &built.tori {
        let node = f.scene.node(id);
        assert_eq!(node.kind, first);
        assert!(matches!(
            node.kind,
            NodeKind::Mesh { material, .. } if matches!(f.scene.material(material), Material::Normal(_))
        ));

        let t = node.transform;
        for v in t.position.to_array() {
            assert!((-5.0..5.0).contains(&v), "position {v}");
        }
        for v in t.rotation.to_array() {
            assert!((-2.5..2.5).contains(&v), "rotation {v}");
        }
        assert_eq!(t.scale, Vec3::ONE);
    }
}

/// Counts `v` in `[-extent, extent)` into equal-width buckets.
fn bucket(counts: &mut [usize], v: f32, extent: f32) {
    let n = counts.len();
    let i = ((v + extent) / (2.0 * extent) * n as f32) as usize;
    counts[i.min(n - 1)] += 1;
}

#[test]
fn torus_placement_covers_every_axis_uniformly() {
    const BUCKETS: usize = 10;
    let config = SceneConfig {
        torus_count: 5000,
        ..SceneConfig::default()
    };
    let built = SceneBuilder::new(&config).build(&Viewport::new(800.0, 600.0, 1.0));
    let mut scene = built.scene;
    let font = Font::from_json(FONT).unwrap();
    let tori = ContentBuilder::new(config.clone())
        .build(
            &mut scene,
            built.group,
            &font,
            ContentTextures::default(),
            &mut Lcg::new(7),
        )
        .unwrap()
        .tori;
    assert_eq!(tori.len(), 5000);

    // position x/y/z, then rotation x/y/z
    let mut counts = [[0usize; BUCKETS]; 6];
    let mut shared_axes = 0;
    for &id in &tori {
        let t = scene.node(id).transform;
        let p = t.position.to_array();
        let r = t.rotation.to_array();
        for axis in 0..3 {
            bucket(&mut counts[axis], p[axis], config.scatter_extent);
            bucket(&mut counts[3 + axis], r[axis], config.rotation_extent);
        }
        if p[0] == p[1] || p[1] == p[2] || r[0] == r[1] || p[2] == r[0] {
            shared_axes += 1;
        }
    }
    assert_eq!(shared_axes, 0, "axes must be sampled independently");

    // 500 expected per bucket; a fair source stays well inside ±25%.
    let expected = tori.len() / BUCKETS;
    for (axis, c) in counts.iter().enumerate() {
        for &n in c {
            assert!(
                n * 4 > expected * 3 && n * 4 < expected * 5,
                "axis {axis}: {c:?}"
            );
        }
    }
}

#[test]
fn unrenderable_text_is_left_out() {
    let mut f = fixture();
    let font = Font::from_json(r#"{"resolution": 1000, "glyphs": {}}"#).unwrap();
    let built = f
        .builder
        .build(&mut f.scene, f.group, &font, f.textures, &mut Lcg::new(6))
        .unwrap();
    assert!(built.text.is_none());
    assert_eq!(f.scene.children(f.group).len(), 201);
}
