use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec3};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, HtmlCanvasElement, HtmlImageElement, WebGl2RenderingContext as GL,
    WebGlBuffer, WebGlContextAttributes, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::shaders;
use super::App;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::scene::{
    GeometryId, Light, Material, MeshDraw, PerspectiveCamera, Scene, Side, TextureId,
};
use crate::viewport::RenderTarget;

/// Decoded pixels for a texture, waiting to be uploaded.
pub enum TextureImage {
    Image(HtmlImageElement),
    Cube(Box<[HtmlImageElement; 6]>),
}

/// Loaders push decoded images here; the renderer uploads them before the next draw.
pub type TextureQueue = Rc<RefCell<Vec<(TextureId, TextureImage)>>>;

fn compile_shader(gl: &GL, kind: u32, src: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(Error::Shader(
            gl.get_shader_info_log(&shader)
                .unwrap_or_else(|| "unknown error".into()),
        ))
    }
}

fn link_program(gl: &GL, vert: &str, frag: &str) -> Result<WebGlProgram> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vert)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, frag)?;
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Program("unable to create program object".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(Error::Program(
            gl.get_program_info_log(&program)
                .unwrap_or_else(|| "unknown error".into()),
        ))
    }
}

/// A linked program with its uniform locations looked up once.
struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    fn new(gl: &GL, frag: &str, names: &[&'static str]) -> Result<Self> {
        let program = link_program(gl, shaders::MESH_VERT, frag)?;
        let uniforms = names
            .iter()
            .filter_map(|&n| gl.get_uniform_location(&program, n).map(|loc| (n, loc)))
            .collect();
        Ok(Self { program, uniforms })
    }

    fn loc(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

const COMMON_UNIFORMS: &[&str] = &[
    "u_model",
    "u_normal_matrix",
    "u_view",
    "u_projection",
    "u_double_sided",
];

const STANDARD_UNIFORMS: &[&str] = &[
    "u_color",
    "u_metalness",
    "u_roughness",
    "u_camera_pos",
    "u_ambient",
    "u_has_spot",
    "u_spot_pos",
    "u_spot_dir",
    "u_spot_color",
    "u_spot_distance",
    "u_spot_decay",
    "u_spot_cos_outer",
    "u_spot_cos_inner",
    "u_has_env",
    "u_env",
    "u_env_intensity",
    "u_has_alpha",
    "u_alpha",
];

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    // Kept alive alongside the VAO that references them.
    _buffers: Vec<WebGlBuffer>,
    index_count: i32,
}

/// Per-frame light state pulled from the scene graph.
#[derive(Default)]
struct FrameLights {
    ambient: Vec3,
    spot: Option<(Vec3, Vec3, crate::scene::SpotLight)>,
}

impl FrameLights {
    fn collect(scene: &Scene) -> Self {
        let mut out = FrameLights::default();
        for l in scene.lights() {
            match l.light {
                Light::Ambient(a) => out.ambient += Vec3::from_array(a.color) * a.intensity,
                Light::Spot(s) if out.spot.is_none() => {
                    let dir = (s.target - l.position).normalize_or_zero();
                    out.spot = Some((l.position, dir, s));
                }
                Light::Spot(_) => log::debug!("only the first spot light is drawn"),
            }
        }
        out
    }
}

/// WebGL2 renderer for the scene graph.
pub struct Renderer {
    canvas: HtmlCanvasElement,
    gl: GL,
    standard: Program,
    normal: Program,
    meshes: HashMap<GeometryId, GpuMesh>,
    textures: HashMap<TextureId, (u32, WebGlTexture)>,
    queue: TextureQueue,
    css_size: (f64, f64),
    pixel_ratio: f64,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let attrs = WebGlContextAttributes::new();
        attrs.set_antialias(true);
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attrs)?
            .ok_or(Error::WebGlUnavailable)?
            .dyn_into()
            .map_err(|_| Error::WebGlUnavailable)?;

        let names = |extra: &[&'static str]| -> Vec<&'static str> {
            COMMON_UNIFORMS.iter().chain(extra).copied().collect()
        };
        let standard = Program::new(&gl, shaders::STANDARD_FRAG, &names(STANDARD_UNIFORMS))?;
        let normal = Program::new(&gl, shaders::NORMAL_FRAG, &names(&[]))?;

        // Cube and 2D samplers must never share a unit.
        gl.use_program(Some(&standard.program));
        gl.uniform1i(standard.loc("u_env"), 0);
        gl.uniform1i(standard.loc("u_alpha"), 1);

        gl.enable(GL::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);

        let css_size = (canvas.client_width() as f64, canvas.client_height() as f64);
        Ok(Self {
            canvas,
            gl,
            standard,
            normal,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            queue: Rc::new(RefCell::new(Vec::new())),
            css_size,
            pixel_ratio: 1.0,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn texture_queue(&self) -> TextureQueue {
        self.queue.clone()
    }

    /// `(width, height)` of the drawing buffer in device pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn apply_size(&self) {
        let (w, h) = self.css_size;
        self.canvas.set_width((w * self.pixel_ratio).floor() as u32);
        self.canvas.set_height((h * self.pixel_ratio).floor() as u32);
        let style = self.canvas.style();
        if let Err(e) = style
            .set_property("width", &format!("{w}px"))
            .and_then(|_| style.set_property("height", &format!("{h}px")))
        {
            log::warn!("could not style canvas: {e:?}");
        }
    }

    fn upload_geometry(gl: &GL, g: &Geometry) -> Result<GpuMesh> {
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Js("unable to create vertex array".into()))?;
        gl.bind_vertex_array(Some(&vao));

        let mut buffers = Vec::new();
        let mut attribute = |location: u32, size: i32, data: &[f32]| -> Result<()> {
            if data.is_empty() {
                gl.disable_vertex_attrib_array(location);
                return Ok(());
            }
            let buf = gl
                .create_buffer()
                .ok_or_else(|| Error::Js("unable to create buffer".into()))?;
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buf));
            let array = js_sys::Float32Array::from(data);
            gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, 0, 0);
            buffers.push(buf);
            Ok(())
        };
        attribute(0, 3, g.positions.as_flattened())?;
        attribute(1, 3, g.normals.as_flattened())?;
        attribute(2, 2, g.uvs.as_flattened())?;

        let ibuf = gl
            .create_buffer()
            .ok_or_else(|| Error::Js("unable to create index buffer".into()))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&ibuf));
        let indices = js_sys::Uint32Array::from(g.indices.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &indices, GL::STATIC_DRAW);
        buffers.push(ibuf);

        gl.bind_vertex_array(None);
        Ok(GpuMesh {
            vao,
            _buffers: buffers,
            index_count: g.indices.len() as i32,
        })
    }

    fn upload_texture(
        &self,
        image: &TextureImage,
        flip_y: bool,
    ) -> std::result::Result<(u32, WebGlTexture), JsValue> {
        let gl = &self.gl;
        let tex = gl
            .create_texture()
            .ok_or_else(|| JsValue::from_str("unable to create texture"))?;
        let target = match image {
            TextureImage::Image(_) => GL::TEXTURE_2D,
            TextureImage::Cube(_) => GL::TEXTURE_CUBE_MAP,
        };
        gl.bind_texture(target, Some(&tex));
        gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, flip_y as i32);
        let uploaded = match image {
            TextureImage::Image(img) => {
                gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
                    GL::TEXTURE_2D,
                    0,
                    GL::RGBA as i32,
                    GL::RGBA,
                    GL::UNSIGNED_BYTE,
                    img,
                )
            }
            TextureImage::Cube(faces) => faces.iter().enumerate().try_for_each(|(i, img)| {
                gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
                    GL::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    GL::RGBA as i32,
                    GL::RGBA,
                    GL::UNSIGNED_BYTE,
                    img,
                )
            }),
        };
        gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 0);
        uploaded?;
        gl.generate_mipmap(target);
        gl.tex_parameteri(target, GL::TEXTURE_MIN_FILTER, GL::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameteri(target, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.bind_texture(target, None);
        Ok((target, tex))
    }

    fn drain_textures(&mut self, scene: &Scene) {
        let pending: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        for (id, image) in pending {
            match self.upload_texture(&image, scene.texture(id).flip_y()) {
                Ok(t) => {
                    self.textures.insert(id, t);
                }
                Err(e) => log::error!("texture upload failed: {e:?}"),
            }
        }
    }

    fn bind_texture(&self, unit: u32, id: Option<TextureId>) -> bool {
        let Some((target, tex)) = id.and_then(|id| self.textures.get(&id)) else {
            return false;
        };
        self.gl.active_texture(GL::TEXTURE0 + unit);
        self.gl.bind_texture(*target, Some(tex));
        true
    }

    fn set_mat4(&self, p: &Program, name: &str, m: &Mat4) {
        self.gl
            .uniform_matrix4fv_with_f32_array(p.loc(name), false, &m.to_cols_array());
    }

    fn draw_mesh(
        &self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        lights: &FrameLights,
        draw: &MeshDraw,
    ) {
        let gl = &self.gl;
        let Some(mesh) = self.meshes.get(&draw.geometry) else {
            return;
        };
        let material = scene.material(draw.material);
        let program = match material {
            Material::Standard(_) => &self.standard,
            Material::Normal(_) => &self.normal,
        };
        gl.use_program(Some(&program.program));

        self.set_mat4(program, "u_model", &draw.world);
        self.set_mat4(program, "u_view", &camera.view_matrix());
        self.set_mat4(program, "u_projection", &camera.projection_matrix());
        let normal_matrix = Mat3::from_mat4(draw.world).inverse().transpose();
        gl.uniform_matrix3fv_with_f32_array(
            program.loc("u_normal_matrix"),
            false,
            &normal_matrix.to_cols_array(),
        );

        let double = material.side() == Side::Double;
        gl.uniform1i(program.loc("u_double_sided"), double as i32);
        if double {
            gl.disable(GL::CULL_FACE);
        } else {
            gl.enable(GL::CULL_FACE);
            gl.cull_face(GL::BACK);
        }

        if let Material::Standard(m) = material {
            let p = program;
            gl.uniform3fv_with_f32_array(p.loc("u_color"), &m.color);
            gl.uniform1f(p.loc("u_metalness"), m.metalness);
            gl.uniform1f(p.loc("u_roughness"), m.roughness);
            gl.uniform3fv_with_f32_array(p.loc("u_camera_pos"), &camera.position.to_array());
            gl.uniform3fv_with_f32_array(p.loc("u_ambient"), &lights.ambient.to_array());

            gl.uniform1i(p.loc("u_has_spot"), lights.spot.is_some() as i32);
            if let Some((pos, dir, s)) = &lights.spot {
                let (outer, inner) = s.cone_cos();
                let color = Vec3::from_array(s.color) * s.intensity;
                gl.uniform3fv_with_f32_array(p.loc("u_spot_pos"), &pos.to_array());
                gl.uniform3fv_with_f32_array(p.loc("u_spot_dir"), &dir.to_array());
                gl.uniform3fv_with_f32_array(p.loc("u_spot_color"), &color.to_array());
                gl.uniform1f(p.loc("u_spot_distance"), s.distance);
                gl.uniform1f(p.loc("u_spot_decay"), s.decay);
                gl.uniform1f(p.loc("u_spot_cos_outer"), outer);
                gl.uniform1f(p.loc("u_spot_cos_inner"), inner);
            }

            let has_env = self.bind_texture(0, m.env_map);
            gl.uniform1i(p.loc("u_has_env"), has_env as i32);
            gl.uniform1f(p.loc("u_env_intensity"), m.env_map_intensity);
            let has_alpha = self.bind_texture(1, m.alpha_map);
            gl.uniform1i(p.loc("u_has_alpha"), has_alpha as i32);
        }

        gl.bind_vertex_array(Some(&mesh.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, mesh.index_count, GL::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);
    }

    /// Draws everything reachable from the scene root: opaque meshes first,
    /// then transparent ones blended without depth writes.
    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        self.drain_textures(scene);

        let draws = scene.meshes();
        for d in &draws {
            if self.meshes.contains_key(&d.geometry) {
                continue;
            }
            match Self::upload_geometry(&self.gl, scene.geometry(d.geometry)) {
                Ok(mesh) => {
                    self.meshes.insert(d.geometry, mesh);
                }
                Err(e) => log::error!("geometry upload failed: {e}"),
            }
        }

        let gl = &self.gl;
        let (w, h) = self.drawing_buffer_size();
        gl.viewport(0, 0, w as i32, h as i32);
        gl.depth_mask(true);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        let lights = FrameLights::collect(scene);
        let (transparent, opaque): (Vec<_>, Vec<_>) = draws
            .iter()
            .partition(|d| scene.material(d.material).is_transparent());

        gl.disable(GL::BLEND);
        for d in opaque {
            self.draw_mesh(scene, camera, &lights, d);
        }

        if !transparent.is_empty() {
            gl.enable(GL::BLEND);
            gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
            gl.depth_mask(false);
            for d in transparent {
                self.draw_mesh(scene, camera, &lights, d);
            }
            gl.depth_mask(true);
            gl.disable(GL::BLEND);
        }
    }
}

impl RenderTarget for Renderer {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio.max(1.0);
        self.apply_size();
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.css_size = (width, height);
        self.apply_size();
    }
}

/// Start the render loop. Each frame spins the group, eases the orbit
/// controls, draws, and asks for the next animation frame.
pub fn start_loop(app: Rc<RefCell<App>>) -> std::result::Result<(), JsValue> {
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    app.borrow_mut().animation.start();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = super::now_ms();
        {
            let mut guard = app.borrow_mut();
            let app = &mut *guard;
            app.animation.frame(now, &mut app.scene);
            if app.controls.update(&mut app.camera) {
                app.scene.follow_camera(app.camera_node, &app.camera);
            }
            app.renderer.render(&app.scene, &app.camera);
        }

        // schedule next
        let next = window().and_then(|w| {
            f.borrow()
                .as_ref()
                .and_then(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok())
        });
        if next.is_none() {
            log::error!("could not schedule the next animation frame");
        }
    }) as Box<dyn FnMut()>));

    window()
        .ok_or("no window")?
        .request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or("animation closure missing")?
                .as_ref()
                .unchecked_ref(),
        )?;

    Ok(())
}
