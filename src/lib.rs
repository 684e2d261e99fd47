#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod config;
pub mod content;
pub mod controls;
pub mod error;
pub mod font;
pub mod geometry;
pub mod loader;
pub mod random;
pub mod scene;
pub mod timing;
pub mod viewport;

pub use config::SceneConfig;
pub use error::{Error, Result};

// Only compile browser code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use crate::config::SceneConfig;
    use crate::content::{ContentBuilder, ContentTextures};
    use crate::controls::OrbitControls;
    use crate::error::Error;
    use crate::loader::LoadingManager;
    use crate::random::MathRandom;
    use crate::scene::{NodeId, PerspectiveCamera, Scene, SceneBuilder, TextureSource};
    use crate::timing::AnimationLoop;
    use crate::viewport::{resize_target, Viewport};

    mod assets;
    mod input;
    pub mod render;
    mod shaders;

    use assets::Assets;
    use render::Renderer;

    /// Everything the frame loop and the event listeners share.
    pub struct App {
        pub scene: Scene,
        pub camera: PerspectiveCamera,
        pub group: NodeId,
        pub camera_node: NodeId,
        pub controls: OrbitControls,
        pub renderer: Renderer,
        pub animation: AnimationLoop,
        pub content: ContentBuilder,
    }

    pub(crate) fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub(crate) fn window_viewport() -> Option<Viewport> {
        let w = web_sys::window()?;
        let width = w.inner_width().ok()?.as_f64()?;
        let height = w.inner_height().ok()?.as_f64()?;
        Some(Viewport::new(width, height, w.device_pixel_ratio()))
    }

    pub fn find_canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement, Error> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| Error::CanvasNotFound(id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::NotACanvas(id.to_string()))
    }

    /// Sets up the scene on `#canvas_id` and starts animating. Fails before
    /// touching the page when the canvas is missing.
    pub fn start(config: SceneConfig) -> Result<Rc<RefCell<App>>, Error> {
        let window = web_sys::window().ok_or(Error::NoWindow)?;
        let document = window.document().ok_or(Error::NoDocument)?;
        let canvas = find_canvas(&document, &config.canvas_id)?;

        let viewport = window_viewport().ok_or(Error::NoWindow)?;
        let built = SceneBuilder::new(&config).build(&viewport);

        let mut renderer = Renderer::new(canvas)?;
        resize_target(&mut renderer, &viewport);

        let app = Rc::new(RefCell::new(App {
            scene: built.scene,
            camera: built.camera,
            group: built.group,
            camera_node: built.camera_node,
            controls: OrbitControls::new(config.enable_damping),
            animation: AnimationLoop::new(built.group, config.rotation_speed, now_ms()),
            renderer,
            content: ContentBuilder::new(config.clone()),
        }));

        input::bind_resize(&app)?;
        input::bind_orbit(&app)?;

        load_content(&app, &config);

        render::start_loop(app.clone())?;
        log::info!("scene running on #{}", config.canvas_id);
        Ok(app)
    }

    /// Loads the font; once it arrives, requests the textures and builds the
    /// text, atom and tori.
    fn load_content(app: &Rc<RefCell<App>>, config: &SceneConfig) {
        let queue = app.borrow().renderer.texture_queue();
        let assets = Assets::new(LoadingManager::with_logging(), queue);

        let a = app.clone();
        let loader = assets.clone();
        let env_urls = config.env_map_urls.clone();
        let alpha_url = config.alpha_map_url.clone();
        assets.load_font(&config.font_url, move |font| {
            let mut guard = a.borrow_mut();
            let app = &mut *guard;

            let env_map = app.scene.add_texture(TextureSource::Cube {
                urls: env_urls.clone(),
            });
            loader.load_cube(env_map, &env_urls);
            let alpha_map = app.scene.add_texture(TextureSource::Image {
                url: alpha_url.clone(),
            });
            loader.load_texture(alpha_map, &alpha_url);

            let textures = ContentTextures {
                env_map: Some(env_map),
                alpha_map: Some(alpha_map),
            };
            if let Err(e) = app
                .content
                .build(&mut app.scene, app.group, &font, textures, &mut MathRandom)
            {
                log::error!("content not built: {e}");
            }
        });
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
        start(SceneConfig::default())?;
        Ok(())
    }
}
