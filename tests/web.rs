#![cfg(target_arch = "wasm32")]

use helium_scene::scene::PerspectiveCamera;
use helium_scene::viewport::{apply_resize, Viewport};
use helium_scene::wasm::render::Renderer;
use helium_scene::wasm::{find_canvas, start};
use helium_scene::{Error, SceneConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn add_element(tag: &str, id: &str) -> web_sys::Element {
    let doc = document();
    let el = doc.create_element(tag).unwrap();
    el.set_id(id);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn missing_canvas_is_reported() {
    let err = find_canvas(&document(), "no-such-canvas").unwrap_err();
    assert!(matches!(err, Error::CanvasNotFound(ref id) if id == "no-such-canvas"));
}

#[wasm_bindgen_test]
fn start_without_canvas_fails_before_setup() {
    let config = SceneConfig {
        canvas_id: "still-missing".into(),
        ..SceneConfig::default()
    };
    assert!(matches!(start(config), Err(Error::CanvasNotFound(_))));
}

#[wasm_bindgen_test]
fn non_canvas_element_is_rejected() {
    add_element("div", "not-a-canvas");
    let err = find_canvas(&document(), "not-a-canvas").unwrap_err();
    assert!(matches!(err, Error::NotACanvas(_)));
}

#[wasm_bindgen_test]
fn resize_tracks_viewport_and_pixel_ratio() {
    let canvas: web_sys::HtmlCanvasElement = add_element("canvas", "resize-canvas")
        .dyn_into()
        .unwrap();
    let mut renderer = Renderer::new(canvas).unwrap();
    let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 2000.0);

    apply_resize(&mut camera, &mut renderer, &Viewport::new(400.0, 200.0, 2.0));

    assert_eq!(renderer.drawing_buffer_size(), (800, 400));
    assert_eq!(camera.aspect, 2.0);
    assert!(!camera.projection_dirty());
    let style = renderer.canvas().style();
    assert_eq!(style.get_property_value("width").unwrap(), "400px");
    assert_eq!(style.get_property_value("height").unwrap(), "200px");
}
