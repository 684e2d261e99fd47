//! DOM listeners: window resize and pointer/wheel orbiting.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{EventTarget, PointerEvent, WheelEvent};

use super::{window_viewport, App};
use crate::viewport::{resize_camera, resize_target};

fn listen<E, F>(target: &EventTarget, kind: &str, f: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

/// One listener keeps the camera aspect current, the other the drawing buffer.
pub fn bind_resize(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;

    let a = app.clone();
    listen(&window, "resize", move |_: web_sys::Event| {
        if let Some(v) = window_viewport() {
            resize_camera(&mut a.borrow_mut().camera, &v);
        }
    })?;

    let a = app.clone();
    listen(&window, "resize", move |_: web_sys::Event| {
        if let Some(v) = window_viewport() {
            resize_target(&mut a.borrow_mut().renderer, &v);
        }
    })?;
    Ok(())
}

/// Primary-button drag orbits, the wheel zooms. Bound to the document body.
pub fn bind_orbit(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let body = document.body().ok_or("no body")?;
    let target: EventTarget = body.clone().into();

    let last: Rc<Cell<Option<(i32, i32)>>> = Rc::new(Cell::new(None));

    let l = last.clone();
    listen(&target, "pointerdown", move |e: PointerEvent| {
        if e.button() == 0 {
            l.set(Some((e.client_x(), e.client_y())));
        }
    })?;

    let (l, a, b) = (last.clone(), app.clone(), body.clone());
    listen(&target, "pointermove", move |e: PointerEvent| {
        let Some((x, y)) = l.get() else {
            return;
        };
        let (nx, ny) = (e.client_x(), e.client_y());
        l.set(Some((nx, ny)));
        a.borrow_mut().controls.rotate_by_pixels(
            (nx - x) as f32,
            (ny - y) as f32,
            b.client_height() as f32,
        );
    })?;

    for kind in ["pointerup", "pointercancel"] {
        let l = last.clone();
        listen(&target, kind, move |_: PointerEvent| l.set(None))?;
    }

    let a = app.clone();
    listen(&target, "wheel", move |e: WheelEvent| {
        a.borrow_mut().controls.dolly(e.delta_y() as f32);
    })?;
    Ok(())
}
