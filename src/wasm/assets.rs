//! Browser-backed loaders. Every item is reported to the shared
//! [`LoadingManager`]; a failed item is logged and its continuation dropped.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlImageElement, Response};

use super::render::{TextureImage, TextureQueue};
use crate::error::{Error, Result};
use crate::font::Font;
use crate::loader::LoadingManager;
use crate::scene::TextureId;

async fn fetch_text(url: &str) -> Result<String> {
    let window = web_sys::window().ok_or(Error::NoWindow)?;
    let resp: Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()
        .map_err(|_| Error::Js("fetch did not return a Response".into()))?;
    if !resp.ok() {
        return Err(Error::Js(format!("HTTP {} for {url}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?).await?;
    text.as_string()
        .ok_or_else(|| Error::Js("response body is not text".into()))
}

async fn fetch_image(url: &str) -> Result<HtmlImageElement> {
    let img = HtmlImageElement::new()?;
    img.set_cross_origin(Some("anonymous"));
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(url);
    JsFuture::from(promise).await.map_err(|e: JsValue| {
        Error::Js(e.as_string().unwrap_or_else(|| "image failed to decode".into()))
    })?;
    img.set_onload(None);
    img.set_onerror(None);
    Ok(img)
}

/// Font, texture and cube-texture loading against one manager.
#[derive(Clone)]
pub struct Assets {
    manager: Rc<RefCell<LoadingManager>>,
    textures: TextureQueue,
}

impl Assets {
    pub fn new(manager: LoadingManager, textures: TextureQueue) -> Self {
        Self {
            manager: Rc::new(RefCell::new(manager)),
            textures,
        }
    }

    fn start(&self, url: &str) {
        self.manager.borrow_mut().item_start(url);
    }

    fn end(&self, url: &str) {
        self.manager.borrow_mut().item_end(url);
    }

    fn fail(&self, url: &str, e: &Error) {
        log::debug!("{url}: {e}");
        let mut m = self.manager.borrow_mut();
        m.item_error(url);
        m.item_end(url);
    }

    /// Fetches and parses a typeface font, then hands it to `on_load`.
    pub fn load_font(&self, url: &str, on_load: impl FnOnce(Font) + 'static) {
        let this = self.clone();
        let url = url.to_string();
        self.start(&url);
        spawn_local(async move {
            let font = match fetch_text(&url).await {
                Ok(text) => Font::from_json(&text),
                Err(e) => Err(e),
            };
            match font {
                Ok(font) => {
                    on_load(font);
                    this.end(&url);
                }
                Err(e) => this.fail(&url, &e),
            }
        });
    }

    /// Decodes one image into texture `id`.
    pub fn load_texture(&self, id: TextureId, url: &str) {
        let this = self.clone();
        let url = url.to_string();
        self.start(&url);
        spawn_local(async move {
            match fetch_image(&url).await {
                Ok(img) => {
                    this.textures
                        .borrow_mut()
                        .push((id, TextureImage::Image(img)));
                    this.end(&url);
                }
                Err(e) => this.fail(&url, &e),
            }
        });
    }

    /// Decodes six faces (+X, -X, +Y, -Y, +Z, -Z) into cube texture `id`.
    /// The texture only appears once every face has decoded.
    pub fn load_cube(&self, id: TextureId, urls: &[String; 6]) {
        let this = self.clone();
        let urls = urls.clone();
        for url in &urls {
            self.start(url);
        }
        spawn_local(async move {
            let mut faces = Vec::with_capacity(6);
            let mut failed = false;
            for url in &urls {
                match fetch_image(url).await {
                    Ok(img) => {
                        faces.push(img);
                        this.end(url);
                    }
                    Err(e) => {
                        this.fail(url, &e);
                        failed = true;
                    }
                }
            }
            if failed {
                return;
            }
            if let Ok(faces) = <[HtmlImageElement; 6]>::try_from(faces) {
                this.textures
                    .borrow_mut()
                    .push((id, TextureImage::Cube(Box::new(faces))));
            }
        });
    }
}
