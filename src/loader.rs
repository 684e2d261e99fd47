//! Load bookkeeping shared by every asset loader.
//!
//! [`LoadingManager`] counts queued items and fires four hooks: `on_start` when
//! the first item of a batch is queued, `on_progress` after each item finishes,
//! `on_load` once every queued item has finished, and `on_error` for a failed
//! item. Progress is reported in items, not bytes.
//!
//! A failed item still counts as finished for `on_load`, but the loader that
//! owns it never calls its continuation, so content depending on it is simply
//! absent. There are no retries.

type UrlHook = Box<dyn FnMut(&str)>;
type ProgressHook = Box<dyn FnMut(&str, usize, usize)>;
type DoneHook = Box<dyn FnMut()>;

pub struct LoadingManager {
    loading: bool,
    items_loaded: usize,
    items_total: usize,
    on_start: Option<ProgressHook>,
    on_progress: Option<ProgressHook>,
    on_load: Option<DoneHook>,
    on_error: Option<UrlHook>,
}

impl Default for LoadingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("loading", &self.loading)
            .field("items_loaded", &self.items_loaded)
            .field("items_total", &self.items_total)
            .finish_non_exhaustive()
    }
}

impl LoadingManager {
    /// A manager with no hooks.
    pub fn new() -> Self {
        Self {
            loading: false,
            items_loaded: 0,
            items_total: 0,
            on_start: None,
            on_progress: None,
            on_load: None,
            on_error: None,
        }
    }

    /// A manager whose hooks write to the `log` facade.
    pub fn with_logging() -> Self {
        let mut m = Self::new();
        m.set_on_start(|url, _, _| log::info!("[LOADER] Starting to load resource: {url}"));
        m.set_on_progress(|url, loaded, total| {
            log::info!("[LOADER] Progress: {url} ({loaded} of {total} queued)")
        });
        m.set_on_load(|| log::info!("[LOADER] All resources loaded"));
        m.set_on_error(|url| log::error!("[LOADER] Error loading resource: {url}"));
        m
    }

    pub fn set_on_start(&mut self, f: impl FnMut(&str, usize, usize) + 'static) {
        self.on_start = Some(Box::new(f));
    }

    pub fn set_on_progress(&mut self, f: impl FnMut(&str, usize, usize) + 'static) {
        self.on_progress = Some(Box::new(f));
    }

    pub fn set_on_load(&mut self, f: impl FnMut() + 'static) {
        self.on_load = Some(Box::new(f));
    }

    pub fn set_on_error(&mut self, f: impl FnMut(&str) + 'static) {
        self.on_error = Some(Box::new(f));
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// `(loaded, total)` for the current batch.
    pub fn counts(&self) -> (usize, usize) {
        (self.items_loaded, self.items_total)
    }

    pub fn item_start(&mut self, url: &str) {
        self.items_total += 1;
        if !self.loading {
            if let Some(f) = self.on_start.as_mut() {
                f(url, self.items_loaded, self.items_total);
            }
        }
        self.loading = true;
    }

    pub fn item_end(&mut self, url: &str) {
        self.items_loaded += 1;
        if let Some(f) = self.on_progress.as_mut() {
            f(url, self.items_loaded, self.items_total);
        }
        if self.items_loaded == self.items_total {
            self.loading = false;
            if let Some(f) = self.on_load.as_mut() {
                f();
            }
        }
    }

    pub fn item_error(&mut self, url: &str) {
        if let Some(f) = self.on_error.as_mut() {
            f(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording() -> (LoadingManager, Rc<RefCell<Vec<String>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut m = LoadingManager::new();
        let e = events.clone();
        m.set_on_start(move |url, l, t| e.borrow_mut().push(format!("start {url} {l}/{t}")));
        let e = events.clone();
        m.set_on_progress(move |url, l, t| e.borrow_mut().push(format!("progress {url} {l}/{t}")));
        let e = events.clone();
        m.set_on_load(move || e.borrow_mut().push("load".into()));
        let e = events.clone();
        m.set_on_error(move |url| e.borrow_mut().push(format!("error {url}")));
        (m, events)
    }

    #[test]
    fn hooks_fire_in_order() {
        let (mut m, events) = recording();
        m.item_start("font.json");
        m.item_start("alpha.png");
        assert!(m.is_loading());
        m.item_end("font.json");
        m.item_end("alpha.png");
        assert!(!m.is_loading());
        assert_eq!(
            *events.borrow(),
            vec![
                "start font.json 0/1",
                "progress font.json 1/2",
                "progress alpha.png 2/2",
                "load",
            ]
        );
    }

    #[test]
    fn error_is_reported_and_item_still_completes() {
        let (mut m, events) = recording();
        m.item_start("missing.png");
        m.item_error("missing.png");
        m.item_end("missing.png");
        assert_eq!(
            *events.borrow(),
            vec![
                "start missing.png 0/1",
                "error missing.png",
                "progress missing.png 1/1",
                "load",
            ]
        );
    }

    #[test]
    fn second_batch_starts_again() {
        let (mut m, events) = recording();
        m.item_start("a");
        m.item_end("a");
        m.item_start("b");
        assert_eq!(events.borrow()[3], "start b 1/2");
        assert_eq!(m.counts(), (1, 2));
    }

    #[test]
    fn counts_with_default_hooks() {
        let mut m = LoadingManager::with_logging();
        m.item_start("x");
        m.item_end("x");
        assert_eq!(m.counts(), (1, 1));
        let mut m = LoadingManager::default();
        m.item_error("x");
        assert!(!m.is_loading());
    }
}
