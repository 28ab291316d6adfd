//! Browser frame loop and DOM helpers

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::error::PlatformError;

pub fn window() -> Result<Window, PlatformError> {
    web_sys::window().ok_or(PlatformError::NoWindow)
}

pub fn document() -> Result<Document, PlatformError> {
    window()?.document().ok_or(PlatformError::NoWindow)
}

/// Look up `#id` as a concrete element type
pub fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, PlatformError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| PlatformError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| PlatformError::WrongElementType(id.to_string()))
}

/// Add or remove `class` on `#id`; missing elements are skipped
pub fn set_class(document: &Document, id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        toggle(&el, class, on);
    }
}

pub fn toggle(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

/// Replace the text of `#id` if it changed
pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
}

/// Viewport size in CSS pixels
pub fn viewport_size() -> (f32, f32) {
    let Ok(window) = window() else {
        return super::HEADLESS_VIEWPORT;
    };
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (dim(window.inner_width()), dim(window.inner_height()))
}

/// Milliseconds on the same clock as animation frame timestamps
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// A running `requestAnimationFrame` loop
///
/// Dropping the handle cancels the pending frame and frees the callback.
pub struct FrameLoop {
    window: Window,
    request: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    /// Call `on_frame(timestamp_ms)` once per display refresh
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, PlatformError> {
        let window = window()?;
        let request = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&callback);
        let next_request = request.clone();
        let next_window = window.clone();
        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            next_request.set(None);
            on_frame(time);
            // Reschedule unless the loop was dropped meanwhile
            let Some(callback) = weak.upgrade() else {
                return;
            };
            if let Some(cb) = callback.borrow().as_ref() {
                next_request.set(
                    next_window
                        .request_animation_frame(cb.as_ref().unchecked_ref())
                        .ok(),
                );
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            request.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        }
        log::debug!("Frame loop started");
        Ok(Self {
            window,
            request,
            callback,
        })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.request.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
        log::debug!("Frame loop canceled");
    }
}
