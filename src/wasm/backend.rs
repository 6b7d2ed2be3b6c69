use std::cell::RefCell;
use std::rc::Weak;

use log::warn;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MouseEvent, ResizeObserver, Window,
};

use super::render::GlSurface;
use crate::error::{FxError, Result};
use crate::lifecycle::Controller;
use crate::pointer::{PointerEvent, Vec2};
use crate::surface::{Backend, FrameRequest, ProgramSource, SurfaceSize};

type SharedController = Weak<RefCell<dyn Controller>>;

/// Fraction of the container that must be on screen to keep animating.
const VISIBLE_THRESHOLD: f64 = 0.05;

/// Browser services for one effect container.
///
/// Every callback handed to the browser holds a `Weak` reference to the
/// controller, so a callback that outlives the mount does nothing.
pub struct WebBackend {
    window: Window,
    container: HtmlElement,
    pixel_ratio: f32,
    controller: Option<SharedController>,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
    pointer_listeners: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
    resize_observer: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
    visibility_observer: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl WebBackend {
    pub fn new(window: Window, container: HtmlElement, pixel_ratio: f32, label: &str) -> Self {
        container.set_attribute("role", "img").ok();
        container
            .set_attribute("aria-label", &format!("{} canvas", label))
            .ok();
        let style = container.style();
        style.set_property("position", "relative").ok();
        style.set_property("overflow", "hidden").ok();
        Self {
            window,
            container,
            pixel_ratio,
            controller: None,
            frame_callback: None,
            pointer_listeners: Vec::new(),
            resize_observer: None,
            visibility_observer: None,
        }
    }

    /// Point browser callbacks at the controller that owns this backend.
    pub fn bind(&mut self, controller: SharedController) {
        self.controller = Some(controller);
    }

    fn controller(&self) -> Result<SharedController> {
        self.controller
            .clone()
            .ok_or_else(|| FxError::Js("backend used before bind".into()))
    }

    fn attach_pointer(&mut self, controller: &SharedController) -> Result<()> {
        for kind in ["mouseenter", "mousemove", "mouseleave"] {
            let controller = controller.clone();
            let container = self.container.clone();
            let callback = Closure::wrap(Box::new(move |e: MouseEvent| {
                let rect = container.get_bounding_client_rect();
                let at = Vec2::new(
                    ((e.client_x() as f64 - rect.left()) / rect.width().max(1.0)) as f32,
                    ((e.client_y() as f64 - rect.top()) / rect.height().max(1.0)) as f32,
                );
                let event = match kind {
                    "mouseenter" => PointerEvent::Enter(at),
                    "mousemove" => PointerEvent::Move(at),
                    _ => PointerEvent::Leave,
                };
                with_controller(&controller, |c| c.pointer(event));
            }) as Box<dyn FnMut(MouseEvent)>);
            self.container
                .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
            self.pointer_listeners.push((kind, callback));
        }
        Ok(())
    }

    fn attach_resize(&mut self, controller: &SharedController) -> Result<()> {
        let controller = controller.clone();
        let container = self.container.clone();
        let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            let rect = container.get_bounding_client_rect();
            let size = SurfaceSize::from_rect(rect.width(), rect.height());
            with_controller(&controller, |c| c.resize(size));
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&self.container);
        self.resize_observer = Some((observer, callback));
        Ok(())
    }

    fn attach_visibility(&mut self, controller: &SharedController) -> Result<()> {
        let controller = controller.clone();
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let Some(last) = entries.iter().last() else { return };
            let visible = last.unchecked_into::<IntersectionObserverEntry>().is_intersecting();
            with_controller(&controller, |c| c.set_visible(visible));
        }) as Box<dyn FnMut(js_sys::Array)>);
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(VISIBLE_THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(&self.container);
        self.visibility_observer = Some((observer, callback));
        Ok(())
    }
}

/// Run `f` against the controller if it is still alive and not mid-callback.
fn with_controller(controller: &SharedController, f: impl FnOnce(&mut (dyn Controller + 'static))) {
    let Some(controller) = controller.upgrade() else { return };
    match controller.try_borrow_mut() {
        Ok(mut c) => f(&mut *c),
        Err(_) => warn!("controller busy; event dropped"),
    };
}

impl Backend for WebBackend {
    type Surface = GlSurface;

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_surface(&mut self, size: SurfaceSize, program: &ProgramSource) -> Result<GlSurface> {
        GlSurface::create(&self.container, size, self.pixel_ratio, program)
    }

    fn show_placeholder(&mut self, size: SurfaceSize) {
        let style = self.container.style();
        style
            .set_property("min-height", &format!("{}px", size.height))
            .ok();
        self.container.set_attribute("data-fx", "placeholder").ok();
    }

    /// On error, whatever was attached stays recorded for `detach_listeners`.
    fn attach_listeners(&mut self) -> Result<()> {
        let controller = self.controller()?;
        self.attach_pointer(&controller)?;
        self.attach_resize(&controller)?;
        self.attach_visibility(&controller)?;
        Ok(())
    }

    fn detach_listeners(&mut self) {
        for (kind, callback) in self.pointer_listeners.drain(..) {
            self.container
                .remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
                .ok();
        }
        if let Some((observer, _callback)) = self.resize_observer.take() {
            observer.disconnect();
        }
        if let Some((observer, _callback)) = self.visibility_observer.take() {
            observer.disconnect();
        }
    }

    fn request_frame(&mut self) -> Result<FrameRequest> {
        if self.frame_callback.is_none() {
            let controller = self.controller()?;
            self.frame_callback = Some(Closure::wrap(Box::new(move |now: f64| {
                with_controller(&controller, |c| {
                    c.frame(now);
                });
            }) as Box<dyn FnMut(f64)>));
        }
        let callback = self
            .frame_callback
            .as_ref()
            .ok_or_else(|| FxError::Js("frame callback missing".into()))?;
        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        Ok(FrameRequest(id))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.window.cancel_animation_frame(request.0).ok();
    }
}
