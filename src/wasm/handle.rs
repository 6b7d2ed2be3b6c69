//! Entry points exported to the page.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use super::backend::WebBackend;
use crate::config::{capped_pixel_ratio, ChromaticConfig, DitherConfig, TypewriterConfig, WavyConfig};
use crate::effects::{ChromaticImage, DitherWaves, Effect, WavyImage};
use crate::init::init;
use crate::lifecycle::{Controller, Mount};
use crate::surface::SurfaceSize;
use crate::typewriter::Typewriter;

/// A running effect. `stop()` unmounts it; dropping the handle does the same.
#[wasm_bindgen]
pub struct EffectHandle {
    controller: Option<Rc<RefCell<dyn Controller>>>,
}

#[wasm_bindgen]
impl EffectHandle {
    pub fn stop(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.borrow_mut().unmount();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.controller
            .as_ref()
            .map(|c| c.borrow().phase().is_mounted())
            .unwrap_or(false)
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn mount_effect<E: Effect + 'static>(container: HtmlElement, effect: E) -> Result<EffectHandle, JsValue> {
    init();
    let window = web_sys::window().ok_or("no window")?;
    let ratio = capped_pixel_ratio(window.device_pixel_ratio(), effect.pixel_ratio_cap());
    let backend = WebBackend::new(window, container.clone(), ratio, effect.label());

    let mount = Rc::new(RefCell::new(Mount::new(backend, effect)));
    let controller: Rc<RefCell<dyn Controller>> = mount.clone();
    mount.borrow_mut().backend_mut().bind(Rc::downgrade(&controller));

    let rect = container.get_bounding_client_rect();
    let outcome = mount
        .borrow_mut()
        .mount(SurfaceSize::from_rect(rect.width(), rect.height()));
    debug!("{}: {:?}", mount.borrow().effect().label(), outcome);

    Ok(EffectHandle {
        controller: Some(controller),
    })
}

#[wasm_bindgen(js_name = mountChromatic)]
pub fn mount_chromatic(container: HtmlElement, config: &str) -> Result<EffectHandle, JsValue> {
    let config = ChromaticConfig::from_json(config)?;
    mount_effect(container, ChromaticImage::new(config))
}

#[wasm_bindgen(js_name = mountWavy)]
pub fn mount_wavy(container: HtmlElement, config: &str) -> Result<EffectHandle, JsValue> {
    let config = WavyConfig::from_json(config)?;
    mount_effect(container, WavyImage::new(config))
}

#[wasm_bindgen(js_name = mountDither)]
pub fn mount_dither(container: HtmlElement, config: &str) -> Result<EffectHandle, JsValue> {
    let config = DitherConfig::from_json(config)?;
    mount_effect(container, DitherWaves::new(config))
}

struct TypewriterRun {
    window: Window,
    text: HtmlElement,
    cursor: HtmlElement,
    typewriter: Typewriter,
    timeout: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl TypewriterRun {
    fn schedule(&mut self, delay_ms: u32) {
        let Some(callback) = self.callback.as_ref() else { return };
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms.min(i32::MAX as u32) as i32,
            ) {
            Ok(id) => self.timeout = Some(id),
            Err(err) => warn!("typewriter timer failed: {:?}", err),
        }
    }

    fn advance(&mut self) {
        self.timeout = None;
        let step = self.typewriter.advance();
        self.text.set_text_content(Some(&step.text));
        self.cursor
            .set_class_name(if step.paused { "ml-1 animate-pulse" } else { "ml-1" });
        self.schedule(step.delay_ms);
    }
}

/// A running typewriter. `stop()` is the only way to cancel its timer.
#[wasm_bindgen]
pub struct TypewriterHandle {
    run: Option<Rc<RefCell<TypewriterRun>>>,
}

#[wasm_bindgen]
impl TypewriterHandle {
    pub fn stop(&mut self) {
        let Some(run) = self.run.take() else { return };
        let mut run = run.borrow_mut();
        if let Some(id) = run.timeout.take() {
            run.window.clear_timeout_with_handle(id);
        }
        run.callback = None;
    }
}

impl Drop for TypewriterHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[wasm_bindgen(js_name = startTypewriter)]
pub fn start_typewriter(element: HtmlElement, config: &str) -> Result<TypewriterHandle, JsValue> {
    init();
    let config = TypewriterConfig::from_json(config)?;
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let text: HtmlElement = document.create_element("span")?.dyn_into()?;
    let cursor: HtmlElement = document.create_element("span")?.dyn_into()?;
    cursor.set_class_name("ml-1");
    cursor.set_text_content(Some("|"));
    element.set_text_content(None);
    element.append_child(&text)?;
    element.append_child(&cursor)?;

    let typewriter = Typewriter::new(&config);
    let first_delay = typewriter.initial_delay();
    let run = Rc::new(RefCell::new(TypewriterRun {
        window,
        text,
        cursor,
        typewriter,
        timeout: None,
        callback: None,
    }));

    let weak: Weak<RefCell<TypewriterRun>> = Rc::downgrade(&run);
    let callback = Closure::wrap(Box::new(move || {
        if let Some(run) = weak.upgrade() {
            run.borrow_mut().advance();
        }
    }) as Box<dyn FnMut()>);
    {
        let mut r = run.borrow_mut();
        r.callback = Some(callback);
        r.schedule(first_delay);
    }

    Ok(TypewriterHandle { run: Some(run) })
}
