//! Recording backend for driving `Mount` without a browser.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use portfolio_fx::surface::{Backend, FrameRequest, ProgramSource, RenderSurface, SurfaceSize};
use portfolio_fx::uniforms::UniformBatch;
use portfolio_fx::{FxError, Result};

#[derive(Debug, Default)]
pub struct Ledger {
    pub live_contexts: usize,
    pub peak_contexts: usize,
    pub created: u64,
    pub released: u64,
    pub outstanding: BTreeSet<i32>,
    pub next_frame: i32,
    pub listeners: bool,
    pub placeholder: Option<SurfaceSize>,
    pub context_unavailable: bool,
    /// `attach_listeners` registers, then reports an error.
    pub listeners_fail: bool,
    pub frame_fail: bool,
    /// Every backend/surface operation in call order.
    pub log: Vec<String>,
    pub last_batch: Option<UniformBatch>,
}

pub type SharedLedger = Rc<RefCell<Ledger>>;

pub struct RecordingBackend {
    pub ledger: SharedLedger,
    pub pixel_ratio: f32,
}

impl RecordingBackend {
    pub fn new() -> (Self, SharedLedger) {
        let ledger = SharedLedger::default();
        (
            Self {
                ledger: ledger.clone(),
                pixel_ratio: 1.0,
            },
            ledger,
        )
    }
}

pub struct RecordingSurface {
    id: u64,
    size: SurfaceSize,
    ledger: SharedLedger,
}

impl RenderSurface for RecordingSurface {
    fn context_id(&self) -> u64 {
        self.id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.ledger.borrow_mut().log.push(format!("resize {}x{}", size.width, size.height));
    }

    fn apply(&mut self, batch: &UniformBatch) {
        let mut ledger = self.ledger.borrow_mut();
        for (name, _) in batch.iter() {
            ledger.log.push(format!("uniform {}", name));
        }
        ledger.last_batch = Some(batch.clone());
    }

    fn draw(&mut self) {
        self.ledger.borrow_mut().log.push("draw".into());
    }

    fn release(self) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.log.push("release surface".into());
        ledger.live_contexts -= 1;
        ledger.released += 1;
    }
}

impl Backend for RecordingBackend {
    type Surface = RecordingSurface;

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_surface(&mut self, size: SurfaceSize, _program: &ProgramSource) -> Result<RecordingSurface> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.context_unavailable {
            return Err(FxError::ResourceUnavailable("no webgl2".into()));
        }
        ledger.created += 1;
        ledger.live_contexts += 1;
        ledger.peak_contexts = ledger.peak_contexts.max(ledger.live_contexts);
        ledger.log.push("create surface".into());
        Ok(RecordingSurface {
            id: ledger.created,
            size,
            ledger: self.ledger.clone(),
        })
    }

    fn show_placeholder(&mut self, size: SurfaceSize) {
        self.ledger.borrow_mut().placeholder = Some(size);
    }

    fn attach_listeners(&mut self) -> Result<()> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.listeners = true;
        ledger.log.push("attach listeners".into());
        if ledger.listeners_fail {
            return Err(FxError::Js("observer refused".into()));
        }
        Ok(())
    }

    fn detach_listeners(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.listeners = false;
        ledger.log.push("detach listeners".into());
    }

    fn request_frame(&mut self) -> Result<FrameRequest> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.frame_fail {
            return Err(FxError::Js("no animation frames".into()));
        }
        ledger.next_frame += 1;
        let id = ledger.next_frame;
        ledger.outstanding.insert(id);
        ledger.log.push("request frame".into());
        Ok(FrameRequest(id))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.outstanding.remove(&request.0);
        ledger.log.push("cancel frame".into());
    }
}

/// Mark the oldest outstanding request as fired, like the host would before
/// invoking the callback.
pub fn fire(ledger: &SharedLedger) {
    let mut ledger = ledger.borrow_mut();
    if let Some(id) = ledger.outstanding.iter().next().copied() {
        ledger.outstanding.remove(&id);
    }
}
