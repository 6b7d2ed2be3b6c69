//! Mount/unmount lifecycle of one effect on one container.
//!
//! `Mount` owns the backend, the effect, the frame gate and (while mounted)
//! the rendering surface. Resources are acquired surface → listeners → frame
//! request and released in the reverse order. Releasing is idempotent because
//! every resource sits in an `Option` that is taken exactly once.

use log::{debug, warn};

use crate::effects::Effect;
use crate::gate::{FrameGate, GateDecision};
use crate::pointer::PointerEvent;
use crate::surface::{Backend, FrameRequest, RenderSurface, SurfaceSize};
use crate::uniforms::{present, FrameClock, UniformBatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Mounting,
    Running,
    Throttled,
    Hidden,
    Unmounting,
}

impl Phase {
    pub fn is_mounted(self) -> bool {
        matches!(self, Phase::Running | Phase::Throttled | Phase::Hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Running,
    /// No usable rendering context; an empty sized placeholder is shown.
    Placeholder,
    AlreadyMounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    Hidden,
    Throttled,
    /// Callback arrived with nothing mounted.
    Inactive,
}

pub struct Mount<B: Backend, E: Effect> {
    backend: B,
    effect: E,
    gate: FrameGate,
    surface: Option<B::Surface>,
    pending: Option<FrameRequest>,
    listening: bool,
    phase: Phase,
    started_ms: Option<f64>,
    frames: u64,
    batch: UniformBatch,
}

impl<B: Backend, E: Effect> Mount<B, E> {
    pub fn new(backend: B, effect: E) -> Self {
        let gate = FrameGate::new(effect.target_fps());
        Self {
            backend,
            effect,
            gate,
            surface: None,
            pending: None,
            listening: false,
            phase: Phase::Unmounted,
            started_ms: None,
            frames: 0,
            batch: UniformBatch::new(),
        }
    }

    pub fn mount(&mut self, size: SurfaceSize) -> MountOutcome {
        if self.phase != Phase::Unmounted {
            return MountOutcome::AlreadyMounted;
        }
        self.phase = Phase::Mounting;

        let program = self.effect.program();
        let surface = match self.backend.create_surface(size, &program) {
            Ok(surface) => surface,
            Err(err) => {
                warn!("{}: {}; rendering placeholder", program.label, err);
                return self.degrade(size);
            }
        };
        debug!("{}: surface {} created at {}x{}", program.label, surface.context_id(), size.width, size.height);
        self.surface = Some(surface);
        self.effect.resize(size, self.backend.pixel_ratio());

        // set first: a partial attach still needs its detach
        self.listening = true;
        if let Err(err) = self.backend.attach_listeners() {
            warn!("{}: listeners failed: {}", program.label, err);
            self.teardown();
            return self.degrade(size);
        }

        match self.backend.request_frame() {
            Ok(request) => self.pending = Some(request),
            Err(err) => {
                warn!("{}: frame request failed: {}", program.label, err);
                self.teardown();
                return self.degrade(size);
            }
        }

        self.phase = Phase::Running;
        MountOutcome::Running
    }

    fn degrade(&mut self, size: SurfaceSize) -> MountOutcome {
        self.backend.show_placeholder(size);
        self.phase = Phase::Unmounted;
        MountOutcome::Placeholder
    }

    /// Rescale the existing surface; the context is kept.
    pub fn resize(&mut self, size: SurfaceSize) {
        if let Some(surface) = self.surface.as_mut() {
            if surface.size() != size {
                surface.resize(size);
                self.effect.resize(size, self.backend.pixel_ratio());
            }
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.gate.set_visible(visible);
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        if self.surface.is_some() {
            self.effect.pointer(event);
        }
    }

    /// Body of the host's frame callback.
    pub fn frame(&mut self, now_ms: f64) -> TickOutcome {
        // the request that brought us here has fired
        self.pending = None;
        let Some(surface) = self.surface.as_mut() else {
            return TickOutcome::Inactive;
        };

        let outcome = match self.gate.admit(now_ms) {
            GateDecision::Hidden => {
                self.phase = Phase::Hidden;
                TickOutcome::Hidden
            }
            GateDecision::Throttled => {
                self.phase = Phase::Throttled;
                TickOutcome::Throttled
            }
            GateDecision::Accept => {
                self.phase = Phase::Running;
                let started = *self.started_ms.get_or_insert(now_ms);
                let clock = FrameClock {
                    now_ms,
                    elapsed: ((now_ms - started) / 1000.0) as f32,
                    frame: self.frames,
                };
                self.effect.tick(&clock);
                self.batch.clear();
                self.effect.write_uniforms(&clock, &mut self.batch);
                present(surface, &self.batch);
                self.frames += 1;
                TickOutcome::Drawn
            }
        };

        match self.backend.request_frame() {
            Ok(request) => self.pending = Some(request),
            Err(err) => warn!("next frame request failed: {}", err),
        }
        outcome
    }

    /// Cancel the pending frame, drop listeners, then release the surface.
    pub fn unmount(&mut self) {
        if self.surface.is_none() && self.pending.is_none() && !self.listening {
            return;
        }
        self.phase = Phase::Unmounting;
        self.teardown();
        self.phase = Phase::Unmounted;
        debug!("{}: unmounted", self.effect.label());
    }

    fn teardown(&mut self) {
        if let Some(request) = self.pending.take() {
            self.backend.cancel_frame(request);
        }
        if self.listening {
            self.backend.detach_listeners();
            self.listening = false;
        }
        if let Some(surface) = self.surface.take() {
            surface.release();
        }
        self.gate.reset();
        self.started_ms = None;
        self.frames = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.surface.as_ref().map(|s| s.size())
    }

    pub fn context_id(&self) -> Option<u64> {
        self.surface.as_ref().map(|s| s.context_id())
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: Backend, E: Effect> Drop for Mount<B, E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Type-erased view of a [`Mount`] for host callbacks.
pub trait Controller {
    fn frame(&mut self, now_ms: f64) -> TickOutcome;
    fn pointer(&mut self, event: PointerEvent);
    fn resize(&mut self, size: SurfaceSize);
    fn set_visible(&mut self, visible: bool);
    fn unmount(&mut self);
    fn phase(&self) -> Phase;
}

impl<B: Backend, E: Effect> Controller for Mount<B, E> {
    fn frame(&mut self, now_ms: f64) -> TickOutcome {
        Mount::frame(self, now_ms)
    }

    fn pointer(&mut self, event: PointerEvent) {
        Mount::pointer(self, event)
    }

    fn resize(&mut self, size: SurfaceSize) {
        Mount::resize(self, size)
    }

    fn set_visible(&mut self, visible: bool) {
        Mount::set_visible(self, visible)
    }

    fn unmount(&mut self) {
        Mount::unmount(self)
    }

    fn phase(&self) -> Phase {
        self.phase
    }
}
