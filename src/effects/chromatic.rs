use crate::config::ChromaticConfig;
use crate::pointer::{PointerEvent, PointerState, PointerTracker};
use crate::surface::ProgramSource;
use crate::uniforms::{FrameClock, UniformBatch};

use super::{Effect, QUAD_VERTEX, TEXTURE_UNIT};

/// Grid displacement plus RGB split that flares up while the pointer moves.
#[derive(Debug, Clone)]
pub struct ChromaticImage {
    config: ChromaticConfig,
    tracker: PointerTracker,
}

impl ChromaticImage {
    pub fn new(config: ChromaticConfig) -> Self {
        let tracker = PointerTracker::new(config.follow_ease, config.settle_ease, config.decay_step);
        Self { config, tracker }
    }

    pub fn state(&self) -> &PointerState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }
}

impl Effect for ChromaticImage {
    fn label(&self) -> &'static str {
        "chromatic image"
    }

    fn program(&self) -> ProgramSource {
        ProgramSource {
            label: self.label(),
            vertex: QUAD_VERTEX,
            fragment: include_str!("../shaders/chromatic.frag"),
            texture: Some(self.config.src.clone()),
            match_image_aspect: true,
        }
    }

    fn target_fps(&self) -> Option<f32> {
        self.config.target_fps
    }

    fn pixel_ratio_cap(&self) -> f32 {
        self.config.pixel_ratio_cap
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.tracker.handle(event);
    }

    fn tick(&mut self, _clock: &FrameClock) {
        self.tracker.tick();
    }

    fn write_uniforms(&self, clock: &FrameClock, batch: &mut UniformBatch) {
        let s = self.tracker.state();
        let mouse = s.current.flip_y();
        let prev = s.previous_target.flip_y();
        batch
            .vec2("u_mouse", mouse.x, mouse.y)
            .vec2("u_prevMouse", prev.x, prev.y)
            .f32("u_aberrationIntensity", s.intensity)
            .f32("u_time", clock.elapsed)
            .i32("u_texture", TEXTURE_UNIT);
    }
}
