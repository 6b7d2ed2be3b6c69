use crate::config::WavyConfig;
use crate::pointer::{PointerEvent, Vec2};
use crate::surface::ProgramSource;
use crate::uniforms::{FrameClock, UniformBatch};

use super::{lerp, Effect, QUAD_VERTEX, TEXTURE_UNIT};

/// Time step added to `u_time` per accepted frame.
const TIME_STEP: f32 = 0.005;

/// Sine-warped image; the warp strength eases up while hovered.
#[derive(Debug, Clone)]
pub struct WavyImage {
    config: WavyConfig,
    /// Pointer in -1..1, y up.
    current_mouse: Vec2,
    target_mouse: Vec2,
    current_intensity: f32,
    target_intensity: f32,
    time: f32,
}

impl WavyImage {
    pub fn new(config: WavyConfig) -> Self {
        let base = config.base_intensity;
        Self {
            config,
            current_mouse: Vec2::default(),
            target_mouse: Vec2::default(),
            current_intensity: base,
            target_intensity: base,
            time: 1.0,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.current_intensity
    }

    pub fn target_intensity(&self) -> f32 {
        self.target_intensity
    }

    pub fn mouse(&self) -> Vec2 {
        self.current_mouse
    }
}

impl Effect for WavyImage {
    fn label(&self) -> &'static str {
        "wavy image"
    }

    fn program(&self) -> ProgramSource {
        ProgramSource {
            label: self.label(),
            vertex: QUAD_VERTEX,
            fragment: include_str!("../shaders/wavy.frag"),
            texture: Some(self.config.src.clone()),
            match_image_aspect: false,
        }
    }

    fn target_fps(&self) -> Option<f32> {
        self.config.target_fps
    }

    fn pixel_ratio_cap(&self) -> f32 {
        self.config.pixel_ratio_cap
    }

    fn pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter(_) => self.target_intensity = self.config.hover_intensity,
            PointerEvent::Move(at) => {
                self.target_mouse = Vec2::new(at.x * 2.0 - 1.0, -(at.y * 2.0) + 1.0);
            }
            PointerEvent::Leave => {
                self.target_intensity = self.config.base_intensity;
                self.target_mouse = Vec2::default();
            }
        }
    }

    fn tick(&mut self, _clock: &FrameClock) {
        let t = self.config.transition_speed;
        self.current_mouse.x = lerp(self.current_mouse.x, self.target_mouse.x, t);
        self.current_mouse.y = lerp(self.current_mouse.y, self.target_mouse.y, t);
        self.current_intensity = lerp(self.current_intensity, self.target_intensity, t);
        self.time += TIME_STEP;
    }

    fn write_uniforms(&self, _clock: &FrameClock, batch: &mut UniformBatch) {
        batch
            .f32("u_time", self.time)
            .f32("u_intensity", self.current_intensity)
            .vec2("u_mouse", self.current_mouse.x, self.current_mouse.y)
            .i32("u_texture", TEXTURE_UNIT);
    }
}
