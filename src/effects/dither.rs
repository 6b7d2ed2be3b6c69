use crate::config::DitherConfig;
use crate::pointer::PointerEvent;
use crate::surface::{ProgramSource, SurfaceSize};
use crate::uniforms::{FrameClock, UniformBatch};

use super::{Effect, QUAD_VERTEX};

/// Animated fbm waves quantised through an 8x8 Bayer matrix.
#[derive(Debug, Clone)]
pub struct DitherWaves {
    config: DitherConfig,
    size: SurfaceSize,
    pixel_ratio: f32,
    /// Pointer in drawing-buffer pixels, origin top-left.
    mouse: [f32; 2],
    time: f32,
}

impl DitherWaves {
    pub fn new(config: DitherConfig) -> Self {
        Self {
            config,
            size: SurfaceSize::new(1, 1),
            pixel_ratio: 1.0,
            mouse: [0.0, 0.0],
            time: 0.0,
        }
    }

    pub fn resolution(&self) -> [f32; 2] {
        let (w, h) = self.size.scaled(self.pixel_ratio);
        [w as f32, h as f32]
    }

    pub fn mouse(&self) -> [f32; 2] {
        self.mouse
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Effect for DitherWaves {
    fn label(&self) -> &'static str {
        "dithered waves"
    }

    fn program(&self) -> ProgramSource {
        ProgramSource {
            label: self.label(),
            vertex: QUAD_VERTEX,
            fragment: include_str!("../shaders/dither.frag"),
            texture: None,
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
        if !self.config.enable_mouse_interaction {
            return;
        }
        if let PointerEvent::Enter(at) | PointerEvent::Move(at) = event {
            self.mouse = [
                at.x * self.size.width as f32 * self.pixel_ratio,
                at.y * self.size.height as f32 * self.pixel_ratio,
            ];
        }
    }

    fn resize(&mut self, size: SurfaceSize, pixel_ratio: f32) {
        self.size = size;
        self.pixel_ratio = pixel_ratio;
    }

    fn tick(&mut self, clock: &FrameClock) {
        if !self.config.disable_animation {
            self.time = clock.elapsed;
        }
    }

    fn write_uniforms(&self, _clock: &FrameClock, batch: &mut UniformBatch) {
        let c = &self.config;
        let [w, h] = self.resolution();
        batch
            .vec2("resolution", w, h)
            .f32("time", self.time)
            .f32("waveSpeed", c.wave_speed)
            .f32("waveFrequency", c.wave_frequency)
            .f32("waveAmplitude", c.wave_amplitude)
            .vec3("waveColor", c.wave_color)
            .i32("enableMouseInteraction", c.enable_mouse_interaction as i32)
            .f32("mouseRadius", c.mouse_radius)
            .f32("colorNum", c.color_num)
            .f32("pixelSize", c.pixel_size);
        if c.enable_mouse_interaction {
            batch.vec2("mousePos", self.mouse[0], self.mouse[1]);
        }
    }
}
