//! The concrete shader effects and the trait the lifecycle drives them by.

mod chromatic;
mod dither;
mod wavy;

pub use chromatic::ChromaticImage;
pub use dither::DitherWaves;
pub use wavy::WavyImage;

use crate::pointer::PointerEvent;
use crate::surface::{ProgramSource, SurfaceSize};
use crate::uniforms::{FrameClock, UniformBatch};

pub(crate) const QUAD_VERTEX: &str = include_str!("../shaders/quad.vert");

/// Texture unit image-backed effects sample from.
pub const TEXTURE_UNIT: i32 = 0;

pub trait Effect {
    /// Short name used in logs and the container's accessibility label.
    fn label(&self) -> &'static str;

    fn program(&self) -> ProgramSource;

    fn target_fps(&self) -> Option<f32> {
        None
    }

    fn pixel_ratio_cap(&self) -> f32;

    fn pointer(&mut self, event: PointerEvent);

    fn resize(&mut self, _size: SurfaceSize, _pixel_ratio: f32) {}

    /// Advance animation state for an accepted frame.
    fn tick(&mut self, clock: &FrameClock);

    fn write_uniforms(&self, clock: &FrameClock, batch: &mut UniformBatch);
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
