//! Per-frame uniform updates.
//!
//! An effect fills a [`UniformBatch`] for the tick; [`present`] writes the
//! whole batch before issuing the tick's single draw call, so a draw never
//! sees a half-updated program.

use crate::surface::RenderSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBatch {
    entries: Vec<(&'static str, UniformValue)>,
}

impl UniformBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: UniformValue) -> &mut Self {
        self.entries.push((name, value));
        self
    }

    pub fn f32(&mut self, name: &'static str, v: f32) -> &mut Self {
        self.set(name, UniformValue::F32(v))
    }

    pub fn i32(&mut self, name: &'static str, v: i32) -> &mut Self {
        self.set(name, UniformValue::I32(v))
    }

    pub fn vec2(&mut self, name: &'static str, x: f32, y: f32) -> &mut Self {
        self.set(name, UniformValue::Vec2([x, y]))
    }

    pub fn vec3(&mut self, name: &'static str, v: [f32; 3]) -> &mut Self {
        self.set(name, UniformValue::Vec3(v))
    }

    /// Last value written for `name`, if any.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, UniformValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Timing handed to effects on every accepted tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Host timestamp of the frame callback.
    pub now_ms: f64,
    /// Seconds since the surface was mounted.
    pub elapsed: f32,
    /// Accepted frames so far, starting at 0.
    pub frame: u64,
}

/// Apply a full batch, then draw once.
pub fn present<S: RenderSurface>(surface: &mut S, batch: &UniformBatch) {
    surface.apply(batch);
    surface.draw();
}
