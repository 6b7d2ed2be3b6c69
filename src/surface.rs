//! Rendering surface sizing and the backend seam the lifecycle drives.

use crate::error::Result;
use crate::uniforms::UniformBatch;

/// Aspect ratio (height / width) used before the image has loaded.
pub const DEFAULT_ASPECT: f32 = 0.75;

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Floor a fractional bounding box; degenerate boxes become 1×1.
    pub fn from_rect(width: f64, height: f64) -> Self {
        let floor = |v: f64| if v.is_finite() && v >= 1.0 { v.floor() as u32 } else { 1 };
        Self::new(floor(width), floor(height))
    }

    /// Drawing buffer size for a (capped) device pixel ratio.
    pub fn scaled(self, pixel_ratio: f32) -> (u32, u32) {
        let ratio = pixel_ratio.max(0.0) as f64;
        let w = (self.width as f64 * ratio).floor().max(1.0);
        let h = (self.height as f64 * ratio).floor().max(1.0);
        (w as u32, h as u32)
    }
}

/// Height over width of a loaded image, with fallbacks for missing sizes.
pub fn aspect_ratio(natural_width: u32, natural_height: u32) -> f32 {
    let w = if natural_width == 0 { 1.0 } else { natural_width as f32 };
    let h = if natural_height == 0 { 0.9 } else { natural_height as f32 };
    h / w
}

/// CSS `aspect-ratio` value for a height/width ratio.
pub fn aspect_ratio_css(ratio: f32) -> String {
    format!("1 / {}", ratio)
}

/// One allocated rendering context with its program, geometry and texture.
///
/// `release` consumes the surface so nothing can touch it afterwards.
pub trait RenderSurface {
    /// Stable identity of the underlying graphics context.
    fn context_id(&self) -> u64;
    fn size(&self) -> SurfaceSize;
    fn resize(&mut self, size: SurfaceSize);
    /// Write every uniform of the batch to the program.
    fn apply(&mut self, batch: &UniformBatch);
    fn draw(&mut self);
    /// Free buffers, then the program, then the context itself.
    fn release(self);
}

/// Opaque token for an outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// Host environment services the lifecycle controller relies on.
pub trait Backend {
    type Surface: RenderSurface;

    /// Device pixel ratio after applying the effect's cap.
    fn pixel_ratio(&self) -> f32;

    fn create_surface(&mut self, size: SurfaceSize, program: &ProgramSource) -> Result<Self::Surface>;
    /// Shown instead of the canvas when no context can be created.
    fn show_placeholder(&mut self, size: SurfaceSize);
    fn attach_listeners(&mut self) -> Result<()>;
    fn detach_listeners(&mut self);
    fn request_frame(&mut self) -> Result<FrameRequest>;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// GLSL sources plus the optional texture image an effect draws with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSource {
    pub label: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub texture: Option<String>,
    /// Resize the container to the loaded image's aspect ratio.
    pub match_image_aspect: bool,
}
