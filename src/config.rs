//! Typed, defaulted configuration for each effect.
//!
//! Every struct deserialises from the camelCase JSON object the page passes
//! to the mount functions; missing fields take the defaults below.

use serde::Deserialize;

use crate::error::{FxError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChromaticConfig {
    /// Image to distort. Required.
    pub src: String,
    /// Ease factor while the pointer is over the image.
    pub follow_ease: f32,
    /// Ease factor once the pointer has left.
    pub settle_ease: f32,
    /// Intensity lost per tick.
    pub decay_step: f32,
    pub pixel_ratio_cap: f32,
    pub target_fps: Option<f32>,
}

impl Default for ChromaticConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            follow_ease: 0.02,
            settle_ease: 0.05,
            decay_step: 0.05,
            pixel_ratio_cap: 2.0,
            target_fps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WavyConfig {
    pub src: String,
    pub base_intensity: f32,
    pub hover_intensity: f32,
    pub transition_speed: f32,
    pub pixel_ratio_cap: f32,
    pub target_fps: Option<f32>,
}

impl Default for WavyConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            base_intensity: 0.007,
            hover_intensity: 0.01,
            transition_speed: 0.05,
            pixel_ratio_cap: 2.0,
            target_fps: None,
        }
    }
}

/// Wave and dither parameters are forwarded to the shader untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DitherConfig {
    pub wave_speed: f32,
    pub wave_frequency: f32,
    pub wave_amplitude: f32,
    pub wave_color: [f32; 3],
    /// Colour levels per channel after quantisation.
    pub color_num: f32,
    /// Dither block edge in device pixels.
    pub pixel_size: f32,
    pub disable_animation: bool,
    pub enable_mouse_interaction: bool,
    pub mouse_radius: f32,
    pub pixel_ratio_cap: f32,
    pub target_fps: Option<f32>,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            wave_speed: 0.04,
            wave_frequency: 2.0,
            wave_amplitude: 0.18,
            wave_color: [0.5, 0.5, 0.5],
            color_num: 4.0,
            pixel_size: 3.0,
            disable_animation: false,
            enable_mouse_interaction: true,
            mouse_radius: 1.0,
            pixel_ratio_cap: 1.5,
            target_fps: Some(30.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypewriterConfig {
    pub words: Vec<String>,
    /// Milliseconds per typed character.
    pub typing_speed: u32,
    /// Milliseconds per deleted character.
    pub deleting_speed: u32,
    /// Milliseconds to hold a finished word.
    pub pause_time: u32,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            typing_speed: 20,
            deleting_speed: 0,
            pause_time: 1200,
        }
    }
}

impl ChromaticConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = parse_object(json)?;
        require_src(&config.src)?;
        Ok(config)
    }
}

impl WavyConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = parse_object(json)?;
        require_src(&config.src)?;
        Ok(config)
    }
}

impl DitherConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        parse_object(json)
    }
}

impl TypewriterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = parse_object(json)?;
        if config.words.is_empty() {
            return Err(FxError::Config("typewriter needs at least one word".into()));
        }
        Ok(config)
    }
}

/// An empty string is accepted as `{}` so callers can mount with defaults.
fn parse_object<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(json)?)
}

fn require_src(src: &str) -> Result<()> {
    if src.trim().is_empty() {
        return Err(FxError::Config("`src` must name an image".into()));
    }
    Ok(())
}

/// Clamp the host's device pixel ratio to the configured cap. Caps below 1
/// are honoured; a non-positive cap leaves the device ratio alone.
pub fn capped_pixel_ratio(device_ratio: f64, cap: f32) -> f32 {
    let device = if device_ratio.is_finite() && device_ratio > 0.0 {
        device_ratio as f32
    } else {
        1.0
    };
    if cap.is_finite() && cap > 0.0 {
        device.min(cap)
    } else {
        device
    }
}
