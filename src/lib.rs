//! Pointer-reactive WebGL effects for the portfolio page.
//!
//! The effect state machines, the frame gate and the mount lifecycle are plain
//! Rust and run anywhere; the WebGL2/DOM backend is only compiled for wasm32.

pub mod config;
pub mod effects;
pub mod error;
pub mod gate;
pub mod init;
pub mod lifecycle;
pub mod pointer;
pub mod surface;
pub mod typewriter;
pub mod uniforms;

pub use error::{FxError, Result};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod backend;
    mod handle;
    mod render;

    pub use handle::{mount_chromatic, mount_dither, mount_wavy, start_typewriter, EffectHandle, TypewriterHandle};

    #[wasm_bindgen(start)]
    pub fn start() {
        crate::init::init();
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{mount_chromatic, mount_dither, mount_wavy, start_typewriter, EffectHandle, TypewriterHandle};
