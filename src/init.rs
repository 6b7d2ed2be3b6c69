//! One-time process-wide setup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static DONE: AtomicBool = AtomicBool::new(false);

/// Install the panic hook and console logger. Later calls do nothing.
pub fn init() {
    INIT.call_once(|| {
        install_hooks();
        DONE.store(true, Ordering::Release);
        log::info!("portfolio_fx {} ready", env!("CARGO_PKG_VERSION"));
    });
}

pub fn initialized() -> bool {
    DONE.load(Ordering::Acquire)
}

#[cfg(target_arch = "wasm32")]
fn install_hooks() {
    console_error_panic_hook::set_once();
    // a logger may already be installed by the embedding page
    console_log::init_with_level(log::Level::Info).ok();
}

#[cfg(not(target_arch = "wasm32"))]
fn install_hooks() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init();
        assert!(initialized());
        init();
        assert!(initialized());
    }
}
