//! Platform abstraction layer
//!
//! Browser-only pieces the core never touches:
//! - Cancelable `requestAnimationFrame` loop
//! - Viewport size and time
//! - DOM lookups and class toggles

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::*;

/// Viewport used when no browser is around (headless runs)
pub const HEADLESS_VIEWPORT: (f32, f32) = (1280.0, 720.0);
