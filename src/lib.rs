//! Portfolio Gate - access gate and particle backgrounds for a portfolio site
//!
//! Core modules:
//! - `sim`: Deterministic core (particle fields, puzzles, gate state machine, host)
//! - `renderer`: Drawing surfaces and field/victory draw routines
//! - `pages`: Page destinations and their background presets
//! - `platform`: Browser frame loop and DOM helpers (wasm only)
//! - `settings`: Site configuration
//! - `color`, `error`: Shared color type and error enums

pub mod color;
pub mod error;
pub mod pages;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use color::Rgba;
pub use error::{ConfigError, PlatformError};
pub use pages::Page;
pub use settings::{QualityPreset, Settings};

/// Timing and sizing constants
pub mod consts {
    /// Fixed particle step (motion rules are per 60 Hz frame)
    pub const STEP_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap fed to the accumulator (tab switches etc.)
    pub const MAX_FRAME_GAP_MS: f64 = 100.0;

    /// Error flash after a rejected answer
    pub const ERROR_FLASH_MS: f64 = 500.0;
    /// Simulated loading before guest access enters battle
    pub const BYPASS_DELAY_MS: f64 = 800.0;
    /// Projectile flight before impact
    pub const PROJECTILE_FLIGHT_MS: f64 = 900.0;
    /// Enemy shatter animation before it is dead
    pub const ENEMY_SHATTER_MS: f64 = 800.0;
    /// Victory hold before the gate reports completion
    pub const VICTORY_HOLD_MS: f64 = 3000.0;

    /// Home background theme period
    pub const THEME_PERIOD_MS: f64 = 5000.0;
    /// Glitch flash on theme switch
    pub const THEME_GLITCH_MS: f64 = 200.0;

    /// Hard cap on particles per field (links are O(n²))
    pub const MAX_PARTICLES: usize = 300;

    /// Victory canvas is a fixed square
    pub const VICTORY_CANVAS_SIZE: f32 = 300.0;
}

/// Wrap a coordinate into `[0, extent)` (toroidal topology)
///
/// Non-positive extents collapse to 0.
#[inline]
pub fn wrap_coord(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}
